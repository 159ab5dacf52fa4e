//! Conversions between editor columns and UTF-8 byte offsets.
//!
//! The editor counts columns in UTF-16 code units while the renderer reports
//! byte offsets into the UTF-8 source. For more background on why the two
//! disagree, see ["The bottom emoji breaks rust-analyzer"](https://fasterthanli.me/articles/the-bottom-emoji-breaks-rust-analyzer).

pub use mathmate_std::debug_loc::utf16_len;

/// Converts a UTF-16 column on a single line into a byte offset into that
/// line.
///
/// Returns `None` if the column lies beyond the end of the line. A column
/// pointing into the middle of a surrogate pair counts the whole code point.
pub fn utf16_to_byte_in_line(line: &str, column: usize) -> Option<usize> {
    let mut utf16 = 0;
    let mut byte = 0;
    let mut chars = line.chars();
    while utf16 < column {
        let c = chars.next()?;
        utf16 += c.len_utf16();
        byte += c.len_utf8();
    }
    Some(byte)
}

/// Like [`utf16_to_byte_in_line`], but clamps columns beyond the end of the
/// line to the line length.
pub fn utf16_to_byte_clamped(line: &str, column: usize) -> usize {
    utf16_to_byte_in_line(line, column).unwrap_or(line.len())
}

/// Converts a byte offset into a line into a UTF-16 column.
///
/// Offsets past the end, or inside a multi-byte character, are rounded down
/// to the previous character boundary.
pub fn byte_to_utf16_in_line(line: &str, byte: usize) -> usize {
    let mut byte = byte.min(line.len());
    while !line.is_char_boundary(byte) {
        byte -= 1;
    }
    utf16_len(&line[..byte])
}

/// Counts the UTF-8 bytes preceding the UTF-16 position `(line, column)` in
/// `content`.
///
/// Each line separator counts as one byte. Positions beyond the last line, or
/// beyond the end of their line, yield the total byte length of `content`.
pub fn byte_offset_of(content: &str, line: usize, column: usize) -> usize {
    let mut line_offset = 0;
    for (idx, text) in content.split('\n').enumerate() {
        if idx == line {
            return match utf16_to_byte_in_line(text, column) {
                Some(byte) => line_offset + byte,
                None => {
                    log::debug!(
                        "column out of bounds: {line}:{column}, line has {} code units",
                        utf16_len(text)
                    );
                    content.len()
                }
            };
        }
        line_offset += text.len() + 1;
    }

    log::debug!("line out of bounds: {line}:{column}");
    content.len()
}

/// The signed variant of [`byte_offset_of`] for hosts that may hand over
/// negative coordinates. Negative lines or columns yield `0`.
pub fn byte_offset_of_signed(content: &str, line: i64, column: i64) -> usize {
    match (usize::try_from(line), usize::try_from(column)) {
        (Ok(line), Ok(column)) => byte_offset_of(content, line, column),
        _ => 0,
    }
}
