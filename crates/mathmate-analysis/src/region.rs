//! Locating the math expression around the cursor.
//!
//! Both extractors scan outward from the cursor. They never parse the
//! document, and an ambiguous layout (unbalanced delimiters, a cursor sitting
//! inside a delimiter) yields `None` rather than an error.

use ecow::EcoString;
use mathmate_std::{EditorPosition, EditorRange};
use serde::{Deserialize, Serialize};

use crate::Buffer;
use crate::location::utf16_to_byte_clamped;

/// The kind of a math region.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum MathKind {
    /// `$...$` on a single line.
    Inline,
    /// `$$...$$`, possibly spanning several lines.
    Display,
}

impl MathKind {
    /// The delimiter surrounding regions of this kind.
    pub fn delimiter(self) -> &'static str {
        match self {
            MathKind::Inline => "$",
            MathKind::Display => "$$",
        }
    }
}

/// A math expression and its boundary in buffer coordinates.
///
/// `content` is exactly the text between the delimiters. `start` is the
/// position right after the opening delimiter and `end` the position of the
/// closing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MathRegion {
    /// Inline or display.
    pub kind: MathKind,
    /// The source between the delimiters.
    pub content: EcoString,
    /// The first position of the content.
    pub start: EditorPosition,
    /// The position right after the content.
    pub end: EditorPosition,
}

impl MathRegion {
    /// The range covered by the content.
    pub fn range(&self) -> EditorRange {
        EditorRange::new(self.start, self.end)
    }

    /// Whether `pos` lies between the delimiters, boundaries included.
    pub fn contains(&self, pos: EditorPosition) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Converts a buffer position into a `(line, column)` pair local to
    /// `content`. The start column is only subtracted on the first line.
    ///
    /// Returns `None` for positions before the region start.
    pub fn to_local(&self, pos: EditorPosition) -> Option<(usize, usize)> {
        let line = pos.line.checked_sub(self.start.line)?;
        let column = if line == 0 {
            pos.ch.checked_sub(self.start.ch)?
        } else {
            pos.ch
        };
        Some((line, column))
    }

    /// Converts a `(line, column)` pair local to `content` into a buffer
    /// position.
    pub fn to_buffer(&self, line: usize, column: usize) -> EditorPosition {
        let ch = if line == 0 {
            column + self.start.ch
        } else {
            column
        };
        EditorPosition::new(line + self.start.line, ch)
    }
}

/// Finds the innermost region around `cursor`, preferring display math.
pub fn locate(buffer: &Buffer, cursor: EditorPosition) -> Option<MathRegion> {
    extract_display(buffer, cursor).or_else(|| extract_inline(buffer, cursor))
}

/// Extracts the inline region around `cursor`, scanning its line only.
///
/// The region is bounded by the last unescaped `$` before the cursor and the
/// first unescaped `$` after it. A cursor that sits between a `$` and a space
/// (`$| x$` or `$x |$`) is treated as padding, not as content.
pub fn extract_inline(buffer: &Buffer, cursor: EditorPosition) -> Option<MathRegion> {
    let cursor = buffer.clamp(cursor);
    let line = buffer.line(cursor.line)?;
    let split = utf16_to_byte_clamped(line, cursor.ch);
    let (before, after) = line.split_at(split);

    let prev = before.chars().next_back();
    let next = after.chars().next();
    if matches!((prev, next), (Some('$'), Some(' ')) | (Some(' '), Some('$'))) {
        return None;
    }

    let open = before
        .char_indices()
        .rev()
        .find(|&(idx, c)| c == '$' && !is_escaped(line, idx))?
        .0;
    let close = split
        + after
            .char_indices()
            .find(|&(idx, c)| c == '$' && !is_escaped(line, split + idx))?
            .0;

    let content = &line[open + 1..close];
    let start = EditorPosition::new(cursor.line, utf16_col(line, open + 1));
    let end = start.advance(content);
    Some(MathRegion {
        kind: MathKind::Inline,
        content: content.into(),
        start,
        end,
    })
}

/// Extracts the display region around `cursor`.
///
/// The opening `$$` is the nearest marker before the cursor and the closing
/// `$$` the nearest one after it. The opening marker must be an odd one
/// counting from the top of the buffer, otherwise the cursor sits between two
/// display blocks. A cursor splitting a `$$` marker yields `None`.
pub fn extract_display(buffer: &Buffer, cursor: EditorPosition) -> Option<MathRegion> {
    let text = buffer.text();
    let offset = buffer.pos_to_byte(cursor);
    if text[..offset].ends_with('$') && text[offset..].starts_with('$') {
        return None;
    }

    let markers = display_markers(text);
    let before = markers.partition_point(|&m| m + 2 <= offset);
    if before % 2 == 0 {
        return None;
    }
    let open = markers[before - 1] + 2;
    let close = *markers.get(before)?;
    if close < offset {
        // The cursor splits a marker.
        return None;
    }

    let content = &text[open..close];
    let start = buffer.byte_to_pos(open);
    Some(MathRegion {
        kind: MathKind::Display,
        content: content.into(),
        start,
        end: start.advance(content),
    })
}

/// Byte offsets of every unescaped `$$` token, scanned left to right without
/// overlap.
///
/// A `$$` that closes one inline expression and opens the next (`$a$$b$`) is
/// not a marker. It follows an odd number of lone `$` on its line and touches
/// content on both sides.
fn display_markers(text: &str) -> Vec<usize> {
    let bytes = text.as_bytes();
    let touches = |idx: Option<usize>| {
        idx.and_then(|idx| bytes.get(idx))
            .is_some_and(|b| !b.is_ascii_whitespace())
    };

    let mut markers = Vec::new();
    let mut lone = 0usize;
    let mut idx = 0;
    while idx < bytes.len() {
        match bytes[idx] {
            b'\n' => lone = 0,
            b'$' if is_escaped(text, idx) => {}
            b'$' if bytes.get(idx + 1) == Some(&b'$') => {
                let joins_inline =
                    lone % 2 == 1 && touches(idx.checked_sub(1)) && touches(Some(idx + 2));
                if !joins_inline {
                    markers.push(idx);
                }
                idx += 2;
                continue;
            }
            b'$' => lone += 1,
            _ => {}
        }
        idx += 1;
    }
    markers
}

/// Whether the character at byte `idx` is preceded by an odd number of
/// backslashes.
fn is_escaped(text: &str, idx: usize) -> bool {
    let slashes = text.as_bytes()[..idx]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    slashes % 2 == 1
}

fn utf16_col(line: &str, byte: usize) -> usize {
    mathmate_std::debug_loc::utf16_len(&line[..byte])
}
