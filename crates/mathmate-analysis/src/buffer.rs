//! An in-memory editor buffer addressed by [`EditorPosition`].

use core::ops::Range;

use mathmate_std::{EditorPosition, EditorRange};

use crate::location::{byte_to_utf16_in_line, utf16_to_byte_clamped};

/// The text of an editor document together with a line index.
///
/// Positions handed to the buffer are clamped: a line past the end maps to the
/// last line and a column past the end of its line maps to the line end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    text: String,
    line_starts: Vec<usize>,
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl Buffer {
    /// Creates a buffer holding `text`.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = index_lines(&text);
        Self { text, line_starts }
    }

    /// The whole text of the buffer.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The number of lines. An empty buffer has one empty line.
    pub fn len_lines(&self) -> usize {
        self.line_starts.len()
    }

    /// The text of line `idx` without its line separator, or `None` if there is
    /// no such line.
    pub fn line(&self, idx: usize) -> Option<&str> {
        let start = *self.line_starts.get(idx)?;
        let end = match self.line_starts.get(idx + 1) {
            Some(next) => next - 1,
            None => self.text.len(),
        };
        Some(&self.text[start..end])
    }

    /// Iterates over all lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        (0..self.len_lines()).filter_map(|idx| self.line(idx))
    }

    /// The byte offset at which line `idx` starts.
    pub fn line_start(&self, idx: usize) -> Option<usize> {
        self.line_starts.get(idx).copied()
    }

    /// The position right after the last character.
    pub fn end(&self) -> EditorPosition {
        let last = self.len_lines() - 1;
        EditorPosition::new(last, self.line_len(last))
    }

    /// The length of line `idx` in UTF-16 code units.
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).map(mathmate_std::debug_loc::utf16_len).unwrap_or(0)
    }

    /// Clamps a position into the buffer.
    pub fn clamp(&self, pos: EditorPosition) -> EditorPosition {
        if pos.line >= self.len_lines() {
            return self.end();
        }
        EditorPosition::new(pos.line, pos.ch.min(self.line_len(pos.line)))
    }

    /// Converts a position into a byte offset into [`Buffer::text`].
    pub fn pos_to_byte(&self, pos: EditorPosition) -> usize {
        let pos = self.clamp(pos);
        let start = self.line_starts[pos.line];
        let line = self.line(pos.line).unwrap_or_default();
        start + utf16_to_byte_clamped(line, pos.ch)
    }

    /// Converts a byte offset into a position, rounding down to the previous
    /// character boundary.
    pub fn byte_to_pos(&self, byte: usize) -> EditorPosition {
        let byte = byte.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= byte) - 1;
        let text = self.line(line).unwrap_or_default();
        let ch = byte_to_utf16_in_line(text, byte - self.line_starts[line]);
        EditorPosition::new(line, ch)
    }

    /// Converts a position into an absolute UTF-16 offset, counting each line
    /// separator as one unit.
    pub fn pos_to_offset(&self, pos: EditorPosition) -> usize {
        let pos = self.clamp(pos);
        let before: usize = (0..pos.line).map(|idx| self.line_len(idx) + 1).sum();
        before + pos.ch
    }

    /// The inverse of [`Buffer::pos_to_offset`].
    pub fn offset_to_pos(&self, mut offset: usize) -> EditorPosition {
        for idx in 0..self.len_lines() {
            let len = self.line_len(idx);
            if offset <= len {
                return EditorPosition::new(idx, offset);
            }
            offset -= len + 1;
        }
        self.end()
    }

    /// The byte range covered by an editor range.
    pub fn byte_range(&self, range: EditorRange) -> Range<usize> {
        let from = self.pos_to_byte(range.from);
        let to = self.pos_to_byte(range.to);
        from.min(to)..to.max(from)
    }

    /// The text covered by an editor range.
    pub fn slice(&self, range: EditorRange) -> &str {
        &self.text[self.byte_range(range)]
    }

    /// Replaces the text covered by `range` with `text` and returns the
    /// position right after the inserted text.
    pub fn replace(&mut self, range: EditorRange, text: &str) -> EditorPosition {
        let bytes = self.byte_range(range);
        let from = self.byte_to_pos(bytes.start);
        self.text.replace_range(bytes, text);
        self.line_starts = index_lines(&self.text);
        from.advance(text)
    }

    /// Inserts `text` at `pos`.
    pub fn insert(&mut self, pos: EditorPosition, text: &str) -> EditorPosition {
        self.replace(EditorRange::new(pos, pos), text)
    }
}

impl From<&str> for Buffer {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

fn index_lines(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
    starts
}
