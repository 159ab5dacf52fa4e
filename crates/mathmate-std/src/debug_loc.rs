//! Positions in an editor buffer.
//!
//! Every column here counts UTF-16 code units, which is what browser-based
//! editors report. Conversions to UTF-8 byte offsets live in
//! `mathmate-analysis`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A position in an editor buffer in form of line and column.
///
/// Ordered by line first, then by column.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct EditorPosition {
    /// The line number, starting at 0.
    pub line: usize,
    /// The UTF-16 column, starting at 0.
    pub ch: usize,
}

impl EditorPosition {
    /// Creates a new position.
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }

    /// Returns the position shifted right by `delta` UTF-16 code units on the
    /// same line.
    pub const fn right(self, delta: usize) -> Self {
        Self {
            line: self.line,
            ch: self.ch + delta,
        }
    }

    /// Returns the position shifted left by `delta` UTF-16 code units on the
    /// same line, saturating at the start of the line.
    pub const fn left(self, delta: usize) -> Self {
        Self {
            line: self.line,
            ch: self.ch.saturating_sub(delta),
        }
    }

    /// Returns the position reached after inserting `text` at this position.
    pub fn advance(self, text: &str) -> Self {
        match text.rfind('\n') {
            Some(last_nl) => Self {
                line: self.line + text.matches('\n').count(),
                ch: utf16_len(&text[last_nl + 1..]),
            },
            None => self.right(utf16_len(text)),
        }
    }
}

impl fmt::Display for EditorPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.ch)
    }
}

/// A range in an editor buffer, `from` inclusive and `to` exclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub struct EditorRange {
    /// The start position.
    pub from: EditorPosition,
    /// The end position.
    pub to: EditorPosition,
}

impl EditorRange {
    /// Creates a new range.
    pub const fn new(from: EditorPosition, to: EditorPosition) -> Self {
        Self { from, to }
    }

    /// Creates a range of `len` UTF-16 code units on a single line.
    pub const fn on_line(from: EditorPosition, len: usize) -> Self {
        Self {
            from,
            to: from.right(len),
        }
    }

    /// Whether the range is empty.
    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

impl fmt::Display for EditorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// The length of a string in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_single_line() {
        let pos = EditorPosition::new(2, 3);
        assert_eq!(pos.advance("ab"), EditorPosition::new(2, 5));
        assert_eq!(pos.advance("😀"), EditorPosition::new(2, 5));
    }

    #[test]
    fn advance_multi_line() {
        let pos = EditorPosition::new(1, 7);
        assert_eq!(pos.advance("mat(\n  a\n)"), EditorPosition::new(3, 1));
        assert_eq!(pos.advance("x\n"), EditorPosition::new(2, 0));
    }

    #[test]
    fn ordering_is_line_major() {
        assert!(EditorPosition::new(0, 9) < EditorPosition::new(1, 0));
        assert!(EditorPosition::new(1, 1) < EditorPosition::new(1, 2));
    }
}
