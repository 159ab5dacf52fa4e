use crate::prelude::*;

/// Replaces the text covered by `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextEdit {
    /// The range to replace.
    pub range: EditorRange,
    /// The replacement.
    pub text: EcoString,
}

impl TextEdit {
    /// Creates an edit.
    pub fn new(range: EditorRange, text: impl Into<EcoString>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }

    /// Inserts `text` at `pos`.
    pub fn insert(pos: EditorPosition, text: impl Into<EcoString>) -> Self {
        Self::new(EditorRange::new(pos, pos), text)
    }

    /// Deletes `len` UTF-16 code units starting at `pos`.
    pub fn delete(pos: EditorPosition, len: usize) -> Self {
        Self::new(EditorRange::on_line(pos, len), EcoString::new())
    }

    /// The position right after the inserted text.
    pub fn end(&self) -> EditorPosition {
        self.range.from.advance(&self.text)
    }

    /// Applies the edit to `buffer`.
    pub fn apply(&self, buffer: &mut Buffer) -> EditorPosition {
        buffer.replace(self.range, &self.text)
    }
}

/// An optional edit followed by a cursor placement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Splice {
    /// The edit to apply first.
    pub edit: Option<TextEdit>,
    /// Where the cursor goes after the edit.
    pub cursor: EditorPosition,
}

impl Splice {
    /// An edit after which the cursor lands at `cursor`.
    pub fn edit(edit: TextEdit, cursor: EditorPosition) -> Self {
        Self {
            edit: Some(edit),
            cursor,
        }
    }

    /// An edit after which the cursor lands at the end of the inserted text.
    pub fn replace(edit: TextEdit) -> Self {
        let cursor = edit.end();
        Self::edit(edit, cursor)
    }

    /// A pure cursor move.
    pub fn move_to(cursor: EditorPosition) -> Self {
        Self { edit: None, cursor }
    }

    /// Applies the splice to `buffer` and returns the new cursor.
    pub fn apply(&self, buffer: &mut Buffer) -> EditorPosition {
        if let Some(edit) = &self.edit {
            edit.apply(buffer);
        }
        buffer.clamp(self.cursor)
    }
}
