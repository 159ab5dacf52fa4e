//! Keys that wrap the selected math in a template.

use std::collections::BTreeMap;

use crate::prelude::*;

/// The placeholder a shortcut template uses for the selected text.
pub const SELECTION_MARKER: &str = "$1";

/// A template applied to the selection when its key is typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shortcut {
    /// The replacement, with every [`SELECTION_MARKER`] standing for the
    /// selected text.
    pub content: EcoString,
    /// The group the shortcut is listed under.
    #[serde(default)]
    pub category: EcoString,
    /// How far the cursor moves along the line from the end of the
    /// replacement, in UTF-16 code units.
    #[serde(default)]
    pub offset: i64,
}

impl Shortcut {
    fn new(content: &str, category: &str, offset: i64) -> Self {
        Self {
            content: content.into(),
            category: category.into(),
            offset,
        }
    }

    /// Replaces `selection`, whose text is `selected`, with the template.
    pub fn apply(&self, selection: EditorRange, selected: &str) -> Splice {
        let edit = TextEdit::new(selection, self.content.replace(SELECTION_MARKER, selected));
        let end = edit.end();
        let ch = end.ch.saturating_add_signed(self.offset as isize);
        Splice::edit(edit, EditorPosition::new(end.line, ch))
    }
}

/// The bundled shortcuts, keyed by the typed character.
pub fn default_shortcuts() -> BTreeMap<EcoString, Shortcut> {
    [
        ("(", Shortcut::new("($1)", "bracket", 0)),
        ("[", Shortcut::new("[$1]", "bracket", 0)),
        ("{", Shortcut::new("{$1}", "bracket", 0)),
        ("|", Shortcut::new("abs($1)", "bracket", 0)),
        ("/", Shortcut::new("($1)/()", "operator", -1)),
        ("^", Shortcut::new("($1)^()", "operator", -1)),
        ("_", Shortcut::new("($1)_()", "operator", -1)),
    ]
    .into_iter()
    .map(|(key, shortcut)| (EcoString::from(key), shortcut))
    .collect()
}

/// Looks up the shortcut of a typed character.
pub fn find_shortcut(shortcuts: &BTreeMap<EcoString, Shortcut>, c: char) -> Option<&Shortcut> {
    shortcuts.get(c.encode_utf8(&mut [0; 4]) as &str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn applied(
        text: &str,
        selection: EditorRange,
        shortcut: &Shortcut,
    ) -> (String, EditorPosition) {
        let mut buffer = Buffer::new(text);
        let selected = buffer.slice(selection).to_owned();
        let cursor = shortcut.apply(selection, &selected).apply(&mut buffer);
        (buffer.text().to_owned(), cursor)
    }

    #[test]
    fn wraps_the_selection() {
        let shortcuts = default_shortcuts();
        let paren = find_shortcut(&shortcuts, '(').unwrap();
        let selection = EditorRange::new(EditorPosition::new(0, 5), EditorPosition::new(0, 8));
        let (text, cursor) = applied("$x + a+b$", selection, paren);
        assert_eq!(text, "$x + (a+b)$");
        assert_eq!(cursor, EditorPosition::new(0, 10));
    }

    #[test]
    fn offset_moves_into_the_template() {
        let shortcuts = default_shortcuts();
        let frac = find_shortcut(&shortcuts, '/').unwrap();
        let selection = EditorRange::new(EditorPosition::new(0, 1), EditorPosition::new(0, 4));
        let (text, cursor) = applied("$a+b$", selection, frac);
        assert_eq!(text, "$(a+b)/()$");
        assert_eq!(cursor, EditorPosition::new(0, 8));
    }

    #[test]
    fn every_marker_is_replaced() {
        let twice = Shortcut::new("$1 + $1", "", 0);
        let selection = EditorRange::new(EditorPosition::new(0, 1), EditorPosition::new(0, 2));
        let (text, _) = applied("$x$", selection, &twice);
        assert_eq!(text, "$x + x$");
    }

    #[test]
    fn unknown_keys_have_no_shortcut() {
        assert!(find_shortcut(&default_shortcuts(), 'a').is_none());
    }

    #[test]
    fn shortcuts_deserialize_with_defaults() {
        let shortcut: Shortcut = serde_json::from_str(r#"{"content":"norm($1)"}"#).unwrap();
        assert_eq!(shortcut.offset, 0);
        assert!(shortcut.category.is_empty());
    }
}
