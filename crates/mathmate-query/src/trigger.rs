//! Detection of the symbol and snippet queries typed right before the cursor.

use std::sync::LazyLock;

use regex::Regex;

use crate::prelude::*;

/// A word, an optional parenthesized argument and a trailing `@`, preceded by
/// a boundary.
static SNIPPET_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|[ $()\[\]{}<>+\-/*=!?#%&':;,\d])(?P<query>[a-zA-Z0-9]+)(?P<arg>\(.*\))?@$",
    )
    .expect("snippet trigger pattern")
});

/// Two or more letters or dots, or two or more operator characters, with an
/// optional leading backslash, preceded by a boundary.
static SYMBOL_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:^|\s|[$()\[\]{}<>+\-/*=!?#%&':;,\d^_])(?P<symbol>\\?(?:[a-zA-Z.][a-zA-Z.]+|[\-<>|=\[\]~:][\-<>|=\[\]~:]+))$",
    )
    .expect("symbol trigger pattern")
});

/// What a query asks for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum QueryKind {
    /// A symbol name, shorthand or LaTeX command.
    Symbol,
    /// A snippet name terminated by `@`.
    Snippet,
}

/// The in-progress text the user is typing to trigger a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionQuery {
    /// Symbol or snippet.
    pub kind: QueryKind,
    /// The typed name, including a leading backslash for LaTeX symbols.
    pub word: EcoString,
    /// The parenthesized snippet argument, parentheses included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<EcoString>,
    /// The position of the first character of `word`.
    pub start: EditorPosition,
}

impl CompletionQuery {
    /// The number of UTF-16 code units the query occupies, trailing `@`
    /// included.
    pub fn len(&self) -> usize {
        let arg = self.argument.as_deref().map_or(0, utf16_len);
        let at = usize::from(self.kind == QueryKind::Snippet);
        utf16_len(&self.word) + arg + at
    }

    /// Whether the query occupies no text.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The range occupied by the query.
    pub fn range(&self) -> EditorRange {
        EditorRange::on_line(self.start, self.len())
    }

    /// The argument without its parentheses.
    pub fn argument_input(&self) -> Option<&str> {
        let arg = self.argument.as_deref()?;
        arg.strip_prefix('(')
            .and_then(|arg| arg.strip_suffix(')'))
            .or(Some(arg))
    }
}

/// Detects a query in `before`, the text of the cursor's line up to the
/// cursor.
///
/// A line ending with `@` can only form a snippet query, and never does when
/// the line starts an import. A line ending with a space forms no query.
pub fn detect_query(before: &str, cursor: EditorPosition) -> Option<CompletionQuery> {
    if before.ends_with('@') {
        if before.starts_with("#import") {
            return None;
        }
        let caps = SNIPPET_TRIGGER.captures(before)?;
        let query = caps.name("query")?;
        return Some(CompletionQuery {
            kind: QueryKind::Snippet,
            word: query.as_str().into(),
            argument: caps.name("arg").map(|arg| arg.as_str().into()),
            start: EditorPosition::new(cursor.line, utf16_len(&before[..query.start()])),
        });
    }
    if before.ends_with(' ') {
        return None;
    }

    let symbol = SYMBOL_TRIGGER.captures(before)?.name("symbol")?;
    Some(CompletionQuery {
        kind: QueryKind::Symbol,
        word: symbol.as_str().into(),
        argument: None,
        start: EditorPosition::new(cursor.line, utf16_len(&before[..symbol.start()])),
    })
}

/// Detects a query right before `cursor` in `buffer`.
pub fn detect_query_at(buffer: &Buffer, cursor: EditorPosition) -> Option<CompletionQuery> {
    let cursor = buffer.clamp(cursor);
    let line = buffer.line(cursor.line)?;
    let end = mathmate_analysis::location::utf16_to_byte_clamped(line, cursor.ch);
    detect_query(&line[..end], cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(before: &str) -> Option<CompletionQuery> {
        detect_query(before, EditorPosition::new(0, utf16_len(before)))
    }

    fn snippet(word: &str, argument: Option<&str>, start: usize) -> Option<CompletionQuery> {
        Some(CompletionQuery {
            kind: QueryKind::Snippet,
            word: word.into(),
            argument: argument.map(Into::into),
            start: EditorPosition::new(0, start),
        })
    }

    fn symbol(word: &str, start: usize) -> Option<CompletionQuery> {
        Some(CompletionQuery {
            kind: QueryKind::Symbol,
            word: word.into(),
            argument: None,
            start: EditorPosition::new(0, start),
        })
    }

    #[test]
    fn snippet_queries() {
        assert_eq!(detect("area@"), snippet("area", None, 0));
        assert_eq!(detect("mat(2,3)@"), snippet("mat", Some("(2,3)"), 0));
        assert_eq!(detect("$x + frac@"), snippet("frac", None, 5));
        assert_eq!(detect("x = mat()@"), snippet("mat", Some("()"), 4));
        assert_eq!(detect("2mat@"), snippet("2mat", None, 0));
    }

    #[test]
    fn snippet_rejections() {
        assert_eq!(detect("#import \"@preview/cetz:0.3.0\"@"), None);
        assert_eq!(detect("a_b@"), None);
        assert_eq!(detect("@"), None);
        assert_eq!(detect("x.y@"), None);
        assert_eq!(detect("αβ@"), None);
        assert_eq!(detect("x + αβ@"), None);
    }

    #[test]
    fn at_suppresses_symbol_queries() {
        assert_eq!(detect("alpha_@"), None);
    }

    #[test]
    fn symbol_queries() {
        assert_eq!(detect("alp"), symbol("alp", 0));
        assert_eq!(detect("$x + arrow.r"), symbol("arrow.r", 5));
        assert_eq!(detect(r"$\alpha"), symbol(r"\alpha", 1));
        assert_eq!(detect("a ->"), symbol("->", 2));
        assert_eq!(detect("x_alpha"), symbol("alpha", 2));
        assert_eq!(detect("2pi"), symbol("pi", 1));
    }

    #[test]
    fn symbol_rejections() {
        assert_eq!(detect("alpha "), None);
        assert_eq!(detect("a"), None);
        assert_eq!(detect("$x"), None);
        assert_eq!(detect("a1b"), None);
        assert_eq!(detect("αβ"), None);
    }

    #[test]
    fn wide_characters_shift_start() {
        let before = "😀 sum";
        let query = detect(before).unwrap();
        assert_eq!(query.start, EditorPosition::new(0, 3));
        assert_eq!(query.range().to, EditorPosition::new(0, 6));
    }

    #[test]
    fn query_extent() {
        let query = detect("mat(2,3)@").unwrap();
        assert_eq!(query.len(), 9);
        assert_eq!(query.argument_input(), Some("2,3"));
        assert_eq!(detect("sum").unwrap().len(), 3);
    }

    #[test]
    fn detect_in_buffer() {
        let buffer = Buffer::new("intro\n$a + bet$");
        let query = detect_query_at(&buffer, EditorPosition::new(1, 8)).unwrap();
        assert_eq!(query.word, "bet");
        assert_eq!(query.start, EditorPosition::new(1, 5));
    }
}
