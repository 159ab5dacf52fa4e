//! Bracket matching over math source.
//!
//! The lexer skips string literals, line comments and (nestable) block
//! comments, so brackets inside them never pair up. Matching is tolerant of
//! malformed input: a closer pairs with the nearest opener of the same kind,
//! and anything left unmatched is dropped.

use serde::{Deserialize, Serialize};

/// The kind of a bracket.
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
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum BracketKind {
    /// `(` and `)`.
    Paren,
    /// `[` and `]`.
    Bracket,
    /// `{` and `}`.
    Brace,
}

impl BracketKind {
    /// Classifies a character as an opening or closing bracket.
    pub fn of(c: char) -> Option<(Self, bool)> {
        Some(match c {
            '(' => (Self::Paren, true),
            ')' => (Self::Paren, false),
            '[' => (Self::Bracket, true),
            ']' => (Self::Bracket, false),
            '{' => (Self::Brace, true),
            '}' => (Self::Brace, false),
            _ => return None,
        })
    }

    /// Whether `c` opens any kind of bracket.
    pub fn is_open(c: char) -> bool {
        matches!(Self::of(c), Some((_, true)))
    }

    /// Whether `c` closes any kind of bracket.
    pub fn is_close(c: char) -> bool {
        matches!(Self::of(c), Some((_, false)))
    }
}

/// A matched bracket pair, in the coordinates of the scanned source.
///
/// Lines and columns are zero based with UTF-16 columns. Byte offsets count
/// UTF-8 bytes from the start of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BracketPair {
    /// The kind of the pair.
    pub kind: BracketKind,
    /// The number of brackets still open when this pair opened.
    #[serde(default)]
    pub depth: usize,
    /// The line of the opening bracket.
    pub open_line: usize,
    /// The column of the opening bracket.
    pub open_column: usize,
    /// The byte offset of the opening bracket.
    pub open_byte: usize,
    /// The line of the closing bracket.
    pub close_line: usize,
    /// The column of the closing bracket.
    pub close_column: usize,
    /// The byte offset of the closing bracket.
    pub close_byte: usize,
}

impl BracketPair {
    /// Whether a cursor at byte `offset` sits inside the pair. The opening
    /// side is exclusive and the closing side inclusive.
    pub fn encloses(&self, offset: usize) -> bool {
        self.open_byte < offset && offset <= self.close_byte
    }

    /// The number of bytes from the opening to the closing bracket.
    pub fn span(&self) -> usize {
        self.close_byte - self.open_byte
    }
}

#[derive(Debug, Clone, Copy)]
struct BracketToken {
    kind: BracketKind,
    open: bool,
    line: usize,
    column: usize,
    byte: usize,
}

/// Finds all matched bracket pairs in `src`, ordered by their closing bracket.
pub fn find_bracket_pairs(src: &str) -> Vec<BracketPair> {
    match_tokens(&lex(src))
}

fn lex(src: &str) -> Vec<BracketToken> {
    let mut tokens = Vec::new();
    let mut chars = src.char_indices().peekable();
    let mut line = 0;
    let mut column = 0;

    let mut in_str = false;
    let mut str_escape = false;
    let mut in_line_comment = false;
    let mut block_depth = 0usize;

    while let Some((byte, c)) = chars.next() {
        let here = (line, column);
        if c == '\n' {
            line += 1;
            column = 0;
        } else {
            column += c.len_utf16();
        }

        if in_str {
            if str_escape {
                str_escape = false;
            } else if c == '"' {
                in_str = false;
            } else if c == '\\' {
                str_escape = true;
            }
            continue;
        }
        if in_line_comment {
            in_line_comment = c != '\n';
            continue;
        }
        let next = chars.peek().map(|&(_, next)| next);
        if block_depth > 0 {
            match (c, next) {
                ('*', Some('/')) => {
                    chars.next();
                    column += 1;
                    block_depth -= 1;
                }
                ('/', Some('*')) => {
                    chars.next();
                    column += 1;
                    block_depth += 1;
                }
                _ => {}
            }
            continue;
        }

        match (c, next) {
            ('/', Some('/')) => {
                chars.next();
                column += 1;
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                column += 1;
                block_depth += 1;
            }
            ('"', _) => in_str = true,
            _ => {
                if let Some((kind, open)) = BracketKind::of(c) {
                    tokens.push(BracketToken {
                        kind,
                        open,
                        line: here.0,
                        column: here.1,
                        byte,
                    });
                }
            }
        }
    }

    tokens
}

fn match_tokens(tokens: &[BracketToken]) -> Vec<BracketPair> {
    let mut stack: Vec<(BracketToken, usize)> = Vec::new();
    let mut pairs = Vec::new();

    for &token in tokens {
        if token.open {
            stack.push((token, stack.len()));
            continue;
        }
        let Some(idx) = stack.iter().rposition(|(open, _)| open.kind == token.kind) else {
            continue;
        };
        let (open, depth) = stack.remove(idx);
        pairs.push(BracketPair {
            kind: open.kind,
            depth,
            open_line: open.line,
            open_column: open.column,
            open_byte: open.byte,
            close_line: token.line,
            close_column: token.column,
            close_byte: token.byte,
        });
    }

    pairs
}

/// Picks the innermost pair enclosing byte `offset`.
pub fn innermost_enclosing(pairs: &[BracketPair], offset: usize) -> Option<&BracketPair> {
    pairs
        .iter()
        .filter(|pair| pair.encloses(offset))
        .min_by_key(|pair| pair.span())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn render(src: &str) -> String {
        find_bracket_pairs(src)
            .iter()
            .map(|p| {
                format!(
                    "{} d{} {}:{}@{} {}:{}@{}",
                    p.kind,
                    p.depth,
                    p.open_line,
                    p.open_column,
                    p.open_byte,
                    p.close_line,
                    p.close_column,
                    p.close_byte
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn nested_pairs() {
        assert_snapshot!(render("f(x[1] + {y})"), @r"
        bracket d1 0:3@3 0:5@5
        brace d1 0:9@9 0:11@11
        paren d0 0:1@1 0:12@12
        ");
    }

    #[test]
    fn multi_line_and_wide_characters() {
        assert_snapshot!(render("mat(\n  α, 😀(b)\n)"), @r"
        paren d1 1:7@15 1:9@17
        paren d0 0:3@3 2:0@19
        ");
    }

    #[test]
    fn skips_strings_and_comments() {
        assert_snapshot!(render(r#"("(" /* ( /* ) */ [ */ // )
)"#), @"paren d0 0:0@0 1:0@28");
        assert_snapshot!(render(r#"["\"]"]"#), @"bracket d0 0:0@0 0:6@6");
    }

    #[test]
    fn tolerates_malformed_input() {
        assert_snapshot!(render("( [ )"), @"paren d0 0:0@0 0:4@4");
        assert_snapshot!(render(") ( ] ("), @"");
    }

    #[test]
    fn enclosing_is_asymmetric() {
        let pairs = find_bracket_pairs("(a)");
        assert_eq!(innermost_enclosing(&pairs, 0), None);
        assert_eq!(innermost_enclosing(&pairs, 1), Some(&pairs[0]));
        assert_eq!(innermost_enclosing(&pairs, 2), Some(&pairs[0]));
        assert_eq!(innermost_enclosing(&pairs, 3), None);
    }

    #[test]
    fn innermost_pair_wins() {
        let src = "((a)(b))";
        let pairs = find_bracket_pairs(src);
        for offset in 0..=src.len() {
            let got = innermost_enclosing(&pairs, offset).map(|p| (p.open_byte, p.close_byte));
            let expected = match offset {
                2 | 3 => Some((1, 3)),
                5 | 6 => Some((4, 6)),
                1 | 4 | 7 => Some((0, 7)),
                _ => None,
            };
            assert_eq!(got, expected, "offset {offset}");
        }
    }
}
