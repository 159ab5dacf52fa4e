//! Markdown contexts in which math assistance stays off.

use mathmate_std::EditorPosition;

use crate::Buffer;
use crate::location::utf16_to_byte_clamped;

/// Whether `cursor` sits inside a fenced code block.
///
/// Counts the lines above the cursor that open or close a fence (` ``` ` or
/// `~~~` after trimming); an odd count means the cursor is inside.
pub fn in_code_block(buffer: &Buffer, cursor: EditorPosition) -> bool {
    let fences = buffer
        .lines()
        .take(cursor.line)
        .filter(|line| is_fence(line))
        .count();
    fences % 2 == 1
}

/// Whether `cursor` sits inside an inline code span on its line, judged by
/// the parity of the unescaped backticks before it.
pub fn in_inline_code(buffer: &Buffer, cursor: EditorPosition) -> bool {
    let Some(line) = buffer.line(cursor.line) else {
        return false;
    };
    let before = &line[..utf16_to_byte_clamped(line, cursor.ch)];

    let mut ticks = 0;
    let mut escaped = false;
    for c in before.chars() {
        match c {
            '\\' => {
                escaped = !escaped;
                continue;
            }
            '`' if !escaped => ticks += 1,
            _ => {}
        }
        escaped = false;
    }
    ticks % 2 == 1
}

/// Whether `cursor` is in a context where code, not math, is being typed.
pub fn in_code(buffer: &Buffer, cursor: EditorPosition) -> bool {
    in_code_block(buffer, cursor) || in_inline_code(buffer, cursor)
}

fn is_fence(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("```") || line.starts_with("~~~")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, ch: usize) -> EditorPosition {
        EditorPosition::new(line, ch)
    }

    #[test]
    fn fenced_blocks() {
        let buffer = Buffer::new("```typ\n$x$\n```\n$y$\n  ~~~\n$z$");
        assert!(in_code_block(&buffer, pos(1, 1)));
        assert!(!in_code_block(&buffer, pos(3, 1)));
        assert!(in_code_block(&buffer, pos(5, 1)));
        // The fence line itself is not inside.
        assert!(!in_code_block(&buffer, pos(0, 2)));
    }

    #[test]
    fn inline_code_spans() {
        let buffer = Buffer::new(r"a `$x$` b $y$ \`$z$");
        assert!(in_inline_code(&buffer, pos(0, 4)));
        assert!(!in_inline_code(&buffer, pos(0, 11)));
        assert!(!in_inline_code(&buffer, pos(0, 17)));
        assert!(in_code(&buffer, pos(0, 4)));
    }
}
