//! Cursor jumps and commands acting on the equation around the cursor.

use mathmate_analysis::region::{extract_display, extract_inline};

use crate::prelude::*;
use crate::snippet::CURSOR_MARKER;

/// The direction of a tab jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum JumpDirection {
    /// `Tab`.
    Forward,
    /// `Shift+Tab`.
    Backward,
}

/// Moves the cursor to the next stop inside `region`.
///
/// Stops are tried in order: a `#CURSOR` marker, which is deleted; the
/// position after the next closing bracket (forward) or before the previous
/// opening bracket (backward); the region boundary. A cursor already on the
/// boundary leaves the region past its delimiter.
pub fn tab_jump(
    buffer: &Buffer,
    region: &MathRegion,
    cursor: EditorPosition,
    direction: JumpDirection,
) -> Splice {
    let start = buffer.pos_to_byte(region.start);
    let end = buffer.pos_to_byte(region.end);
    let offset = buffer.pos_to_byte(cursor).clamp(start, end);
    let content = &buffer.text()[start..end];
    let local = offset - start;
    let delimiter = region.kind.delimiter().len();

    let target = match direction {
        JumpDirection::Forward if offset == end => {
            return Splice::move_to(buffer.byte_to_pos(end + delimiter));
        }
        JumpDirection::Backward if offset == start => {
            return Splice::move_to(buffer.byte_to_pos(start.saturating_sub(delimiter)));
        }
        JumpDirection::Forward => {
            let rest = &content[local..];
            if let Some(marker) = rest.find(CURSOR_MARKER) {
                return remove_marker(buffer, offset + marker);
            }
            match rest.find([')', ']', '}']) {
                Some(closer) => offset + closer + 1,
                None => end,
            }
        }
        JumpDirection::Backward => {
            let head = &content[..local];
            if let Some(marker) = head.rfind(CURSOR_MARKER) {
                return remove_marker(buffer, start + marker);
            }
            match head.rfind(['(', '[', '{']) {
                Some(opener) => start + opener,
                None => start,
            }
        }
    };
    Splice::move_to(buffer.byte_to_pos(target))
}

fn remove_marker(buffer: &Buffer, byte: usize) -> Splice {
    let pos = buffer.byte_to_pos(byte);
    Splice::edit(TextEdit::delete(pos, CURSOR_MARKER.len()), pos)
}

/// Wraps the inline equation around the cursor in `box(...)`.
pub fn box_current_equation(buffer: &Buffer, cursor: EditorPosition) -> Option<Splice> {
    let region = extract_inline(buffer, cursor)?;
    let text = eco_format!("box({})", region.content);
    Some(Splice::replace(TextEdit::new(region.range(), text)))
}

/// The range of the inline equation around the cursor, or else of the display
/// equation.
pub fn select_current_equation(buffer: &Buffer, cursor: EditorPosition) -> Option<EditorRange> {
    let region = extract_inline(buffer, cursor).or_else(|| extract_display(buffer, cursor))?;
    Some(region.range())
}

#[cfg(test)]
mod tests {
    use mathmate_analysis::locate;

    use super::*;
    use JumpDirection::{Backward, Forward};

    fn at_cursor(marked: &str) -> (Buffer, EditorPosition) {
        let offset = marked.find('|').unwrap();
        let buffer = Buffer::new(marked.replacen('|', "", 1));
        let cursor = buffer.byte_to_pos(offset);
        (buffer, cursor)
    }

    /// Jumps once and renders the result with a `|` at the new cursor.
    fn jump(marked: &str, direction: JumpDirection) -> String {
        let (mut buffer, cursor) = at_cursor(marked);
        let region = locate(&buffer, cursor).unwrap();
        let cursor = tab_jump(&buffer, &region, cursor, direction).apply(&mut buffer);
        buffer.insert(cursor, "|");
        buffer.text().to_owned()
    }

    #[test]
    fn jump_to_markers() {
        assert_eq!(jump("$frac(|a, #CURSOR)$", Forward), "$frac(a, |)$");
        assert_eq!(jump("$#CURSOR + x|$", Backward), "$| + x$");
        assert_eq!(jump("$$\nmat(\n  #CURSOR\n)|\n$$", Backward), "$$\nmat(\n  |\n)\n$$");
    }

    #[test]
    fn jump_over_brackets() {
        assert_eq!(jump("$f(a|) + g$", Forward), "$f(a)| + g$");
        assert_eq!(jump("$f(a) + g|$", Backward), "$f|(a) + g$");
        assert_eq!(jump("$|x_{1} + [y]$", Forward), "$x_{1}| + [y]$");
    }

    #[test]
    fn jump_to_region_bounds() {
        assert_eq!(jump("$x + |y$", Forward), "$x + y|$");
        assert_eq!(jump("$x |+ y$", Backward), "$|x + y$");
    }

    #[test]
    fn jump_out_of_region() {
        assert_eq!(jump("a $x + y|$ b", Forward), "a $x + y$| b");
        assert_eq!(jump("a $|x + y$ b", Backward), "a |$x + y$ b");
        assert_eq!(jump("$$\nx\n|$$\nafter", Forward), "$$\nx\n$$|\nafter");
        assert_eq!(jump("$$|\nx\n$$", Backward), "|$$\nx\n$$");
    }

    #[test]
    fn box_inline_equation() {
        let (mut buffer, cursor) = at_cursor("area $pi |r^2$.");
        let splice = box_current_equation(&buffer, cursor).unwrap();
        splice.apply(&mut buffer);
        assert_eq!(buffer.text(), "area $box(pi r^2)$.");

        let (buffer, cursor) = at_cursor("$$\nx|\n$$");
        assert_eq!(box_current_equation(&buffer, cursor), None);
    }

    #[test]
    fn select_equation() {
        let (buffer, cursor) = at_cursor("see $x^|2$");
        let range = select_current_equation(&buffer, cursor).unwrap();
        assert_eq!(buffer.slice(range), "x^2");

        let (buffer, cursor) = at_cursor("$$\na |+ b\n$$");
        let range = select_current_equation(&buffer, cursor).unwrap();
        assert_eq!(buffer.slice(range), "\na + b\n");

        let (buffer, cursor) = at_cursor("plain| text");
        assert_eq!(select_current_equation(&buffer, cursor), None);
    }
}
