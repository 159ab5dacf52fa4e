//! Where popups and previews are placed on screen.

use crate::prelude::*;

/// The screen box of a position, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    /// The left edge.
    pub left: f64,
    /// The top edge.
    pub top: f64,
    /// The bottom edge.
    pub bottom: f64,
}

/// Maps buffer positions to screen coordinates.
pub trait EditorGeometry {
    /// The screen box of the character at `pos`.
    fn coords_at(&self, pos: EditorPosition) -> Coords;
}

/// The anchor of a floating element, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PopupPosition {
    /// The left edge.
    pub x: f64,
    /// The top edge.
    pub y: f64,
}

impl PopupPosition {
    /// Tops further apart than this lie on different visual rows.
    const ROW_TOLERANCE: f64 = 8.0;

    /// The anchor below the text from `start` to `end`.
    ///
    /// The popup is aligned with `start`, unless the text wraps onto another
    /// row, in which case it is aligned with the start of the line.
    pub fn between(start: Coords, end: Coords, line_start: Coords) -> Self {
        let x = if (end.top - start.top).abs() > Self::ROW_TOLERANCE {
            line_start.left
        } else {
            start.left
        };
        Self { x, y: end.bottom }
    }

    /// The anchor below `range`.
    pub fn below(geometry: &dyn EditorGeometry, range: EditorRange) -> Self {
        let line_start = EditorPosition::new(range.from.line, 0);
        Self::between(
            geometry.coords_at(range.from),
            geometry.coords_at(range.to),
            geometry.coords_at(line_start),
        )
    }
}

/// A fixed grid of cells without wrapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceGeometry {
    /// The width of a cell.
    pub cell_width: f64,
    /// The height of a line.
    pub line_height: f64,
}

impl Default for MonospaceGeometry {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            line_height: 20.0,
        }
    }
}

impl EditorGeometry for MonospaceGeometry {
    fn coords_at(&self, pos: EditorPosition) -> Coords {
        let top = pos.line as f64 * self.line_height;
        Coords {
            left: pos.ch as f64 * self.cell_width,
            top,
            bottom: top + self.line_height,
        }
    }
}
