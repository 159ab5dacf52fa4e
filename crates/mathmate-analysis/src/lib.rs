//! Mathmate Analysis
//!
//! Cheap, editor-independent analyses run on every keystroke: locating the
//! math region around the cursor, translating editor columns to byte offsets,
//! matching brackets and searching the symbol table.

pub mod bracket;
pub mod buffer;
pub mod location;
pub mod markdown;
pub mod region;
pub mod symbols;

pub use bracket::{BracketKind, BracketPair, find_bracket_pairs, innermost_enclosing};
pub use buffer::Buffer;
pub use location::{byte_offset_of, byte_offset_of_signed};
pub use markdown::in_code;
pub use region::{MathKind, MathRegion, locate};
pub use symbols::{MathClass, MatchKind, SYMBOLS, SymbolData, SymbolIndex, SymbolMatch};
