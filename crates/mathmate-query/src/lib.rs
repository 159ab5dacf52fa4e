//! Mathmate Query
//!
//! Detects symbol and snippet queries typed before the cursor, ranks their
//! candidates and turns the user's choice into text edits. Everything here is
//! synchronous and editor independent: operations take the line or buffer and
//! cursor they need and answer with [`Splice`]s for the host to apply.

mod prelude;

pub(crate) mod completion;
pub use completion::*;
pub(crate) mod edit;
pub use edit::*;
pub(crate) mod jump;
pub use jump::*;
pub(crate) mod key;
pub use key::*;
pub(crate) mod shortcut;
pub use shortcut::*;
pub(crate) mod snippet;
pub use snippet::*;
pub(crate) mod symbol;
pub use symbol::*;
pub(crate) mod trigger;
pub use trigger::*;
