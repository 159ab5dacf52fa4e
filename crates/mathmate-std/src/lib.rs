//! Shared building blocks of the mathmate editor helper: the error type and
//! the coordinates an editor host speaks in.

pub mod debug_loc;
pub mod error;

pub use debug_loc::{EditorPosition, EditorRange};
pub use error::{DiagSeverity, ErrKind, Error, Result, UserNotice};
