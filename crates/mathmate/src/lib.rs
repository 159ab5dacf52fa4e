//! Mathmate
//!
//! Live math-input assistance for a plain text editor. A [`Session`] follows
//! one editor: it highlights the brackets of the math around the cursor,
//! suggests symbols and snippets while typing, previews inline equations and
//! jumps between tab stops. Hosts report [`EditorEvent`]s and carry out the
//! [`Effect`]s they get back; rendering is delegated to a [`Renderer`].

mod prelude;

pub mod actor;
pub use actor::{SessionActor, fulfil};
pub(crate) mod brackets;
pub use brackets::*;
pub(crate) mod config;
pub use config::*;
pub(crate) mod geometry;
pub use geometry::*;
pub mod harness;
pub(crate) mod highlight;
pub use highlight::*;
pub(crate) mod preview;
pub use preview::*;
pub(crate) mod renderer;
pub use renderer::*;
pub(crate) mod session;
pub use session::*;
