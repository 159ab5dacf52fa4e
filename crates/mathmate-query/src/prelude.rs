pub use ecow::{EcoString, eco_format};
pub use mathmate_analysis::{Buffer, MathRegion};
pub use mathmate_std::debug_loc::utf16_len;
pub use mathmate_std::{EditorPosition, EditorRange, UserNotice};
pub use serde::{Deserialize, Serialize};

pub use crate::edit::{Splice, TextEdit};
