pub use ecow::{EcoString, EcoVec, eco_format};
pub use mathmate_analysis::{Buffer, MathRegion};
pub use mathmate_query::{Snippet, Splice, TextEdit};
pub use mathmate_std::{EditorPosition, EditorRange, UserNotice};
pub use serde::{Deserialize, Serialize};
