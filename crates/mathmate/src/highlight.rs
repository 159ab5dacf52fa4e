//! Projection of bracket pairs and queries onto editor decorations.

use mathmate_analysis::{BracketKind, BracketPair};
use mathmate_query::CompletionQuery;
use strum::IntoEnumIterator;

use crate::prelude::*;

/// The class marking the text of the query a popup answers.
pub const TRIGGER_CLASS: &str = "mathmate-trigger";

/// A decoration of a range of the buffer with a CSS class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highlight {
    /// The decorated range.
    pub range: EditorRange,
    /// The CSS class.
    pub class: EcoString,
}

impl Highlight {
    /// A decoration of a single bracket at `pos`.
    pub fn bracket(pos: EditorPosition, class: EcoString) -> Self {
        Self {
            range: EditorRange::on_line(pos, 1),
            class,
        }
    }
}

/// The class of every bracket of `kind`.
pub fn bracket_class(kind: BracketKind) -> EcoString {
    eco_format!("mathmate-bracket-{kind}")
}

/// The class of the pair enclosing the cursor.
pub fn enclosing_class(kind: BracketKind) -> EcoString {
    eco_format!("mathmate-bracket-enclosing-{kind}")
}

/// Every class used for brackets.
pub fn bracket_classes() -> Vec<EcoString> {
    BracketKind::iter()
        .flat_map(|kind| [bracket_class(kind), enclosing_class(kind)])
        .collect()
}

/// Every class this crate decorates with.
pub fn all_classes() -> Vec<EcoString> {
    let mut classes = bracket_classes();
    classes.push(TRIGGER_CLASS.into());
    classes
}

/// The buffer positions of a pair's brackets.
///
/// Pair coordinates are local to the region content, so the region's start
/// column is added on the content's first line only.
pub fn project_pair(region: &MathRegion, pair: &BracketPair) -> (EditorPosition, EditorPosition) {
    let open = region.to_buffer(pair.open_line, pair.open_column);
    let close = region.to_buffer(pair.close_line, pair.close_column);
    (open, close)
}

/// Decorates every bracket of `pairs`, and the `enclosing` pair a second
/// time with its own class.
pub fn bracket_highlights(
    region: &MathRegion,
    pairs: &[BracketPair],
    enclosing: Option<&BracketPair>,
) -> Vec<Highlight> {
    let mut highlights = Vec::with_capacity(pairs.len() * 2 + 2);
    for pair in pairs {
        let (open, close) = project_pair(region, pair);
        let class = bracket_class(pair.kind);
        highlights.push(Highlight::bracket(open, class.clone()));
        highlights.push(Highlight::bracket(close, class));
    }
    if let Some(pair) = enclosing {
        let (open, close) = project_pair(region, pair);
        let class = enclosing_class(pair.kind);
        highlights.push(Highlight::bracket(open, class.clone()));
        highlights.push(Highlight::bracket(close, class));
    }
    highlights
}

/// Decorates the text of `query`.
pub fn trigger_highlight(query: &CompletionQuery) -> Highlight {
    Highlight {
        range: query.range(),
        class: TRIGGER_CLASS.into(),
    }
}
