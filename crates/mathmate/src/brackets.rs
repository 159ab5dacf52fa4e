//! The bracket pairs of the math region around the cursor.

use mathmate_analysis::{BracketPair, byte_offset_of, innermost_enclosing};

use crate::prelude::*;
use crate::renderer::RenderResult;

/// What [`BracketPairEngine::refresh`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refresh {
    /// The region is the one already cached.
    Unchanged,
    /// The region moved but its content did not, so the cached pairs stay
    /// valid.
    Moved,
    /// The cursor left math. Every bracket highlight must go.
    Cleared,
    /// The content changed and its pairs must be requested.
    Requested(EcoString),
}

/// Caches the bracket pairs of the last math region.
///
/// Pair requests are answered asynchronously. An answer is only committed if
/// it is for the content of the latest region; anything else was superseded
/// while in flight and is dropped.
#[derive(Debug, Clone, Default)]
pub struct BracketPairEngine {
    region: Option<MathRegion>,
    pairs: Option<Vec<BracketPair>>,
}

impl BracketPairEngine {
    /// The cached region.
    pub fn region(&self) -> Option<&MathRegion> {
        self.region.as_ref()
    }

    /// The pairs of the cached region, if they arrived.
    pub fn pairs(&self) -> Option<&[BracketPair]> {
        self.pairs.as_deref()
    }

    /// Forgets the cached region and pairs.
    pub fn clear(&mut self) {
        self.region = None;
        self.pairs = None;
    }

    /// Caches `region`.
    pub fn refresh(&mut self, region: Option<&MathRegion>) -> Refresh {
        if self.region.as_ref() == region {
            return Refresh::Unchanged;
        }
        let Some(region) = region else {
            self.clear();
            return Refresh::Cleared;
        };

        let same_content = self
            .region
            .as_ref()
            .is_some_and(|last| last.content == region.content);
        self.region = Some(region.clone());
        if same_content && self.pairs.is_some() {
            return Refresh::Moved;
        }
        self.pairs = None;
        Refresh::Requested(region.content.clone())
    }

    /// Commits the answer to a pair request for `content`. Returns whether
    /// the answer is current.
    pub fn commit(&mut self, content: &str, result: RenderResult<Vec<BracketPair>>) -> bool {
        let current = self
            .region
            .as_ref()
            .is_some_and(|region| region.content == content);
        if !current {
            log::debug!("dropping bracket pairs of a superseded region");
            return false;
        }
        match result {
            Ok(pairs) => self.pairs = Some(pairs),
            Err(diags) => {
                log::debug!("bracket pair request failed: {} diagnostics", diags.len());
                self.pairs = None;
            }
        }
        true
    }

    /// The innermost pair enclosing `cursor`.
    ///
    /// A cursor right before the opening bracket is outside the pair, and one
    /// right before the closing bracket is inside.
    pub fn enclosing_pair(&self, cursor: EditorPosition) -> Option<&BracketPair> {
        let region = self.region.as_ref()?;
        let pairs = self.pairs.as_deref()?;
        let (line, column) = region.to_local(cursor)?;
        let offset = byte_offset_of(&region.content, line, column);
        innermost_enclosing(pairs, offset)
    }
}
