//! The live preview of the inline equation being typed.

use mathmate_analysis::in_code;
use mathmate_analysis::region::{extract_display, extract_inline};

use crate::prelude::*;
use crate::renderer::{Diagnostic, RenderKind, RenderResult, SvgResult};

/// A render the preview is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    /// Identifies the request; answers to older tickets are dropped.
    pub ticket: u64,
    /// The source to render.
    pub source: EcoString,
    /// What the source is rendered as.
    pub kind: RenderKind,
    /// The processor to render with.
    pub processor: EcoString,
}

/// What the preview does after a document change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewUpdate {
    /// Nothing changes.
    Keep,
    /// The preview is hidden.
    Hide,
    /// A render is needed.
    Render(PreviewRequest),
}

/// What the preview shows once a render is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewShow {
    /// The rendered equation.
    Svg(SvgResult),
    /// The diagnostics of a failed render.
    Error(EcoVec<Diagnostic>),
}

/// Decides when the inline preview is shown and what it renders.
#[derive(Debug, Clone, Default)]
pub struct PreviewController {
    processor: EcoString,
    ticket: u64,
    pending: Option<u64>,
    /// The source and anchor of the shown (or pending) preview.
    shown: Option<(EcoString, EditorPosition)>,
}

impl PreviewController {
    /// Creates a controller rendering with `processor`.
    pub fn new(processor: EcoString) -> Self {
        Self {
            processor,
            ..Self::default()
        }
    }

    /// Whether a preview is shown or about to be.
    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    /// The position the preview hangs below: the end of the equation.
    pub fn anchor(&self) -> Option<EditorPosition> {
        self.shown.as_ref().map(|(_, anchor)| *anchor)
    }

    /// Hides the preview and drops any pending render.
    pub fn hide(&mut self) -> PreviewUpdate {
        self.pending = None;
        match self.shown.take() {
            Some(_) => PreviewUpdate::Hide,
            None => PreviewUpdate::Keep,
        }
    }

    /// Re-evaluates the preview after a document change.
    ///
    /// The preview only shows inline math outside code and display math, and
    /// never while a suggestion popup is open.
    pub fn update(
        &mut self,
        buffer: &Buffer,
        cursor: EditorPosition,
        popup_open: bool,
    ) -> PreviewUpdate {
        if popup_open || in_code(buffer, cursor) {
            return self.hide();
        }
        let region = match extract_inline(buffer, cursor) {
            Some(region) if extract_display(buffer, cursor).is_none() => region,
            _ => return self.hide(),
        };

        let shown = (region.content.clone(), region.end);
        if self.shown.as_ref() == Some(&shown) {
            return PreviewUpdate::Keep;
        }
        self.shown = Some(shown);
        self.ticket += 1;
        self.pending = Some(self.ticket);
        PreviewUpdate::Render(PreviewRequest {
            ticket: self.ticket,
            source: region.content,
            kind: RenderKind::Inline,
            processor: self.processor.clone(),
        })
    }

    /// Commits the answer to the render with `ticket`, or drops it if the
    /// preview moved on since.
    pub fn commit(&mut self, ticket: u64, result: RenderResult<SvgResult>) -> Option<PreviewShow> {
        if self.pending != Some(ticket) {
            log::debug!("dropping preview render {ticket}");
            return None;
        }
        self.pending = None;
        Some(match result {
            Ok(svg) => PreviewShow::Svg(svg),
            Err(diags) => {
                log::info!("preview render failed: {} diagnostics", diags.len());
                PreviewShow::Error(diags)
            }
        })
    }
}
