//! The typesetting service a session delegates rendering to.

use async_trait::async_trait;
use ecow::{EcoVec, eco_vec};
use mathmate_analysis::{BracketPair, MathKind, find_bracket_pairs};
use mathmate_query::SnippetKind;
use mathmate_std::DiagSeverity;

use crate::prelude::*;

/// What a source is rendered as.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum RenderKind {
    /// Inline math.
    Inline,
    /// Display math.
    Display,
    /// A code block.
    Codeblock,
}

impl From<MathKind> for RenderKind {
    fn from(kind: MathKind) -> Self {
        match kind {
            MathKind::Inline => RenderKind::Inline,
            MathKind::Display => RenderKind::Display,
        }
    }
}

impl From<SnippetKind> for RenderKind {
    fn from(kind: SnippetKind) -> Self {
        match kind {
            SnippetKind::Inline => RenderKind::Inline,
            SnippetKind::Display => RenderKind::Display,
            SnippetKind::Codeblock => RenderKind::Codeblock,
        }
    }
}

/// A byte range in the rendered source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagSpan {
    /// The first byte.
    pub start: usize,
    /// The byte after the last one.
    pub end: usize,
}

/// A problem reported by the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity.
    pub severity: DiagSeverity,
    /// Where in the source the problem is.
    #[serde(default)]
    pub span: DiagSpan,
    /// The message.
    pub message: EcoString,
    /// The call sites leading to the problem.
    #[serde(default)]
    pub trace: EcoVec<EcoString>,
    /// Suggestions for fixing the problem.
    #[serde(default)]
    pub hints: EcoVec<EcoString>,
}

impl Diagnostic {
    /// An error covering `span`.
    pub fn error(span: DiagSpan, message: impl Into<EcoString>) -> Self {
        Self {
            severity: DiagSeverity::Error,
            span,
            message: message.into(),
            trace: EcoVec::new(),
            hints: EcoVec::new(),
        }
    }
}

/// A successful render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SvgResult {
    /// The SVG markup.
    pub svg: EcoString,
    /// Warnings raised while rendering.
    #[serde(default)]
    pub diags: EcoVec<Diagnostic>,
}

/// A failed render.
pub type RenderResult<T> = Result<T, EcoVec<Diagnostic>>;

/// Typesets math and analyzes its brackets.
///
/// Failures carry the renderer's diagnostics, which are data shown to the
/// user rather than errors of the session.
#[async_trait(?Send)]
pub trait Renderer {
    /// Renders `source` as SVG with the processor `processor`.
    async fn render(
        &self,
        source: &str,
        kind: RenderKind,
        processor: &str,
    ) -> RenderResult<SvgResult>;

    /// Finds the bracket pairs of math source.
    async fn find_bracket_pairs(&self, content: &str) -> RenderResult<Vec<BracketPair>>;
}

#[async_trait(?Send)]
impl<R: Renderer + ?Sized> Renderer for Box<R> {
    async fn render(
        &self,
        source: &str,
        kind: RenderKind,
        processor: &str,
    ) -> RenderResult<SvgResult> {
        (**self).render(source, kind, processor).await
    }

    async fn find_bracket_pairs(&self, content: &str) -> RenderResult<Vec<BracketPair>> {
        (**self).find_bracket_pairs(content).await
    }
}

/// A renderer running in process.
///
/// Brackets are matched by the native scanner. Rendering lays the source out
/// as a single line of monospace text, which is enough for terminals and
/// tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRenderer;

impl LocalRenderer {
    const CELL_WIDTH: usize = 8;
    const LINE_HEIGHT: usize = 16;

    fn layout(source: &str) -> RenderResult<EcoString> {
        let mut text = String::with_capacity(source.len());
        for c in source.chars() {
            match c {
                '<' => text.push_str("&lt;"),
                '>' => text.push_str("&gt;"),
                '&' => text.push_str("&amp;"),
                '\n' => text.push(' '),
                c if c.is_control() => {
                    let start = source.find(c).unwrap_or_default();
                    let span = DiagSpan {
                        start,
                        end: start + c.len_utf8(),
                    };
                    let message = eco_format!("unexpected control character {c:?}");
                    let diag = Diagnostic::error(span, message);
                    return Err(eco_vec![diag]);
                }
                c => text.push(c),
            }
        }

        let width = source.chars().count().max(1) * Self::CELL_WIDTH;
        let height = Self::LINE_HEIGHT;
        Ok(eco_format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="0" y="12" font-family="monospace">{text}</text></svg>"#
        ))
    }
}

#[async_trait(?Send)]
impl Renderer for LocalRenderer {
    async fn render(
        &self,
        source: &str,
        kind: RenderKind,
        processor: &str,
    ) -> RenderResult<SvgResult> {
        log::debug!("local render: {kind} with processor {processor:?}");
        let svg = Self::layout(source)?;
        Ok(SvgResult {
            svg,
            diags: EcoVec::new(),
        })
    }

    async fn find_bracket_pairs(&self, content: &str) -> RenderResult<Vec<BracketPair>> {
        Ok(find_bracket_pairs(content))
    }
}

/// Renders with a primary engine, falling back to a secondary one.
///
/// When both fail, the primary's diagnostics are reported. Bracket analysis
/// is only asked of the primary.
#[derive(Debug, Clone, Default)]
pub struct FallbackRenderer<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackRenderer<P, S> {
    /// Creates a renderer trying `primary` first.
    pub fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait(?Send)]
impl<P: Renderer, S: Renderer> Renderer for FallbackRenderer<P, S> {
    async fn render(
        &self,
        source: &str,
        kind: RenderKind,
        processor: &str,
    ) -> RenderResult<SvgResult> {
        let diags = match self.primary.render(source, kind, processor).await {
            Ok(result) => return Ok(result),
            Err(diags) => diags,
        };
        log::info!(
            "primary renderer failed with {} diagnostics, trying the fallback",
            diags.len()
        );
        match self.secondary.render(source, kind, processor).await {
            Ok(result) => Ok(result),
            Err(_) => Err(diags),
        }
    }

    async fn find_bracket_pairs(&self, content: &str) -> RenderResult<Vec<BracketPair>> {
        self.primary.find_bracket_pairs(content).await
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use insta::assert_snapshot;

    use super::*;

    /// Fails every request.
    struct Broken(&'static str);

    #[async_trait(?Send)]
    impl Renderer for Broken {
        async fn render(
            &self,
            _source: &str,
            _kind: RenderKind,
            _processor: &str,
        ) -> RenderResult<SvgResult> {
            Err(eco_vec![Diagnostic::error(DiagSpan::default(), self.0)])
        }

        async fn find_bracket_pairs(&self, _content: &str) -> RenderResult<Vec<BracketPair>> {
            Err(eco_vec![Diagnostic::error(DiagSpan::default(), self.0)])
        }
    }

    #[test]
    fn local_render_escapes_markup() {
        let result = block_on(LocalRenderer.render("a<b", RenderKind::Inline, "")).unwrap();
        assert_snapshot!(result.svg, @r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="16"><text x="0" y="12" font-family="monospace">a&lt;b</text></svg>"#);
    }

    #[test]
    fn local_render_rejects_control_characters() {
        let diags = block_on(LocalRenderer.render("x\u{7}", RenderKind::Display, "")).unwrap_err();
        assert_eq!(diags[0].span, DiagSpan { start: 1, end: 2 });
        assert_eq!(diags[0].severity, DiagSeverity::Error);
    }

    #[test]
    fn fallback_render() {
        let renderer = FallbackRenderer::new(Broken("primary"), LocalRenderer);
        assert!(block_on(renderer.render("x", RenderKind::Inline, "")).is_ok());

        let renderer = FallbackRenderer::new(Broken("primary"), Broken("secondary"));
        let diags = block_on(renderer.render("x", RenderKind::Inline, "")).unwrap_err();
        assert_eq!(diags[0].message, "primary");
    }

    #[test]
    fn fallback_brackets_use_primary() {
        let renderer = FallbackRenderer::new(Broken("primary"), LocalRenderer);
        assert!(block_on(renderer.find_bracket_pairs("(x)")).is_err());

        let renderer = FallbackRenderer::new(LocalRenderer, Broken("secondary"));
        let pairs = block_on(renderer.find_bracket_pairs("(x)")).unwrap();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn diagnostics_deserialize() {
        let diag: Diagnostic = serde_json::from_str(
            r#"{"severity": 1, "span": {"start": 0, "end": 3}, "message": "unknown variable: foo", "hints": ["did you mean `floor`?"]}"#,
        )
        .unwrap();
        assert_eq!(diag.severity, DiagSeverity::Error);
        assert_eq!(diag.hints.len(), 1);
        assert!(diag.trace.is_empty());
    }
}
