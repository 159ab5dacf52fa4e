use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use ecow::{EcoString, eco_vec};
use futures::executor::block_on;
use insta::assert_snapshot;
use mathmate::harness::{EditorHarness, PreviewPane};
use mathmate::{
    DiagSpan, Diagnostic, EditorCommand, Effect, FallbackRenderer, LocalRenderer, MathmateConfig,
    RenderKind, RenderResult, Renderer, Session, SvgResult, TRIGGER_CLASS, all_classes,
};
use mathmate_analysis::BracketPair;
use mathmate_query::{NoScripts, QueryKind, ScriptEvaluator, Snippet, SnippetKind};
use mathmate_std::{EditorPosition, EditorRange};

fn pos(line: usize, ch: usize) -> EditorPosition {
    EditorPosition::new(line, ch)
}

fn range(from: (usize, usize), to: (usize, usize)) -> EditorRange {
    EditorRange::new(pos(from.0, from.1), pos(to.0, to.1))
}

fn snippets() -> Vec<Snippet> {
    vec![
        Snippet {
            name: "frac".into(),
            kind: SnippetKind::Inline,
            content: "frac(#CURSOR, )".into(),
            ..Snippet::default()
        },
        Snippet {
            name: "rep".into(),
            script: true,
            content: "return input.repeat(2)".into(),
            ..Snippet::default()
        },
    ]
}

fn repeat_script(_body: &str, input: Option<&str>) -> mathmate_std::Result<EcoString> {
    match input {
        Some("fail") => mathmate_std::bail!("cannot repeat"),
        Some(input) => Ok(input.repeat(2).into()),
        None => Ok(EcoString::new()),
    }
}

fn editor_with<R: Renderer>(config: MathmateConfig, renderer: R) -> EditorHarness<R> {
    let evaluator: Box<dyn ScriptEvaluator> = Box::new(repeat_script);
    EditorHarness::new(Session::new(config, evaluator), renderer)
}

fn editor() -> EditorHarness<LocalRenderer> {
    let config = MathmateConfig {
        snippets: snippets(),
        ..MathmateConfig::default()
    };
    editor_with(config, LocalRenderer)
}

#[derive(Debug, Clone, Copy)]
struct Broken;

#[async_trait(?Send)]
impl Renderer for Broken {
    async fn render(
        &self,
        _source: &str,
        _kind: RenderKind,
        _processor: &str,
    ) -> RenderResult<SvgResult> {
        Err(eco_vec![Diagnostic::error(DiagSpan::default(), "renderer is down")])
    }

    async fn find_bracket_pairs(&self, _content: &str) -> RenderResult<Vec<BracketPair>> {
        Err(eco_vec![Diagnostic::error(DiagSpan::default(), "renderer is down")])
    }
}

#[derive(Debug, Clone, Default)]
struct Counting {
    renders: Rc<Cell<usize>>,
    brackets: Rc<Cell<usize>>,
}

#[async_trait(?Send)]
impl Renderer for Counting {
    async fn render(
        &self,
        source: &str,
        kind: RenderKind,
        processor: &str,
    ) -> RenderResult<SvgResult> {
        self.renders.set(self.renders.get() + 1);
        LocalRenderer.render(source, kind, processor).await
    }

    async fn find_bracket_pairs(&self, content: &str) -> RenderResult<Vec<BracketPair>> {
        self.brackets.set(self.brackets.get() + 1);
        LocalRenderer.find_bracket_pairs(content).await
    }
}

#[test]
fn brackets_follow_the_cursor() {
    let config = MathmateConfig {
        enable_inline_preview: false,
        ..MathmateConfig::default()
    };
    let mut editor = editor_with(config, LocalRenderer);
    block_on(async {
        editor.open("so $f(a + [b|])$ ok").await;
        assert_snapshot!(editor.describe().trim_end(), @r"
        so $f(a + [b|])$ ok
        highlight 0:10-0:11 mathmate-bracket-bracket
        highlight 0:12-0:13 mathmate-bracket-bracket
        highlight 0:5-0:6 mathmate-bracket-paren
        highlight 0:13-0:14 mathmate-bracket-paren
        highlight 0:10-0:11 mathmate-bracket-enclosing-bracket
        highlight 0:12-0:13 mathmate-bracket-enclosing-bracket
        ");

        editor.click(pos(0, 13)).await;
        assert!(editor.highlighted("mathmate-bracket-enclosing-bracket").is_empty());
        assert_eq!(
            editor.highlighted("mathmate-bracket-enclosing-paren"),
            [range((0, 5), (0, 6)), range((0, 13), (0, 14))]
        );

        editor.settle().await;
        assert_eq!(editor.highlights().len(), 6);

        editor.click(pos(0, 1)).await;
        assert!(editor.highlights().is_empty());
    });
}

#[test]
fn brackets_in_display_math() {
    let mut editor = editor();
    block_on(async {
        editor.open("$$\n(a +\n b|)\n$$").await;
        assert_eq!(
            editor.highlighted("mathmate-bracket-enclosing-paren"),
            [range((1, 0), (1, 1)), range((2, 2), (2, 3))]
        );
        assert_eq!(editor.preview(), None);
    });
}

#[test]
fn moving_inside_a_region_does_not_rerender() {
    let renderer = Counting::default();
    let (renders, brackets) = (renderer.renders.clone(), renderer.brackets.clone());
    let mut editor = editor_with(MathmateConfig::default(), renderer);
    block_on(async {
        editor.open("$f(x|)$").await;
        editor.click(pos(0, 2)).await;
        editor.click(pos(0, 1)).await;
        editor.settle().await;
    });
    assert_eq!(renders.get(), 1);
    assert_eq!(brackets.get(), 1);
}

#[test]
fn preview_follows_typing() {
    let mut editor = editor();
    block_on(async {
        editor.open("see $x^2|$").await;
        let Some(PreviewPane::Svg { anchor, svg }) = editor.preview() else {
            panic!("expected a preview");
        };
        assert_eq!(*anchor, pos(0, 8));
        assert!(svg.contains(">x^2<"));

        editor.type_text("a").await;
        let Some(PreviewPane::Svg { anchor, svg }) = editor.preview() else {
            panic!("expected a preview");
        };
        assert_eq!(*anchor, pos(0, 9));
        assert!(svg.contains(">x^2a<"));

        editor.click(pos(0, 1)).await;
        assert_eq!(editor.preview(), None);
    });
}

#[test]
fn preview_shows_render_errors() {
    let mut editor = editor_with(MathmateConfig::default(), Broken);
    block_on(async {
        editor.open("$f(x|)$").await;
        let Some(PreviewPane::Error { diagnostics, .. }) = editor.preview() else {
            panic!("expected an error preview");
        };
        assert_eq!(diagnostics[0].message, "renderer is down");
        assert!(editor.highlights().is_empty());
    });
}

#[test]
fn fallback_renderer_recovers_the_preview() {
    let renderer = FallbackRenderer::new(Broken, LocalRenderer);
    let mut editor = editor_with(MathmateConfig::default(), renderer);
    block_on(async {
        editor.open("$f(x|)$").await;
        assert!(matches!(editor.preview(), Some(PreviewPane::Svg { .. })));
    });
}

#[test]
fn symbol_completion() {
    let mut editor = editor();
    block_on(async {
        editor.open("$x + |$").await;
        editor.type_text("al").await;
        let popup = editor.popup().expect("symbol popup");
        assert_eq!(popup.kind, QueryKind::Symbol);
        assert_eq!(editor.highlighted(TRIGGER_CLASS), [range((0, 5), (0, 7))]);
        assert_eq!(editor.preview(), None);

        editor.type_text("pha").await;
        assert_eq!(editor.highlighted(TRIGGER_CLASS), [range((0, 5), (0, 10))]);
        assert!(editor.press("Enter").await);

        assert_eq!(editor.marked(), "$x + α |$");
        assert_eq!(editor.popup(), None);
        assert!(editor.highlighted(TRIGGER_CLASS).is_empty());
    });
}

#[test]
fn symbol_names_without_unicode() {
    let config = MathmateConfig {
        complement_symbol_with_unicode: false,
        ..MathmateConfig::default()
    };
    let mut editor = editor_with(config, LocalRenderer);
    block_on(async {
        editor.open("$|$").await;
        editor.type_text("alpha").await;
        editor.press("Enter").await;
        assert_eq!(editor.marked(), "$alpha |$");
    });
}

#[test]
fn snippet_expansion_and_tab_stops() {
    let mut editor = editor();
    block_on(async {
        editor.open("$|$").await;
        editor.type_text("frac@").await;
        let popup = editor.popup().expect("snippet popup");
        assert_eq!(popup.kind, QueryKind::Snippet);
        assert_eq!(popup.selected, Some(0));
        assert_eq!(popup.items[0].label, "frac (Uncategorized)");

        assert!(editor.press("Enter").await);
        assert_eq!(editor.marked(), "$frac(|, )$");
        assert_eq!(editor.popup(), None);

        assert!(editor.press("Tab").await);
        assert_eq!(editor.marked(), "$frac(, )|$");
        assert!(editor.press("Tab").await);
        assert_eq!(editor.marked(), "$frac(, )$|");
        assert!(!editor.press("Tab").await);
        assert_eq!(editor.marked(), "$frac(, )$\t|");
    });
}

#[test]
fn backward_tab_stops() {
    let mut editor = editor();
    block_on(async {
        editor.open("$frac(a, b)|$").await;
        assert!(editor.press("Shift+Tab").await);
        assert_eq!(editor.marked(), "$frac|(a, b)$");
        assert!(editor.press("Shift+Tab").await);
        assert_eq!(editor.marked(), "$|frac(a, b)$");
        assert!(editor.press("Shift+Tab").await);
        assert_eq!(editor.marked(), "|$frac(a, b)$");
    });
}

#[test]
fn tab_jump_can_be_disabled() {
    let config = MathmateConfig {
        enable_tab_jump: false,
        ..MathmateConfig::default()
    };
    let mut editor = editor_with(config, LocalRenderer);
    block_on(async {
        editor.open("$f(a|)$").await;
        assert!(!editor.press("Tab").await);
        assert_eq!(editor.marked(), "$f(a\t|)$");
    });
}

#[test]
fn script_snippets() {
    let mut editor = editor();
    block_on(async {
        editor.open("$|$").await;
        editor.type_text("rep(ab)@").await;
        assert_eq!(editor.popup().map(|p| p.kind), Some(QueryKind::Snippet));
        editor.press("Enter").await;
        assert_eq!(editor.marked(), "$abab |$");
        assert!(editor.notices().is_empty());

        editor.open("$|$").await;
        editor.type_text("rep(fail)@").await;
        editor.press("Enter").await;
        assert_eq!(editor.marked(), "$rep(fail)@|$");
        assert_eq!(editor.notices().len(), 1);
        assert_eq!(editor.notices()[0].origin, "rep");
        assert_eq!(editor.popup(), None);
    });
}

#[test]
fn snippets_without_a_script_runtime() {
    let config = MathmateConfig {
        snippets: snippets(),
        ..MathmateConfig::default()
    };
    let session = Session::new(config, Box::new(NoScripts));
    let mut editor = EditorHarness::new(session, LocalRenderer);
    block_on(async {
        editor.open("$|$").await;
        editor.type_text("rep(ab)@").await;
        editor.press("Enter").await;
        assert_eq!(editor.notices().len(), 1);
    });
}

#[test]
fn popup_candidates_can_be_clicked() {
    let mut editor = editor();
    block_on(async {
        editor.open("$|$").await;
        editor.type_text("fr@").await;
        assert_eq!(editor.popup().map(|p| p.selected), Some(None));
        editor.hover(0).await;
        assert_eq!(editor.popup().map(|p| p.selected), Some(Some(0)));
        editor.choose(0).await;
        assert_eq!(editor.marked(), "$frac(|, )$");
    });
}

#[test]
fn equation_commands() {
    let mut editor = editor();
    block_on(async {
        editor.open("so $x + |y$").await;
        editor.command(EditorCommand::SelectEquation).await;
        assert_eq!(editor.selection(), Some(range((0, 4), (0, 9))));

        editor.command(EditorCommand::BoxEquation).await;
        assert_eq!(editor.marked(), "so $box(x + y)|$");
        assert_eq!(editor.selection(), None);

        editor.command(EditorCommand::SelectEquation).await;
        assert_eq!(editor.selection(), Some(range((0, 4), (0, 14))));
    });
}

#[test]
fn prose_gets_no_suggestions() {
    let mut editor = editor();
    block_on(async {
        editor.open("see |").await;
        editor.type_text("frac@").await;
        assert!(editor.popup().is_none());
        editor.type_text(" al").await;
        assert!(editor.popup().is_none());
        assert!(editor.highlights().is_empty());
        assert_eq!(editor.marked(), "see frac@ al|");

        editor.type_text(" $al").await;
        assert!(editor.popup().is_none());
        editor.type_text("$").await;
        editor.click(pos(0, 16)).await;
        assert_eq!(editor.popup().map(|popup| popup.kind), Some(QueryKind::Symbol));
    });
}

#[test]
fn shortcuts_wrap_selected_math() {
    let mut editor = editor();
    block_on(async {
        editor.open("so $x + |y$").await;
        editor.command(EditorCommand::SelectEquation).await;
        assert!(editor.press("/").await);
        assert_eq!(editor.marked(), "so $(x + y)/(|)$");
        editor.type_text("2").await;
        assert_eq!(editor.marked(), "so $(x + y)/(2|)$");

        editor.select(range((0, 5), (0, 10))).await;
        assert!(editor.press("|").await);
        assert_eq!(editor.marked(), "so $(abs(x + y)|)/(2)$");
    });
}

#[test]
fn shortcut_keys_type_over_prose() {
    let mut editor = editor();
    block_on(async {
        editor.open("so a+b $x$").await;
        editor.select(range((0, 3), (0, 6))).await;
        assert!(!editor.press("(").await);
        assert_eq!(editor.marked(), "so (| $x$");
    });
}

#[test]
fn blur_tears_everything_down() {
    let mut editor = editor();
    block_on(async {
        editor.open("$f(x) + al|$").await;
        assert!(editor.popup().is_some());
        assert!(!editor.highlights().is_empty());

        editor.take_journal();
        editor.blur().await;
        let journal = editor.take_journal();
        assert_eq!(
            journal,
            [
                Effect::ClosePopup,
                Effect::HidePreview,
                Effect::RemoveHighlights {
                    classes: all_classes()
                },
            ]
        );
        assert_eq!(editor.popup(), None);
        assert_eq!(editor.preview(), None);
        assert!(editor.highlights().is_empty());
    });
}

#[test]
fn code_is_left_alone() {
    let mut editor = editor();
    block_on(async {
        editor.open("```\n$x + al|$").await;
        assert_eq!(editor.popup(), None);
        assert_eq!(editor.preview(), None);
    });
}
