//! The coordinator of one editor: events in, effects out.
//!
//! A [`Session`] never touches the editor. It consumes the events the host
//! reports and answers with [`Effect`]s for the host to carry out. Renders
//! are requested through [`Effect::Request`] and their answers come back as
//! [`EditorEvent::Rendered`], so a session is usable from synchronous and
//! asynchronous hosts alike.

use mathmate_analysis::{BracketPair, in_code, locate};
use mathmate_query::{
    Completion, CompletionContext, CompletionState, JumpDirection, Key, KeyEvent, KeyOutcome,
    QueryKind, ScriptEvaluator, box_current_equation, detect_query_at, find_shortcut,
    select_current_equation, tab_jump,
};

use crate::brackets::{BracketPairEngine, Refresh};
use crate::config::MathmateConfig;
use crate::highlight::{
    Highlight, TRIGGER_CLASS, all_classes, bracket_classes, bracket_highlights, trigger_highlight,
};
use crate::prelude::*;
use crate::preview::{PreviewController, PreviewRequest, PreviewShow, PreviewUpdate};
use crate::renderer::{Diagnostic, RenderKind, RenderResult, SvgResult};

/// The state of the editor as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    /// The whole document.
    pub text: String,
    /// The caret.
    pub cursor: EditorPosition,
}

impl EditorSnapshot {
    /// Creates a snapshot.
    pub fn new(text: impl Into<String>, cursor: EditorPosition) -> Self {
        Self {
            text: text.into(),
            cursor,
        }
    }
}

/// A command invoked by the user.
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
#[strum(serialize_all = "camelCase")]
pub enum EditorCommand {
    /// Wraps the inline equation in `box(...)`.
    BoxEquation,
    /// Selects the equation around the cursor.
    SelectEquation,
}

/// A render a session asks the host for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum RenderRequest {
    /// The bracket pairs of math content.
    Brackets {
        /// The content of the region.
        content: EcoString,
    },
    /// The inline preview.
    Preview(PreviewRequest),
}

/// The answer to a [`RenderRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderReply {
    /// The bracket pairs of `content`.
    Brackets {
        /// The content the pairs were requested for.
        content: EcoString,
        /// The pairs.
        result: RenderResult<Vec<BracketPair>>,
    },
    /// The inline preview.
    Preview {
        /// The ticket of the request.
        ticket: u64,
        /// The rendered preview.
        result: RenderResult<SvgResult>,
    },
}

/// Something that happened in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// The document changed.
    Changed(EditorSnapshot),
    /// The caret moved without the document changing.
    CursorMoved(EditorPosition),
    /// The user selected text. The caret is at the `to` end.
    SelectionChanged(EditorRange),
    /// A key is about to be handled by the editor.
    KeyDown(KeyEvent),
    /// The mouse is over a popup candidate.
    Hover(usize),
    /// A popup candidate was clicked.
    Select(usize),
    /// A [`Effect::Defer`] delay elapsed.
    Repaint(u64),
    /// The editor gained or lost focus.
    Focus(bool),
    /// The user invoked a command.
    Command(EditorCommand),
    /// A render was answered.
    Rendered(RenderReply),
    /// The editor is going away.
    Close,
}

/// A popup candidate as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupItem {
    /// The main line.
    pub label: EcoString,
    /// A secondary line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<EcoString>,
    /// A source to render next to the candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<(EcoString, RenderKind)>,
}

/// The suggestion popup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    /// What the popup suggests.
    pub kind: QueryKind,
    /// The query text, which the popup hangs below.
    pub range: EditorRange,
    /// The candidates.
    pub items: Vec<PopupItem>,
    /// The highlighted candidate.
    pub selected: Option<usize>,
}

impl PopupView {
    fn of(state: &CompletionState) -> Option<Self> {
        Some(match state {
            CompletionState::Idle => return None,
            CompletionState::SnippetQuery(found) => Self {
                kind: QueryKind::Snippet,
                range: found.query.range(),
                items: found
                    .candidates
                    .iter()
                    .map(|snippet| PopupItem {
                        label: snippet.label(),
                        detail: (!snippet.description.is_empty())
                            .then(|| snippet.description.clone()),
                        preview: snippet
                            .preview_source()
                            .map(|source| (source, snippet.kind.into())),
                    })
                    .collect(),
                selected: found.selected,
            },
            CompletionState::SymbolQuery(found) => {
                let latex = found.query.word.starts_with('\\');
                Self {
                    kind: QueryKind::Symbol,
                    range: found.query.range(),
                    items: found
                        .candidates
                        .iter()
                        .map(|candidate| PopupItem {
                            label: candidate.label(latex),
                            detail: (!candidate.symbol.unic_name.is_empty())
                                .then(|| candidate.symbol.unic_name.clone()),
                            preview: None,
                        })
                        .collect(),
                    selected: found.selected,
                }
            }
        })
    }
}

/// What the host must do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Effect {
    /// Apply an edit and move the caret.
    Splice(Splice),
    /// Select a range.
    SetSelection {
        /// The range.
        range: EditorRange,
    },
    /// Show or update the suggestion popup.
    ShowPopup(PopupView),
    /// Hide the suggestion popup.
    ClosePopup,
    /// Add decorations.
    AddHighlights {
        /// The decorations.
        highlights: Vec<Highlight>,
    },
    /// Remove every decoration with one of the classes.
    RemoveHighlights {
        /// The classes.
        classes: Vec<EcoString>,
    },
    /// Render something and report the answer as [`EditorEvent::Rendered`].
    Request(RenderRequest),
    /// Show the inline preview below `anchor`.
    ShowPreview {
        /// The end of the equation.
        anchor: EditorPosition,
        /// The rendered equation.
        svg: EcoString,
    },
    /// Show the diagnostics of a failed preview below `anchor`.
    ShowPreviewError {
        /// The end of the equation.
        anchor: EditorPosition,
        /// The diagnostics.
        diagnostics: EcoVec<Diagnostic>,
    },
    /// Hide the inline preview.
    HidePreview,
    /// Tell the user something went wrong.
    Notice(UserNotice),
    /// Report [`EditorEvent::Repaint`] with `generation` after `delay_ms`.
    Defer {
        /// The delay in milliseconds.
        delay_ms: u64,
        /// The generation to report back.
        generation: u64,
    },
}

/// The answer to an event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reaction {
    /// Whether the event was consumed. Only meaningful for keys: a consumed
    /// key must not reach the editor.
    pub handled: bool,
    /// What the host must do, in order.
    pub effects: Vec<Effect>,
}

fn context<'a>(
    config: &'a MathmateConfig,
    evaluator: &'a dyn ScriptEvaluator,
) -> CompletionContext<'a> {
    CompletionContext {
        snippets: &config.snippets,
        symbols: &mathmate_analysis::SYMBOLS,
        evaluator,
        unicode: config.complement_symbol_with_unicode,
    }
}

/// The math assistance of one editor.
pub struct Session {
    config: MathmateConfig,
    evaluator: Box<dyn ScriptEvaluator>,

    buffer: Buffer,
    cursor: EditorPosition,
    /// The non-empty selection, ordered.
    selection: Option<EditorRange>,

    completion: Completion,
    /// The popup as last shown to the host.
    popup: Option<PopupView>,
    brackets: BracketPairEngine,
    preview: PreviewController,
    /// Bumped by every cursor move, so that only the latest deferred repaint
    /// fires.
    generation: u64,
}

impl Session {
    /// Creates a session over an empty document.
    pub fn new(config: MathmateConfig, evaluator: Box<dyn ScriptEvaluator>) -> Self {
        let preview = PreviewController::new(config.preview_processor.clone());
        Self {
            config,
            evaluator,
            buffer: Buffer::default(),
            cursor: EditorPosition::default(),
            selection: None,
            completion: Completion::default(),
            popup: None,
            brackets: BracketPairEngine::default(),
            preview,
            generation: 0,
        }
    }

    /// The configuration.
    pub fn config(&self) -> &MathmateConfig {
        &self.config
    }

    /// The document as last reported.
    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// The caret as last reported.
    pub fn cursor(&self) -> EditorPosition {
        self.cursor
    }

    /// The selection as last reported.
    pub fn selection(&self) -> Option<EditorRange> {
        self.selection
    }

    /// The state of the suggestion popup.
    pub fn completion(&self) -> &CompletionState {
        self.completion.state()
    }

    /// The cached bracket pairs.
    pub fn brackets(&self) -> &BracketPairEngine {
        &self.brackets
    }

    /// Handles an event.
    pub fn handle(&mut self, event: EditorEvent) -> Reaction {
        let mut fx = Vec::new();
        let mut handled = false;
        match event {
            EditorEvent::Changed(snapshot) => self.changed(snapshot, &mut fx),
            EditorEvent::CursorMoved(cursor) => self.cursor_moved(cursor, &mut fx),
            EditorEvent::SelectionChanged(range) => self.selection_changed(range, &mut fx),
            EditorEvent::KeyDown(key) => handled = self.key_down(&key, &mut fx),
            EditorEvent::Hover(idx) => {
                self.completion.hover(idx);
                self.sync_popup(&mut fx);
            }
            EditorEvent::Select(idx) => {
                let cx = context(&self.config, &*self.evaluator);
                let outcome = self.completion.on_select(idx, self.cursor, &cx);
                handled = self.outcome(outcome, &mut fx);
            }
            EditorEvent::Repaint(generation) => {
                if generation == self.generation {
                    self.paint(&mut fx);
                } else {
                    log::debug!("skipping stale repaint {generation}");
                }
            }
            EditorEvent::Focus(true) => {}
            EditorEvent::Focus(false) | EditorEvent::Close => self.close(&mut fx),
            EditorEvent::Command(command) => self.command(command, &mut fx),
            EditorEvent::Rendered(reply) => self.rendered(reply, &mut fx),
        }
        Reaction {
            handled,
            effects: fx,
        }
    }

    fn changed(&mut self, snapshot: EditorSnapshot, fx: &mut Vec<Effect>) {
        self.buffer = Buffer::new(snapshot.text);
        self.cursor = self.buffer.clamp(snapshot.cursor);
        self.selection = None;

        self.update_completion(fx);
        self.update_preview(fx);
        self.refresh_brackets(fx);
    }

    fn cursor_moved(&mut self, cursor: EditorPosition, fx: &mut Vec<Effect>) {
        self.cursor = self.buffer.clamp(cursor);
        self.selection = None;

        self.update_completion(fx);
        self.update_preview(fx);
        self.refresh_brackets(fx);

        // The editor repaints its own decorations after a move, which may drop
        // ours, so paint once more when it has settled.
        self.generation += 1;
        if self.brackets.region().is_some() {
            fx.push(Effect::Defer {
                delay_ms: self.config.highlight_delay(),
                generation: self.generation,
            });
        }
    }

    fn selection_changed(&mut self, range: EditorRange, fx: &mut Vec<Effect>) {
        let (anchor, head) = (self.buffer.clamp(range.from), self.buffer.clamp(range.to));
        self.cursor_moved(head, fx);
        let selection = EditorRange::new(anchor.min(head), anchor.max(head));
        self.selection = (!selection.is_empty()).then_some(selection);
    }

    fn key_down(&mut self, key: &KeyEvent, fx: &mut Vec<Effect>) -> bool {
        if self.completion.is_open() {
            let cx = context(&self.config, &*self.evaluator);
            let outcome = self.completion.on_key(key, self.cursor, &cx);
            return self.outcome(outcome, fx);
        }
        if let Some(splice) = self.shortcut(key) {
            self.selection = None;
            fx.push(Effect::Splice(splice));
            return true;
        }

        let command = key.ctrl || key.alt || key.meta;
        if key.key != Key::Tab || command || !self.config.enable_tab_jump {
            return false;
        }
        let Some(region) = locate(&self.buffer, self.cursor) else {
            return false;
        };
        let direction = if key.shift {
            JumpDirection::Backward
        } else {
            JumpDirection::Forward
        };
        fx.push(Effect::Splice(tab_jump(&self.buffer, &region, self.cursor, direction)));
        true
    }

    /// Wraps the selection when a shortcut key is typed inside math.
    fn shortcut(&self, key: &KeyEvent) -> Option<Splice> {
        let selection = self.selection?;
        let shortcut = find_shortcut(&self.config.shortcuts, key.typed_char()?)?;
        locate(&self.buffer, self.cursor)?;
        Some(shortcut.apply(selection, self.buffer.slice(selection)))
    }

    fn outcome(&mut self, outcome: KeyOutcome, fx: &mut Vec<Effect>) -> bool {
        if let Some(notice) = outcome.notice {
            fx.push(Effect::Notice(notice));
        }
        if let Some(splice) = outcome.splice {
            fx.push(Effect::Splice(splice));
        }
        self.sync_popup(fx);
        outcome.handled
    }

    fn command(&mut self, command: EditorCommand, fx: &mut Vec<Effect>) {
        log::debug!("running command {command}");
        match command {
            EditorCommand::BoxEquation => {
                if let Some(splice) = box_current_equation(&self.buffer, self.cursor) {
                    fx.push(Effect::Splice(splice));
                }
            }
            EditorCommand::SelectEquation => {
                if let Some(range) = select_current_equation(&self.buffer, self.cursor) {
                    fx.push(Effect::SetSelection { range });
                }
            }
        }
    }

    fn rendered(&mut self, reply: RenderReply, fx: &mut Vec<Effect>) {
        match reply {
            RenderReply::Brackets { content, result } => {
                if self.brackets.commit(&content, result) {
                    self.paint(fx);
                }
            }
            RenderReply::Preview { ticket, result } => {
                let (Some(show), Some(anchor)) =
                    (self.preview.commit(ticket, result), self.preview.anchor())
                else {
                    return;
                };
                fx.push(match show {
                    PreviewShow::Svg(result) => Effect::ShowPreview {
                        anchor,
                        svg: result.svg,
                    },
                    PreviewShow::Error(diagnostics) => Effect::ShowPreviewError {
                        anchor,
                        diagnostics,
                    },
                });
            }
        }
    }

    /// Tears down every popup, preview and decoration. Deferred repaints
    /// issued before are ignored.
    fn close(&mut self, fx: &mut Vec<Effect>) {
        self.generation += 1;
        self.completion.close();
        self.popup = None;
        self.selection = None;
        self.brackets.clear();
        self.preview.hide();
        fx.push(Effect::ClosePopup);
        fx.push(Effect::HidePreview);
        fx.push(Effect::RemoveHighlights {
            classes: all_classes(),
        });
    }

    /// Suggestions are only offered inside math, and never inside code.
    fn update_completion(&mut self, fx: &mut Vec<Effect>) {
        let in_math = locate(&self.buffer, self.cursor).is_some();
        let query = if !in_math || in_code(&self.buffer, self.cursor) {
            None
        } else {
            detect_query_at(&self.buffer, self.cursor)
        };
        let cx = context(&self.config, &*self.evaluator);
        self.completion.update(query, &cx);
        self.sync_popup(fx);
    }

    /// Tells the host about changes of the popup since it was last shown.
    fn sync_popup(&mut self, fx: &mut Vec<Effect>) {
        let view = PopupView::of(self.completion.state());
        if view == self.popup {
            return;
        }

        let trigger = vec![EcoString::from(TRIGGER_CLASS)];
        match &view {
            Some(view) => {
                if self.preview.hide() == PreviewUpdate::Hide {
                    fx.push(Effect::HidePreview);
                }
                fx.push(Effect::RemoveHighlights { classes: trigger });
                fx.push(Effect::ShowPopup(view.clone()));
                if let Some(query) = self.completion.state().query() {
                    fx.push(Effect::AddHighlights {
                        highlights: vec![trigger_highlight(query)],
                    });
                }
            }
            None => {
                fx.push(Effect::ClosePopup);
                fx.push(Effect::RemoveHighlights { classes: trigger });
            }
        }
        self.popup = view;
    }

    fn update_preview(&mut self, fx: &mut Vec<Effect>) {
        if !self.config.enable_inline_preview {
            return;
        }
        let popup_open = self.completion.is_open();
        match self.preview.update(&self.buffer, self.cursor, popup_open) {
            PreviewUpdate::Keep => {}
            PreviewUpdate::Hide => fx.push(Effect::HidePreview),
            PreviewUpdate::Render(request) => {
                fx.push(Effect::Request(RenderRequest::Preview(request)));
            }
        }
    }

    fn refresh_brackets(&mut self, fx: &mut Vec<Effect>) {
        let region = locate(&self.buffer, self.cursor);
        match self.brackets.refresh(region.as_ref()) {
            Refresh::Unchanged | Refresh::Moved => self.paint(fx),
            Refresh::Cleared => fx.push(Effect::RemoveHighlights {
                classes: bracket_classes(),
            }),
            Refresh::Requested(content) => {
                fx.push(Effect::RemoveHighlights {
                    classes: bracket_classes(),
                });
                fx.push(Effect::Request(RenderRequest::Brackets { content }));
            }
        }
    }

    /// Replaces the bracket decorations with those of the cached pairs.
    fn paint(&self, fx: &mut Vec<Effect>) {
        let (Some(region), Some(pairs)) = (self.brackets.region(), self.brackets.pairs()) else {
            return;
        };
        let enclosing = self.brackets.enclosing_pair(self.cursor);
        fx.push(Effect::RemoveHighlights {
            classes: bracket_classes(),
        });
        fx.push(Effect::AddHighlights {
            highlights: bracket_highlights(region, pairs, enclosing),
        });
    }
}

#[cfg(test)]
mod tests {
    use mathmate_analysis::find_bracket_pairs;
    use mathmate_query::NoScripts;

    use super::*;

    fn session() -> Session {
        Session::new(MathmateConfig::default(), Box::new(NoScripts))
    }

    fn changed(session: &mut Session, text: &str, line: usize, ch: usize) -> Vec<Effect> {
        let snapshot = EditorSnapshot::new(text, EditorPosition::new(line, ch));
        session.handle(EditorEvent::Changed(snapshot)).effects
    }

    fn requests(effects: &[Effect]) -> Vec<&RenderRequest> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Request(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn math_requests_brackets_and_preview() {
        let mut session = session();
        let effects = changed(&mut session, "$f(x)$", 0, 3);
        let requests = requests(&effects);
        assert_eq!(requests.len(), 2);
        assert!(matches!(requests[0], RenderRequest::Preview(req) if req.source == "f(x)"));
        assert_eq!(
            requests[1],
            &RenderRequest::Brackets {
                content: "f(x)".into()
            }
        );
    }

    #[test]
    fn plain_text_requests_nothing() {
        let mut session = session();
        let effects = changed(&mut session, "hello world", 0, 5);
        assert!(requests(&effects).is_empty());
    }

    #[test]
    fn committed_pairs_are_painted() {
        let mut session = session();
        changed(&mut session, "$f(x)$", 0, 3);
        let reply = RenderReply::Brackets {
            content: "f(x)".into(),
            result: Ok(find_bracket_pairs("f(x)")),
        };
        let effects = session.handle(EditorEvent::Rendered(reply)).effects;
        let Some(Effect::AddHighlights { highlights }) = effects.last() else {
            panic!("expected highlights");
        };
        assert_eq!(highlights.len(), 4);
    }

    fn shows_popup(effects: &[Effect]) -> bool {
        effects.iter().any(|e| matches!(e, Effect::ShowPopup(_)))
    }

    #[test]
    fn queries_outside_math_stay_closed() {
        let config = MathmateConfig {
            snippets: vec![Snippet {
                name: "area".into(),
                content: "pi r^2".into(),
                ..Snippet::default()
            }],
            ..MathmateConfig::default()
        };
        let mut session = Session::new(config, Box::new(NoScripts));

        for (text, ch) in [("the quick al", 12), ("the area@", 9), ("$x$ and al", 10)] {
            let effects = changed(&mut session, text, 0, ch);
            assert!(!shows_popup(&effects), "{text}");
            assert!(!session.completion().is_open(), "{text}");
        }
        let moved = session.handle(EditorEvent::CursorMoved(EditorPosition::new(0, 10)));
        assert!(!shows_popup(&moved.effects));

        let effects = changed(&mut session, "$area@$", 0, 6);
        assert!(shows_popup(&effects));
        let effects = changed(&mut session, "$x + al$", 0, 7);
        assert!(shows_popup(&effects));
    }

    #[test]
    fn shortcuts_wrap_the_selection_in_math() {
        let mut session = session();
        changed(&mut session, "$a+b$ a+b", 0, 0);

        let math = EditorRange::new(EditorPosition::new(0, 1), EditorPosition::new(0, 4));
        session.handle(EditorEvent::SelectionChanged(math));
        assert_eq!(session.selection(), Some(math));
        let reaction = session.handle(EditorEvent::KeyDown(KeyEvent::parse("(")));
        assert!(reaction.handled);
        let edit = TextEdit::new(math, "(a+b)");
        assert_eq!(
            reaction.effects,
            vec![Effect::Splice(Splice::edit(edit, EditorPosition::new(0, 6)))]
        );
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn shortcuts_need_math_and_a_selection() {
        let mut session = session();
        changed(&mut session, "$a+b$ a+b", 0, 3);
        let reaction = session.handle(EditorEvent::KeyDown(KeyEvent::parse("(")));
        assert!(!reaction.handled);

        // Selected backwards, in prose.
        let prose = EditorRange::new(EditorPosition::new(0, 9), EditorPosition::new(0, 6));
        session.handle(EditorEvent::SelectionChanged(prose));
        assert_eq!(
            session.selection(),
            Some(EditorRange::new(EditorPosition::new(0, 6), EditorPosition::new(0, 9)))
        );
        let reaction = session.handle(EditorEvent::KeyDown(KeyEvent::parse("(")));
        assert!(!reaction.handled);
        assert!(reaction.effects.is_empty());

        session.handle(EditorEvent::CursorMoved(EditorPosition::new(0, 2)));
        assert_eq!(session.selection(), None);
    }

    #[test]
    fn leaving_the_query_closes_popup() {
        let mut session = session();
        changed(&mut session, "$x + al$", 0, 7);
        assert!(session.completion().is_open());
        let effects = changed(&mut session, "$x + al$", 0, 3);
        assert!(!session.completion().is_open());
        assert!(effects.contains(&Effect::ClosePopup));
        assert!(effects.contains(&Effect::RemoveHighlights {
            classes: vec![TRIGGER_CLASS.into()]
        }));
    }

    #[test]
    fn keys_pass_without_popup() {
        let mut session = session();
        changed(&mut session, "text", 0, 4);
        let reaction = session.handle(EditorEvent::KeyDown(KeyEvent::parse("Tab")));
        assert!(!reaction.handled);
        assert!(reaction.effects.is_empty());
    }

    #[test]
    fn stale_repaints_are_skipped() {
        let mut session = session();
        changed(&mut session, "$f(x)$", 0, 3);
        session.handle(EditorEvent::Rendered(RenderReply::Brackets {
            content: "f(x)".into(),
            result: Ok(find_bracket_pairs("f(x)")),
        }));
        let first = session.handle(EditorEvent::CursorMoved(EditorPosition::new(0, 4)));
        let Some(&Effect::Defer { generation, delay_ms }) = first.effects.last() else {
            panic!("expected a deferral");
        };
        assert_eq!(delay_ms, 250);
        session.handle(EditorEvent::CursorMoved(EditorPosition::new(0, 2)));

        assert!(session.handle(EditorEvent::Repaint(generation)).effects.is_empty());
        assert!(!session.handle(EditorEvent::Repaint(generation + 1)).effects.is_empty());

        session.handle(EditorEvent::Close);
        assert!(session.handle(EditorEvent::Repaint(generation + 1)).effects.is_empty());
    }

    #[test]
    fn close_removes_everything() {
        let mut session = session();
        changed(&mut session, "$al$", 0, 3);
        let effects = session.handle(EditorEvent::Focus(false)).effects;
        assert_eq!(effects[0], Effect::ClosePopup);
        assert_eq!(effects[1], Effect::HidePreview);
        assert_eq!(
            effects[2],
            Effect::RemoveHighlights {
                classes: all_classes()
            }
        );
        assert!(!session.completion().is_open());
    }
}
