//! A simulated editor host.
//!
//! The harness plays the role of the editor: it keeps the document, caret,
//! decorations, popup and preview, carries out every effect a session asks
//! for and reports the resulting changes back. It backs the command line
//! replay and the integration tests.

use std::collections::VecDeque;
use std::fmt::Write as _;

use mathmate_query::{Key, KeyEvent};

use crate::actor::SessionActor;
use crate::highlight::Highlight;
use crate::prelude::*;
use crate::renderer::{Diagnostic, Renderer};
use crate::session::{EditorCommand, EditorEvent, EditorSnapshot, Effect, PopupView, Session};

/// The cursor marker of [`EditorHarness::open`] and [`EditorHarness::marked`].
pub const CURSOR_MARK: char = '|';

/// What the preview pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewPane {
    /// A rendered equation.
    Svg {
        /// The end of the equation.
        anchor: EditorPosition,
        /// The rendered equation.
        svg: EcoString,
    },
    /// The diagnostics of a failed render.
    Error {
        /// The end of the equation.
        anchor: EditorPosition,
        /// The diagnostics.
        diagnostics: EcoVec<Diagnostic>,
    },
}

/// An editor driven by a session.
pub struct EditorHarness<R> {
    actor: SessionActor<R>,

    buffer: Buffer,
    cursor: EditorPosition,
    selection: Option<EditorRange>,
    highlights: Vec<Highlight>,
    popup: Option<PopupView>,
    preview: Option<PreviewPane>,
    notices: Vec<UserNotice>,
    deferred: Vec<u64>,
    /// Every effect carried out, oldest first.
    journal: Vec<Effect>,
}

impl<R: Renderer> EditorHarness<R> {
    /// Creates an empty editor.
    pub fn new(session: Session, renderer: R) -> Self {
        Self {
            actor: SessionActor::new(session, renderer),
            buffer: Buffer::default(),
            cursor: EditorPosition::default(),
            selection: None,
            highlights: Vec::new(),
            popup: None,
            preview: None,
            notices: Vec::new(),
            deferred: Vec::new(),
            journal: Vec::new(),
        }
    }

    /// The session behind the editor.
    pub fn session(&self) -> &Session {
        self.actor.session()
    }

    /// The document.
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    /// The caret.
    pub fn cursor(&self) -> EditorPosition {
        self.cursor
    }

    /// The selection, if the caret has not moved since it was made.
    pub fn selection(&self) -> Option<EditorRange> {
        self.selection
    }

    /// The decorations, in the order they were added.
    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// The decorations with `class`.
    pub fn highlighted(&self, class: &str) -> Vec<EditorRange> {
        self.highlights
            .iter()
            .filter(|h| h.class == class)
            .map(|h| h.range)
            .collect()
    }

    /// The suggestion popup.
    pub fn popup(&self) -> Option<&PopupView> {
        self.popup.as_ref()
    }

    /// The preview pane.
    pub fn preview(&self) -> Option<&PreviewPane> {
        self.preview.as_ref()
    }

    /// Every notice shown so far.
    pub fn notices(&self) -> &[UserNotice] {
        &self.notices
    }

    /// Drains the effects carried out so far.
    pub fn take_journal(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.journal)
    }

    /// The document with [`CURSOR_MARK`] at the caret.
    pub fn marked(&self) -> String {
        let mut text = self.buffer.text().to_owned();
        text.insert(self.buffer.pos_to_byte(self.cursor), CURSOR_MARK);
        text
    }

    /// Replaces the document with `marked`, whose first [`CURSOR_MARK`] is
    /// the caret. Without a mark the caret goes to the end.
    pub async fn open(&mut self, marked: &str) {
        let (text, offset) = match marked.find(CURSOR_MARK) {
            Some(offset) => (marked.replacen(CURSOR_MARK, "", 1), offset),
            None => (marked.to_owned(), marked.len()),
        };
        let buffer = Buffer::new(text);
        let cursor = buffer.byte_to_pos(offset);
        self.load(buffer.text(), cursor).await;
    }

    /// Replaces the document with `text` and puts the caret at `cursor`.
    pub async fn load(&mut self, text: impl Into<String>, cursor: EditorPosition) {
        self.buffer = Buffer::new(text);
        self.cursor = self.buffer.clamp(cursor);
        self.selection = None;
        self.run(EditorEvent::Changed(self.snapshot())).await;
    }

    /// Presses the keys of `text` one by one.
    pub async fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyEvent::plain(Key::Char(c))).await;
        }
    }

    /// Presses a chord such as `Shift+Tab`. Returns whether the session
    /// consumed it.
    pub async fn press(&mut self, chord: &str) -> bool {
        self.key(KeyEvent::parse(chord)).await
    }

    /// Presses a key. Unless the session consumes it, the editor handles the
    /// key itself.
    pub async fn key(&mut self, key: KeyEvent) -> bool {
        let handled = self.run(EditorEvent::KeyDown(key.clone())).await;
        if !handled && let Some(event) = self.default_action(&key) {
            self.run(event).await;
        }
        handled
    }

    /// Clicks at `pos`.
    pub async fn click(&mut self, pos: EditorPosition) {
        self.cursor = self.buffer.clamp(pos);
        self.selection = None;
        self.run(EditorEvent::CursorMoved(self.cursor)).await;
    }

    /// Selects `range`, leaving the caret at its `to` end.
    pub async fn select(&mut self, range: EditorRange) {
        let range = EditorRange::new(self.buffer.clamp(range.from), self.buffer.clamp(range.to));
        self.cursor = range.to;
        self.selection = Some(range);
        self.run(EditorEvent::SelectionChanged(range)).await;
    }

    /// Moves the mouse over the popup candidate `idx`.
    pub async fn hover(&mut self, idx: usize) {
        self.run(EditorEvent::Hover(idx)).await;
    }

    /// Clicks the popup candidate `idx`.
    pub async fn choose(&mut self, idx: usize) {
        self.run(EditorEvent::Select(idx)).await;
    }

    /// Invokes a command.
    pub async fn command(&mut self, command: EditorCommand) {
        self.run(EditorEvent::Command(command)).await;
    }

    /// Moves the focus away from the editor.
    pub async fn blur(&mut self) {
        self.run(EditorEvent::Focus(false)).await;
    }

    /// Lets every pending delay elapse.
    pub async fn settle(&mut self) {
        for generation in std::mem::take(&mut self.deferred) {
            self.run(EditorEvent::Repaint(generation)).await;
        }
    }

    /// A readable summary of the editor.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.marked());
        for highlight in &self.highlights {
            let _ = writeln!(out, "highlight {} {}", highlight.range, highlight.class);
        }
        if let Some(popup) = &self.popup {
            let _ = writeln!(out, "popup {} at {}", popup.kind, popup.range);
            for (idx, item) in popup.items.iter().enumerate() {
                let mark = if popup.selected == Some(idx) { '>' } else { ' ' };
                let _ = writeln!(out, " {mark} {}", item.label);
            }
        }
        match &self.preview {
            Some(PreviewPane::Svg { anchor, svg }) => {
                let _ = writeln!(out, "preview at {anchor}: {svg}");
            }
            Some(PreviewPane::Error {
                anchor,
                diagnostics,
            }) => {
                for diag in diagnostics {
                    let _ = writeln!(out, "preview error at {anchor}: {}", diag.message);
                }
            }
            None => {}
        }
        if let Some(selection) = self.selection {
            let _ = writeln!(out, "selection {selection}");
        }
        for notice in &self.notices {
            let _ = writeln!(out, "notice {}: {}", notice.origin, notice.message);
        }
        out
    }

    fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot::new(self.buffer.text(), self.cursor)
    }

    /// Dispatches `event` and every change caused by its effects. Returns
    /// whether the first event was consumed.
    async fn run(&mut self, event: EditorEvent) -> bool {
        let mut events = VecDeque::from([event]);
        let mut handled = None;
        while let Some(event) = events.pop_front() {
            let reaction = self.actor.dispatch(event).await;
            handled.get_or_insert(reaction.handled);
            events.extend(reaction.effects.into_iter().filter_map(|fx| self.apply(fx)));
        }
        handled.unwrap_or_default()
    }

    /// Carries out an effect, returning the change to report.
    fn apply(&mut self, effect: Effect) -> Option<EditorEvent> {
        self.journal.push(effect.clone());
        match effect {
            Effect::Splice(splice) => {
                self.cursor = splice.apply(&mut self.buffer);
                self.selection = None;
                return Some(match splice.edit {
                    Some(_) => EditorEvent::Changed(self.snapshot()),
                    None => EditorEvent::CursorMoved(self.cursor),
                });
            }
            Effect::SetSelection { range } => {
                self.cursor = range.to;
                self.selection = Some(range);
                return Some(EditorEvent::SelectionChanged(range));
            }
            Effect::ShowPopup(popup) => self.popup = Some(popup),
            Effect::ClosePopup => self.popup = None,
            Effect::AddHighlights { highlights } => self.highlights.extend(highlights),
            Effect::RemoveHighlights { classes } => {
                self.highlights.retain(|h| !classes.contains(&h.class));
            }
            Effect::Request(request) => log::warn!("unanswered render request {request:?}"),
            Effect::ShowPreview { anchor, svg } => {
                self.preview = Some(PreviewPane::Svg { anchor, svg });
            }
            Effect::ShowPreviewError {
                anchor,
                diagnostics,
            } => {
                self.preview = Some(PreviewPane::Error {
                    anchor,
                    diagnostics,
                });
            }
            Effect::HidePreview => self.preview = None,
            Effect::Notice(notice) => self.notices.push(notice),
            Effect::Defer { generation, .. } => self.deferred.push(generation),
        }
        None
    }

    /// What the editor does with a key the session let through.
    fn default_action(&mut self, key: &KeyEvent) -> Option<EditorEvent> {
        if let Some(c) = key.typed_char() {
            return Some(self.insert(&c.to_string()));
        }
        let byte = self.buffer.pos_to_byte(self.cursor);
        match key.key {
            Key::Enter => Some(self.insert("\n")),
            Key::Tab => Some(self.insert("\t")),
            Key::Backspace => {
                let prev = self.buffer.text()[..byte].chars().next_back()?;
                let from = self.buffer.byte_to_pos(byte - prev.len_utf8());
                self.cursor = self.buffer.replace(EditorRange::new(from, self.cursor), "");
                Some(EditorEvent::Changed(self.snapshot()))
            }
            Key::Left => {
                let prev = self.buffer.text()[..byte].chars().next_back()?;
                self.cursor = self.buffer.byte_to_pos(byte - prev.len_utf8());
                Some(EditorEvent::CursorMoved(self.cursor))
            }
            Key::Right => {
                let next = self.buffer.text()[byte..].chars().next()?;
                self.cursor = self.buffer.byte_to_pos(byte + next.len_utf8());
                Some(EditorEvent::CursorMoved(self.cursor))
            }
            _ => None,
        }
    }

    /// Types `text` over the selection, or at the caret.
    fn insert(&mut self, text: &str) -> EditorEvent {
        let range = match self.selection.take() {
            Some(selection) => selection,
            None => EditorRange::new(self.cursor, self.cursor),
        };
        self.cursor = self.buffer.replace(range, text);
        EditorEvent::Changed(self.snapshot())
    }
}
