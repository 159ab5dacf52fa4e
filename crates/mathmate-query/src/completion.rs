//! The suggestion popup state machine.
//!
//! The popup is driven by two inputs: the query detected after every document
//! or selection change ([`Completion::update`]) and the keys pressed while it
//! is open ([`Completion::on_key`]). Both answer synchronously; edits are
//! returned as [`Splice`]s and never applied here.

use mathmate_analysis::SymbolIndex;
use mathmate_std::Error;

use crate::key::{Key, KeyEvent};
use crate::prelude::*;
use crate::snippet::{ScriptEvaluator, Snippet, complete_snippet, execute_snippet};
use crate::symbol::{SymbolCandidate, apply_symbol, complete_symbol, symbol_candidates};
use crate::trigger::{CompletionQuery, QueryKind};

/// The candidates offered for a query, with the highlighted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestions<T> {
    /// The query the candidates answer.
    pub query: CompletionQuery,
    /// The candidates, best first. Never empty.
    pub candidates: Vec<T>,
    /// The highlighted candidate, if the user picked one.
    pub selected: Option<usize>,
}

impl<T> Suggestions<T> {
    fn new(query: CompletionQuery, candidates: Vec<T>) -> Option<Self> {
        (!candidates.is_empty()).then_some(Self {
            query,
            candidates,
            selected: None,
        })
    }

    /// Moves the highlight down, wrapping around.
    pub fn select_next(&mut self) {
        let len = self.candidates.len();
        self.selected = Some(self.selected.map_or(0, |idx| (idx + 1) % len));
    }

    /// Moves the highlight up, wrapping around.
    pub fn select_prev(&mut self) {
        let len = self.candidates.len();
        self.selected = Some(self.selected.map_or(len - 1, |idx| (idx + len - 1) % len));
    }

    /// Highlights the candidate at `idx`, if it exists.
    pub fn select(&mut self, idx: usize) {
        if idx < self.candidates.len() {
            self.selected = Some(idx);
        }
    }

    /// The highlighted candidate, falling back to the first one.
    pub fn chosen(&self) -> &T {
        let idx = self.selected.unwrap_or(0).min(self.candidates.len() - 1);
        &self.candidates[idx]
    }

    fn keep_selection<U>(&mut self, prev: &Suggestions<U>) {
        self.selected = prev.selected.filter(|idx| *idx < self.candidates.len());
    }
}

/// The state of the suggestion popup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompletionState {
    /// No popup is shown.
    #[default]
    Idle,
    /// Snippets are offered for a `name@` query.
    SnippetQuery(Suggestions<Snippet>),
    /// Symbols are offered for a name, shorthand or LaTeX query.
    SymbolQuery(Suggestions<SymbolCandidate>),
}

impl CompletionState {
    /// Whether the popup is shown.
    pub fn is_open(&self) -> bool {
        !matches!(self, CompletionState::Idle)
    }

    /// The query the popup answers.
    pub fn query(&self) -> Option<&CompletionQuery> {
        match self {
            CompletionState::Idle => None,
            CompletionState::SnippetQuery(s) => Some(&s.query),
            CompletionState::SymbolQuery(s) => Some(&s.query),
        }
    }

    /// The highlighted candidate.
    pub fn selected(&self) -> Option<usize> {
        match self {
            CompletionState::Idle => None,
            CompletionState::SnippetQuery(s) => s.selected,
            CompletionState::SymbolQuery(s) => s.selected,
        }
    }
}

/// What the host provides to turn a choice into text.
#[derive(Clone, Copy)]
pub struct CompletionContext<'a> {
    /// The configured snippets.
    pub snippets: &'a [Snippet],
    /// The symbol table.
    pub symbols: &'a SymbolIndex,
    /// Runs script snippets.
    pub evaluator: &'a dyn ScriptEvaluator,
    /// Whether applied symbols are inserted as glyphs rather than names.
    pub unicode: bool,
}

/// The answer to a key press or a click on a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Whether the key was consumed and must not reach the editor.
    pub handled: bool,
    /// The edit to apply.
    pub splice: Option<Splice>,
    /// A message to show the user.
    pub notice: Option<UserNotice>,
}

impl KeyOutcome {
    /// Lets the key reach the editor.
    pub fn pass() -> Self {
        Self::default()
    }

    /// Consumes the key without editing.
    pub fn consumed() -> Self {
        Self {
            handled: true,
            ..Self::default()
        }
    }

    /// Consumes the key and edits.
    pub fn splice(splice: Splice) -> Self {
        Self {
            handled: true,
            splice: Some(splice),
            notice: None,
        }
    }

    fn from_result(result: mathmate_std::Result<Splice>) -> Self {
        match result {
            Ok(splice) => Self::splice(splice),
            Err(err) => Self {
                handled: true,
                splice: None,
                notice: Some(notice_of(&err)),
            },
        }
    }
}

fn notice_of(err: &Error) -> UserNotice {
    err.notice().cloned().unwrap_or_else(|| UserNotice {
        origin: "mathmate".into(),
        message: err.to_string().into(),
    })
}

/// Drives the suggestion popup.
#[derive(Debug, Clone, Default)]
pub struct Completion {
    state: CompletionState,
}

impl Completion {
    /// The current state.
    pub fn state(&self) -> &CompletionState {
        &self.state
    }

    /// Whether the popup is shown.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Hides the popup.
    pub fn close(&mut self) {
        self.state = CompletionState::Idle;
    }

    /// Recomputes the candidates for the query detected at the cursor.
    ///
    /// A query without candidates closes the popup. A highlight survives while
    /// the popup stays open on the same kind of query. A snippet whose name is
    /// typed exactly is highlighted.
    pub fn update(&mut self, query: Option<CompletionQuery>, cx: &CompletionContext) -> bool {
        let Some(query) = query else {
            self.close();
            return false;
        };

        self.state = match query.kind {
            QueryKind::Snippet => {
                let candidates = cx
                    .snippets
                    .iter()
                    .filter(|s| s.name.contains(query.word.as_str()))
                    .cloned()
                    .collect::<Vec<_>>();
                let exact = candidates.iter().position(|s| s.name == query.word);
                match Suggestions::new(query, candidates) {
                    Some(mut found) => {
                        if let CompletionState::SnippetQuery(prev) = &self.state {
                            found.keep_selection(prev);
                        }
                        if exact.is_some() {
                            found.selected = exact;
                        }
                        CompletionState::SnippetQuery(found)
                    }
                    None => CompletionState::Idle,
                }
            }
            QueryKind::Symbol => {
                let candidates = symbol_candidates(cx.symbols, &query.word);
                match Suggestions::new(query, candidates) {
                    Some(mut found) => {
                        if let CompletionState::SymbolQuery(prev) = &self.state {
                            found.keep_selection(prev);
                        }
                        CompletionState::SymbolQuery(found)
                    }
                    None => CompletionState::Idle,
                }
            }
        };
        self.is_open()
    }

    /// Handles a key pressed while the popup is shown. The cursor is the
    /// current caret, which sits right after the query.
    pub fn on_key(
        &mut self,
        event: &KeyEvent,
        cursor: EditorPosition,
        cx: &CompletionContext,
    ) -> KeyOutcome {
        match &mut self.state {
            CompletionState::Idle => KeyOutcome::pass(),
            CompletionState::SnippetQuery(found) => {
                let (outcome, close) = snippet_key(found, event, cursor, cx);
                if close {
                    self.close();
                }
                outcome
            }
            CompletionState::SymbolQuery(found) => {
                let (outcome, close) = symbol_key(found, event, cursor, cx);
                if close {
                    self.close();
                }
                outcome
            }
        }
    }

    /// Highlights the candidate under the mouse.
    pub fn hover(&mut self, idx: usize) {
        match &mut self.state {
            CompletionState::Idle => {}
            CompletionState::SnippetQuery(found) => found.select(idx),
            CompletionState::SymbolQuery(found) => found.select(idx),
        }
    }

    /// Handles a click on the candidate at `idx`: snippets are executed and
    /// symbols applied, then the popup closes.
    pub fn on_select(
        &mut self,
        idx: usize,
        cursor: EditorPosition,
        cx: &CompletionContext,
    ) -> KeyOutcome {
        let outcome = match &mut self.state {
            CompletionState::Idle => return KeyOutcome::pass(),
            CompletionState::SnippetQuery(found) if idx < found.candidates.len() => {
                found.select(idx);
                KeyOutcome::from_result(execute_snippet(&found.query, found.chosen(), cx.evaluator))
            }
            CompletionState::SymbolQuery(found) if idx < found.candidates.len() => {
                found.select(idx);
                let symbol = &found.chosen().symbol;
                KeyOutcome::splice(apply_symbol(&found.query, symbol, cursor, cx.unicode))
            }
            _ => return KeyOutcome::pass(),
        };
        self.close();
        outcome
    }
}

/// Returns the outcome and whether the popup closes.
fn snippet_key(
    found: &mut Suggestions<Snippet>,
    event: &KeyEvent,
    cursor: EditorPosition,
    cx: &CompletionContext,
) -> (KeyOutcome, bool) {
    let query = &found.query;
    let argument = query.argument.as_deref();
    // Characters typed while the popup is open go before the `@`, or before
    // the argument if there is one.
    let word_end = cursor.left(if argument.is_some() { 2 } else { 1 });

    match &event.key {
        Key::Up => {
            found.select_prev();
            (KeyOutcome::consumed(), false)
        }
        Key::Down => {
            found.select_next();
            (KeyOutcome::consumed(), false)
        }
        Key::Tab | Key::Right => {
            let outcome = complete_snippet(query, found.chosen(), cx.evaluator);
            let close = outcome.is_err();
            (KeyOutcome::from_result(outcome), close)
        }
        Key::Enter => {
            let snippet = found.chosen();
            if snippet.wants_argument() && argument.is_none() {
                let outcome = complete_snippet(query, snippet, cx.evaluator);
                let close = outcome.is_err();
                return (KeyOutcome::from_result(outcome), close);
            }
            let outcome = execute_snippet(query, snippet, cx.evaluator);
            (KeyOutcome::from_result(outcome), true)
        }
        Key::Escape => (KeyOutcome::consumed(), true),
        Key::Shift => (KeyOutcome::consumed(), false),
        Key::Backspace => {
            if query.word.is_empty() {
                return (KeyOutcome::pass(), true);
            }
            let at = cursor.left(if argument.is_some() { 3 } else { 2 });
            let len = if argument == Some("()") { 2 } else { 1 };
            let edit = TextEdit::delete(at, len);
            (KeyOutcome::splice(Splice::edit(edit, cursor.left(len))), false)
        }
        _ => match event.typed_char() {
            Some('(') => {
                let edit = TextEdit::insert(word_end, "()");
                (KeyOutcome::splice(Splice::edit(edit, cursor.right(2))), false)
            }
            Some(' ') if argument.is_none() => (KeyOutcome::pass(), true),
            Some(c) => {
                let edit = TextEdit::insert(word_end, c.to_string());
                let cursor = cursor.right(c.len_utf16());
                (KeyOutcome::splice(Splice::edit(edit, cursor)), false)
            }
            None => (KeyOutcome::pass(), true),
        },
    }
}

/// Returns the outcome and whether the popup closes.
fn symbol_key(
    found: &mut Suggestions<SymbolCandidate>,
    event: &KeyEvent,
    cursor: EditorPosition,
    cx: &CompletionContext,
) -> (KeyOutcome, bool) {
    let query = &found.query;
    match &event.key {
        Key::Up => {
            found.select_prev();
            (KeyOutcome::consumed(), false)
        }
        Key::Down => {
            found.select_next();
            (KeyOutcome::consumed(), false)
        }
        Key::Tab | Key::Right => {
            let symbol = &found.chosen().symbol;
            let splice = complete_symbol(query, symbol, cursor, cx.unicode);
            (KeyOutcome::splice(splice), false)
        }
        Key::Enter => {
            let symbol = &found.chosen().symbol;
            let splice = apply_symbol(query, symbol, cursor, cx.unicode);
            (KeyOutcome::splice(splice), true)
        }
        Key::Escape => (KeyOutcome::consumed(), true),
        // The query is re-detected once the editor applies the key.
        Key::Backspace | Key::Shift => (KeyOutcome::pass(), false),
        _ if event.typed_char().is_some() => (KeyOutcome::pass(), false),
        _ => (KeyOutcome::pass(), true),
    }
}
