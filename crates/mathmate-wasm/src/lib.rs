//! Mathmate WASM bindings.
//!
//! This crate exposes a [`MathmateSession`] to JavaScript editor hosts. The
//! host reports editor events through its methods and carries out the
//! returned effects. Rendering, bracket analysis and snippet scripts are
//! delegated to JavaScript callbacks; render answers arrive later through the
//! effect listener passed at construction.
#![warn(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use ecow::{EcoString, EcoVec, eco_vec};
use js_sys::{Array, Function, Promise};
use mathmate::{
    Coords, DiagSpan, Diagnostic, EditorCommand, EditorEvent, EditorSnapshot, Effect,
    LocalRenderer, MathmateConfig, PopupPosition, Reaction, RenderKind, RenderRequest,
    RenderResult, Renderer, Session, SvgResult, fulfil,
};
use mathmate_analysis::BracketPair;
use mathmate_query::{Key, KeyEvent, ScriptEvaluator};
use mathmate_std::error::prelude::*;
use mathmate_std::{EditorPosition, EditorRange};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

/// Forwards log records to the browser console.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from(format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Initialize panic hook and logging for better messages in the browser
/// console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    if log::set_logger(&ConsoleLogger).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Turns a rejected JavaScript promise into diagnostics. A rejection with an
/// array of diagnostics is taken as is; anything else becomes one error.
fn diagnostics(err: JsValue) -> EcoVec<Diagnostic> {
    if let Ok(diags) = serde_wasm_bindgen::from_value::<Vec<Diagnostic>>(err.clone()) {
        return diags.into();
    }
    let message = err
        .as_string()
        .or_else(|| err.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{err:?}"));
    eco_vec![Diagnostic::error(DiagSpan::default(), message)]
}

fn malformed(err: serde_wasm_bindgen::Error) -> EcoVec<Diagnostic> {
    eco_vec![Diagnostic::error(
        DiagSpan::default(),
        format!("malformed renderer answer: {err}")
    )]
}

/// A renderer calling back into JavaScript.
///
/// `render(source, kind, processor)` resolves to an SVG string or to
/// `{ svg, diags }`. `brackets(content)` resolves to the pairs of the content;
/// without it the native scanner is used.
struct JsRenderer {
    render: Function,
    brackets: Option<Function>,
}

impl JsRenderer {
    async fn call(func: &Function, args: &Array) -> Result<JsValue, JsValue> {
        let ret = func.apply(&JsValue::NULL, args)?;
        JsFuture::from(Promise::resolve(&ret)).await
    }
}

#[async_trait(?Send)]
impl Renderer for JsRenderer {
    async fn render(
        &self,
        source: &str,
        kind: RenderKind,
        processor: &str,
    ) -> RenderResult<SvgResult> {
        let args = Array::of3(
            &source.into(),
            &kind.to_string().into(),
            &processor.into(),
        );
        let value = Self::call(&self.render, &args).await.map_err(diagnostics)?;
        if let Some(svg) = value.as_string() {
            return Ok(SvgResult {
                svg: svg.into(),
                diags: EcoVec::new(),
            });
        }
        serde_wasm_bindgen::from_value(value).map_err(malformed)
    }

    async fn find_bracket_pairs(&self, content: &str) -> RenderResult<Vec<BracketPair>> {
        let Some(brackets) = &self.brackets else {
            return LocalRenderer.find_bracket_pairs(content).await;
        };
        let args = Array::of1(&content.into());
        let value = Self::call(brackets, &args).await.map_err(diagnostics)?;
        serde_wasm_bindgen::from_value(value).map_err(malformed)
    }
}

/// Runs snippet scripts with a JavaScript `(body, input) => string` callback.
struct JsScripts(Function);

impl ScriptEvaluator for JsScripts {
    fn evaluate(&self, body: &str, input: Option<&str>) -> Result<EcoString> {
        let input = input.map_or(JsValue::UNDEFINED, JsValue::from);
        let value = self
            .0
            .call2(&JsValue::NULL, &body.into(), &input)
            .map_err(map_err("run script"))?;
        match value.as_string() {
            Some(text) => Ok(text.into()),
            None => mathmate_std::bail!("script returned {value:?} instead of a string"),
        }
    }
}

#[derive(Serialize)]
struct JsReaction<'a> {
    handled: bool,
    effects: &'a [Effect],
}

struct Shared {
    session: RefCell<Session>,
    renderer: JsRenderer,
    listener: Function,
}

impl Shared {
    /// Sends effects produced outside of a method call to the listener.
    fn notify(&self, effects: &[Effect]) {
        if effects.is_empty() {
            return;
        }
        let sent = serde_wasm_bindgen::to_value(effects)
            .map_err(JsValue::from)
            .and_then(|effects| self.listener.call1(&JsValue::NULL, &effects));
        if let Err(err) = sent {
            log::warn!("effect listener failed: {err:?}");
        }
    }
}

/// Splits render requests off `effects` and renders them in the background.
fn spawn_requests(shared: &Rc<Shared>, effects: Vec<Effect>) -> Vec<Effect> {
    let mut rest = Vec::with_capacity(effects.len());
    for effect in effects {
        let Effect::Request(request) = effect else {
            rest.push(effect);
            continue;
        };
        let shared = shared.clone();
        spawn_local(async move {
            let reply = fulfil(&shared.renderer, request).await;
            let reaction = shared
                .session
                .borrow_mut()
                .handle(EditorEvent::Rendered(reply));
            let effects = spawn_requests(&shared, reaction.effects);
            shared.notify(&effects);
        });
    }
    rest
}

/// The math assistance of one editor.
#[wasm_bindgen]
pub struct MathmateSession {
    shared: Rc<Shared>,
}

#[wasm_bindgen]
impl MathmateSession {
    /// Creates a session.
    ///
    /// `config` is a `MathmateConfig` object or `undefined`. Effects caused by
    /// render answers are passed to `listener` as an array.
    #[wasm_bindgen(constructor)]
    pub fn new(
        config: JsValue,
        listener: Function,
        render: Function,
        brackets: Option<Function>,
        scripts: Option<Function>,
    ) -> Result<MathmateSession, JsValue> {
        let config: MathmateConfig = if config.is_undefined() || config.is_null() {
            MathmateConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        let evaluator: Box<dyn ScriptEvaluator> = match scripts {
            Some(scripts) => Box::new(JsScripts(scripts)),
            None => Box::new(mathmate_query::NoScripts),
        };
        log::info!("session created with {} snippets", config.snippets.len());

        Ok(Self {
            shared: Rc::new(Shared {
                session: RefCell::new(Session::new(config, evaluator)),
                renderer: JsRenderer { render, brackets },
                listener,
            }),
        })
    }

    fn dispatch(&self, event: EditorEvent) -> Result<JsValue, JsValue> {
        let Reaction { handled, effects } = self.shared.session.borrow_mut().handle(event);
        let effects = spawn_requests(&self.shared, effects);
        let reaction = JsReaction {
            handled,
            effects: &effects,
        };
        Ok(serde_wasm_bindgen::to_value(&reaction)?)
    }

    /// The document changed.
    pub fn changed(&self, text: String, line: u32, ch: u32) -> Result<JsValue, JsValue> {
        let cursor = EditorPosition::new(line as usize, ch as usize);
        self.dispatch(EditorEvent::Changed(EditorSnapshot::new(text, cursor)))
    }

    /// The caret moved without the document changing.
    pub fn cursor_moved(&self, line: u32, ch: u32) -> Result<JsValue, JsValue> {
        let cursor = EditorPosition::new(line as usize, ch as usize);
        self.dispatch(EditorEvent::CursorMoved(cursor))
    }

    /// The user selected text from the anchor to the head, where the caret is.
    pub fn selection_changed(
        &self,
        anchor_line: u32,
        anchor_ch: u32,
        head_line: u32,
        head_ch: u32,
    ) -> Result<JsValue, JsValue> {
        let anchor = EditorPosition::new(anchor_line as usize, anchor_ch as usize);
        let head = EditorPosition::new(head_line as usize, head_ch as usize);
        self.dispatch(EditorEvent::SelectionChanged(EditorRange::new(anchor, head)))
    }

    /// A key is about to be handled by the editor. The answer tells whether
    /// the default action must be prevented.
    pub fn key_down(
        &self,
        key: String,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> Result<JsValue, JsValue> {
        let Ok(key) = key.parse::<Key>();
        let event = KeyEvent {
            key,
            shift,
            ctrl,
            alt,
            meta,
        };
        self.dispatch(EditorEvent::KeyDown(event))
    }

    /// The mouse is over the popup candidate `idx`.
    pub fn hover(&self, idx: usize) -> Result<JsValue, JsValue> {
        self.dispatch(EditorEvent::Hover(idx))
    }

    /// The popup candidate `idx` was clicked.
    pub fn select(&self, idx: usize) -> Result<JsValue, JsValue> {
        self.dispatch(EditorEvent::Select(idx))
    }

    /// The delay of a `defer` effect elapsed.
    pub fn repaint(&self, generation: f64) -> Result<JsValue, JsValue> {
        self.dispatch(EditorEvent::Repaint(generation as u64))
    }

    /// The editor gained or lost focus.
    pub fn focus(&self, focused: bool) -> Result<JsValue, JsValue> {
        self.dispatch(EditorEvent::Focus(focused))
    }

    /// Runs `boxEquation` or `selectEquation`.
    pub fn command(&self, name: String) -> Result<JsValue, JsValue> {
        let command = name
            .parse::<EditorCommand>()
            .map_err(map_string_err_with_args("parse command", [("name", name.clone())]))?;
        self.dispatch(EditorEvent::Command(command))
    }

    /// Tears down every popup, preview and decoration.
    pub fn close(&self) -> Result<JsValue, JsValue> {
        self.dispatch(EditorEvent::Close)
    }
}

/// Computes where a popup hangs below a range, from the `{ left, top, bottom }`
/// boxes of the range start, the range end and the start of its line.
#[wasm_bindgen(js_name = popupPosition)]
pub fn popup_position(
    start: JsValue,
    end: JsValue,
    line_start: JsValue,
) -> Result<JsValue, JsValue> {
    let start: Coords = serde_wasm_bindgen::from_value(start)?;
    let end: Coords = serde_wasm_bindgen::from_value(end)?;
    let line_start: Coords = serde_wasm_bindgen::from_value(line_start)?;
    Ok(serde_wasm_bindgen::to_value(&PopupPosition::between(
        start, end, line_start,
    ))?)
}

/// Lists the render requests a session issues for a document, for hosts that
/// prefetch renders.
#[wasm_bindgen(js_name = pendingRenders)]
pub fn pending_renders(text: String, line: u32, ch: u32) -> Result<JsValue, JsValue> {
    let cursor = EditorPosition::new(line as usize, ch as usize);
    let mut session = Session::new(MathmateConfig::default(), Box::new(mathmate_query::NoScripts));
    let reaction = session.handle(EditorEvent::Changed(EditorSnapshot::new(text, cursor)));
    let requests: Vec<&RenderRequest> = reaction
        .effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Request(request) => Some(request),
            _ => None,
        })
        .collect();
    Ok(serde_wasm_bindgen::to_value(&requests)?)
}
