//! User-defined snippets and their expansion.

use mathmate_std::error::prelude::*;
use mathmate_std::{ErrKind, Error};

use crate::prelude::*;
use crate::trigger::CompletionQuery;

/// The marker a snippet uses to say where the cursor goes after expansion.
pub const CURSOR_MARKER: &str = "#CURSOR";

/// Where a snippet expands to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "lowercase")]
pub enum SnippetKind {
    /// Inline math.
    Inline,
    /// Display math.
    #[default]
    Display,
    /// A fenced code block.
    Codeblock,
}

/// A user-configured snippet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snippet {
    /// The group shown next to the name.
    pub category: EcoString,
    /// The name typed before `@`.
    pub name: EcoString,
    /// A free-form description.
    pub description: EcoString,
    /// Where the snippet expands to.
    pub kind: SnippetKind,
    /// The processor the preview is rendered with.
    pub id: EcoString,
    /// The expansion template, or the script body if `script` is set.
    pub content: EcoString,
    /// Whether `content` is a script computing the expansion.
    pub script: bool,
}

impl Default for Snippet {
    fn default() -> Self {
        Self {
            category: "Uncategorized".into(),
            name: "new".into(),
            description: EcoString::new(),
            kind: SnippetKind::Display,
            id: EcoString::new(),
            content: CURSOR_MARKER.into(),
            script: false,
        }
    }
}

impl Snippet {
    /// The source rendered as the snippet's preview in the popup. Script
    /// snippets have no preview.
    pub fn preview_source(&self) -> Option<EcoString> {
        if self.script {
            return None;
        }
        Some(match self.kind {
            SnippetKind::Inline if self.id.is_empty() => self.content.clone(),
            SnippetKind::Inline => eco_format!("{}:{}", self.id, self.content),
            SnippetKind::Display | SnippetKind::Codeblock => {
                eco_format!("{}\n{}\n", self.id, self.content)
            }
        })
    }

    /// The popup label.
    pub fn label(&self) -> EcoString {
        if self.script {
            eco_format!("📦{} ({})", self.name, self.category)
        } else {
            eco_format!("{} ({})", self.name, self.category)
        }
    }

    /// Whether the snippet needs an argument before it can be executed.
    pub fn wants_argument(&self) -> bool {
        self.script
    }
}

/// Evaluates snippet scripts.
///
/// A script is a function body taking the snippet argument (without its
/// parentheses, `None` if absent) and returning the expansion.
pub trait ScriptEvaluator {
    /// Runs `body` with `input`.
    fn evaluate(&self, body: &str, input: Option<&str>) -> Result<EcoString>;
}

impl<F> ScriptEvaluator for F
where
    F: Fn(&str, Option<&str>) -> Result<EcoString>,
{
    fn evaluate(&self, body: &str, input: Option<&str>) -> Result<EcoString> {
        self(body, input)
    }
}

/// An evaluator for hosts that cannot run scripts.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoScripts;

impl ScriptEvaluator for NoScripts {
    fn evaluate(&self, _body: &str, _input: Option<&str>) -> Result<EcoString> {
        mathmate_std::bail!("scripts are not supported by this editor")
    }
}

/// Replaces the query with the snippet's name, keeping edit mode.
///
/// Script snippets get their argument, or an empty `()`, appended. A snippet
/// whose name is already fully typed is executed instead, unless it still
/// needs an argument.
pub fn complete_snippet(
    query: &CompletionQuery,
    snippet: &Snippet,
    evaluator: &dyn ScriptEvaluator,
) -> Result<Splice> {
    let missing_argument = snippet.wants_argument() && query.argument.is_none();
    if !missing_argument && snippet.name == query.word {
        return execute_snippet(query, snippet, evaluator);
    }

    let argument = match (&query.argument, snippet.script) {
        (_, false) => "",
        (Some(arg), true) => arg.as_str(),
        (None, true) => "()",
    };
    let text = eco_format!("{}{argument}@", snippet.name);
    Ok(Splice::replace(TextEdit::new(query.range(), text)))
}

/// Replaces the query with the snippet's expansion.
///
/// The first `#CURSOR` marker is removed and the cursor placed there. Without
/// a marker, a space is appended and the cursor lands after it. A failing
/// script yields an error carrying a [`UserNotice`] and no edit.
pub fn execute_snippet(
    query: &CompletionQuery,
    snippet: &Snippet,
    evaluator: &dyn ScriptEvaluator,
) -> Result<Splice> {
    let content = if snippet.script {
        evaluator
            .evaluate(&snippet.content, query.argument_input())
            .map_err(|err| {
                log::warn!("snippet script {} failed: {err}", snippet.name);
                let notice = UserNotice {
                    origin: snippet.name.clone(),
                    message: script_message(&err),
                };
                Error::new("execute_snippet", ErrKind::Notice(Box::new(notice)), None)
            })?
    } else {
        snippet.content.clone()
    };

    let (text, cursor) = match content.find(CURSOR_MARKER) {
        Some(marker) => {
            let text = content.replacen(CURSOR_MARKER, "", 1);
            let cursor = query.start.advance(&content[..marker]);
            (EcoString::from(text), cursor)
        }
        None => {
            let text = eco_format!("{content} ");
            let cursor = query.start.advance(&text);
            (text, cursor)
        }
    };
    Ok(Splice::edit(TextEdit::new(query.range(), text), cursor))
}

fn script_message(err: &Error) -> EcoString {
    match err.kind() {
        ErrKind::Msg(msg) => msg.clone(),
        _ => err.to_string().into(),
    }
}
