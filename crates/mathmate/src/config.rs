use std::collections::BTreeMap;
use std::path::Path;

use mathmate_query::{Shortcut, default_shortcuts};
use mathmate_std::error::prelude::*;

use crate::prelude::*;

/// The user configuration of a session.
///
/// Every field is optional when deserializing; missing fields take their
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MathmateConfig {
    /// Whether inline math is previewed while typing.
    pub enable_inline_preview: bool,
    /// Whether applied symbols are inserted as glyphs rather than names.
    pub complement_symbol_with_unicode: bool,
    /// The snippets offered for `name@` queries.
    pub snippets: Vec<Snippet>,
    /// The templates wrapping a selection inside math, keyed by the typed
    /// character.
    pub shortcuts: BTreeMap<EcoString, Shortcut>,
    /// The processor inline previews are rendered with.
    pub preview_processor: EcoString,
    /// How long to wait before repainting bracket highlights after a cursor
    /// move, in milliseconds.
    pub highlight_delay_ms: u64,
    /// Whether `Tab` jumps between stops inside math.
    pub enable_tab_jump: bool,
}

impl Default for MathmateConfig {
    fn default() -> Self {
        Self {
            enable_inline_preview: true,
            complement_symbol_with_unicode: true,
            snippets: Vec::new(),
            shortcuts: default_shortcuts(),
            preview_processor: EcoString::new(),
            highlight_delay_ms: 250,
            enable_tab_jump: true,
        }
    }
}

impl MathmateConfig {
    /// The longest accepted repaint delay.
    pub const MAX_HIGHLIGHT_DELAY_MS: u64 = 500;

    /// The repaint delay, clamped to [`Self::MAX_HIGHLIGHT_DELAY_MS`].
    pub fn highlight_delay(&self) -> u64 {
        self.highlight_delay_ms.min(Self::MAX_HIGHLIGHT_DELAY_MS)
    }

    /// Parses a JSON configuration.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("config.json")
    }

    /// Parses a TOML configuration.
    pub fn from_toml(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(map_string_err("config.toml"))
    }

    /// Loads a configuration file, picking the format by extension.
    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path).map_err(map_string_err_with_args(
            "read config",
            [("path", path.display().to_string())],
        ))?;

        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&input)?,
            Some("json") => Self::from_json(&input)?,
            ext => mathmate_std::bail!("unsupported config format: {ext:?}"),
        };

        if config.highlight_delay_ms > Self::MAX_HIGHLIGHT_DELAY_MS {
            log::warn!(
                "highlightDelayMs {} is clamped to {}",
                config.highlight_delay_ms,
                Self::MAX_HIGHLIGHT_DELAY_MS
            );
        }
        log::info!(
            "loaded config from {} with {} snippets",
            path.display(),
            config.snippets.len()
        );
        Ok(config)
    }
}
