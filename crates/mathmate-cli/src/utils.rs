use std::path::Path;

use mathmate::MathmateConfig;
use mathmate_analysis::Buffer;
use mathmate_std::error::prelude::*;
use serde::Serialize;

pub fn read_document(path: &Path) -> Result<Buffer> {
    let text = std::fs::read_to_string(path).map_err(map_string_err_with_args(
        "read document",
        [("path", path.display().to_string())],
    ))?;
    Ok(Buffer::new(text))
}

pub fn load_config(path: Option<&Path>) -> Result<MathmateConfig> {
    match path {
        Some(path) => MathmateConfig::load(path),
        None => Ok(MathmateConfig::default()),
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}
