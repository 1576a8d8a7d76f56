//! pt-layout: layout document format, traffic scripts and validation.

pub mod schema;
pub mod script;
pub mod validate;

pub use schema::*;
pub use script::{InjectEntry, InjectKind, Script};
pub use validate::{Diagnostic, Subject, ValidationError, validate_layout};

use std::path::Path;

pub type LayoutResult<T> = Result<T, LayoutError>;

#[derive(thiserror::Error, Debug)]
pub enum LayoutError {
    #[error("Layout has {} problem(s)", .0.len())]
    Invalid(Vec<Diagnostic>),

    #[error("Unsupported file format: {path} (expected .json, .yaml or .yml)")]
    UnsupportedFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Document encoding, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    pub fn from_path(path: &Path) -> LayoutResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Format::Json),
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(Format::Yaml)
            }
            _ => Err(LayoutError::UnsupportedFormat {
                path: path.display().to_string(),
            }),
        }
    }

    pub fn parse<T: serde::de::DeserializeOwned>(self, content: &str) -> LayoutResult<T> {
        Ok(match self {
            Format::Json => serde_json::from_str(content)?,
            Format::Yaml => serde_yaml::from_str(content)?,
        })
    }
}

/// Parse a layout document. Diagnostics are left to [`validate_layout`].
pub fn load_yaml(path: &Path) -> LayoutResult<Layout> {
    let content = std::fs::read_to_string(path)?;
    Format::Yaml.parse(&content)
}

pub fn load_json(path: &Path) -> LayoutResult<Layout> {
    let content = std::fs::read_to_string(path)?;
    Format::Json.parse(&content)
}

/// Load a layout, picking the parser from the file extension.
pub fn load(path: &Path) -> LayoutResult<Layout> {
    match Format::from_path(path)? {
        Format::Json => load_json(path),
        Format::Yaml => load_yaml(path),
    }
}

pub fn save_json(path: &Path, layout: &Layout) -> LayoutResult<()> {
    let content = serde_json::to_string_pretty(layout)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn save_yaml(path: &Path, layout: &Layout) -> LayoutResult<()> {
    let content = serde_yaml::to_string(layout)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a traffic injection script (JSON or YAML by extension).
pub fn load_script(path: &Path) -> LayoutResult<Script> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}
