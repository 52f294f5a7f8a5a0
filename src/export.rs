use crate::error::ExportError;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used when the caller does not choose one.
pub const DEFAULT_FILE_NAME: &str = "workflow-validated.json";

/// Serializes `document` as JSON indented with two spaces.
///
/// Object keys keep their insertion order, so equal inputs give identical text.
pub fn to_pretty_json(document: &Value) -> Result<String, ExportError> {
    to_json_with_indent(document, 2)
}

/// Serializes `document` with a custom indentation width.
pub fn to_json_with_indent(document: &Value, indent: usize) -> Result<String, ExportError> {
    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
    document.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes `document` to `path`, followed by a trailing newline.
pub fn write_document(document: &Value, path: &Path) -> Result<PathBuf, ExportError> {
    let mut text = to_pretty_json(document)?;
    text.push('\n');
    fs::write(path, text).map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), "Wrote corrected workflow");
    Ok(path.to_path_buf())
}
