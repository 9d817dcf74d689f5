//! JSON loading for pasted and uploaded catalog batches.
//!
//! A batch is a top-level JSON array. Elements are returned undecoded so the
//! importer can reject a single malformed element without failing the batch.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Expected a JSON array of games, found {0}")]
    NotAnArray(&'static str),
}

/// Parse a batch from JSON text.
pub fn parse_batch(text: &str) -> Result<Vec<Value>, BatchError> {
    let value: Value = serde_json::from_str(text)?;
    batch_from_value(value)
}

/// Unwrap an already-decoded JSON value into batch elements.
pub fn batch_from_value(value: Value) -> Result<Vec<Value>, BatchError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(BatchError::NotAnArray(json_type_name(&other))),
    }
}

/// Read and parse a batch file from disk.
pub fn load_batch_file(path: &Path) -> Result<Vec<Value>, BatchError> {
    let text = std::fs::read_to_string(path).map_err(|e| BatchError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_batch(&text)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
