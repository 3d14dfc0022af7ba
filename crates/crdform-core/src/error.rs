//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed JSON, with the byte offset where parsing failed
    #[error("failed to decode document at byte {offset}: {message}")]
    Decode { offset: usize, message: String },

    #[error("schema mismatch at '{path}': expected {expected}")]
    SchemaMismatch { path: String, expected: String },

    #[error("invalid import ID '{id}': expected format 'namespace/name'")]
    InvalidImportId { id: String },

    #[error("invalid resource coordinates: {message}")]
    InvalidCoordinates { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("unknown resource type '{name}'")]
    UnknownResource { name: String },

    #[error("resource type '{name}' is already registered")]
    DuplicateResource { name: String },

    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Build a decode error from a serde_json failure over `input`
    ///
    /// serde_json reports 1-based line/column positions; this converts them
    /// into a byte offset into the original input.
    pub fn decode(input: &[u8], err: &serde_json::Error) -> Self {
        Self::Decode {
            offset: byte_offset(input, err.line(), err.column()),
            message: err.to_string(),
        }
    }

    pub fn mismatch(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

fn byte_offset(input: &[u8], line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start = if line == 1 {
        0
    } else {
        input
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .nth(line - 2)
            .map(|(i, _)| i + 1)
            .unwrap_or(0)
    };
    (line_start + column.saturating_sub(1)).min(input.len())
}

pub type Result<T> = std::result::Result<T, CoreError>;
