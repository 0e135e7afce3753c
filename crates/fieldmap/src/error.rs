//! Error types for the fieldmap library.
//!
//! Only run-aborting conditions live here. Problems found in individual cells
//! are reported as [`ValidationIssue`](crate::validation::ValidationIssue)s and
//! never surface as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fieldmap operations.
#[derive(Debug, Error)]
pub enum FieldmapError {
    /// The rules table lacks a required column, has a blank or duplicate
    /// field name, or otherwise cannot be turned into a catalog.
    #[error("Malformed rules: {0}")]
    MalformedRules(String),

    /// The data file could not be parsed into a table.
    #[error("Unreadable input '{path}': {message}")]
    UnreadableInput { path: PathBuf, message: String },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// LLM provider failure (transport, API or response shape).
    #[error("LLM error: {0}")]
    Llm(String),

    /// Template workbook could not be written.
    #[error("Template error: {0}")]
    Template(String),
}

impl FieldmapError {
    /// Build an [`FieldmapError::UnreadableInput`] for `path`.
    pub fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FieldmapError::UnreadableInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for the two fatal input kinds: malformed rules and unreadable data.
    pub fn is_fatal_input(&self) -> bool {
        matches!(
            self,
            FieldmapError::MalformedRules(_) | FieldmapError::UnreadableInput { .. }
        )
    }
}

/// Result type alias for fieldmap operations.
pub type Result<T> = std::result::Result<T, FieldmapError>;
