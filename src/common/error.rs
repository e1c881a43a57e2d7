//! Error types for the test compiler and execution monitor
//!
//! Compile-time leniencies (unknown operators, failed casts) are reported
//! as warnings, not errors; only structural problems end up here.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for testforge
#[derive(Error, Debug)]
pub enum Error {
    // === Field Path Errors ===
    #[error("Invalid field path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("Field path '{path}' indexes into a non-array value")]
    PathConflict { path: String },

    // === Table Errors ===
    #[error("Table has no columns")]
    EmptyTable,

    #[error("Column '{column}' not found in table")]
    ColumnNotFound { column: String },

    #[error(
        "Parameter columns must have the same number of values: {detail}. \
         Metadata columns like [API]endpoint may carry a single value"
    )]
    UnbalancedColumns { detail: String },

    // === Runner Errors ===
    #[error("Test runner '{program}' not found. Is it installed and on PATH?")]
    RunnerNotFound { program: String },

    #[error("Failed to start test runner '{program}': {source}")]
    RunnerStartFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("No generated scripts in '{0}'. Run 'testforge compile' first")]
    NoGeneratedScripts(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid path error
    pub fn invalid_path(path: &str, reason: &str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create a path conflict error
    pub fn path_conflict(path: &str) -> Self {
        Self::PathConflict {
            path: path.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}
