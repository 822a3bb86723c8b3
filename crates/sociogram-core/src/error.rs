//! Error types shared by every analysis step.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the core crate.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised while loading, analysing or writing a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GML parse error at line {line}: {message}")]
    Gml { line: usize, message: String },

    #[error("Duplicate node key: {0}")]
    DuplicateNode(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Edge references unknown node id: {0}")]
    UnknownEndpoint(String),

    #[error("Invalid value for attribute '{key}': {value}")]
    InvalidAttribute { key: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Event log is missing column '{0}'")]
    MissingColumn(String),

    #[error("Unparsable timestamp '{value}' on row {row}")]
    Timestamp { value: String, row: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Wrap an `io::Error` with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
