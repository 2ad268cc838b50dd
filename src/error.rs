//! Error types for NRP problem loading, configuration and repair.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for `u-nrp` operations.
#[derive(Debug, Error)]
pub enum NrpError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A result file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The problem document parsed but its content is inconsistent.
    #[error("Malformed problem: {0}")]
    MalformedProblem(String),

    /// A seed does not fit the problem it is injected into.
    #[error("Malformed seed: {0}")]
    MalformedSeed(String),

    /// Run or engine configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The exact solver could not be set up or failed during a solve.
    #[error("Solver error: {0}")]
    Solver(String),
}

/// Result type alias for `u-nrp` operations.
pub type Result<T> = std::result::Result<T, NrpError>;
