use std::path::PathBuf;

use thiserror::Error;

/// Errors from model codec invocations.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The external tool exited non-zero or produced malformed output.
    #[error("model codec failed ({context}): {detail}")]
    Codec { context: String, detail: String },

    /// The external tool did not finish within the configured timeout.
    #[error("model codec timed out after {seconds}s ({context})")]
    Timeout { context: String, seconds: u64 },

    /// An expected output artifact was not produced.
    #[error("model codec did not produce {path}")]
    MissingArtifact { path: PathBuf },

    /// I/O failure reading the model file or codec artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for model codec operations.
pub type ModelResult<T> = Result<T, ModelError>;
