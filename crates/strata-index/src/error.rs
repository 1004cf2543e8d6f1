use thiserror::Error;

/// Errors from staging index operations.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A path cannot be both a leaf and a directory.
    #[error("conflicting path: {path} is already {existing}")]
    ConflictingPath { path: String, existing: String },

    /// The path is empty or otherwise unusable.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Serialization or deserialization failure for a persisted index file.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error reading or writing a persisted index file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
