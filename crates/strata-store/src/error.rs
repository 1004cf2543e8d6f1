use strata_types::Digest;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {kind} {digest}")]
    NotFound { kind: String, digest: Digest },

    /// Compression or decompression failure (store corruption).
    #[error("codec error for {context}: {reason}")]
    Codec { context: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {digest}: {reason}")]
    CorruptObject { digest: Digest, reason: String },

    /// Attempted to write an object addressed by the null digest.
    #[error("cannot store object with null digest")]
    NullDigest,
}

impl StoreError {
    /// A `NotFound` error for the given kind/digest pair.
    pub fn not_found(kind: impl std::fmt::Display, digest: Digest) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            digest,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
