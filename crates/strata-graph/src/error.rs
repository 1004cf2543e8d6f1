use strata_types::Digest;
use thiserror::Error;

/// Errors from commit graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A referenced commit is missing from the store (corrupt or truncated
    /// history).
    #[error("commit not found: {0}")]
    NotFound(Digest),

    /// A parent walk exceeded the defensive step bound; the store holds a
    /// cycle and is corrupt.
    #[error("commit graph cycle detected walking from {start}")]
    CycleDetected { start: Digest },

    /// Failure reading or writing the underlying object store.
    #[error(transparent)]
    Store(#[from] strata_store::StoreError),
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
