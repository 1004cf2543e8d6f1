//! Error types for the merge engine.

use strata_types::Digest;
use thiserror::Error;

use crate::tree::Conflict;

/// Errors from merge analysis and tree merging.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The two sides disagree on one or more paths; nothing was persisted.
    /// The caller resolves the listed paths and retries.
    #[error("merge produced {} conflicting path(s)", .0.len())]
    Conflicts(Vec<Conflict>),

    /// A tree referenced by one of the sides is missing from the store.
    #[error("tree not found: {0}")]
    TreeNotFound(Digest),

    /// History traversal failed while classifying the merge.
    #[error(transparent)]
    Graph(#[from] strata_graph::GraphError),

    /// Failure reading or writing the underlying object store.
    #[error(transparent)]
    Store(#[from] strata_store::StoreError),
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
