//! Error types for repository-level operations.

use std::path::PathBuf;

use strata_merge::Conflict;
use thiserror::Error;

/// Errors from repository workflows.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The directory holds no repository (no `.strata/`).
    #[error("not a strata repository: {0}")]
    NotARepository(PathBuf),

    /// `init` was called where a repository already exists.
    #[error("repository already exists at {0}")]
    AlreadyExists(PathBuf),

    /// Another process holds the repository lock.
    #[error("repository is locked (another operation is in progress); stale lock at {0}")]
    Locked(PathBuf),

    /// `commit` was called with an empty staging index.
    #[error("nothing staged; run add first")]
    NothingStaged,

    /// A path handed to `add` does not exist in the working tree.
    #[error("path not found in working tree: {0}")]
    PathNotFound(PathBuf),

    /// A working tree path is not valid UTF-8 and cannot be indexed.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// The merge stopped on conflicting paths; nothing was committed.
    #[error("merge produced {} conflicting path(s)", .0.len())]
    MergeConflicts(Vec<Conflict>),

    /// Configuration file could not be parsed or written.
    #[error("bad repository config: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] strata_store::StoreError),

    #[error(transparent)]
    Chunk(#[from] strata_chunk::ChunkError),

    #[error(transparent)]
    Index(#[from] strata_index::IndexError),

    #[error(transparent)]
    Tree(#[from] strata_tree::TreeError),

    #[error(transparent)]
    Graph(#[from] strata_graph::GraphError),

    #[error(transparent)]
    Ref(#[from] strata_refs::RefError),

    #[error(transparent)]
    Model(#[from] strata_model::ModelError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<strata_merge::MergeError> for RepoError {
    fn from(err: strata_merge::MergeError) -> Self {
        match err {
            strata_merge::MergeError::Conflicts(conflicts) => RepoError::MergeConflicts(conflicts),
            strata_merge::MergeError::Graph(e) => RepoError::Graph(e),
            strata_merge::MergeError::Store(e) => RepoError::Store(e),
            strata_merge::MergeError::TreeNotFound(d) => {
                RepoError::Store(strata_store::StoreError::not_found(
                    strata_store::ObjectKind::Tree,
                    d,
                ))
            }
        }
    }
}

/// Convenience alias for repository results.
pub type RepoResult<T> = Result<T, RepoError>;
