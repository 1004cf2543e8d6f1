use thiserror::Error;

/// Errors from branch and HEAD operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The branch was not found.
    #[error("branch not found: {name}")]
    BranchNotFound { name: String },

    /// A branch with this name already exists.
    #[error("branch already exists: {name}")]
    BranchExists { name: String },

    /// The branch name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// Refusing to delete a branch whose history is not merged into HEAD.
    /// Pass `force` to delete anyway.
    #[error("branch {name} is not merged into the current branch")]
    NotMerged { name: String },

    /// Cannot delete the currently checked-out branch.
    #[error("cannot delete current branch: {name}")]
    DeleteCurrentBranch { name: String },

    /// A branch tip file holds something that is not a commit digest.
    #[error("malformed branch pointer {name}: {reason}")]
    MalformedPointer { name: String, reason: String },

    /// HEAD is missing or unreadable.
    #[error("HEAD is missing or unreadable")]
    MissingHead,

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type RefResult<T> = std::result::Result<T, RefError>;
