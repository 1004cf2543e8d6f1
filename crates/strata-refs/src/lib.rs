//! Branch pointers and HEAD indirection for strata.
//!
//! Branches are the only mutable persisted state in a repository: one file
//! per branch under `branches/`, holding the hex digest of the branch tip
//! (an empty file is an unborn branch, the state `init` creates). `HEAD` is
//! a single indirection file holding the name of the active branch —
//! switching branches rewrites only this pointer, never a commit.

pub mod error;
pub mod names;
pub mod store;

pub use error::{RefError, RefResult};
pub use names::validate_branch_name;
pub use store::BranchStore;
