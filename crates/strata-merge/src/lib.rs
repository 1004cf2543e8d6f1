//! Merge engine for strata.
//!
//! Two pieces: [`analyze`] classifies a merge of one branch tip into another
//! (fast-forward, no-op, or diverged) by walking the commit graph, and
//! [`merge_trees`] combines two divergent snapshot trees path by path,
//! recursing through subtrees both sides changed. Conflicts are returned to
//! the caller as data; this crate never writes conflict markers and never
//! persists a partially merged tree.

pub mod analysis;
pub mod error;
pub mod tree;

pub use analysis::{analyze, MergeAnalysis};
pub use error::{MergeError, MergeResult};
pub use tree::{merge_trees, Conflict};
