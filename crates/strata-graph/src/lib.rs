//! Commit graph for strata.
//!
//! Commits are content-addressed [`Commit`] objects in the store; this crate
//! adds the graph view over them: writing commits, resolving referenced
//! commits, first-parent history, and the ancestor query that branch
//! deletion protection and merge analysis are built on.
//!
//! # Invariants
//!
//! - The graph is acyclic by construction: every commit is content-addressed
//!   and created after its parents.
//! - Parent references always name commits already in the store; a missing
//!   parent means corrupt or truncated history and is surfaced as
//!   [`GraphError::NotFound`].
//! - Traversals still defend against a corrupted (cyclic) store with a
//!   visited set and a step bound rather than looping forever.

pub mod error;
pub mod graph;

pub use error::{GraphError, GraphResult};
pub use graph::CommitGraph;

pub use strata_store::Commit;
