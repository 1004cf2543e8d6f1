//! Staging index for strata.
//!
//! The [`StagingIndex`] is the transient bridge between a working-tree scan
//! and the next commit: a hierarchical mapping from path segments to either
//! a leaf (a staged file or model) or a nested directory node, plus a
//! parallel map holding the manifest of every staged model.
//!
//! It accumulates across `add` passes: each pass loads the persisted index,
//! stages new paths on top of it, and saves it back as two JSON files
//! (`index.json`, `model_index.json`). The tree builder consumes it on the
//! next commit.

pub mod error;
pub mod node;
pub mod staging;

pub use error::{IndexError, IndexResult};
pub use node::IndexNode;
pub use staging::StagingIndex;
