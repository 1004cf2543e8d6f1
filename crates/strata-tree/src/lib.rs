//! Snapshot trees for strata.
//!
//! [`TreeBuilder::build`] turns a staging index into a persisted Merkle
//! tree and returns the root digest that uniquely identifies the whole
//! staged state: any single changed byte anywhere below propagates to a
//! different root. [`TreeBuilder::expand`] is the inverse, restoring a
//! working tree from a root digest — decompressing blobs, recursing into
//! subtrees, and materializing models by reassembling their chunked weights
//! and invoking the external model codec.

pub mod builder;
pub mod error;

pub use builder::TreeBuilder;
pub use error::{TreeError, TreeResult};
