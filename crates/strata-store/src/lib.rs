//! Content-addressed object storage for strata.
//!
//! This crate implements a hash-keyed object store analogous to git's
//! `.git/objects/` directory. Every piece of data in strata — blobs, trees,
//! commits, model manifests — is stored as an immutable object identified by
//! the BLAKE3 digest of its uncompressed bytes, with zstd compression applied
//! on the way to disk.
//!
//! # Object Types
//!
//! - [`Blob`] — raw content (file contents, weight chunks)
//! - [`Tree`] — ordered directory snapshot mapping paths to object references
//! - [`Commit`] — immutable history record (tree + message + parents)
//! - [`ModelManifest`] — a model's descriptor blobs plus its ordered chunk list
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`FsObjectStore`] — sharded, zstd-compressed filesystem store
//! - [`InMemoryObjectStore`] — `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: a digest already present is never rewritten.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. Only uncompressed logical bytes determine an object's identity; the
//!    compressed on-disk form is a storage detail.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod codec;
pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::{compress, decompress};
pub use error::{StoreError, StoreResult};
pub use fs::FsObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{
    Blob, Commit, EntryKind, ModelManifest, ObjectKind, StoredObject, Tree, TreeEntry,
};
pub use traits::ObjectStore;
