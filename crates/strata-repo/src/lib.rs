//! Repository orchestration for strata.
//!
//! Ties the lower layers together behind one [`Repository`] type: the
//! content-addressed object store, the staging index, snapshot trees, the
//! commit graph, branch pointers, and the merge engine. Mutating operations
//! serialize through an advisory lock file; object writes are idempotent
//! and race-safe on their own.

pub mod config;
pub mod error;
pub mod lock;
pub mod remote;
pub mod repository;

pub use config::RepoConfig;
pub use error::{RepoError, RepoResult};
pub use lock::RepoLock;
pub use remote::{PushReport, RemoteSink};
pub use repository::{MergeOutcome, Repository, STRATA_DIR};
