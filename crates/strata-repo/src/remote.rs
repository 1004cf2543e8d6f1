//! Remote transfer seam.
//!
//! `push` walks everything reachable from a commit and hands missing
//! objects to a [`RemoteSink`]. The sink is transport-agnostic; a real
//! backend (HTTP, object storage) implements the two methods and the walk
//! stays the same.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use strata_store::{
    Commit, EntryKind, ModelManifest, ObjectKind, ObjectStore, StoredObject, Tree,
};
use strata_types::Digest;
use tracing::{debug, info};

use crate::error::RepoResult;

/// Receives objects during a push.
pub trait RemoteSink: Send + Sync {
    /// Whether the remote already holds this object.
    fn contains(&self, kind: ObjectKind, digest: &Digest) -> RepoResult<bool>;

    /// Store one object on the remote.
    fn put(&self, digest: &Digest, object: &StoredObject) -> RepoResult<()>;
}

/// Counts of objects transferred by one push.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PushReport {
    pub commits: u64,
    pub trees: u64,
    pub blobs: u64,
    pub manifests: u64,
}

impl PushReport {
    /// Total objects sent.
    pub fn total(&self) -> u64 {
        self.commits + self.trees + self.blobs + self.manifests
    }
}

/// Push everything reachable from `tip` that the remote is missing.
///
/// Commits are walked through all parents; each commit's tree is walked
/// recursively, including model manifests and their chunk blobs. A commit
/// the remote already holds prunes the walk below it, so pushing an
/// up-to-date branch sends nothing.
pub fn push(
    store: &Arc<dyn ObjectStore>,
    sink: &dyn RemoteSink,
    tip: &Digest,
) -> RepoResult<PushReport> {
    let mut report = PushReport::default();
    if tip.is_null() {
        return Ok(report);
    }

    let mut queue = VecDeque::from([*tip]);
    let mut seen = HashSet::new();

    while let Some(digest) = queue.pop_front() {
        if digest.is_null() || !seen.insert(digest) {
            continue;
        }
        if sink.contains(ObjectKind::Commit, &digest)? {
            debug!(commit = %digest.short_hex(), "remote has commit; pruning walk");
            continue;
        }
        let stored = store.read_required(ObjectKind::Commit, &digest)?;
        let commit = Commit::from_stored_object(&stored)?;

        push_tree(store, sink, &commit.tree, &mut report)?;
        sink.put(&digest, &stored)?;
        report.commits += 1;

        queue.extend(commit.parents.iter().copied());
    }

    info!(sent = report.total(), tip = %tip.short_hex(), "push complete");
    Ok(report)
}

fn push_tree(
    store: &Arc<dyn ObjectStore>,
    sink: &dyn RemoteSink,
    tree_digest: &Digest,
    report: &mut PushReport,
) -> RepoResult<()> {
    if sink.contains(ObjectKind::Tree, tree_digest)? {
        return Ok(());
    }
    let stored = store.read_required(ObjectKind::Tree, tree_digest)?;
    let tree = Tree::from_stored_object(&stored)?;

    for entry in &tree.entries {
        match entry.kind {
            EntryKind::Blob => push_blob(store, sink, &entry.hash, report)?,
            EntryKind::Tree => push_tree(store, sink, &entry.hash, report)?,
            EntryKind::Model => push_manifest(store, sink, &entry.hash, report)?,
        }
    }
    sink.put(tree_digest, &stored)?;
    report.trees += 1;
    Ok(())
}

fn push_manifest(
    store: &Arc<dyn ObjectStore>,
    sink: &dyn RemoteSink,
    digest: &Digest,
    report: &mut PushReport,
) -> RepoResult<()> {
    if sink.contains(ObjectKind::Model, digest)? {
        return Ok(());
    }
    let stored = store.read_required(ObjectKind::Model, digest)?;
    let manifest = ModelManifest::from_stored_object(&stored)?;

    push_blob(store, sink, &manifest.architecture, report)?;
    push_blob(store, sink, &manifest.metadata, report)?;
    for chunk in &manifest.chunks {
        push_blob(store, sink, chunk, report)?;
    }
    sink.put(digest, &stored)?;
    report.manifests += 1;
    Ok(())
}

fn push_blob(
    store: &Arc<dyn ObjectStore>,
    sink: &dyn RemoteSink,
    digest: &Digest,
    report: &mut PushReport,
) -> RepoResult<()> {
    if sink.contains(ObjectKind::Blob, digest)? {
        return Ok(());
    }
    let stored = store.read_required(ObjectKind::Blob, digest)?;
    sink.put(digest, &stored)?;
    report.blobs += 1;
    Ok(())
}
