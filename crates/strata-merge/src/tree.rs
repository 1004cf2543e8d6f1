//! Recursive merging of two snapshot trees.
//!
//! Entries are compared by path at every level. A path present on one side
//! only, or identical on both, carries into the merged tree unchanged.
//! When both sides changed a path and both entries are subtrees, the merge
//! recurses instead of declaring a conflict; anything else that differs at
//! the same path is a conflict. Nothing is persisted unless the whole merge
//! is clean.

use std::collections::BTreeMap;

use strata_store::{EntryKind, ObjectKind, ObjectStore, StoredObject, Tree, TreeEntry};
use strata_types::Digest;
use tracing::{debug, info};

use crate::error::{MergeError, MergeResult};

/// A path both sides changed in incompatible ways.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    /// Repo-relative path of the disputed entry.
    pub path: String,
    /// The entry digest on the side being merged into.
    pub ours: Digest,
    /// The entry digest on the side being merged from.
    pub theirs: Digest,
}

/// Merge the trees at `ours` and `theirs`, returning the merged root digest.
///
/// On a clean merge every new tree object is written to the store. When any
/// path conflicts, the full conflict list comes back as
/// [`MergeError::Conflicts`] and the store is untouched.
pub fn merge_trees(
    store: &dyn ObjectStore,
    ours: &Digest,
    theirs: &Digest,
) -> MergeResult<Digest> {
    let mut conflicts = Vec::new();
    let mut pending = Vec::new();
    let root = merge_level(store, ours, theirs, &mut conflicts, &mut pending)?;

    if !conflicts.is_empty() {
        info!(count = conflicts.len(), "tree merge conflicted");
        return Err(MergeError::Conflicts(conflicts));
    }
    for object in &pending {
        store.write(object)?;
    }
    info!(root = %root.short_hex(), trees = pending.len(), "merged trees");
    Ok(root)
}

/// Merge one tree level. New tree objects are staged in `pending` and their
/// digests computed without touching the store, so a conflicted merge leaves
/// no partial results behind.
fn merge_level(
    store: &dyn ObjectStore,
    ours: &Digest,
    theirs: &Digest,
    conflicts: &mut Vec<Conflict>,
    pending: &mut Vec<StoredObject>,
) -> MergeResult<Digest> {
    let our_entries = load_entries(store, ours)?;
    let their_entries = load_entries(store, theirs)?;

    let mut merged = Vec::new();

    for (path, our_entry) in &our_entries {
        match their_entries.get(path) {
            None => merged.push(our_entry.clone()),
            Some(their_entry) if their_entry.hash == our_entry.hash => {
                merged.push(our_entry.clone());
            }
            Some(their_entry)
                if our_entry.kind == EntryKind::Tree && their_entry.kind == EntryKind::Tree =>
            {
                debug!(path = %path, "descending into changed subtree");
                let sub =
                    merge_level(store, &our_entry.hash, &their_entry.hash, conflicts, pending)?;
                merged.push(TreeEntry::new(EntryKind::Tree, path.clone(), sub));
            }
            Some(their_entry) => {
                conflicts.push(Conflict {
                    path: path.clone(),
                    ours: our_entry.hash,
                    theirs: their_entry.hash,
                });
            }
        }
    }
    for (path, their_entry) in &their_entries {
        if !our_entries.contains_key(path) {
            merged.push(their_entry.clone());
        }
    }

    let object = Tree::new(merged).to_stored_object()?;
    let digest = object.compute_digest();
    pending.push(object);
    Ok(digest)
}

fn load_entries(
    store: &dyn ObjectStore,
    digest: &Digest,
) -> MergeResult<BTreeMap<String, TreeEntry>> {
    let stored = store
        .read(ObjectKind::Tree, digest)?
        .ok_or(MergeError::TreeNotFound(*digest))?;
    let tree = Tree::from_stored_object(&stored)?;
    Ok(tree
        .entries
        .into_iter()
        .map(|e| (e.path.clone(), e))
        .collect())
}
