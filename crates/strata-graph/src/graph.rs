//! Graph operations over stored commits.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use strata_store::{Commit, ObjectKind, ObjectStore};
use strata_types::Digest;
use tracing::debug;

use crate::error::{GraphError, GraphResult};

/// Hard ceiling on parent-walk steps. The graph is acyclic by construction;
/// hitting this bound means the store is corrupt.
const MAX_WALK_STEPS: usize = 1_000_000;

/// The commit graph: a view over commit objects in an object store.
///
/// The graph owns no state of its own — it can always be re-derived from the
/// store. A null digest is the sentinel for "no commit" (the tip of an
/// unborn branch, the parent of a root commit).
#[derive(Clone)]
pub struct CommitGraph {
    store: Arc<dyn ObjectStore>,
}

impl CommitGraph {
    /// Create a graph view over `store`.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Persist a commit and return its digest.
    ///
    /// A pure function of the commit's fields: the same (tree, message,
    /// parents) triple always produces the same digest, so identical
    /// commits deduplicate in the store.
    pub fn write(&self, commit: &Commit) -> GraphResult<Digest> {
        let stored = commit.to_stored_object()?;
        let digest = self.store.write(&stored)?;
        debug!(
            commit = %digest.short_hex(),
            parents = commit.parents.len(),
            "wrote commit"
        );
        Ok(digest)
    }

    /// Read a commit, failing with [`GraphError::NotFound`] if absent.
    pub fn read(&self, digest: &Digest) -> GraphResult<Commit> {
        let stored = self
            .store
            .read(ObjectKind::Commit, digest)?
            .ok_or(GraphError::NotFound(*digest))?;
        Ok(Commit::from_stored_object(&stored)?)
    }

    /// Returns `true` if `candidate` is an ancestor of `of_commit`,
    /// including equality.
    ///
    /// Walks every parent edge breadth-first from `of_commit`. A null
    /// `of_commit` (unborn tip) has no ancestors; a null `candidate` is
    /// never an ancestor. Commits form a DAG, so the visited set guarantees
    /// termination in O(history); the step bound turns a corrupt cyclic
    /// store into [`GraphError::CycleDetected`] instead of an endless walk.
    pub fn is_ancestor(&self, candidate: &Digest, of_commit: &Digest) -> GraphResult<bool> {
        if candidate.is_null() || of_commit.is_null() {
            return Ok(false);
        }

        let mut visited: HashSet<Digest> = HashSet::new();
        let mut queue: VecDeque<Digest> = VecDeque::new();
        queue.push_back(*of_commit);

        let mut steps = 0usize;
        while let Some(current) = queue.pop_front() {
            steps += 1;
            if steps > MAX_WALK_STEPS {
                return Err(GraphError::CycleDetected { start: *of_commit });
            }
            if current == *candidate {
                return Ok(true);
            }
            if !visited.insert(current) {
                continue;
            }
            let commit = self.read(&current)?;
            for parent in &commit.parents {
                // Tolerate a legacy null parent encoding as "no parent".
                if !parent.is_null() && !visited.contains(parent) {
                    queue.push_back(*parent);
                }
            }
        }
        Ok(false)
    }

    /// First-parent history starting at `tip`, newest first, at most `limit`
    /// entries. A null tip yields an empty history.
    pub fn log(&self, tip: &Digest, limit: usize) -> GraphResult<Vec<(Digest, Commit)>> {
        let mut history = Vec::new();
        let mut current = *tip;
        let mut seen: HashSet<Digest> = HashSet::new();

        while !current.is_null() && history.len() < limit {
            if !seen.insert(current) {
                return Err(GraphError::CycleDetected { start: *tip });
            }
            let commit = self.read(&current)?;
            let next = commit.first_parent().unwrap_or_else(Digest::null);
            history.push((current, commit));
            current = next;
        }
        Ok(history)
    }
}

impl std::fmt::Debug for CommitGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitGraph").finish()
    }
}
