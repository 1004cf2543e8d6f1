//! Classifying a merge before any tree work happens.

use strata_graph::CommitGraph;
use strata_types::Digest;
use tracing::debug;

use crate::error::MergeResult;

/// How a merge of `other` into `current` should proceed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeAnalysis {
    /// `current` already contains all of `other`'s history; nothing to do.
    AlreadyUpToDate,
    /// `current` is an ancestor of `other`; move the pointer to `other`
    /// without creating a commit.
    FastForward,
    /// The histories have diverged; a true merge of the two trees is
    /// required, recorded as a two-parent commit.
    Diverged,
}

/// Classify merging `other` into `current`.
///
/// An unborn `current` (null digest) fast-forwards onto any real tip; an
/// unborn `other` contributes nothing.
pub fn analyze(
    graph: &CommitGraph,
    current: &Digest,
    other: &Digest,
) -> MergeResult<MergeAnalysis> {
    let analysis = if other.is_null() || current == other {
        MergeAnalysis::AlreadyUpToDate
    } else if current.is_null() || graph.is_ancestor(current, other)? {
        MergeAnalysis::FastForward
    } else if graph.is_ancestor(other, current)? {
        MergeAnalysis::AlreadyUpToDate
    } else {
        MergeAnalysis::Diverged
    };
    debug!(
        current = %current.short_hex(),
        other = %other.short_hex(),
        ?analysis,
        "classified merge"
    );
    Ok(analysis)
}
