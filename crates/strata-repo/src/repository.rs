//! High-level repository API: init, add, commit, checkout, branch, merge.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_chunk::split;
use strata_graph::CommitGraph;
use strata_index::StagingIndex;
use strata_merge::{analyze, merge_trees, MergeAnalysis};
use strata_model::{CommandCodec, ModelCodec};
use strata_refs::BranchStore;
use strata_store::{Blob, Commit, FsObjectStore, ModelManifest, ObjectStore};
use strata_tree::TreeBuilder;
use strata_types::Digest;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::config::RepoConfig;
use crate::error::{RepoError, RepoResult};
use crate::lock::RepoLock;
use crate::remote::{self, PushReport, RemoteSink};

/// Name of the repository directory inside the working tree.
pub const STRATA_DIR: &str = ".strata";

/// How a merge concluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The current branch already contained the other's history.
    AlreadyUpToDate,
    /// The current branch pointer moved to the other tip; no commit made.
    FastForward(Digest),
    /// A two-parent merge commit was created at this digest.
    Merged(Digest),
}

/// A version-controlled working tree rooted at a directory.
///
/// All mutating operations take the advisory repository lock for their
/// duration; concurrent invocations against the same repository fail fast
/// with [`RepoError::Locked`] instead of corrupting branch pointers.
pub struct Repository {
    root: PathBuf,
    strata_dir: PathBuf,
    config: RepoConfig,
    store: Arc<dyn ObjectStore>,
    graph: CommitGraph,
    tree: TreeBuilder,
    refs: BranchStore,
    codec: Box<dyn ModelCodec>,
}

impl Repository {
    /// Create a new repository at `root` with default configuration.
    pub fn init(root: impl Into<PathBuf>) -> RepoResult<Self> {
        Self::init_with_config(root, RepoConfig::default())
    }

    /// Create a new repository at `root`.
    ///
    /// Lays out `.strata/` (object store categories, `branches/` with an
    /// unborn default branch, HEAD, empty index files, `config.toml`).
    pub fn init_with_config(root: impl Into<PathBuf>, config: RepoConfig) -> RepoResult<Self> {
        let root = root.into();
        let strata_dir = root.join(STRATA_DIR);
        if strata_dir.exists() {
            return Err(RepoError::AlreadyExists(root));
        }
        config
            .chunker
            .validate()
            .map_err(|e| RepoError::Config(e.to_string()))?;
        fs::create_dir_all(&strata_dir)?;

        let store = FsObjectStore::new(&strata_dir);
        store.init_layout()?;

        let refs = BranchStore::new(&strata_dir);
        refs.init(&config.default_branch)?;

        StagingIndex::new().save(&strata_dir)?;
        config.save(&strata_dir)?;

        info!(root = %root.display(), branch = %config.default_branch, "initialized repository");
        Ok(Self::assemble(root, strata_dir, config))
    }

    /// Open an existing repository at `root`.
    pub fn open(root: impl Into<PathBuf>) -> RepoResult<Self> {
        let root = root.into();
        let strata_dir = root.join(STRATA_DIR);
        if !strata_dir.is_dir() {
            return Err(RepoError::NotARepository(root));
        }
        let config = RepoConfig::load(&strata_dir)?;
        Ok(Self::assemble(root, strata_dir, config))
    }

    fn assemble(root: PathBuf, strata_dir: PathBuf, config: RepoConfig) -> Self {
        let store: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(&strata_dir));
        let codec = Box::new(CommandCodec::new(config.codec.clone()));
        Self {
            graph: CommitGraph::new(store.clone()),
            tree: TreeBuilder::new(store.clone()),
            refs: BranchStore::new(&strata_dir),
            root,
            strata_dir,
            config,
            store,
            codec,
        }
    }

    /// Replace the model codec. The default is the configured external
    /// command; embedding callers and tests substitute an in-process one.
    pub fn with_codec(mut self, codec: Box<dyn ModelCodec>) -> Self {
        self.codec = codec;
        self
    }

    // ---- Accessors ----

    /// Working tree root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repository configuration.
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// The underlying object store handle.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Name of the branch HEAD points at.
    pub fn current_branch(&self) -> RepoResult<String> {
        Ok(self.refs.head()?)
    }

    /// Commit digest of the current branch tip (null when unborn).
    pub fn head_tip(&self) -> RepoResult<Digest> {
        Ok(self.refs.head_tip()?)
    }

    // ---- Staging ----

    /// Stage a file or directory (recursively) for the next commit.
    ///
    /// `path` is relative to the repository root. Dot-prefixed entries and
    /// the repository directory itself are skipped. Files under the
    /// configured model prefix go through the model codec; everything else
    /// is stored as a single blob.
    pub fn add(&self, path: impl AsRef<Path>) -> RepoResult<()> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        let target = self.root.join(path.as_ref());
        if !target.exists() {
            return Err(RepoError::PathNotFound(target));
        }

        let mut index = StagingIndex::load(&self.strata_dir)?;
        if target.is_file() {
            self.stage_path(&mut index, &target)?;
        } else {
            for entry in WalkDir::new(&target)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !is_hidden(e))
            {
                let entry = entry.map_err(|e| {
                    RepoError::Io(e.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "walk failed")
                    }))
                })?;
                if entry.file_type().is_file() {
                    self.stage_path(&mut index, entry.path())?;
                }
            }
        }
        index.save(&self.strata_dir)?;
        Ok(())
    }

    fn stage_path(&self, index: &mut StagingIndex, absolute: &Path) -> RepoResult<()> {
        let rel = self.relative_path(absolute)?;
        let model_prefix = format!("{}/", self.config.model_prefix);
        if rel.starts_with(&model_prefix) {
            self.stage_model(index, absolute, &rel)
        } else {
            self.stage_file(index, absolute, &rel)
        }
    }

    fn stage_file(&self, index: &mut StagingIndex, absolute: &Path, rel: &str) -> RepoResult<()> {
        let data = fs::read(absolute)?;
        let digest = self.store.write(&Blob::new(data).to_stored_object())?;
        index.stage_file(rel, digest)?;
        debug!(path = %rel, hash = %digest.short_hex(), "staged file");
        Ok(())
    }

    fn stage_model(&self, index: &mut StagingIndex, absolute: &Path, rel: &str) -> RepoResult<()> {
        let extracted = self.codec.extract(absolute)?;
        let architecture = self
            .store
            .write(&Blob::new(extracted.architecture).to_stored_object())?;
        let metadata = self
            .store
            .write(&Blob::new(extracted.metadata).to_stored_object())?;

        let spans = split(&extracted.weights, &self.config.chunker)?;
        let mut chunks = Vec::with_capacity(spans.len());
        for span in &spans {
            let chunk = Blob::new(span.slice(&extracted.weights).to_vec());
            chunks.push(self.store.write(&chunk.to_stored_object())?);
        }

        info!(path = %rel, chunks = chunks.len(), "staged model");
        index.stage_model(rel, ModelManifest::new(architecture, metadata, chunks))?;
        Ok(())
    }

    fn relative_path(&self, absolute: &Path) -> RepoResult<String> {
        let rel = absolute.strip_prefix(&self.root).unwrap_or(absolute);
        let mut parts = Vec::new();
        for component in rel.components() {
            let part = match component {
                std::path::Component::CurDir => continue,
                other => other
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| RepoError::NonUtf8Path(absolute.to_path_buf()))?,
            };
            parts.push(part);
        }
        Ok(parts.join("/"))
    }

    // ---- History ----

    /// Commit the staged index and advance the current branch pointer.
    ///
    /// A successful commit empties the staging index; committing again
    /// without a new `add` fails with [`RepoError::NothingStaged`].
    pub fn commit(&self, message: &str) -> RepoResult<Digest> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        let index = StagingIndex::load(&self.strata_dir)?;
        if index.is_empty() {
            return Err(RepoError::NothingStaged);
        }

        let tree = self.tree.build(&index)?;
        let branch = self.refs.head()?;
        let tip = self.refs.read(&branch)?;
        let commit = if tip.is_null() {
            Commit::root(tree, message)
        } else {
            Commit::child(tree, message, tip)
        };
        let digest = self.graph.write(&commit)?;
        self.refs.set(&branch, digest)?;
        // The commit consumed the staged state; reset the index so the next
        // commit requires a fresh add pass.
        StagingIndex::new().save(&self.strata_dir)?;

        info!(branch = %branch, commit = %digest.short_hex(), "committed");
        Ok(digest)
    }

    /// History of the current branch, newest first, following first
    /// parents.
    pub fn log(&self, limit: usize) -> RepoResult<Vec<(Digest, Commit)>> {
        let tip = self.refs.head_tip()?;
        if tip.is_null() {
            return Ok(Vec::new());
        }
        Ok(self.graph.log(&tip, limit)?)
    }

    // ---- Branches and working tree ----

    /// Switch to `branch`, restoring its tip's tree into the working tree.
    ///
    /// With `create`, the branch is first created at the current tip. The
    /// working tree is cleared (everything except the repository directory)
    /// and rebuilt from the branch tip; an unborn branch leaves it empty.
    pub fn checkout(&self, branch: &str, create: bool) -> RepoResult<()> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        if create {
            let tip = self.refs.head_tip()?;
            self.refs.create(branch, tip)?;
        }
        let tip = self.refs.read(branch)?;
        self.refs.set_head(branch)?;

        self.clear_working_tree()?;
        if !tip.is_null() {
            let commit = self.graph.read(&tip)?;
            self.tree
                .expand(&commit.tree, &self.root, self.codec.as_ref())?;
        }
        info!(branch = %branch, tip = %tip.short_hex(), "checked out");
        Ok(())
    }

    fn clear_working_tree(&self) -> RepoResult<()> {
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name() == STRATA_DIR {
                continue;
            }
            let path = entry.path();
            if path.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }

    /// Create `branch` at the current tip without switching to it.
    pub fn branch_create(&self, branch: &str) -> RepoResult<()> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        let tip = self.refs.head_tip()?;
        self.refs.create(branch, tip)?;
        Ok(())
    }

    /// All branches with their tips, sorted by name.
    pub fn branch_list(&self) -> RepoResult<Vec<(String, Digest)>> {
        Ok(self.refs.list()?)
    }

    /// Delete `branch`. Without `force`, refuses when the branch's history
    /// is not contained in the current branch.
    pub fn branch_delete(&self, branch: &str, force: bool) -> RepoResult<()> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        let tip = self.refs.read(branch)?;
        let head_tip = self.refs.head_tip()?;
        let merged = tip.is_null()
            || (!head_tip.is_null() && self.graph.is_ancestor(&tip, &head_tip)?);
        self.refs.delete(branch, force, merged)?;
        Ok(())
    }

    /// Rename `old` to `new`, retargeting HEAD if needed.
    pub fn branch_rename(&self, old: &str, new: &str) -> RepoResult<()> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        self.refs.rename(old, new)?;
        Ok(())
    }

    // ---- Merge ----

    /// Merge `other` into the current branch.
    ///
    /// Fast-forwards move the pointer without a commit. Divergent histories
    /// get a recursive tree merge: if clean, a two-parent merge commit is
    /// created, the pointer advances, and the merged tree is restored into
    /// the working tree; conflicts abort with the full conflict list and
    /// leave everything untouched.
    pub fn merge(&self, other: &str) -> RepoResult<MergeOutcome> {
        let _lock = RepoLock::acquire(&self.strata_dir)?;
        let current = self.refs.head()?;
        let current_tip = self.refs.read(&current)?;
        let other_tip = self.refs.read(other)?;

        match analyze(&self.graph, &current_tip, &other_tip)? {
            MergeAnalysis::AlreadyUpToDate => Ok(MergeOutcome::AlreadyUpToDate),
            MergeAnalysis::FastForward => {
                self.refs.set(&current, other_tip)?;
                info!(branch = %current, tip = %other_tip.short_hex(), "fast-forwarded");
                Ok(MergeOutcome::FastForward(other_tip))
            }
            MergeAnalysis::Diverged => {
                let ours = self.graph.read(&current_tip)?;
                let theirs = self.graph.read(&other_tip)?;
                let merged_tree = merge_trees(self.store.as_ref(), &ours.tree, &theirs.tree)?;

                let message = format!("Merge branch '{other}' into {current}");
                let commit = Commit::merge(merged_tree, message, current_tip, other_tip);
                let digest = self.graph.write(&commit)?;
                self.refs.set(&current, digest)?;

                self.tree
                    .expand(&merged_tree, &self.root, self.codec.as_ref())?;
                info!(branch = %current, commit = %digest.short_hex(), "merged");
                Ok(MergeOutcome::Merged(digest))
            }
        }
    }

    // ---- Remote ----

    /// Push the current branch's reachable objects to `sink`.
    pub fn push(&self, sink: &dyn RemoteSink) -> RepoResult<PushReport> {
        let tip = self.refs.head_tip()?;
        remote::push(&self.store, sink, &tip)
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_model::FramedCodec;

    fn repo(dir: &Path) -> Repository {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        Repository::init(dir)
            .unwrap()
            .with_codec(Box::new(FramedCodec))
    }

    fn write_file(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn init_lays_out_repository() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert!(repo.head_tip().unwrap().is_null());
        assert!(dir.path().join(".strata/config.toml").is_file());
        assert!(dir.path().join(".strata/branches/main").is_file());
    }

    #[test]
    fn init_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let _repo = repo(dir.path());
        assert!(matches!(
            Repository::init(dir.path()),
            Err(RepoError::AlreadyExists(_))
        ));
    }

    #[test]
    fn open_without_init_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(RepoError::NotARepository(_))
        ));
    }

    #[test]
    fn commit_requires_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        assert!(matches!(
            repo.commit("empty"),
            Err(RepoError::NothingStaged)
        ));
    }

    #[test]
    fn commit_empties_the_staging_index() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "a.txt", b"one");
        repo.add(".").unwrap();
        repo.commit("first").unwrap();

        // The first commit consumed the staged state; a bare repeat must
        // not mint a duplicate child commit.
        assert!(matches!(
            repo.commit("second"),
            Err(RepoError::NothingStaged)
        ));
    }

    #[test]
    fn add_and_commit_advance_the_branch() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "hello.txt", b"hello");

        repo.add(".").unwrap();
        let commit = repo.commit("first").unwrap();

        assert_eq!(repo.head_tip().unwrap(), commit);
        let log = repo.log(10).unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].1.message, "first");
        assert!(log[0].1.is_root());
    }

    #[test]
    fn file_blob_digest_is_the_content_digest() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "hello.txt", b"hello");
        repo.add("hello.txt").unwrap();

        let expected = Digest::from_bytes(b"hello");
        let index = StagingIndex::load(&dir.path().join(".strata")).unwrap();
        match index.root.get("hello.txt").unwrap() {
            strata_index::IndexNode::File { hash, .. } => assert_eq!(*hash, expected),
            other => panic!("expected file node, got {other:?}"),
        }
    }

    #[test]
    fn add_skips_dot_entries() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "kept.txt", b"kept");
        write_file(dir.path(), ".hidden", b"secret");
        write_file(dir.path(), ".config/inner.txt", b"secret");

        repo.add(".").unwrap();
        let index = StagingIndex::load(&dir.path().join(".strata")).unwrap();
        assert!(index.root.contains_key("kept.txt"));
        assert!(!index.root.contains_key(".hidden"));
        assert!(!index.root.contains_key(".config"));
        assert!(!index.root.contains_key(".strata"));
    }

    #[test]
    fn add_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        assert!(matches!(
            repo.add("ghost.txt"),
            Err(RepoError::PathNotFound(_))
        ));
    }

    #[test]
    fn model_files_go_through_the_codec() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        let weights: Vec<u8> = (0..300 * 1024).map(|i| (i % 249) as u8).collect();
        let model = FramedCodec::encode(b"{\"layers\":2}", b"{}", &weights);
        write_file(dir.path(), "models/net.bin", &model);

        repo.add("models").unwrap();
        let index = StagingIndex::load(&dir.path().join(".strata")).unwrap();
        let manifest = index.model_manifest("models/net.bin").unwrap();
        assert!(manifest.chunks.len() > 1);
    }

    #[test]
    fn checkout_restores_model_bytes_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        let weights: Vec<u8> = (0..100 * 1024).map(|i| (i % 241) as u8).collect();
        let model = FramedCodec::encode(b"{}", b"{}", &weights);
        write_file(dir.path(), "models/net.bin", &model);
        write_file(dir.path(), "readme.md", b"docs");

        repo.add(".").unwrap();
        repo.commit("snapshot").unwrap();

        fs::remove_file(dir.path().join("models/net.bin")).unwrap();
        repo.checkout("main", false).unwrap();

        assert_eq!(fs::read(dir.path().join("models/net.bin")).unwrap(), model);
        assert_eq!(fs::read(dir.path().join("readme.md")).unwrap(), b"docs");
    }

    #[test]
    fn branch_switch_restores_each_branch_state() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "shared.txt", b"v1");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.checkout("feature", true).unwrap();
        write_file(dir.path(), "shared.txt", b"v2");
        repo.add(".").unwrap();
        repo.commit("tweak").unwrap();

        repo.checkout("main", false).unwrap();
        assert_eq!(fs::read(dir.path().join("shared.txt")).unwrap(), b"v1");

        repo.checkout("feature", false).unwrap();
        assert_eq!(fs::read(dir.path().join("shared.txt")).unwrap(), b"v2");
    }

    #[test]
    fn fast_forward_merge_moves_pointer_without_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "a.txt", b"base");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.checkout("feature", true).unwrap();
        write_file(dir.path(), "b.txt", b"feature work");
        repo.add(".").unwrap();
        let feature_tip = repo.commit("feature work").unwrap();

        repo.checkout("main", false).unwrap();
        let outcome = repo.merge("feature").unwrap();
        assert_eq!(outcome, MergeOutcome::FastForward(feature_tip));
        assert_eq!(repo.head_tip().unwrap(), feature_tip);
        // No merge commit was created.
        assert_eq!(repo.log(10).unwrap().len(), 2);
    }

    #[test]
    fn merge_of_ancestor_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "a.txt", b"base");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.branch_create("old").unwrap();
        write_file(dir.path(), "b.txt", b"more");
        repo.add(".").unwrap();
        repo.commit("more").unwrap();

        assert_eq!(repo.merge("old").unwrap(), MergeOutcome::AlreadyUpToDate);
    }

    #[test]
    fn divergent_branches_merge_into_two_parent_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "base.txt", b"base");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.checkout("feature", true).unwrap();
        write_file(dir.path(), "feature.txt", b"theirs");
        repo.add(".").unwrap();
        let feature_tip = repo.commit("feature side").unwrap();

        repo.checkout("main", false).unwrap();
        write_file(dir.path(), "main.txt", b"ours");
        repo.add(".").unwrap();
        let main_tip = repo.commit("main side").unwrap();

        let outcome = repo.merge("feature").unwrap();
        let merged = match outcome {
            MergeOutcome::Merged(digest) => digest,
            other => panic!("expected merge commit, got {other:?}"),
        };
        let commit = repo.graph.read(&merged).unwrap();
        assert_eq!(commit.parents, vec![main_tip, feature_tip]);

        // Both sides' files are in the working tree.
        assert!(dir.path().join("main.txt").is_file());
        assert!(dir.path().join("feature.txt").is_file());
    }

    #[test]
    fn conflicting_merge_aborts_with_paths() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "f.txt", b"base");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.checkout("feature", true).unwrap();
        write_file(dir.path(), "f.txt", b"theirs");
        repo.add(".").unwrap();
        repo.commit("their change").unwrap();

        repo.checkout("main", false).unwrap();
        write_file(dir.path(), "f.txt", b"ours");
        repo.add(".").unwrap();
        let main_tip = repo.commit("our change").unwrap();

        match repo.merge("feature").unwrap_err() {
            RepoError::MergeConflicts(conflicts) => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].path, "f.txt");
            }
            other => panic!("expected conflicts, got {other:?}"),
        }
        // Pointer did not move.
        assert_eq!(repo.head_tip().unwrap(), main_tip);
    }

    #[test]
    fn unmerged_branch_delete_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "a.txt", b"base");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.checkout("feature", true).unwrap();
        write_file(dir.path(), "b.txt", b"unmerged work");
        repo.add(".").unwrap();
        repo.commit("unmerged").unwrap();

        repo.checkout("main", false).unwrap();
        assert!(matches!(
            repo.branch_delete("feature", false),
            Err(RepoError::Ref(strata_refs::RefError::NotMerged { .. }))
        ));
        repo.branch_delete("feature", true).unwrap();
        assert_eq!(repo.branch_list().unwrap().len(), 1);
    }

    fn blob_file_count(root: &Path) -> usize {
        WalkDir::new(root.join(".strata/objects/blobs"))
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn identical_files_share_one_stored_blob() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "one.bin", b"same bytes");
        write_file(dir.path(), "two.bin", b"same bytes");
        write_file(dir.path(), "sub/three.bin", b"same bytes");

        repo.add(".").unwrap();
        assert_eq!(blob_file_count(dir.path()), 1);
    }

    #[test]
    fn similar_model_versions_share_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        let weights: Vec<u8> = (0..512 * 1024).map(|i| (i * 7 % 253) as u8).collect();
        let model = FramedCodec::encode(b"{}", b"{}", &weights);
        write_file(dir.path(), "models/net.bin", &model);
        repo.add("models").unwrap();
        let before = blob_file_count(dir.path());

        // Flip one byte in the middle of the weights; boundary stability
        // means most chunks keep their digests, so few new blobs appear.
        let mut edited = weights.clone();
        edited[256 * 1024] ^= 0xFF;
        let model2 = FramedCodec::encode(b"{}", b"{}", &edited);
        write_file(dir.path(), "models/net.bin", &model2);
        repo.add("models").unwrap();
        let after = blob_file_count(dir.path());

        assert!(after > before);
        assert!(after - before < before / 2 + 2);
    }

    #[test]
    fn merged_branch_deletes_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(dir.path());
        write_file(dir.path(), "a.txt", b"base");
        repo.add(".").unwrap();
        repo.commit("base").unwrap();

        repo.branch_create("done").unwrap();
        write_file(dir.path(), "b.txt", b"ahead");
        repo.add(".").unwrap();
        repo.commit("ahead").unwrap();

        repo.branch_delete("done", false).unwrap();
    }
}
