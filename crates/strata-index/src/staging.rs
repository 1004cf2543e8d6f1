//! The staging index: two parallel hierarchical mappings built per add pass.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_store::ModelManifest;
use strata_types::Digest;
use tracing::debug;

use crate::error::{IndexError, IndexResult};
use crate::node::IndexNode;

/// File name of the persisted primary index.
pub const INDEX_FILE: &str = "index.json";
/// File name of the persisted model manifest map.
pub const MODEL_INDEX_FILE: &str = "model_index.json";

/// The staging index.
///
/// `root` is the hierarchical path mapping; `models` is the parallel map
/// from a staged model's repo-relative path to its manifest. Each add pass
/// loads the persisted index, stages on top of it, and saves it back; the
/// next commit consumes whatever is staged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StagingIndex {
    /// Hierarchical mapping from path segments to leaves and directories.
    pub root: BTreeMap<String, IndexNode>,
    /// Manifests of staged models, keyed by repo-relative path.
    pub models: BTreeMap<String, ModelManifest>,
}

impl StagingIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Stage an ordinary file at `path` with its content digest.
    ///
    /// Creates intermediate directory nodes for each path segment and
    /// overwrites any existing leaf at the exact path. Fails with
    /// [`IndexError::ConflictingPath`] if a segment along the way is already
    /// a leaf, or the final segment is already a directory.
    pub fn stage_file(&mut self, path: &str, hash: Digest) -> IndexResult<()> {
        let leaf = IndexNode::File {
            path: path.to_string(),
            hash,
        };
        self.insert_leaf(path, leaf)?;
        // If the path previously held a model leaf, its manifest is now
        // orphaned and must not survive into the persisted model map.
        self.models.remove(path);
        Ok(())
    }

    /// Stage a model at `path`.
    ///
    /// The placeholder leaf goes into the primary mapping; the manifest is
    /// held in the parallel model map keyed by the same path.
    pub fn stage_model(&mut self, path: &str, manifest: ModelManifest) -> IndexResult<()> {
        let leaf = IndexNode::Model {
            path: path.to_string(),
        };
        self.insert_leaf(path, leaf)?;
        self.models.insert(path.to_string(), manifest);
        Ok(())
    }

    /// Manifest of a staged model, if `path` names one.
    pub fn model_manifest(&self, path: &str) -> Option<&ModelManifest> {
        self.models.get(path)
    }

    fn insert_leaf(&mut self, path: &str, leaf: IndexNode) -> IndexResult<()> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(IndexError::InvalidPath(path.to_string()));
        }

        let mut current = &mut self.root;
        for (i, segment) in segments.iter().enumerate() {
            let last = i == segments.len() - 1;
            if last {
                match current.get(*segment) {
                    // Overwriting a leaf at the exact path is a re-stage.
                    Some(existing @ IndexNode::Directory { .. }) => {
                        return Err(IndexError::ConflictingPath {
                            path: path.to_string(),
                            existing: existing.describe().to_string(),
                        });
                    }
                    _ => {
                        current.insert(segment.to_string(), leaf);
                        debug!(path, "staged entry");
                        return Ok(());
                    }
                }
            }

            let child = current
                .entry(segment.to_string())
                .or_insert_with(IndexNode::empty_dir);
            match child {
                IndexNode::Directory { children } => current = children,
                existing => {
                    return Err(IndexError::ConflictingPath {
                        path: path.to_string(),
                        existing: existing.describe().to_string(),
                    });
                }
            }
        }
        unreachable!("loop returns on the final segment");
    }

    // ---------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------

    /// Write `index.json` and `model_index.json` under `dir`, overwriting
    /// whatever the previous staging pass left there.
    pub fn save(&self, dir: &Path) -> IndexResult<()> {
        let index_json = serde_json::to_vec_pretty(&self.root)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;
        fs::write(dir.join(INDEX_FILE), index_json)?;

        let models_json = serde_json::to_vec_pretty(&self.models)
            .map_err(|e| IndexError::Serialization(e.to_string()))?;
        fs::write(dir.join(MODEL_INDEX_FILE), models_json)?;
        debug!(
            entries = self.root.len(),
            models = self.models.len(),
            "saved staging index"
        );
        Ok(())
    }

    /// Load the persisted index files from `dir`.
    ///
    /// Empty or absent files load as an empty index (the state `init`
    /// leaves behind).
    pub fn load(dir: &Path) -> IndexResult<Self> {
        let root = match fs::read(dir.join(INDEX_FILE)) {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
                .map_err(|e| IndexError::Serialization(e.to_string()))?,
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        let models = match fs::read(dir.join(MODEL_INDEX_FILE)) {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)
                .map_err(|e| IndexError::Serialization(e.to_string()))?,
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { root, models })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(s: &str) -> Digest {
        Digest::from_bytes(s.as_bytes())
    }

    fn manifest() -> ModelManifest {
        ModelManifest::new(digest("arch"), digest("meta"), vec![digest("c0")])
    }

    #[test]
    fn stage_file_creates_intermediate_dirs() {
        let mut index = StagingIndex::new();
        index.stage_file("src/deep/nested.rs", digest("n")).unwrap();

        let src = index.root.get("src").unwrap();
        let IndexNode::Directory { children } = src else {
            panic!("src should be a directory");
        };
        let deep = children.get("deep").unwrap();
        let IndexNode::Directory { children } = deep else {
            panic!("deep should be a directory");
        };
        assert_eq!(
            children.get("nested.rs"),
            Some(&IndexNode::File {
                path: "src/deep/nested.rs".into(),
                hash: digest("n"),
            })
        );
    }

    #[test]
    fn restage_overwrites_leaf() {
        let mut index = StagingIndex::new();
        index.stage_file("a.txt", digest("v1")).unwrap();
        index.stage_file("a.txt", digest("v2")).unwrap();
        assert_eq!(
            index.root.get("a.txt"),
            Some(&IndexNode::File {
                path: "a.txt".into(),
                hash: digest("v2"),
            })
        );
    }

    #[test]
    fn leaf_where_directory_exists_conflicts() {
        let mut index = StagingIndex::new();
        index.stage_file("src/main.rs", digest("m")).unwrap();
        let err = index.stage_file("src", digest("clash")).unwrap_err();
        assert!(matches!(err, IndexError::ConflictingPath { .. }));
    }

    #[test]
    fn directory_where_leaf_exists_conflicts() {
        let mut index = StagingIndex::new();
        index.stage_file("src", digest("file")).unwrap();
        let err = index.stage_file("src/main.rs", digest("m")).unwrap_err();
        assert!(matches!(err, IndexError::ConflictingPath { .. }));
        // Nothing was staged under the conflicting path.
        assert!(index.root.get("src").unwrap().is_leaf());
    }

    #[test]
    fn empty_path_is_invalid() {
        let mut index = StagingIndex::new();
        assert!(matches!(
            index.stage_file("", digest("x")),
            Err(IndexError::InvalidPath(_))
        ));
    }

    #[test]
    fn stage_model_fills_both_mappings() {
        let mut index = StagingIndex::new();
        index.stage_model("models/net.pt", manifest()).unwrap();
        assert_eq!(
            index.root.get("models").map(|n| n.is_leaf()),
            Some(false)
        );
        assert_eq!(index.model_manifest("models/net.pt"), Some(&manifest()));
    }

    #[test]
    fn restage_file_over_model_drops_manifest() {
        let mut index = StagingIndex::new();
        index.stage_model("models/net.pt", manifest()).unwrap();
        index.stage_file("models/net.pt", digest("plain")).unwrap();

        assert!(index.model_manifest("models/net.pt").is_none());
        assert!(index.models.is_empty());
        let IndexNode::Directory { children } = index.root.get("models").unwrap() else {
            panic!("models should be a directory");
        };
        assert!(matches!(
            children.get("net.pt"),
            Some(IndexNode::File { .. })
        ));
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = StagingIndex::new();
        index.stage_file("a.txt", digest("a")).unwrap();
        index.stage_file("src/lib.rs", digest("lib")).unwrap();
        index.stage_model("models/net.pt", manifest()).unwrap();
        index.save(dir.path()).unwrap();

        let loaded = StagingIndex::load(dir.path()).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn load_of_empty_files_is_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(INDEX_FILE), b"").unwrap();
        fs::write(dir.path().join(MODEL_INDEX_FILE), b"").unwrap();
        let loaded = StagingIndex::load(dir.path()).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn save_overwrites_previous_pass() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = StagingIndex::new();
        first.stage_file("old.txt", digest("old")).unwrap();
        first.save(dir.path()).unwrap();

        let mut second = StagingIndex::new();
        second.stage_file("new.txt", digest("new")).unwrap();
        second.save(dir.path()).unwrap();

        let loaded = StagingIndex::load(dir.path()).unwrap();
        assert!(loaded.root.contains_key("new.txt"));
        assert!(!loaded.root.contains_key("old.txt"));
    }
}
