use serde::{Deserialize, Serialize};
use strata_types::Digest;

use crate::error::{StoreError, StoreResult};

/// The kind of object stored. Each kind lives in its own sharded category
/// directory, but all kinds share the same addressing scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Raw content (file contents, weight chunks).
    Blob,
    /// Directory snapshot: ordered entries mapping paths to object references.
    Tree,
    /// History record: tree digest, message, parent digests.
    Commit,
    /// Model manifest: descriptor blobs plus ordered weight chunk digests.
    Model,
}

impl ObjectKind {
    /// Category directory for this kind, relative to the repository dir.
    ///
    /// Blobs and trees live under `objects/`; commits and model manifests
    /// have top-level category directories, mirroring the on-disk layout of
    /// the repositories this store reads and writes.
    pub fn category_dir(&self) -> &'static str {
        match self {
            Self::Blob => "objects/blobs",
            Self::Tree => "objects/trees",
            Self::Commit => "commits",
            Self::Model => "models",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Commit => write!(f, "commit"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A stored object: kind tag + logical (uncompressed) bytes.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// data — it is a pure key-value store keyed by content digest. Compression
/// happens below this type, inside the filesystem backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The logical bytes of the object.
    pub data: Vec<u8>,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        Self { kind, data }
    }

    /// Compute the content-addressed digest for this object.
    ///
    /// The digest covers only the logical bytes, so two callers producing
    /// identical content always collapse to one stored object.
    pub fn compute_digest(&self) -> Digest {
        Digest::from_bytes(&self.data)
    }

    /// The size of the logical bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (a tracked file's bytes, or one weight chunk).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Blob {
            return Err(StoreError::CorruptObject {
                digest: obj.compute_digest(),
                reason: format!("expected blob, got {}", obj.kind),
            });
        }
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// What a tree entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// An ordinary file blob.
    Blob,
    /// A nested subtree.
    Tree,
    /// A model manifest.
    Model,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blob => write!(f, "blob"),
            Self::Tree => write!(f, "tree"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// What this entry references.
    pub kind: EntryKind,
    /// Repository-relative path of the entry.
    pub path: String,
    /// Content-addressed digest of the referenced object.
    pub hash: Digest,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(kind: EntryKind, path: impl Into<String>, hash: Digest) -> Self {
        Self {
            kind,
            path: path.into(),
            hash,
        }
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.path.cmp(&other.path)
    }
}

/// Ordered directory snapshot (Merkle node).
///
/// Entries are sorted by path so that the serialized form — and hence the
/// tree's digest — is deterministic regardless of insertion order. The
/// digest of a tree depends only on its entries' `(kind, path, hash)`
/// triples.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries, sorted by path.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tree, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(StoreError::CorruptObject {
                digest: obj.compute_digest(),
                reason: format!("expected tree, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Look up an entry by path.
    pub fn get(&self, path: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ModelManifest
// ---------------------------------------------------------------------------

/// One versioned model: two small descriptor blobs plus the ordered list of
/// weight chunk digests.
///
/// Chunk order is semantically significant — concatenating the chunks in
/// order reconstructs the weight payload byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    /// Digest of the architecture descriptor blob.
    pub architecture: Digest,
    /// Digest of the metadata descriptor blob.
    pub metadata: Digest,
    /// Ordered digests of the weight payload's chunks.
    pub chunks: Vec<Digest>,
}

impl ModelManifest {
    /// Create a manifest from its parts.
    pub fn new(architecture: Digest, metadata: Digest, chunks: Vec<Digest>) -> Self {
        Self {
            architecture,
            metadata,
            chunks,
        }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Model, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Model {
            return Err(StoreError::CorruptObject {
                digest: obj.compute_digest(),
                reason: format!("expected model manifest, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Immutable history record.
///
/// `parents` is ordered: empty for a root commit, one entry for an ordinary
/// commit, two for a true merge (first parent is the branch the merge was
/// made on). A commit's digest is a pure function of this structure, so
/// identical commits deduplicate automatically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Digest of the root tree this commit snapshots.
    pub tree: Digest,
    /// Commit message.
    pub message: String,
    /// Ordered parent commit digests.
    #[serde(default)]
    pub parents: Vec<Digest>,
}

impl Commit {
    /// Create a root commit (no parents).
    pub fn root(tree: Digest, message: impl Into<String>) -> Self {
        Self {
            tree,
            message: message.into(),
            parents: Vec::new(),
        }
    }

    /// Create an ordinary single-parent commit.
    pub fn child(tree: Digest, message: impl Into<String>, parent: Digest) -> Self {
        Self {
            tree,
            message: message.into(),
            parents: vec![parent],
        }
    }

    /// Create a two-parent merge commit. `ours` is the branch the merge was
    /// made on.
    pub fn merge(tree: Digest, message: impl Into<String>, ours: Digest, theirs: Digest) -> Self {
        Self {
            tree,
            message: message.into(),
            parents: vec![ours, theirs],
        }
    }

    /// Returns `true` if this is a root commit.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns `true` if this is a merge commit (more than one parent).
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// The first parent, if any. History listings follow first parents.
    pub fn first_parent(&self) -> Option<Digest> {
        self.parents.first().copied()
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Commit {
            return Err(StoreError::CorruptObject {
                digest: obj.compute_digest(),
                reason: format!("expected commit, got {}", obj.kind),
            });
        }
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
