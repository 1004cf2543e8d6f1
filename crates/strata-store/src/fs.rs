//! Sharded, zstd-compressed filesystem object store.
//!
//! Objects live at `<root>/<category>/<first-2-hex>/<remaining-hex>`:
//!
//! ```text
//! .strata/objects/blobs/ab/cdef…   blob bodies (files and weight chunks)
//! .strata/objects/trees/ab/cdef…   tree snapshots
//! .strata/commits/ab/cdef…         commit records
//! .strata/models/ab/cdef…          model manifests
//! ```
//!
//! Sharding by hash prefix bounds directory fan-out; it is purely a
//! filesystem-performance concern with no semantic meaning.

use std::fs;
use std::path::{Path, PathBuf};

use strata_types::Digest;
use tracing::{debug, trace};

use crate::codec::{compress, decompress};
use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Filesystem-backed object store rooted at a repository's metadata dir.
///
/// The root is an explicit handle passed in at construction; the store never
/// consults ambient process state to find it.
#[derive(Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Open a store rooted at `root`. The directory does not need to exist
    /// yet; category directories are created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the category directory skeleton under the root.
    pub fn init_layout(&self) -> StoreResult<()> {
        for kind in [
            ObjectKind::Blob,
            ObjectKind::Tree,
            ObjectKind::Commit,
            ObjectKind::Model,
        ] {
            fs::create_dir_all(self.root.join(kind.category_dir()))?;
        }
        Ok(())
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// On-disk path for an object.
    fn object_path(&self, kind: ObjectKind, digest: &Digest) -> PathBuf {
        let (prefix, rest) = digest.shard();
        self.root.join(kind.category_dir()).join(prefix).join(rest)
    }
}

impl ObjectStore for FsObjectStore {
    fn read(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<Option<StoredObject>> {
        let path = self.object_path(kind, digest);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let data = decompress(&compressed).map_err(|e| match e {
            StoreError::Codec { reason, .. } => StoreError::Codec {
                context: format!("{kind} {digest}"),
                reason,
            },
            other => other,
        })?;
        trace!(%digest, %kind, bytes = data.len(), "read object");
        Ok(Some(StoredObject::new(kind, data)))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<Digest> {
        let digest = object.compute_digest();
        if digest.is_null() {
            return Err(StoreError::NullDigest);
        }
        let path = self.object_path(object.kind, &digest);
        // Idempotent: a digest already present is never rewritten. Racing
        // writers are harmless because both hold identical content.
        if path.exists() {
            return Ok(digest);
        }

        let parent = path.parent().ok_or_else(|| StoreError::CorruptObject {
            digest,
            reason: "object path has no parent directory".to_string(),
        })?;
        fs::create_dir_all(parent)?;

        let compressed = compress(&object.data)?;
        // Write to a temp file in the same directory, then rename into
        // place, so a crash mid-write never leaves a truncated object.
        let tmp = tempfile::NamedTempFile::new_in(parent)?;
        fs::write(tmp.path(), &compressed)?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(
            %digest,
            kind = %object.kind,
            logical = object.data.len(),
            compressed = compressed.len(),
            "stored object"
        );
        Ok(digest)
    }

    fn exists(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<bool> {
        Ok(self.object_path(kind, digest).exists())
    }

    fn delete(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<bool> {
        let path = self.object_path(kind, digest);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for FsObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsObjectStore")
            .field("root", &self.root)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Blob;

    fn temp_store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        store.init_layout().unwrap();
        (dir, store)
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (_dir, store) = temp_store();
        let obj = Blob::new(b"persisted bytes".to_vec()).to_stored_object();
        let digest = store.write(&obj).unwrap();
        let read = store.read(ObjectKind::Blob, &digest).unwrap().unwrap();
        assert_eq!(read, obj);
    }

    #[test]
    fn on_disk_layout_is_sharded() {
        let (dir, store) = temp_store();
        let obj = Blob::new(b"shard layout".to_vec()).to_stored_object();
        let digest = store.write(&obj).unwrap();
        let (prefix, rest) = digest.shard();
        let expected = dir
            .path()
            .join("objects/blobs")
            .join(&prefix)
            .join(&rest);
        assert!(expected.is_file());
    }

    #[test]
    fn stored_bytes_are_compressed() {
        let (dir, store) = temp_store();
        let data = vec![7u8; 128 * 1024];
        let obj = Blob::new(data.clone()).to_stored_object();
        let digest = store.write(&obj).unwrap();
        let (prefix, rest) = digest.shard();
        let on_disk = fs::read(dir.path().join("objects/blobs").join(prefix).join(rest)).unwrap();
        assert!(on_disk.len() < data.len());
        // Digest is computed over the logical bytes, not the compressed form.
        assert_eq!(digest, Digest::from_bytes(&data));
    }

    #[test]
    fn rewrite_does_not_corrupt() {
        let (_dir, store) = temp_store();
        let obj = Blob::new(b"write twice".to_vec()).to_stored_object();
        let d1 = store.write(&obj).unwrap();
        let d2 = store.write(&obj).unwrap();
        assert_eq!(d1, d2);
        let read = store.read(ObjectKind::Blob, &d1).unwrap().unwrap();
        assert_eq!(read.data, b"write twice");
    }

    #[test]
    fn missing_object_is_none() {
        let (_dir, store) = temp_store();
        let digest = Digest::from_bytes(b"never written");
        assert!(store.read(ObjectKind::Commit, &digest).unwrap().is_none());
        assert!(!store.exists(ObjectKind::Commit, &digest).unwrap());
    }

    #[test]
    fn corrupt_object_is_codec_error() {
        let (dir, store) = temp_store();
        let obj = Blob::new(b"soon corrupt".to_vec()).to_stored_object();
        let digest = store.write(&obj).unwrap();
        let (prefix, rest) = digest.shard();
        let path = dir.path().join("objects/blobs").join(prefix).join(rest);
        fs::write(&path, b"garbage, not zstd").unwrap();
        let err = store.read(ObjectKind::Blob, &digest).unwrap_err();
        assert!(matches!(err, StoreError::Codec { .. }));
    }

    #[test]
    fn delete_removes_object() {
        let (_dir, store) = temp_store();
        let obj = Blob::new(b"to delete".to_vec()).to_stored_object();
        let digest = store.write(&obj).unwrap();
        assert!(store.delete(ObjectKind::Blob, &digest).unwrap());
        assert!(!store.delete(ObjectKind::Blob, &digest).unwrap());
        assert!(store.read(ObjectKind::Blob, &digest).unwrap().is_none());
    }

    #[test]
    fn kinds_are_separate_categories() {
        let (_dir, store) = temp_store();
        let blob = StoredObject::new(ObjectKind::Blob, b"same".to_vec());
        let tree = StoredObject::new(ObjectKind::Tree, b"same".to_vec());
        let d = store.write(&blob).unwrap();
        assert!(!store.exists(ObjectKind::Tree, &d).unwrap());
        store.write(&tree).unwrap();
        assert!(store.exists(ObjectKind::Tree, &d).unwrap());
    }
}
