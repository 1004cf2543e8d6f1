//! Building snapshot trees from the staging index, and expanding them back
//! into a working tree.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use strata_chunk::join;
use strata_index::{IndexNode, StagingIndex};
use strata_model::ModelCodec;
use strata_store::{
    Blob, EntryKind, ModelManifest, ObjectKind, ObjectStore, Tree, TreeEntry,
};
use strata_types::Digest;
use tracing::{debug, info};

use crate::error::{TreeError, TreeResult};

/// Builds and expands snapshot trees against an object store.
#[derive(Clone)]
pub struct TreeBuilder {
    store: Arc<dyn ObjectStore>,
}

impl TreeBuilder {
    /// Create a builder over `store`.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    // ---------------------------------------------------------------
    // Build: staging index -> persisted Merkle tree
    // ---------------------------------------------------------------

    /// Persist the staged state as a Merkle tree and return the root digest.
    ///
    /// Entries are emitted in path order at every level, so two indexes
    /// with the same final path→leaf mapping produce the identical root
    /// digest no matter what order they were staged in.
    pub fn build(&self, index: &StagingIndex) -> TreeResult<Digest> {
        let root = self.build_level(&index.root, index)?;
        info!(root = %root.short_hex(), "built snapshot tree");
        Ok(root)
    }

    fn build_level(
        &self,
        level: &BTreeMap<String, IndexNode>,
        index: &StagingIndex,
    ) -> TreeResult<Digest> {
        let mut entries = Vec::with_capacity(level.len());

        for node in level.values() {
            match node {
                IndexNode::File { path, hash } => {
                    entries.push(TreeEntry::new(EntryKind::Blob, path.clone(), *hash));
                }
                IndexNode::Model { path } => {
                    let manifest = index.model_manifest(path).ok_or_else(|| {
                        TreeError::MissingManifest { path: path.clone() }
                    })?;
                    let manifest_digest = self.store.write(&manifest.to_stored_object()?)?;
                    entries.push(TreeEntry::new(
                        EntryKind::Model,
                        path.clone(),
                        manifest_digest,
                    ));
                }
                IndexNode::Directory { children } => {
                    let child_digest = self.build_level(children, index)?;
                    let path = directory_path(children);
                    entries.push(TreeEntry::new(EntryKind::Tree, path, child_digest));
                }
            }
        }

        let tree = Tree::new(entries);
        let digest = self.store.write(&tree.to_stored_object()?)?;
        debug!(tree = %digest.short_hex(), entries = tree.len(), "persisted tree level");
        Ok(digest)
    }

    // ---------------------------------------------------------------
    // Expand: root digest -> working tree
    // ---------------------------------------------------------------

    /// Restore the tree at `root` under `destination`, materializing model
    /// entries through `codec`.
    ///
    /// Intermediate directories are created as needed. A codec failure
    /// aborts the expansion with [`TreeError::ModelMaterialization`];
    /// already-restored files are left in place (best effort, no rollback).
    pub fn expand(
        &self,
        root: &Digest,
        destination: &Path,
        codec: &dyn ModelCodec,
    ) -> TreeResult<()> {
        let stored = self.store.read_required(ObjectKind::Tree, root)?;
        let tree = Tree::from_stored_object(&stored)?;
        // Blobs and subtrees first; model materialization runs external
        // tooling and is the most likely step to fail.
        let mut models: Vec<&TreeEntry> = Vec::new();

        for entry in &tree.entries {
            match entry.kind {
                EntryKind::Blob => {
                    let stored = self.store.read_required(ObjectKind::Blob, &entry.hash)?;
                    let blob = Blob::from_stored_object(&stored)?;
                    let out = destination.join(&entry.path);
                    if let Some(parent) = out.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&out, &blob.data)?;
                }
                EntryKind::Tree => {
                    self.expand(&entry.hash, destination, codec)?;
                }
                EntryKind::Model => models.push(entry),
            }
        }

        for entry in models {
            self.materialize_model(entry, destination, codec)?;
        }
        Ok(())
    }

    fn materialize_model(
        &self,
        entry: &TreeEntry,
        destination: &Path,
        codec: &dyn ModelCodec,
    ) -> TreeResult<()> {
        let stored = self.store.read_required(ObjectKind::Model, &entry.hash)?;
        let manifest = ModelManifest::from_stored_object(&stored)?;

        let architecture = self.read_blob(&manifest.architecture)?;
        let metadata = self.read_blob(&manifest.metadata)?;

        // Chunk order is the reconstruction invariant: concatenate in the
        // order the manifest records.
        let mut chunks = Vec::with_capacity(manifest.chunks.len());
        for chunk_digest in &manifest.chunks {
            chunks.push(self.read_blob(chunk_digest)?);
        }
        let weights = join(chunks);

        let output = destination.join(&entry.path);
        codec
            .rebuild(&weights, &architecture, &metadata, &output)
            .map_err(|source| TreeError::ModelMaterialization {
                path: entry.path.clone(),
                source,
            })?;
        info!(model = %entry.path, chunks = manifest.chunks.len(), "materialized model");
        Ok(())
    }

    fn read_blob(&self, digest: &Digest) -> TreeResult<Vec<u8>> {
        let stored = self.store.read_required(ObjectKind::Blob, digest)?;
        Ok(Blob::from_stored_object(&stored)?.data)
    }
}

/// Repo-relative path of a directory node, derived from its children. Every
/// leaf records its full path, so the directory path is the parent of any
/// child's path.
fn directory_path(children: &BTreeMap<String, IndexNode>) -> String {
    for node in children.values() {
        match node {
            IndexNode::File { path, .. } | IndexNode::Model { path } => {
                if let Some((dir, _)) = path.rsplit_once('/') {
                    return dir.to_string();
                }
            }
            IndexNode::Directory { children } => {
                let below = directory_path(children);
                if let Some((dir, _)) = below.rsplit_once('/') {
                    return dir.to_string();
                }
            }
        }
    }
    String::new()
}

impl std::fmt::Debug for TreeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder").finish()
    }
}
