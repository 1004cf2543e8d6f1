use strata_types::Digest;

use crate::error::StoreResult;
use crate::object::{ObjectKind, StoredObject};

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same data always produces the same digest.
/// - Writes are idempotent. Re-writing an existing digest leaves the stored
///   bytes untouched — it must never corrupt an existing object.
/// - Concurrent reads are always safe (objects are immutable).
/// - The store never interprets object contents — it is a pure key-value
///   store keyed by `(kind, digest)`.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Read an object by kind and content digest.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed digest.
    ///
    /// If the object already exists this is a no-op in effect.
    fn write(&self, object: &StoredObject) -> StoreResult<Digest>;

    /// Check whether an object exists in the store.
    fn exists(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<bool>;

    /// Delete an object. Returns `true` if the object existed.
    ///
    /// Intended for garbage collection only; deleting referenced objects
    /// corrupts history.
    fn delete(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<bool>;

    /// Read an object, failing with [`StoreError::NotFound`] if absent.
    ///
    /// [`StoreError::NotFound`]: crate::error::StoreError::NotFound
    fn read_required(&self, kind: ObjectKind, digest: &Digest) -> StoreResult<StoredObject> {
        self.read(kind, digest)?
            .ok_or_else(|| crate::error::StoreError::not_found(kind, *digest))
    }
}
