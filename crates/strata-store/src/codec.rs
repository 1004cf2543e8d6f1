//! Lossless compression wrapped around every object write and read.
//!
//! The store compresses object bodies with zstd on the way to disk and
//! decompresses on the way back. Compression is a storage concern only:
//! digests are always computed over the uncompressed logical bytes, so the
//! compressed size never participates in content identity.

use crate::error::{StoreError, StoreResult};

/// Compression level for object bodies. zstd's default level trades well
/// between ratio and write throughput for blob-sized payloads.
const LEVEL: i32 = 0;

/// Compress logical bytes into the on-disk representation.
pub fn compress(data: &[u8]) -> StoreResult<Vec<u8>> {
    zstd::encode_all(data, LEVEL).map_err(|e| StoreError::Codec {
        context: "compress".to_string(),
        reason: e.to_string(),
    })
}

/// Decompress an on-disk object body back into its logical bytes.
///
/// Fails with [`StoreError::Codec`] on a malformed stream, which indicates
/// store corruption.
pub fn decompress(data: &[u8]) -> StoreResult<Vec<u8>> {
    zstd::decode_all(data).map_err(|e| StoreError::Codec {
        context: "decompress".to_string(),
        reason: e.to_string(),
    })
}
