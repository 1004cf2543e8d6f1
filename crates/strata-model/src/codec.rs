use std::path::Path;

use crate::error::ModelResult;

/// The three artifacts a model file decomposes into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extracted {
    /// Architecture descriptor bytes.
    pub architecture: Vec<u8>,
    /// Metadata descriptor bytes.
    pub metadata: Vec<u8>,
    /// Raw weight tensor payload.
    pub weights: Vec<u8>,
}

/// Decomposes model files into artifacts and reassembles them.
///
/// Implementations must be inverses of each other's output: for any model
/// file `m`, `rebuild(extract(m))` written to `out` makes `out`
/// byte-identical to `m`. The version store relies on this to restore
/// checked-out models exactly.
pub trait ModelCodec: Send + Sync {
    /// Decompose the model file at `model_path` into its three artifacts.
    fn extract(&self, model_path: &Path) -> ModelResult<Extracted>;

    /// Reassemble a model file at `output_path` from its artifacts.
    fn rebuild(
        &self,
        weights: &[u8],
        architecture: &[u8],
        metadata: &[u8],
        output_path: &Path,
    ) -> ModelResult<()>;
}
