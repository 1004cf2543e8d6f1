use thiserror::Error;

/// Errors from tree building and expansion.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Failure reading or writing the object store.
    #[error(transparent)]
    Store(#[from] strata_store::StoreError),

    /// A staged model has a placeholder leaf but no manifest in the model
    /// index (inconsistent staging state).
    #[error("no manifest staged for model {path}")]
    MissingManifest { path: String },

    /// The external model codec failed while restoring a model file. The
    /// expansion aborts; files restored before the failure remain in place.
    #[error("failed to materialize model {path}: {source}")]
    ModelMaterialization {
        path: String,
        #[source]
        source: strata_model::ModelError,
    },

    /// I/O failure writing restored files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
