use crate::store::StoreError;

use super::backend::BackendKind;

/// Errors that can occur on a container
///
/// These are configuration errors: wiring mistakes that should abort the run.
/// Per-record I/O failures never show up here; they degrade to absent records.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// Error from the backing record store
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// I/O error outside the record store (manifests, directories)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Manifest could not be (de)serialized
    #[error("Manifest error: {0}")]
    ManifestError(#[from] serde_json::Error),

    /// Manifest content is inconsistent
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    /// A file was requested from a memory-backed container
    #[error("Container '{id}' is memory-backed and has no data file")]
    NotFileBacked {
        /// Container identifier
        id: String,
    },

    /// An append was attempted after finalization
    #[error("Container '{id}' is finalized and read-only")]
    ReadOnly {
        /// Container identifier
        id: String,
    },

    /// The container's data was deleted
    #[error("Container '{id}' has been removed")]
    Removed {
        /// Container identifier
        id: String,
    },

    /// A manifest was requested before finalization
    #[error("Container '{id}' is not finalized")]
    NotFinalized {
        /// Container identifier
        id: String,
    },

    /// No constructor registered for a capability
    #[error("No {capability} registered for the {backend} backend")]
    Unregistered {
        /// Requested capability
        capability: crate::factory::Capability,
        /// Selector backend
        backend: BackendKind,
    },
}
