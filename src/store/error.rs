use std::path::PathBuf;

use crate::record::RecordKind;

/// Errors that can occur inside a record store
///
/// The best-effort surface of [`RecordStore`](super::RecordStore) (`write`,
/// `read`) logs these and degrades to the sentinel handle or `None`; the
/// lifecycle operations return them.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Record could not be serialized
    #[error("Encode error: {0}")]
    EncodeError(#[from] bincode::error::EncodeError),

    /// Frame payload could not be deserialized
    #[error("Decode error: {0}")]
    DecodeError(#[from] bincode::error::DecodeError),

    /// Encoded record does not fit a u32 length prefix
    #[error("Frame too large: {0} bytes")]
    FrameTooLarge(usize),

    /// Frame ends past the end of the file
    #[error("Truncated frame at offset {offset}")]
    TruncatedFrame {
        /// Offset of the frame's length prefix
        offset: u64,
    },

    /// Frame holds a different record kind than requested
    #[error("Kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        /// Requested kind
        expected: RecordKind,
        /// Kind found in the frame
        found: RecordKind,
    },

    /// Operation needs a temporary file but the store is already durable
    #[error("Store is not temporary: {0}")]
    NotTemporary(PathBuf),

    /// Temporary file could not be marked durable
    #[error("Failed to persist {path}: {source}")]
    PersistError {
        /// Path of the backing file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
}
