//! # Record Store
//!
//! An append-only binary file of length-prefixed frames. Each frame is
//!
//! ```text
//! length: u32 (big-endian) ++ payload: [u8; length]
//! ```
//!
//! where the payload is the bincode encoding of one [`Record`](crate::record::Record).
//! There is no file header and no tombstone: deleting data means deleting the
//! whole file. A [`Handle`] is the byte offset of a frame's length prefix.
//!
//! ## Failure model
//!
//! `write` and `read` are best-effort. An I/O or decode failure is logged at
//! `error` level and surfaces as [`Handle::INVALID`] or `None`, so one bad
//! frame yields one missing record instead of aborting a pipeline stage.
//! Lifecycle operations (`create_in`, `persist`, `scan_frames`) return
//! [`StoreError`].

mod config;
mod error;
mod frame;
mod handle;
mod record_store;

#[cfg(test)]
mod tests;

pub use config::StoreConfig;
pub use error::StoreError;
pub use frame::{encoded_len, LENGTH_PREFIX};
pub use handle::Handle;
pub use record_store::{FrameInfo, FrameScan, RecordStore};
