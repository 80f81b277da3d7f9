use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, error, warn};
use tempfile::TempPath;

use super::config::StoreConfig;
use super::error::StoreError;
use super::frame::{decode_payload, encode_frame, read_frame_at, read_frame_len, LENGTH_PREFIX};
use super::handle::Handle;
use crate::record::{Record, StoredRecord};

/// Location and size of one frame found by [`RecordStore::scan_frames`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Handle of the frame
    pub handle: Handle,
    /// Payload length in bytes, excluding the prefix
    pub payload_len: u32,
}

/// Result of walking a store file frame by frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameScan {
    /// Complete frames, in file order
    pub frames: Vec<FrameInfo>,
    /// Offset of a trailing partial frame, if the file ends mid-frame
    pub truncated_at: Option<u64>,
}

/// Append-only file of length-prefixed record frames
///
/// A store is either temporary (created in a working directory, deleted on
/// drop unless persisted) or durable (an existing file, or a temporary one
/// after [`persist`](Self::persist)).
///
/// Writes require `&mut self`, so there is at most one producer. Reads take
/// `&self` and are serialized by an internal lock, so a finalized store can be
/// shared between reader threads.
pub struct RecordStore {
    path: PathBuf,
    temp: Option<TempPath>,
    file: Mutex<Option<File>>,
    scratch: Vec<u8>,
    config: StoreConfig,
}

impl RecordStore {
    /// Create a new, empty temporary store in `dir`
    ///
    /// The file is named with the configured prefix and suffix and stays open
    /// for writing.
    pub fn create_in(dir: impl AsRef<Path>, config: &StoreConfig) -> Result<Self, StoreError> {
        let named = tempfile::Builder::new()
            .prefix(&config.temp_prefix)
            .suffix(&config.temp_suffix)
            .tempfile_in(dir)?;
        let (file, temp) = named.into_parts();
        let path = temp.to_path_buf();
        debug!("Created record store {}", path.display());

        Ok(Self {
            path,
            temp: Some(temp),
            file: Mutex::new(Some(file)),
            scratch: Vec::with_capacity(config.encode_buffer_capacity),
            config: config.clone(),
        })
    }

    /// Bind to an existing store file without opening it
    ///
    /// The store is durable: dropping it never deletes the file.
    pub fn open_existing(path: impl Into<PathBuf>, config: &StoreConfig) -> Self {
        Self {
            path: path.into(),
            temp: None,
            file: Mutex::new(None),
            scratch: Vec::new(),
            config: config.clone(),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the backing file
    pub fn working_directory(&self) -> Option<&Path> {
        self.path.parent()
    }

    /// Whether the file is still deleted on drop
    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Size of the backing file in bytes
    pub fn size_bytes(&self) -> Result<u64, StoreError> {
        Ok(fs::metadata(&self.path)?.len())
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open<'a>(
        slot: &'a mut Option<File>,
        path: &Path,
    ) -> Result<&'a mut File, StoreError> {
        let file = match slot.take() {
            Some(file) => file,
            None => OpenOptions::new().read(true).write(true).open(path)?,
        };
        Ok(slot.insert(file))
    }

    /// Acquire the read/write file handle if it is not already held
    pub fn open(&self) -> Result<(), StoreError> {
        let mut slot = self.lock();
        if slot.is_none() {
            Self::ensure_open(&mut slot, &self.path)?;
            debug!("Opened record store {}", self.path.display());
        }
        Ok(())
    }

    /// Release the file handle
    pub fn close(&self) {
        if self.lock().take().is_some() {
            debug!("Closed record store {}", self.path.display());
        }
    }

    /// Whether the file handle is currently held
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Append `record` as a new frame and return its handle
    ///
    /// Opens the file if needed and leaves it open. On failure the error is
    /// logged, any partial frame is cut off, and [`Handle::INVALID`] is
    /// returned.
    pub fn write<R: StoredRecord>(&mut self, record: &R) -> Handle {
        match self.try_write(record) {
            Ok(handle) => handle,
            Err(e) => {
                error!(
                    "Failed to write {} to {}: {}",
                    R::KIND,
                    self.path.display(),
                    e
                );
                Handle::INVALID
            }
        }
    }

    fn try_write<R: StoredRecord>(&mut self, record: &R) -> Result<Handle, StoreError> {
        encode_frame(record.to_ref(), &mut self.scratch)?;

        let slot = self.file.get_mut().unwrap_or_else(PoisonError::into_inner);
        let file = Self::ensure_open(slot, &self.path)?;
        let start = file.seek(SeekFrom::End(0))?;

        if let Err(e) = file.write_all(&self.scratch) {
            if let Err(trunc) = file.set_len(start) {
                warn!(
                    "Failed to cut partial frame at {} in {}: {}",
                    start,
                    self.path.display(),
                    trunc
                );
            }
            return Err(e.into());
        }

        Ok(Handle::from_offset(start))
    }

    /// Read the record behind `handle`
    ///
    /// Returns `None` immediately for the sentinel. Read or decode failures,
    /// including a frame of a different kind, are logged and yield `None`.
    pub fn read<R: StoredRecord>(&self, handle: Handle) -> Option<R> {
        let offset = handle.offset()?;
        let result = self.read_at(offset).and_then(|record| {
            R::from_record(record).map_err(|other| StoreError::KindMismatch {
                expected: R::KIND,
                found: other.kind(),
            })
        });

        match result {
            Ok(record) => Some(record),
            Err(e) => {
                error!(
                    "Failed to read {} at {} from {}: {}",
                    R::KIND,
                    handle,
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    /// Read several records, one slot per handle, order preserved
    pub fn read_many<R: StoredRecord>(&self, handles: &[Handle]) -> Vec<Option<R>> {
        handles.iter().map(|&h| self.read(h)).collect()
    }

    /// Decode the frame behind `handle` without knowing its kind
    ///
    /// Unlike [`read`](Self::read) this reports failures; the sentinel yields
    /// `Ok(None)`.
    pub fn read_record(&self, handle: Handle) -> Result<Option<Record>, StoreError> {
        match handle.offset() {
            Some(offset) => self.read_at(offset).map(Some),
            None => Ok(None),
        }
    }

    fn read_at(&self, offset: u64) -> Result<Record, StoreError> {
        let payload = {
            let mut slot = self.lock();
            match slot.as_mut() {
                Some(file) => read_frame_at(file, offset)?,
                // Transient handle, released when this block ends
                None => read_frame_at(&mut File::open(&self.path)?, offset)?,
            }
        };
        decode_payload(&payload)
    }

    /// Mark a temporary store durable
    ///
    /// Syncs the file if configured, releases the handle, and disarms the
    /// delete-on-drop.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        if self.temp.is_none() {
            return Err(StoreError::NotTemporary(self.path.clone()));
        }

        {
            let slot = self.file.get_mut().unwrap_or_else(PoisonError::into_inner);
            if let Some(file) = slot.as_ref() {
                if self.config.sync_on_finalize {
                    file.sync_all()?;
                }
            }
            *slot = None;
        }

        if let Some(temp) = self.temp.take() {
            if let Err(e) = temp.keep() {
                let path = self.path.clone();
                self.temp = Some(e.path);
                return Err(StoreError::PersistError {
                    path,
                    source: e.error,
                });
            }
        }

        debug!("Persisted record store {}", self.path.display());
        Ok(())
    }

    /// Delete the backing file
    ///
    /// Returns whether the file is gone afterwards; a file that was already
    /// missing counts as removed.
    pub fn remove(&mut self) -> bool {
        self.close();
        let result = match self.temp.take() {
            Some(temp) => temp.close(),
            None => fs::remove_file(&self.path),
        };

        match result {
            Ok(()) => {
                debug!("Removed record store {}", self.path.display());
                true
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => true,
            Err(e) => {
                error!("Failed to remove {}: {}", self.path.display(), e);
                false
            }
        }
    }

    /// Walk the file frame by frame without decoding payloads
    ///
    /// Stops at the first frame whose prefix or payload runs past the end of
    /// the file and reports its offset.
    pub fn scan_frames(&self) -> Result<FrameScan, StoreError> {
        let _serialized = self.lock();
        let mut file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();

        let mut scan = FrameScan::default();
        let mut offset = 0u64;
        while offset < file_len {
            match read_frame_len(&mut file, offset, file_len) {
                Ok(payload_len) => {
                    scan.frames.push(FrameInfo {
                        handle: Handle::from_offset(offset),
                        payload_len,
                    });
                    offset += LENGTH_PREFIX + u64::from(payload_len);
                }
                Err(StoreError::TruncatedFrame { offset }) => {
                    scan.truncated_at = Some(offset);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(scan)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("path", &self.path)
            .field("temporary", &self.is_temporary())
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for RecordStore {
    fn drop(&mut self) {
        let slot = self.file.get_mut().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        if let Some(temp) = self.temp.take() {
            match temp.close() {
                Ok(()) => debug!("Deleted temporary store {}", self.path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    "Failed to delete temporary store {}: {}",
                    self.path.display(),
                    e
                ),
            }
        }
    }
}
