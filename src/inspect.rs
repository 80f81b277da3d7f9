//! Offline inspection of record store files.
//!
//! [`inspect_store`] walks a store file frame by frame and decodes every
//! payload, collecting a [`StoreReport`] with the kind of each frame and every
//! frame that failed to decode. The `mzstore-inspect` binary prints it.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::record::RecordKind;
use crate::store::{Handle, RecordStore, StoreConfig, StoreError};

/// Outcome of decoding one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    /// Frame decoded as this kind
    Ok(RecordKind),
    /// Frame failed to decode
    Failed(String),
}

/// Decode result for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCheck {
    /// Frame handle
    pub handle: Handle,
    /// Payload length in bytes
    pub payload_len: u32,
    /// Decode outcome
    pub status: FrameStatus,
}

/// Frame-level report for one store file
#[derive(Debug)]
pub struct StoreReport {
    /// Path of the inspected file
    pub file_path: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Every complete frame, in file order
    pub frames: Vec<FrameCheck>,
    /// Offset of a trailing partial frame
    pub truncated_at: Option<u64>,
}

impl StoreReport {
    /// Number of frames per decoded kind
    pub fn kind_counts(&self) -> BTreeMap<RecordKind, usize> {
        let mut counts = BTreeMap::new();
        for frame in &self.frames {
            if let FrameStatus::Ok(kind) = frame.status {
                *counts.entry(kind).or_insert(0) += 1;
            }
        }
        counts
    }

    /// Frames that failed to decode
    pub fn failures(&self) -> impl Iterator<Item = &FrameCheck> + '_ {
        self.frames
            .iter()
            .filter(|f| matches!(f.status, FrameStatus::Failed(_)))
    }

    /// Count the number of frames that failed to decode
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Whether any frame failed or the file ends mid-frame
    pub fn has_failures(&self) -> bool {
        self.truncated_at.is_some() || self.failure_count() > 0
    }

    /// Summary without per-frame detail
    pub fn format_info(&self) -> String {
        let mut output = String::new();
        output.push_str("mzstore File Information\n");
        output.push_str("========================\n");
        output.push_str(&format!("File: {}\n", self.file_path));
        output.push_str(&format!("Size: {} bytes\n", self.size_bytes));
        output.push_str(&format!("Frames: {}\n", self.frames.len()));
        for (kind, count) in self.kind_counts() {
            output.push_str(&format!("  {}: {}\n", kind, count));
        }
        if let Some(offset) = self.truncated_at {
            output.push_str(&format!("Truncated frame at offset {}\n", offset));
        }
        output
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("mzstore Verification Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("===========================").cyan()));
            output.push_str(&format!("{}: {}\n\n", style("File").bold(), self.file_path));

            for (kind, count) in self.kind_counts() {
                output.push_str(&format!("{} {} {}\n", OK, style(count).green(), kind));
            }
            for frame in self.failures() {
                if let FrameStatus::Failed(msg) = &frame.status {
                    output.push_str(&format!(
                        "{} frame {} ({} bytes) - {}: {}\n",
                        FAIL,
                        frame.handle,
                        frame.payload_len,
                        style("FAILED").red().bold(),
                        msg
                    ));
                }
            }
            if let Some(offset) = self.truncated_at {
                output.push_str(&format!(
                    "{} {} at offset {}\n",
                    FAIL,
                    style("Truncated frame").red().bold(),
                    offset
                ));
            }

            output.push_str(&format!(
                "\n{}: {} frames, {} failed\n\n",
                style("Summary").bold(),
                style(self.frames.len()).green(),
                style(self.failure_count()).red()
            ));

            if self.has_failures() {
                output.push_str(&format!("{}\n", style("Verification FAILED").red().bold()));
            } else {
                output.push_str(&format!("{}\n", style("Verification PASSED").green().bold()));
            }

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for StoreReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mzstore Verification Report")?;
        writeln!(f, "===========================")?;
        writeln!(f, "File: {}", self.file_path)?;
        writeln!(f)?;

        for (kind, count) in self.kind_counts() {
            writeln!(f, "[✓] {} {}", count, kind)?;
        }
        for frame in self.failures() {
            if let FrameStatus::Failed(msg) = &frame.status {
                writeln!(
                    f,
                    "[✗] frame {} ({} bytes) - FAILED: {}",
                    frame.handle, frame.payload_len, msg
                )?;
            }
        }
        if let Some(offset) = self.truncated_at {
            writeln!(f, "[✗] Truncated frame at offset {}", offset)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} frames, {} failed",
            self.frames.len(),
            self.failure_count()
        )?;
        writeln!(f)?;
        if self.has_failures() {
            writeln!(f, "Verification FAILED")?;
        } else {
            writeln!(f, "Verification PASSED")?;
        }
        Ok(())
    }
}

/// Walk and decode every frame of the store file at `path`
///
/// The file is only read; nothing is deleted or rewritten.
pub fn inspect_store(path: &Path) -> Result<StoreReport, StoreError> {
    let store = RecordStore::open_existing(path, &StoreConfig::default());
    let size_bytes = store.size_bytes()?;
    let scan = store.scan_frames()?;

    let frames = scan
        .frames
        .iter()
        .map(|info| {
            let status = match store.read_record(info.handle) {
                Ok(Some(record)) => FrameStatus::Ok(record.kind()),
                Ok(None) => FrameStatus::Failed("invalid handle".to_string()),
                Err(e) => FrameStatus::Failed(e.to_string()),
            };
            FrameCheck {
                handle: info.handle,
                payload_len: info.payload_len,
                status,
            }
        })
        .collect();

    Ok(StoreReport {
        file_path: path.display().to_string(),
        size_bytes,
        frames,
        truncated_at: scan.truncated_at,
    })
}
