use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a stored frame: the byte offset of its length prefix
///
/// `Handle::INVALID` (-1) is the "no record" sentinel returned by a failed
/// write. Reading it yields nothing and never touches the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(i64);

impl Handle {
    /// The reserved "no record" sentinel
    pub const INVALID: Handle = Handle(-1);

    /// Handle for a frame starting at `offset`
    ///
    /// Offsets beyond `i64::MAX` cannot be addressed and map to the sentinel.
    pub fn from_offset(offset: u64) -> Self {
        i64::try_from(offset).map(Handle).unwrap_or(Self::INVALID)
    }

    /// Wrap a raw value as read from a manifest
    pub fn from_raw(raw: i64) -> Self {
        Handle(raw)
    }

    /// Raw value
    pub fn raw(&self) -> i64 {
        self.0
    }

    /// Whether this handle can name a frame
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }

    /// Byte offset of the frame, `None` for the sentinel
    pub fn offset(&self) -> Option<u64> {
        u64::try_from(self.0).ok()
    }
}

impl Default for Handle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "@{}", self.0)
        } else {
            f.write_str("@invalid")
        }
    }
}
