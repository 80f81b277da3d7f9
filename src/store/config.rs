/// Configuration for a record store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Prefix of temporary store files, recognizable by external sweepers
    pub temp_prefix: String,

    /// Suffix of temporary store files
    pub temp_suffix: String,

    /// Flush file contents to disk before a store is marked durable
    pub sync_on_finalize: bool,

    /// Initial capacity of the reusable encode buffer in bytes
    pub encode_buffer_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            temp_prefix: "mzstore_".to_string(),
            temp_suffix: ".tmp".to_string(),
            sync_on_finalize: true,
            // A centroided scan is typically tens of kilobytes
            encode_buffer_capacity: 256 * 1024,
        }
    }
}

impl StoreConfig {
    /// Skip the fsync at finalization (tests, throwaway intermediates)
    pub fn fast() -> Self {
        Self {
            sync_on_finalize: false,
            ..Default::default()
        }
    }

    /// Larger encode buffer for profile-mode scans
    pub fn profile_data() -> Self {
        Self {
            encode_buffer_capacity: 4 * 1024 * 1024,
            ..Default::default()
        }
    }

    /// Use a custom prefix for temporary files
    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    /// Use a custom suffix for temporary files
    pub fn with_temp_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.temp_suffix = suffix.into();
        self
    }
}
