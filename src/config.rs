//! TOML configuration for storage settings.
//!
//! Pipelines pick their backend and store settings from a config file rather
//! than code:
//!
//! ```toml
//! # mzstore.toml
//! [storage]
//! backend = "file"              # or "memory"
//! working_directory = "/scratch/mzstore"
//! temp_prefix = "mzstore_"
//! temp_suffix = ".tmp"
//! sync_on_finalize = true
//! ```
//!
//! Load it with [`Config::from_file`] and build a selector with
//! [`ContainerFactory::from_config`](crate::factory::ContainerFactory::from_config).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::container::BackendKind;
use crate::store::StoreConfig;

/// Root configuration structure for mzstore.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// The `[storage]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Backend used by every container of the run.
    pub backend: BackendKind,

    /// Directory for store files; the system temp directory when unset.
    pub working_directory: Option<PathBuf>,

    /// Prefix of temporary store files.
    pub temp_prefix: String,

    /// Suffix of temporary store files.
    pub temp_suffix: String,

    /// Fsync store files before marking them durable.
    pub sync_on_finalize: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            backend: BackendKind::default(),
            working_directory: None,
            temp_prefix: store.temp_prefix,
            temp_suffix: store.temp_suffix,
            sync_on_finalize: store.sync_on_finalize,
        }
    }
}

impl StorageConfig {
    /// Store configuration described by this table.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            temp_prefix: self.temp_prefix.clone(),
            temp_suffix: self.temp_suffix.clone(),
            sync_on_finalize: self.sync_on_finalize,
            ..StoreConfig::default()
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
