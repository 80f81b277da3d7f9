//! # Backend Selector
//!
//! Pipeline stages create their output containers through a
//! [`ContainerFactory`] instead of naming a concrete type. Switching a whole
//! pipeline between spilling to disk and staying resident is then a matter of
//! handing the first stage a different factory:
//!
//! ```rust,no_run
//! use mzstore::factory::ContainerFactory;
//! use mzstore::record::IonMode;
//!
//! let factory = if std::env::var_os("MZSTORE_IN_MEMORY").is_some() {
//!     ContainerFactory::memory()
//! } else {
//!     ContainerFactory::file(Some("/scratch/run01".into()))
//! };
//!
//! let scans = factory.new_scan_container("run01")?;
//! let features = factory.new_feature_container("run01-features", IonMode::Positive)?;
//! # Ok::<(), mzstore::container::ContainerError>(())
//! ```
//!
//! Each factory holds one constructor per capability for its backend. The
//! built-in constructors can be replaced with `register_*`; a capability
//! without a constructor fails with [`ContainerError::Unregistered`].

use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use crate::config::StorageConfig;
use crate::container::{
    BackendKind, ContainerError, FeatureContainer, FeatureSetContainer, FileFeatureContainer,
    FileFeatureSetContainer, FileScanContainer, MemoryFeatureContainer, MemoryFeatureSetContainer,
    MemoryScanContainer, ScanContainer,
};
use crate::record::IonMode;
use crate::store::StoreConfig;

/// Abstract container kinds a factory can construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// [`ScanContainer`]
    ScanCollection,
    /// [`FeatureContainer`]
    FeatureCollection,
    /// [`FeatureSetContainer`]
    FeatureSetCollection,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ScanCollection => f.write_str("scan collection"),
            Capability::FeatureCollection => f.write_str("feature collection"),
            Capability::FeatureSetCollection => f.write_str("feature-set collection"),
        }
    }
}

/// Arguments forwarded to a container constructor
#[derive(Debug, Clone, Copy)]
pub struct ContainerArgs<'a> {
    /// Container identifier
    pub id: &'a str,
    /// Ion mode (ignored by scan collections)
    pub ion_mode: IonMode,
    /// Working directory; always `None` for the memory backend
    pub working_directory: Option<&'a Path>,
    /// Store configuration
    pub store_config: &'a StoreConfig,
}

/// Constructor for scan collections
pub type ScanConstructor = fn(&ContainerArgs<'_>) -> Result<Box<dyn ScanContainer>, ContainerError>;
/// Constructor for feature collections
pub type FeatureConstructor =
    fn(&ContainerArgs<'_>) -> Result<Box<dyn FeatureContainer>, ContainerError>;
/// Constructor for feature-set collections
pub type FeatureSetConstructor =
    fn(&ContainerArgs<'_>) -> Result<Box<dyn FeatureSetContainer>, ContainerError>;

fn file_scan(args: &ContainerArgs<'_>) -> Result<Box<dyn ScanContainer>, ContainerError> {
    let container =
        FileScanContainer::with_config(args.id, args.working_directory, args.store_config)?;
    Ok(Box::new(container))
}

fn file_feature(args: &ContainerArgs<'_>) -> Result<Box<dyn FeatureContainer>, ContainerError> {
    let container = FileFeatureContainer::with_config(
        args.id,
        args.ion_mode,
        args.working_directory,
        args.store_config,
    )?;
    Ok(Box::new(container))
}

fn file_feature_set(
    args: &ContainerArgs<'_>,
) -> Result<Box<dyn FeatureSetContainer>, ContainerError> {
    let container = FileFeatureSetContainer::with_config(
        args.id,
        args.ion_mode,
        args.working_directory,
        args.store_config,
    )?;
    Ok(Box::new(container))
}

fn memory_scan(args: &ContainerArgs<'_>) -> Result<Box<dyn ScanContainer>, ContainerError> {
    Ok(Box::new(MemoryScanContainer::new(args.id)))
}

fn memory_feature(args: &ContainerArgs<'_>) -> Result<Box<dyn FeatureContainer>, ContainerError> {
    Ok(Box::new(MemoryFeatureContainer::new(args.id, args.ion_mode)))
}

fn memory_feature_set(
    args: &ContainerArgs<'_>,
) -> Result<Box<dyn FeatureSetContainer>, ContainerError> {
    Ok(Box::new(MemoryFeatureSetContainer::new(args.id, args.ion_mode)))
}

/// Creates containers of every capability for one backend
#[derive(Debug, Clone)]
pub struct ContainerFactory {
    backend: BackendKind,
    working_directory: Option<PathBuf>,
    store_config: StoreConfig,
    scan: Option<ScanConstructor>,
    feature: Option<FeatureConstructor>,
    feature_set: Option<FeatureSetConstructor>,
}

impl ContainerFactory {
    /// Factory with no constructors registered
    pub fn unregistered(backend: BackendKind) -> Self {
        Self {
            backend,
            working_directory: None,
            store_config: StoreConfig::default(),
            scan: None,
            feature: None,
            feature_set: None,
        }
    }

    /// File-backed factory writing into `working_directory`
    ///
    /// `None` uses the system temp directory.
    pub fn file(working_directory: Option<PathBuf>) -> Self {
        Self {
            working_directory,
            scan: Some(file_scan),
            feature: Some(file_feature),
            feature_set: Some(file_feature_set),
            ..Self::unregistered(BackendKind::File)
        }
    }

    /// Memory-backed factory
    pub fn memory() -> Self {
        Self {
            scan: Some(memory_scan),
            feature: Some(memory_feature),
            feature_set: Some(memory_feature_set),
            ..Self::unregistered(BackendKind::Memory)
        }
    }

    /// Factory for the backend and store settings of a loaded configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        let factory = match config.backend {
            BackendKind::File => Self::file(config.working_directory.clone()),
            BackendKind::Memory => Self::memory(),
        };
        factory.with_store_config(config.store_config())
    }

    /// Use `config` for stores created by this factory
    pub fn with_store_config(mut self, config: StoreConfig) -> Self {
        self.store_config = config;
        self
    }

    /// Replace the scan collection constructor
    pub fn register_scan(mut self, constructor: ScanConstructor) -> Self {
        self.scan = Some(constructor);
        self
    }

    /// Replace the feature collection constructor
    pub fn register_feature(mut self, constructor: FeatureConstructor) -> Self {
        self.feature = Some(constructor);
        self
    }

    /// Replace the feature-set collection constructor
    pub fn register_feature_set(mut self, constructor: FeatureSetConstructor) -> Self {
        self.feature_set = Some(constructor);
        self
    }

    /// Backend of every container this factory creates
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    /// Working directory handed to file-backed constructors
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    /// Whether a constructor is registered for `capability`
    pub fn is_registered(&self, capability: Capability) -> bool {
        match capability {
            Capability::ScanCollection => self.scan.is_some(),
            Capability::FeatureCollection => self.feature.is_some(),
            Capability::FeatureSetCollection => self.feature_set.is_some(),
        }
    }

    fn args<'a>(&'a self, id: &'a str, ion_mode: IonMode) -> ContainerArgs<'a> {
        let working_directory = match self.backend {
            BackendKind::File => self.working_directory.as_deref(),
            BackendKind::Memory => None,
        };
        ContainerArgs {
            id,
            ion_mode,
            working_directory,
            store_config: &self.store_config,
        }
    }

    fn missing(&self, capability: Capability) -> ContainerError {
        ContainerError::Unregistered {
            capability,
            backend: self.backend,
        }
    }

    /// Create an empty scan collection
    pub fn new_scan_container(&self, id: &str) -> Result<Box<dyn ScanContainer>, ContainerError> {
        let constructor = self
            .scan
            .ok_or_else(|| self.missing(Capability::ScanCollection))?;
        debug!("Creating {} scan collection '{}'", self.backend, id);
        constructor(&self.args(id, IonMode::Unknown))
    }

    /// Create an empty feature collection
    pub fn new_feature_container(
        &self,
        id: &str,
        ion_mode: IonMode,
    ) -> Result<Box<dyn FeatureContainer>, ContainerError> {
        let constructor = self
            .feature
            .ok_or_else(|| self.missing(Capability::FeatureCollection))?;
        debug!("Creating {} feature collection '{}'", self.backend, id);
        constructor(&self.args(id, ion_mode))
    }

    /// Create an empty feature-set collection
    pub fn new_feature_set_container(
        &self,
        id: &str,
        ion_mode: IonMode,
    ) -> Result<Box<dyn FeatureSetContainer>, ContainerError> {
        let constructor = self
            .feature_set
            .ok_or_else(|| self.missing(Capability::FeatureSetCollection))?;
        debug!("Creating {} feature-set collection '{}'", self.backend, id);
        constructor(&self.args(id, ion_mode))
    }
}
