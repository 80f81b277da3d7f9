//! Backend selection through `ContainerFactory` and TOML configuration

use mzstore::config::Config;
use mzstore::container::{BackendKind, ContainerError};
use mzstore::factory::{Capability, ContainerFactory};
use mzstore::record::{Feature, FeatureSet, IonMode, ScanBuilder, TracePoint};
use tempfile::tempdir;

fn feature(id: i64, rt: f64) -> Feature {
    Feature::from_trace(id, vec![TracePoint::new(rt, 300.0, 1000.0)]).expect("trace")
}

#[test]
fn test_file_factory_creates_file_backed_containers() -> Result<(), ContainerError> {
    let dir = tempdir()?;
    let factory = ContainerFactory::file(Some(dir.path().to_path_buf()));
    assert_eq!(factory.backend(), BackendKind::File);

    let mut scans = factory.new_scan_container("run01")?;
    let features = factory.new_feature_container("run01-features", IonMode::Positive)?;
    let sets = factory.new_feature_set_container("run01-sets", IonMode::Positive)?;

    for container_dir in [
        scans.working_directory(),
        features.working_directory(),
        sets.working_directory(),
    ] {
        assert_eq!(container_dir, Some(dir.path()));
    }
    assert_eq!(features.ion_mode(), IonMode::Positive);

    scans.add(ScanBuilder::new(0).retention_time(1.0).add_point(200.0, 5.0).build())?;
    scans.finalize(None)?;
    let data_file = scans.data_file()?;
    assert!(data_file.starts_with(dir.path()));
    assert!(data_file.exists());
    Ok(())
}

#[test]
fn test_memory_factory_ignores_working_directory() -> Result<(), ContainerError> {
    let factory = ContainerFactory::memory();
    assert_eq!(factory.backend(), BackendKind::Memory);

    let mut sets = factory.new_feature_set_container("sets", IonMode::Negative)?;
    sets.add(FeatureSet::new(0, vec![feature(0, 10.0), feature(1, 11.0)]))?;
    sets.finalize(None)?;

    assert_eq!(sets.backend(), BackendKind::Memory);
    assert!(sets.working_directory().is_none());
    assert!(matches!(
        sets.data_file(),
        Err(ContainerError::NotFileBacked { .. })
    ));
    assert_eq!(sets.base_peaks().len(), 1);
    Ok(())
}

#[test]
fn test_unregistered_capability() {
    let factory = ContainerFactory::unregistered(BackendKind::Memory);
    assert!(!factory.is_registered(Capability::ScanCollection));

    match factory.new_scan_container("run") {
        Err(ContainerError::Unregistered {
            capability,
            backend,
        }) => {
            assert_eq!(capability, Capability::ScanCollection);
            assert_eq!(backend, BackendKind::Memory);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("unregistered capability produced a container"),
    }
}

#[test]
fn test_registered_constructor_replaces_builtin() -> Result<(), ContainerError> {
    // file factory that keeps feature collections resident
    let factory = ContainerFactory::file(None).register_feature(|args| {
        Ok(Box::new(mzstore::container::MemoryFeatureContainer::new(
            args.id,
            args.ion_mode,
        )))
    });
    assert!(factory.is_registered(Capability::FeatureCollection));

    let mut features = factory.new_feature_container("resident", IonMode::Negative)?;
    features.add(feature(7, 3.0))?;
    assert_eq!(features.backend(), BackendKind::Memory);
    assert_eq!(features.get(7).map(|f| f.id), Some(7));
    Ok(())
}

#[test]
fn test_factory_from_toml() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let toml = format!(
        r#"
[storage]
backend = "file"
working_directory = "{}"
temp_prefix = "stage2_"
sync_on_finalize = false
"#,
        dir.path().display()
    );
    let config = Config::from_str(&toml)?;
    let factory = ContainerFactory::from_config(&config.storage);
    assert_eq!(factory.working_directory(), Some(dir.path()));

    let mut features = factory.new_feature_container("features", IonMode::Positive)?;
    features.add(feature(0, 1.0))?;
    let name = features
        .data_file()?
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .unwrap_or_default();
    assert!(name.starts_with("stage2_"), "unexpected file name {name}");

    let memory = Config::from_str("[storage]\nbackend = \"memory\"\n")?;
    let factory = ContainerFactory::from_config(&memory.storage);
    assert_eq!(factory.backend(), BackendKind::Memory);
    assert!(factory.working_directory().is_none());
    Ok(())
}
