use super::*;
use crate::record::{ExtendableRange, ScanBuilder, StoredRecord, TracePoint};
use crate::store::{StoreConfig, StoreError};
use tempfile::tempdir;

fn scan(index: i64, msn: Msn, rt: f64, points: &[(f64, f64)]) -> Scan {
    ScanBuilder::new(index)
        .msn(msn)
        .retention_time(rt)
        .ion_mode(IonMode::Positive)
        .data(points.iter().map(|&p| XyPoint::from(p)).collect())
        .build()
}

fn feature(id: i64, rt: f64, mz: f64, intensity: f64) -> Feature {
    Feature::from_trace(
        id,
        vec![
            TracePoint::new(rt - 1.0, mz, intensity / 2.0),
            TracePoint::new(rt, mz, intensity),
            TracePoint::new(rt + 1.0, mz, intensity / 4.0),
        ],
    )
    .expect("non-empty trace")
}

#[test]
fn test_memory_container_has_no_data_file() {
    let container = MemoryScanContainer::new("mem");
    assert_eq!(container.backend(), BackendKind::Memory);
    assert!(container.working_directory().is_none());
    assert!(matches!(
        container.data_file(),
        Err(ContainerError::NotFileBacked { .. })
    ));
}

#[test]
fn test_removed_memory_container_still_has_no_data_file() {
    let mut container = MemoryFeatureContainer::new("mem", IonMode::Positive);
    assert!(container.remove_all());
    assert!(matches!(
        container.data_file(),
        Err(ContainerError::NotFileBacked { .. })
    ));
}

#[test]
fn test_file_container_lives_in_working_directory() -> Result<(), ContainerError> {
    let dir = tempdir()?;
    let container = FileScanContainer::with_config("run", Some(dir.path()), &StoreConfig::fast())?;
    assert_eq!(container.backend(), BackendKind::File);
    assert_eq!(container.working_directory(), Some(dir.path()));
    assert!(container.data_file()?.starts_with(dir.path()));
    Ok(())
}

#[test]
fn test_add_after_finalize_is_rejected() -> Result<(), ContainerError> {
    let mut container = MemoryFeatureContainer::new("features", IonMode::Negative);
    container.add(feature(1, 10.0, 200.0, 100.0))?;
    container.finalize(None)?;

    assert!(container.is_finalized());
    assert!(matches!(
        container.add(feature(2, 11.0, 201.0, 50.0)),
        Err(ContainerError::ReadOnly { .. })
    ));
    // finalizing again is a no-op
    let at = container.finalized_at();
    container.finalize(None)?;
    assert_eq!(container.finalized_at(), at);
    assert_eq!(container.len(), 1);
    Ok(())
}

#[test]
fn test_scan_levels_are_tracked() -> Result<(), ContainerError> {
    let mut container = MemoryScanContainer::new("levels");
    container.add_all(vec![
        scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0)]),
        scan(1, Msn::Ms2, 1.5, &[(80.0, 2.0)]),
        scan(2, Msn::Ms1, 2.0, &[(300.0, 7.0)]),
        scan(3, Msn::Ms2, 2.5, &[(90.0, 3.0)]),
        scan(4, Msn::Ms2, 3.0, &[(70.0, 1.0)]),
    ])?;

    assert_eq!(container.len(), 5);
    assert_eq!(container.level_len(Msn::Ms1), 2);
    assert_eq!(container.level_len(Msn::Ms2), 3);
    assert_eq!(container.level_len(Msn::Ms3), 0);

    let levels: Vec<Msn> = container.scan_levels().iter().map(|l| l.msn).collect();
    assert_eq!(levels, vec![Msn::Ms1, Msn::Ms2]);

    let ms1 = container.scan_level(Msn::Ms1).expect("MS1 level");
    assert_eq!(ms1.rt_range, ExtendableRange::new(1.0, 2.0));
    assert_eq!(ms1.mz_range, ExtendableRange::new(100.0, 300.0));
    assert_eq!(ms1.ion_mode, IonMode::Positive);

    let ms2_ids: Vec<i64> = container.level_iter(Msn::Ms2).map(|s| s.index).collect();
    assert_eq!(ms2_ids, vec![1, 3, 4]);
    assert_eq!(container.level_iter(Msn::Ms4).count(), 0);

    assert_eq!(container.get_by_position(2).map(|s| s.index), Some(2));
    assert!(container.get_by_position(5).is_none());
    Ok(())
}

#[test]
fn test_readding_scan_moves_it_between_levels() -> Result<(), ContainerError> {
    let mut container = MemoryScanContainer::new("dup");
    container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0)]))?;
    container.add(scan(0, Msn::Ms2, 1.0, &[(100.0, 5.0)]))?;

    assert_eq!(container.len(), 1);
    assert_eq!(container.level_len(Msn::Ms1), 0);
    assert_eq!(container.level_len(Msn::Ms2), 1);
    assert_eq!(container.get(0).map(|s| s.msn), Some(Msn::Ms2));

    // the emptied level is gone
    let levels: Vec<Msn> = container.scan_levels().iter().map(|l| l.msn).collect();
    assert_eq!(levels, vec![Msn::Ms2]);
    assert!(container.scan_level(Msn::Ms1).is_none());

    container.finalize(None)?;
    assert!(container.tic_chromatogram(Msn::Ms1).is_none());
    let tic2 = container.tic_chromatogram(Msn::Ms2).expect("MS2 TIC");
    assert_eq!(tic2.data, vec![XyPoint::new(1.0, 5.0)]);
    let bpc = container.base_peak_chromatogram().expect("BPC");
    assert!(bpc.is_empty());
    Ok(())
}

#[test]
fn test_readding_scan_within_a_level_replaces_its_contribution() -> Result<(), ContainerError> {
    let mut container = MemoryScanContainer::new("dup");
    container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0), (900.0, 8.0)]))?;
    container.add(scan(1, Msn::Ms1, 2.0, &[(200.0, 3.0)]))?;
    container.add(scan(0, Msn::Ms1, 1.5, &[(150.0, 4.0)]))?;

    let ms1 = container.scan_level(Msn::Ms1).expect("MS1 level");
    assert_eq!(ms1.rt_range, ExtendableRange::new(1.5, 2.0));
    assert_eq!(ms1.mz_range, ExtendableRange::new(150.0, 200.0));
    let ids: Vec<i64> = container.level_iter(Msn::Ms1).map(|s| s.index).collect();
    assert_eq!(ids, vec![0, 1]);

    container.finalize(None)?;
    let tic = container.tic_chromatogram(Msn::Ms1).expect("TIC");
    assert_eq!(tic.data, vec![XyPoint::new(1.5, 4.0), XyPoint::new(2.0, 3.0)]);
    let bpc = container.base_peak_chromatogram().expect("BPC");
    assert_eq!(bpc.data, vec![XyPoint::new(1.5, 4.0), XyPoint::new(2.0, 3.0)]);
    Ok(())
}

#[test]
fn test_empty_ms1_scan_has_no_base_peak_point() -> Result<(), ContainerError> {
    let mut container = MemoryScanContainer::new("empty");
    container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 10.0)]))?;
    container.add(scan(1, Msn::Ms1, 2.0, &[]))?;
    container.finalize(None)?;

    let bpc = container.base_peak_chromatogram().expect("BPC");
    assert_eq!(bpc.data, vec![XyPoint::new(1.0, 10.0)]);
    // the empty scan still has a zero TIC point
    let tic = container.tic_chromatogram(Msn::Ms1).expect("TIC");
    assert_eq!(tic.data, vec![XyPoint::new(1.0, 10.0), XyPoint::new(2.0, 0.0)]);
    Ok(())
}

/// Memory backend whose first seal fails
#[derive(Debug)]
struct FailingSeal {
    failures: u32,
}

impl Backend for FailingSeal {
    const KIND: BackendKind = BackendKind::Memory;

    fn put<R: StoredRecord>(&mut self, record: R) -> Slot<R> {
        MemoryBackend.put(record)
    }

    fn store(&self) -> Option<&crate::store::RecordStore> {
        None
    }

    fn seal(&mut self) -> Result<(), StoreError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(StoreError::NotTemporary("unsealable".into()));
        }
        Ok(())
    }

    fn purge(&mut self) -> bool {
        true
    }

    fn working_directory(&self) -> Option<&std::path::Path> {
        None
    }

    fn data_file(&self) -> Option<&std::path::Path> {
        None
    }
}

#[test]
fn test_failed_finalize_keeps_accumulating_aggregates() -> Result<(), ContainerError> {
    let mut container = ScanCollection::with_backend("retry", FailingSeal { failures: 1 });
    container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0)]))?;

    assert!(matches!(
        container.finalize(None),
        Err(ContainerError::StoreError(_))
    ));
    assert!(!container.is_finalized());
    assert!(container.base_peak_chromatogram().is_none());

    container.add(scan(1, Msn::Ms1, 2.0, &[(200.0, 7.0)]))?;
    container.finalize(None)?;

    let tic = container.tic_chromatogram(Msn::Ms1).expect("TIC");
    assert_eq!(tic.data, vec![XyPoint::new(1.0, 5.0), XyPoint::new(2.0, 7.0)]);
    let bpc = container.base_peak_chromatogram().expect("BPC");
    assert_eq!(bpc.len(), 2);
    Ok(())
}

#[test]
fn test_aggregates_only_after_finalize() -> Result<(), ContainerError> {
    let mut container = MemoryScanContainer::new("agg");
    container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0), (200.0, 9.0)]))?;
    container.add(scan(1, Msn::Ms2, 1.2, &[(50.0, 4.0)]))?;
    assert!(container.base_peak_chromatogram().is_none());
    assert!(container.tic_chromatogram(Msn::Ms1).is_none());

    let when = chrono::Utc::now();
    container.finalize(Some(when))?;
    assert_eq!(container.info().date, Some(when));

    let bpc = container.base_peak_chromatogram().expect("BPC");
    assert_eq!(bpc.data, vec![XyPoint::new(1.0, 9.0)]);
    let tic2 = container.tic_chromatogram(Msn::Ms2).expect("MS2 TIC");
    assert_eq!(tic2.data, vec![XyPoint::new(1.2, 4.0)]);
    assert!(container.tic_chromatogram(Msn::Ms3).is_none());
    Ok(())
}

#[test]
fn test_batch_releases_file_handle() -> Result<(), ContainerError> {
    let dir = tempdir()?;
    let mut container = FileFeatureContainer::with_config(
        "features",
        IonMode::Positive,
        Some(dir.path()),
        &StoreConfig::fast(),
    )?;
    container.add_all(vec![feature(1, 5.0, 150.0, 10.0), feature(2, 6.0, 151.0, 20.0)])?;
    // single adds after a batch reopen the store transparently
    container.add(feature(3, 7.0, 152.0, 30.0))?;

    assert_eq!(container.len(), 3);
    assert_eq!(container.get(2).map(|f| f.intensity), Some(20.0));
    assert_eq!(container.ion_mode(), IonMode::Positive);
    Ok(())
}

#[test]
fn test_time_queries() -> Result<(), ContainerError> {
    let mut container = MemoryFeatureContainer::new("rt", IonMode::Positive);
    container.add_all(vec![
        feature(1, 10.0, 100.0, 1.0),
        feature(2, 20.0, 100.0, 1.0),
        feature(3, 30.0, 100.0, 1.0),
    ])?;

    assert_eq!(container.ids_in_time_range(10.0, 20.0), vec![1, 2]);
    assert!(container.ids_in_time_range(21.0, 29.0).is_empty());
    assert_eq!(container.nearest_id(25.0), Some(2));
    assert_eq!(container.nearest_id(26.0), Some(3));
    assert_eq!(container.time_of(3), Some(30.0));
    assert_eq!(container.time_of(4), None);
    Ok(())
}

#[test]
fn test_feature_set_summaries() -> Result<(), ContainerError> {
    let mut container = MemoryFeatureSetContainer::new("sets", IonMode::Positive);
    let first = FeatureSet::new(
        0,
        vec![feature(1, 10.0, 300.0, 50.0), feature(2, 10.0, 150.0, 90.0)],
    );
    let second = FeatureSet::new(1, vec![feature(3, 20.0, 410.0, 10.0)]);
    container.add_all(vec![first, second, FeatureSet::new(2, Vec::new())])?;

    assert_eq!(
        container.base_peaks(),
        &[XyPoint::new(10.0, 150.0), XyPoint::new(20.0, 410.0)]
    );
    let ids: Vec<i64> = container.features().map(|f| f.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_remove_all_clears_everything() -> Result<(), ContainerError> {
    let dir = tempdir()?;
    let mut container =
        FileScanContainer::with_config("gone", Some(dir.path()), &StoreConfig::fast())?;
    container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0)]))?;
    container.finalize(None)?;
    let path = container.data_file()?.to_path_buf();

    assert!(container.remove_all());
    assert!(!path.exists());
    assert!(container.is_empty());
    assert!(container.get(0).is_none());
    assert_eq!(container.iter().count(), 0);
    assert_eq!(container.level_iter(Msn::Ms1).count(), 0);
    assert!(container.base_peak_chromatogram().is_none());
    assert!(matches!(container.data_file(), Err(ContainerError::Removed { .. })));
    assert!(matches!(
        container.add(scan(1, Msn::Ms1, 2.0, &[])),
        Err(ContainerError::Removed { .. })
    ));
    Ok(())
}

#[test]
fn test_manifest_requires_finalize() -> Result<(), ContainerError> {
    let dir = tempdir()?;
    let container = FileFeatureSetContainer::with_config(
        "sets",
        IonMode::Negative,
        Some(dir.path()),
        &StoreConfig::fast(),
    )?;
    assert!(matches!(
        container.manifest(),
        Err(ContainerError::NotFinalized { .. })
    ));
    Ok(())
}

#[test]
fn test_dropped_open_container_deletes_its_file() -> Result<(), ContainerError> {
    let dir = tempdir()?;
    let path = {
        let mut container =
            FileScanContainer::with_config("tmp", Some(dir.path()), &StoreConfig::fast())?;
        container.add(scan(0, Msn::Ms1, 1.0, &[(100.0, 5.0)]))?;
        container.data_file()?.to_path_buf()
    };
    assert!(!path.exists());
    Ok(())
}
