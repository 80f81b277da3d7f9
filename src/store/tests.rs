use super::*;
use crate::record::{
    Chromatogram, ChromatogramKind, Feature, Msn, Record, Scan, ScanBuilder, TracePoint, XyPoint,
};
use std::fs::OpenOptions;
use std::io::Write;
use tempfile::tempdir;

fn sample_scan(index: i64) -> Scan {
    ScanBuilder::new(index)
        .retention_time(index as f64 * 1.5)
        .add_point(100.0, 10.0)
        .add_point(200.0, 30.0)
        .build()
}

#[test]
fn test_write_read_round_trip() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;

    let scan = sample_scan(1);
    let handle = store.write(&scan);
    assert_eq!(handle, Handle::from_offset(0));
    assert_eq!(store.read::<Scan>(handle), Some(scan));
    Ok(())
}

#[test]
fn test_offsets_follow_frame_lengths() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;

    let scans: Vec<Scan> = (0..5).map(sample_scan).collect();
    let handles: Vec<Handle> = scans.iter().map(|s| store.write(s)).collect();

    for (i, pair) in handles.windows(2).enumerate() {
        let expected = LENGTH_PREFIX as i64 + encoded_len(&scans[i])? as i64;
        assert_eq!(pair[1].raw() - pair[0].raw(), expected);
    }
    assert_eq!(store.read_many::<Scan>(&handles), scans.into_iter().map(Some).collect::<Vec<_>>());
    Ok(())
}

#[test]
fn test_sentinel_never_touches_file() {
    let store =
        RecordStore::open_existing("/nonexistent/mzstore/never.bin", &StoreConfig::default());
    assert_eq!(store.read::<Scan>(Handle::INVALID), None);
    assert!(matches!(store.read_record(Handle::INVALID), Ok(None)));
    assert!(!store.is_open());
}

#[test]
fn test_kind_mismatch_reads_absent() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;

    let handle = store.write(&sample_scan(0));
    assert_eq!(store.read::<Feature>(handle), None);
    assert!(matches!(store.read_record(handle)?, Some(Record::Scan(_))));
    Ok(())
}

#[test]
fn test_mixed_kinds_in_one_file() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;

    let feature = Feature::from_trace(9, vec![TracePoint::new(1.0, 300.0, 5.0)]).expect("feature");
    let chrom = Chromatogram::new(
        ChromatogramKind::TotalIon,
        Msn::Ms1,
        vec![XyPoint::new(1.0, 2.0)],
    );

    let h1 = store.write(&feature);
    let h2 = store.write(&chrom);
    assert_eq!(store.read::<Feature>(h1), Some(feature));
    assert_eq!(store.read::<Chromatogram>(h2), Some(chrom));
    Ok(())
}

#[test]
fn test_read_after_close_uses_transient_handle() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;
    let scan = sample_scan(3);
    let handle = store.write(&scan);

    store.close();
    assert!(!store.is_open());
    assert_eq!(store.read::<Scan>(handle), Some(scan));
    assert!(!store.is_open());

    // a later write reopens the file and appends
    let next = store.write(&sample_scan(4));
    assert!(next > handle);
    assert!(store.is_open());
    Ok(())
}

#[test]
fn test_out_of_range_handle_reads_absent() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;
    store.write(&sample_scan(0));

    assert_eq!(store.read::<Scan>(Handle::from_offset(1 << 20)), None);
    assert!(matches!(
        store.read_record(Handle::from_offset(1 << 20)),
        Err(StoreError::TruncatedFrame { .. })
    ));
    Ok(())
}

#[test]
fn test_drop_deletes_temporary_file() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let path = {
        let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;
        store.write(&sample_scan(0));
        assert!(store.is_temporary());
        store.path().to_path_buf()
    };
    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_persist_survives_drop() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let config = StoreConfig::default().with_temp_prefix("run42_");
    let (path, handle) = {
        let mut store = RecordStore::create_in(dir.path(), &config)?;
        let handle = store.write(&sample_scan(0));
        store.persist()?;
        assert!(!store.is_temporary());
        assert!(!store.is_open());
        assert!(matches!(store.persist(), Err(StoreError::NotTemporary(_))));
        (store.path().to_path_buf(), handle)
    };

    assert!(path.exists());
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name.starts_with("run42_"));
    assert!(name.ends_with(".tmp"));

    let reopened = RecordStore::open_existing(&path, &config);
    assert_eq!(reopened.read::<Scan>(handle), Some(sample_scan(0)));
    assert_eq!(reopened.working_directory(), Some(dir.path()));
    Ok(())
}

#[test]
fn test_remove_deletes_file() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;
    store.write(&sample_scan(0));
    store.persist()?;

    let path = store.path().to_path_buf();
    assert!(store.remove());
    assert!(!path.exists());
    // already gone
    assert!(store.remove());
    Ok(())
}

#[test]
fn test_scan_frames_reports_truncated_tail() -> Result<(), StoreError> {
    let dir = tempdir()?;
    let mut store = RecordStore::create_in(dir.path(), &StoreConfig::fast())?;
    let h0 = store.write(&sample_scan(0));
    let h1 = store.write(&sample_scan(1));
    store.close();

    let clean = store.scan_frames()?;
    assert_eq!(clean.frames.len(), 2);
    assert_eq!(clean.frames[0].handle, h0);
    assert_eq!(clean.frames[1].handle, h1);
    assert_eq!(clean.truncated_at, None);

    let tail = store.size_bytes()?;
    {
        let mut file = OpenOptions::new().append(true).open(store.path())?;
        // length prefix promising more bytes than follow
        file.write_all(&[0, 0, 1, 0, 42])?;
    }

    let scan = store.scan_frames()?;
    assert_eq!(scan.frames.len(), 2);
    assert_eq!(scan.truncated_at, Some(tail));
    assert_eq!(store.read::<Scan>(Handle::from_offset(tail)), None);
    assert_eq!(store.read::<Scan>(h1), Some(sample_scan(1)));
    Ok(())
}

#[test]
fn test_handle_sentinel() {
    assert!(!Handle::INVALID.is_valid());
    assert_eq!(Handle::INVALID.offset(), None);
    assert_eq!(Handle::default(), Handle::INVALID);
    assert_eq!(Handle::from_offset(u64::MAX), Handle::INVALID);
    assert_eq!(Handle::from_raw(12).offset(), Some(12));
    assert_eq!(Handle::from_offset(8).to_string(), "@8");
}
