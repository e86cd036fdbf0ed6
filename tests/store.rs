use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use cms_provider_sync::error::SyncError;
use cms_provider_sync::store::{Snapshot, Store};

fn temp_store(temp: &tempfile::TempDir) -> Store {
    Store::new(Utf8PathBuf::from_path_buf(temp.path().join("out")).unwrap())
}

#[test]
fn missing_sidecar_loads_empty() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp);
    assert!(store.load_snapshot().unwrap().is_empty());
}

#[test]
fn snapshot_round_trip() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp);

    let mut snapshot = Snapshot::new();
    snapshot.insert("xubh-q36u.csv".to_string(), "2021-07-21".to_string());
    snapshot.insert("yv7e-xnih.csv".to_string(), "2023-07-14T00:00:00".to_string());

    store.save_snapshot(&snapshot).unwrap();
    assert_eq!(store.load_snapshot().unwrap(), snapshot);
}

#[test]
fn save_replaces_prior_content_wholesale() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp);

    let mut first = Snapshot::new();
    first.insert("a.csv".to_string(), "2021-01-01".to_string());
    first.insert("b.csv".to_string(), "2021-01-01".to_string());
    store.save_snapshot(&first).unwrap();

    let mut second = Snapshot::new();
    second.insert("a.csv".to_string(), "2021-02-01".to_string());
    store.save_snapshot(&second).unwrap();

    assert_eq!(store.load_snapshot().unwrap(), second);
}

#[test]
fn malformed_sidecar_is_fatal() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp);
    store.ensure_output_root().unwrap();
    std::fs::write(store.metadata_path().as_std_path(), b"not json").unwrap();

    let err = store.load_snapshot().unwrap_err();
    assert_matches!(err, SyncError::MetadataParse(_));
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp);
    let path = store.dataset_path("a.csv");

    Store::write_bytes_atomic(&path, b"old").unwrap();
    Store::write_bytes_atomic(&path, b"new").unwrap();

    assert_eq!(std::fs::read_to_string(path.as_std_path()).unwrap(), "new");
}
