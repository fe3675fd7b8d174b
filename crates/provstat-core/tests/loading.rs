// crates/provstat-core/tests/loading.rs

use provstat_core::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), target).unwrap();
        }
    }
}

#[test]
fn load_is_memoized_until_invalidated() {
    let config = SourceConfig::with_data_dir(fixtures_dir());

    let first = Dataset::load(&config).unwrap();
    let second = Dataset::load(&config).unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    assert!(Dataset::invalidate(&config));
    let third = Dataset::load(&config).unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.stats(), third.stats());
}

#[test]
fn cached_dataset_ignores_file_changes_until_invalidated() {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&fixtures_dir(), dir.path());
    let config = SourceConfig::with_data_dir(dir.path());

    let before = Dataset::load(&config).unwrap();
    fs::remove_file(dir.path().join("dataset/Penduduk.csv")).unwrap();

    let cached = Dataset::load(&config).unwrap();
    assert!(Arc::ptr_eq(&before, &cached));

    Dataset::invalidate(&config);
    let err = Dataset::load(&config).unwrap_err();
    assert!(matches!(err, StatError::NotFound(_)));
}

#[test]
fn missing_source_aborts_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let config = SourceConfig::with_data_dir(dir.path());

    match Dataset::load_uncached(&config) {
        Err(StatError::NotFound(msg)) => assert!(msg.contains("Dataset not found at")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn missing_geojson_is_fatal_too() {
    let dir = tempfile::tempdir().unwrap();
    copy_dir(&fixtures_dir().join("dataset"), &dir.path().join("dataset"));
    let config = SourceConfig::with_data_dir(dir.path());

    let err = Dataset::load_uncached(&config).unwrap_err();
    match err {
        StatError::NotFound(msg) => assert!(msg.contains("indonesia-prov.geojson")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn config_file_points_at_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("provstat.json");
    let json = serde_json::json!({
        "sources": { "data_dir": fixtures_dir() },
        "view": { "highlight_mode": "none", "top_n": 3 }
    });
    fs::write(&path, json.to_string()).unwrap();

    let cfg = DashboardConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.view.top_n, 3);
    let ds = Dataset::load_uncached(&cfg.sources).unwrap();
    assert_eq!(ds.records.len(), 5);

    assert!(matches!(
        DashboardConfig::from_json_file(dir.path().join("absent.json")),
        Err(StatError::NotFound(_))
    ));
}
