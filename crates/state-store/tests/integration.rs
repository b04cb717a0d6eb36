//! Snapshot persistence and flusher behaviour against real files.

use std::sync::Arc;
use std::time::Duration;

use lsfbeat_state_store::{
    FlushTarget, JobStateStore, PropertyCache, PropertySnapshot, SnapshotFlusher,
};

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

fn props(user: &str) -> PropertySnapshot {
    let mut snap = PropertySnapshot::new();
    snap.insert("user_name".to_string(), user.to_string());
    snap.insert("queue_name".to_string(), String::new());
    snap
}

// --- Snapshot files ---

#[test]
fn snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");

    let store = JobStateStore::new();
    store.write("c1_100_0", 0);
    store.write("c1_101_2", 5);
    store.snapshot_to(&path).unwrap();

    let restored = JobStateStore::new();
    assert_eq!(restored.load_from(&path).unwrap(), 2);
    assert_eq!(restored.read("c1_100_0"), Some(0));
    assert_eq!(restored.read("c1_101_2"), Some(5));
    assert!(!restored.is_dirty());
}

#[test]
fn snapshot_is_rewritten_wholesale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");

    let store = JobStateStore::new();
    store.write("a", 1);
    store.write("b", 2);
    store.snapshot_to(&path).unwrap();

    store.delete("a");
    store.snapshot_to(&path).unwrap();

    assert_eq!(read_json(&path), serde_json::json!({"b": 2}));
    assert!(!dir.path().join("job.states.snapshot.tmp").exists());
}

#[test]
fn float_codes_normalize_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");
    std::fs::write(&path, r#"{"c1_7_0": 2.0, "c1_8_0": 13, "bad": "RUN"}"#).unwrap();

    let store = JobStateStore::new();
    assert_eq!(store.load_from(&path).unwrap(), 2);
    assert_eq!(store.read("c1_7_0"), Some(2));
    assert_eq!(store.read("c1_8_0"), Some(13));
    assert_eq!(store.read("bad"), None);
}

#[test]
fn corrupt_snapshot_keeps_prior_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");
    std::fs::write(&path, "{not json").unwrap();

    let store = JobStateStore::new();
    store.write("c1_1_0", 2);
    assert!(store.load_from(&path).is_err());
    assert_eq!(store.read("c1_1_0"), Some(2));

    std::fs::write(&path, "[1, 2, 3]").unwrap();
    assert!(store.load_from(&path).is_err());
    assert_eq!(store.read("c1_1_0"), Some(2));
}

#[test]
fn open_tolerates_missing_and_corrupt_files() {
    let dir = tempfile::tempdir().unwrap();

    let missing = JobStateStore::open(&dir.path().join("absent.snapshot"));
    assert!(missing.is_empty());

    let corrupt_path = dir.path().join("corrupt.snapshot");
    std::fs::write(&corrupt_path, "").unwrap();
    let corrupt = JobStateStore::open(&corrupt_path);
    assert!(corrupt.is_empty());
}

#[test]
fn missing_file_error_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = JobStateStore::new()
        .load_from(&dir.path().join("absent"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn snapshot_into_missing_dir_fails_softly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("job.states.snapshot");

    let store = JobStateStore::new();
    store.write("a", 1);
    assert!(store.snapshot_to(&path).is_err());
    assert_eq!(store.read("a"), Some(1));
}

#[test]
fn property_cache_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.props.snapshot");

    let cache = PropertyCache::new();
    cache.write("c1_100_0", props("alice"));
    cache.snapshot_to(&path).unwrap();

    let restored = PropertyCache::open(&path);
    let snap = restored.read("c1_100_0").unwrap();
    assert_eq!(snap["user_name"], "alice");
    assert_eq!(snap["queue_name"], "");
}

// --- Flusher ---

#[tokio::test]
async fn flusher_writes_dirty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");
    let store = Arc::new(JobStateStore::new());

    let flusher = SnapshotFlusher::spawn(
        vec![FlushTarget::new("job-states", store.clone(), &path)],
        Duration::from_millis(20),
    );
    assert!(flusher.is_running());

    store.write("c1_100_0", 2);
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(read_json(&path), serde_json::json!({"c1_100_0": 2}));
    assert!(!store.is_dirty());

    flusher.stop().await;
}

#[tokio::test]
async fn flusher_skips_clean_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");
    let store = Arc::new(JobStateStore::new());

    let flusher = SnapshotFlusher::spawn(
        vec![FlushTarget::new("job-states", store.clone(), &path)],
        Duration::from_millis(20),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!path.exists());
    flusher.stop().await;
}

#[tokio::test]
async fn stop_flushes_unconditionally() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.states.snapshot");
    let store = Arc::new(JobStateStore::new());

    // Long interval: only the shutdown flush can write the file.
    let flusher = SnapshotFlusher::spawn(
        vec![FlushTarget::new("job-states", store.clone(), &path)],
        Duration::from_secs(3600),
    );

    store.write("c1_100_0", 0);
    store.clear_dirty();
    flusher.stop().await;

    assert_eq!(read_json(&path), serde_json::json!({"c1_100_0": 0}));
}

#[tokio::test]
async fn failed_flush_does_not_stop_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("missing").join("job.states.snapshot");
    let store = Arc::new(JobStateStore::new());

    let flusher = SnapshotFlusher::spawn(
        vec![FlushTarget::new("job-states", store.clone(), &bad)],
        Duration::from_millis(10),
    );
    store.write("c1_100_0", 2);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(flusher.is_running());
    assert!(!store.is_dirty());
    flusher.stop().await;
    assert!(!bad.exists());
}

#[tokio::test]
async fn flusher_drives_multiple_targets() {
    let dir = tempfile::tempdir().unwrap();
    let states_path = dir.path().join("job.states.snapshot");
    let props_path = dir.path().join("job.props.snapshot");
    let states = Arc::new(JobStateStore::new());
    let cache = Arc::new(PropertyCache::new());

    let flusher = SnapshotFlusher::spawn(
        vec![
            FlushTarget::new("job-states", states.clone(), &states_path),
            FlushTarget::new("job-properties", cache.clone(), &props_path),
        ],
        Duration::from_secs(3600),
    );

    states.write("c1_1_0", 2);
    cache.write("c1_1_0", props("bob"));
    flusher.stop().await;

    assert_eq!(read_json(&states_path)["c1_1_0"], 2);
    assert_eq!(read_json(&props_path)["c1_1_0"]["user_name"], "bob");
}
