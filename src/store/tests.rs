use super::*;

#[test]
fn test_file_store_round_trip_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileNameStore::new(dir.path().join("state").join("name.json"));

    assert_eq!(store.load().unwrap(), None);
    store.save("Ana").unwrap();
    assert_eq!(store.load().unwrap().as_deref(), Some("Ana"));

    let raw = fs::read_to_string(dir.path().join("state").join("name.json")).unwrap();
    assert_eq!(raw, r#"{"userName":"Ana"}"#);

    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
    // clearing twice is fine
    store.clear().unwrap();
}

#[test]
fn test_corrupt_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("name.json");
    fs::write(&path, "not json").unwrap();
    assert_eq!(FileNameStore::new(path).load().unwrap(), None);
}

#[test]
fn test_memory_store() {
    let store = MemoryNameStore::with_name("Ana");
    assert_eq!(store.load().unwrap().as_deref(), Some("Ana"));
    store.clear().unwrap();
    assert_eq!(store.load().unwrap(), None);
}
