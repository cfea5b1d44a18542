use fabric_deploy_gen::storage::file::file_artifact_store::FileArtifactStore;
use fabric_deploy_gen::traits::artifact_store::ArtifactStore;
use std::fs;

#[test]
fn write_replaces_artifact_and_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileArtifactStore::new(dir.path().join("out"));

    let path = store.write_artifact("cluster.json", b"{\"peers\":{}}").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "{\"peers\":{}}");

    store.write_artifact("cluster.json", b"second").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "second");

    let entries: Vec<String> = fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["cluster.json".to_string()]);
}

#[test]
fn path_like_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileArtifactStore::new(dir.path());
    let err = store.write_artifact("../escape.yaml", b"x").unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(store.write_artifact("", b"x").unwrap_err().is_invalid_argument());
}

#[test]
fn failed_write_keeps_previous_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileArtifactStore::new(dir.path());
    let path = store.write_artifact("docker-compose-server1.yaml", b"old").unwrap();

    // A directory squatting on the temp path makes the write fail.
    fs::create_dir(dir.path().join(".docker-compose-server1.yaml.tmp")).unwrap();
    let err = store
        .write_artifact("docker-compose-server1.yaml", b"new")
        .unwrap_err();
    assert!(!err.is_invalid_argument());
    assert_eq!(fs::read_to_string(&path).unwrap(), "old");
}
