//! Tests for host key creation and reload.

use tictactoe_server::load_or_create_host_key;

#[test]
fn test_missing_key_is_generated_then_reloaded() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keys").join("host_key");

    let created = load_or_create_host_key(&path).expect("generates key");
    assert!(path.exists());

    let reloaded = load_or_create_host_key(&path).expect("loads key");
    assert_eq!(created.public_key(), reloaded.public_key());
}

#[cfg(unix)]
#[test]
fn test_generated_key_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("host_key");
    load_or_create_host_key(&path).expect("generates key");

    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_garbage_key_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("host_key");
    std::fs::write(&path, "not a key").expect("write");

    let err = load_or_create_host_key(&path).expect_err("rejects garbage");
    assert!(err.message.contains("Key error"));
}
