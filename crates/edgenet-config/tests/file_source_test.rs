// FileTargetSource tests against real files.
#![allow(clippy::unwrap_used)]

use std::fs;

use edgenet_config::FileTargetSource;
use edgenet_core::{CoreError, TargetSource};

#[tokio::test]
async fn test_reloads_file_every_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [[targets]]
        tenant = "file-source-a"
        router = "192.168.0.1"
        password = "pw"
        "#,
    )
    .unwrap();

    let source = FileTargetSource::new(Some(path.clone()));
    let first = source.load().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].tenant_id, "file-source-a");

    fs::write(
        &path,
        r#"
        [[targets]]
        tenant = "file-source-a"
        router = "192.168.0.1"
        password = "pw"

        [[targets]]
        tenant = "file-source-b"
        router = "http://192.168.1.1:8080"
        password = "pw"
        "#,
    )
    .unwrap();

    let second = source.load().await.unwrap();
    let tenants: Vec<&str> = second.iter().map(|t| t.tenant_id.as_str()).collect();
    assert_eq!(tenants, vec!["file-source-a", "file-source-b"]);
    assert_eq!(second[1].router.port(), Some(8080));
}

#[tokio::test]
async fn test_disabled_and_invalid_targets_are_left_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [[targets]]
        tenant = "file-source-on"
        router = "192.168.0.1"
        password = "pw"

        [[targets]]
        tenant = "file-source-off"
        router = "192.168.0.2"
        password = "pw"
        enabled = false

        [[targets]]
        tenant = "file-source-bad"
        router = "http://"
        password = "pw"
        "#,
    )
    .unwrap();

    let targets = FileTargetSource::new(Some(path)).load().await.unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].tenant_id, "file-source-on");
}

#[tokio::test]
async fn test_unreadable_config_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[[targets]\ntenant = ").unwrap();

    let err = FileTargetSource::new(Some(path)).load().await.unwrap_err();
    assert!(matches!(err, CoreError::TargetLoad { .. }));
}
