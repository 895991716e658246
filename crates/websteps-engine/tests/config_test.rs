use std::time::Duration;
use tempfile::TempDir;
use websteps_engine::capture::CaptureSettings;
use websteps_engine::config::{ConfigError, ConfigLoader, WebStepsConfig};

#[test]
fn test_defaults() {
    let config = WebStepsConfig::default();
    assert_eq!(config.recorder.commit_delay_ms, 1000);
    assert_eq!(config.recorder.dedup_window, 10);
    assert_eq!(config.api.base_url, "http://localhost:7001");
    assert_eq!(config.api.timeout_ms, 30000);
    assert_eq!(config.security.sensitive_fields, vec!["password"]);
    assert!(config.storage.history_path.ends_with(".websteps/history.json"));
}

#[tokio::test]
async fn test_load_partial_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("websteps.yaml");
    tokio::fs::write(
        &path,
        "recorder:\n  commit_delay_ms: 250\napi:\n  base_url: https://qa.example.com\n  token: abc\nsecurity:\n  sensitive_fields: [password, ssn]\n",
    )
    .await
    .unwrap();

    let config = ConfigLoader::load_from(&path).await.unwrap();
    assert_eq!(config.recorder.commit_delay_ms, 250);
    assert_eq!(config.recorder.dedup_window, 10);
    assert_eq!(config.api.base_url, "https://qa.example.com");
    assert_eq!(config.api.resolved_token().as_deref(), Some("abc"));
    assert_eq!(config.api.timeout_ms, 30000);
    assert_eq!(config.security.sensitive_fields, vec!["password", "ssn"]);

    let settings = CaptureSettings::from(&config.recorder);
    assert_eq!(settings.commit_delay, Duration::from_millis(250));
    assert_eq!(settings.dedup_window, 10);
}

#[tokio::test]
async fn test_load_invalid_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.yaml");
    tokio::fs::write(&path, "recorder: [unclosed").await.unwrap();

    let result = ConfigLoader::load_from(&path).await;
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[tokio::test]
async fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from(&temp_dir.path().join("nope.yaml")).await;
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[tokio::test]
async fn test_override_path_wins() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ci.yaml");
    tokio::fs::write(&path, "recorder:\n  dedup_window: 3\n")
        .await
        .unwrap();

    let config = ConfigLoader::load_with_override(Some(path)).await.unwrap();
    assert_eq!(config.recorder.dedup_window, 3);
    assert_eq!(config.recorder.commit_delay_ms, 1000);
}

#[tokio::test]
async fn test_missing_override_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.yaml");

    let result = ConfigLoader::load_with_override(Some(path.clone())).await;
    match result {
        Err(ConfigError::Missing(missing)) => assert_eq!(missing, path),
        other => panic!("expected a missing-file error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_search_paths_start_with_local_file() {
    let paths = ConfigLoader::search_paths();
    assert_eq!(paths[0], std::path::PathBuf::from("./websteps.yaml"));
    assert!(paths.iter().skip(1).all(|p| p.ends_with(".websteps/config.yaml")));
}
