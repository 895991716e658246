use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const TOKEN_ENV_VAR: &str = "WEBSTEPS_API_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebStepsConfig {
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecorderConfig {
    #[serde(default = "default_commit_delay_ms")]
    pub commit_delay_ms: u64,
    #[serde(default = "default_dedup_window")]
    pub dedup_window: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            commit_delay_ms: default_commit_delay_ms(),
            dedup_window: default_dedup_window(),
        }
    }
}

fn default_commit_delay_ms() -> u64 {
    1000
}

fn default_dedup_window() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Service root. A path prefix such as `/flytest` is kept when joining endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. Falls back to the `WEBSTEPS_API_TOKEN` environment variable.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_ms: default_api_timeout_ms(),
        }
    }
}

impl ApiConfig {
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
            .filter(|t| !t.is_empty())
    }
}

fn default_base_url() -> String {
    "http://localhost:7001".to_string()
}

fn default_api_timeout_ms() -> u64 {
    30000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            history_path: default_history_path(),
            export_dir: default_export_dir(),
        }
    }
}

fn default_history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".websteps")
        .join("history.json")
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Selector keywords whose Input values are masked in readable steps.
    #[serde(default = "default_sensitive_fields")]
    pub sensitive_fields: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sensitive_fields: default_sensitive_fields(),
        }
    }
}

fn default_sensitive_fields() -> Vec<String> {
    vec!["password".to_string()]
}
