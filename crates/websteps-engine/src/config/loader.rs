use super::schema::WebStepsConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Names a config file that replaces the default lookup.
pub const CONFIG_ENV_VAR: &str = "WEBSTEPS_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Config file {0} set by WEBSTEPS_CONFIG does not exist")]
    Missing(PathBuf),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from `$WEBSTEPS_CONFIG` when set, else from the first of:
    /// 1. ./websteps.yaml
    /// 2. ~/.websteps/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<WebStepsConfig, ConfigError> {
        let override_path = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::load_with_override(override_path).await
    }

    /// An override path must exist; without one the standard locations are searched.
    pub async fn load_with_override(
        override_path: Option<PathBuf>,
    ) -> Result<WebStepsConfig, ConfigError> {
        if let Some(path) = override_path {
            if !path.exists() {
                return Err(ConfigError::Missing(path));
            }
            return Self::load_from(&path).await;
        }

        for candidate in Self::search_paths() {
            if candidate.exists() {
                return Self::load_from(&candidate).await;
            }
        }

        debug!("No config file found, using defaults");
        Ok(WebStepsConfig::default())
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./websteps.yaml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".websteps").join("config.yaml"));
        }
        paths
    }

    pub async fn load_from(path: &Path) -> Result<WebStepsConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: WebStepsConfig = serde_yaml::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
