use std::path::{Path, PathBuf};

use gemini::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tracing::debug;

pub const CONFIG_FILE: &str = "college-compass.toml";
pub const DEFAULT_PORT: u16 = 3001;

/// Environment variables holding the Gemini API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("No Gemini API key configured; set GEMINI_API_KEY or gemini.api_key in college-compass.toml")]
    MissingApiKey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    /// Static app served for paths the API does not handle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            app_dir: None,
        }
    }
}

/// Application configuration stored in `college-compass.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Read the config file from `dir`, or defaults if there is none.
    pub async fn read(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(CONFIG_FILE);

        if !config_path.exists() {
            debug!(path = %config_path.display(), "Config file does not exist, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;
        let config = toml::from_str(&content)?;
        debug!(path = %config_path.display(), "Config loaded successfully");

        Ok(config)
    }

    /// Write the config file into `dir` and return its path.
    pub async fn write(&self, dir: &Path) -> Result<PathBuf, ConfigError> {
        let config_path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        fs::write(&config_path, content)
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.clone(),
                source,
            })?;
        debug!(path = %config_path.display(), "Config saved successfully");

        Ok(config_path)
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; the first non-blank key variable wins.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let key = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty());

        if let Some(key) = key {
            self.gemini.api_key = key;
        }
        self
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        let key = self.gemini.api_key.trim();
        if key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(key)
    }

    pub fn gemini_client(&self) -> Result<GeminiClient, ConfigError> {
        Ok(GeminiClient::new(
            self.api_key()?.to_string(),
            self.gemini.base_url.clone(),
            self.gemini.model.clone(),
        ))
    }
}
