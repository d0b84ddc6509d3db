//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file
//! (`config.yaml`) and the plugin's API-key file (`config.json`). The key
//! file is loaded once at startup and injected into the pipeline rather
//! than re-read per invocation.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::domain::types::ConfigError;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub news: NewsSection,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
}

/// Settings for the news-card plugin itself.
#[derive(Debug, Deserialize, Clone)]
pub struct NewsSection {
    /// Path of the JSON file carrying the provider API key.
    #[serde(default = "default_news_config_path")]
    pub config_path: String,
}

impl Default for NewsSection {
    fn default() -> Self {
        Self {
            config_path: default_news_config_path(),
        }
    }
}

fn default_news_config_path() -> String {
    "data/config.json".to_string()
}

/// Validated provider credentials for the news API.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: String,
}

/// Raw shape of the plugin's `config.json`.
#[derive(Debug, Deserialize)]
struct NewsConfigFile {
    #[serde(rename = "TIAN_API_KEY")]
    tian_api_key: Option<String>,
}

impl NewsConfig {
    /// Load and validate the key file. A missing file and a missing/empty
    /// key are distinct errors so the user sees an actionable diagnostic.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing(path.display().to_string()));
        }
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let file: NewsConfigFile =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let api_key = file.tian_api_key.unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingKey);
        }
        Ok(Self { api_key })
    }
}
