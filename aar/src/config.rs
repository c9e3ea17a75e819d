//! Configuration management for aar.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Environment variables (AAR_*)
//! 2. Config file (~/.aar/config.toml)
//! 3. Default values

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// AAR server settings
    pub api: ApiConfig,

    /// Paths
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the aar-server API
    #[serde(default = "default_api_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory for aar data
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_data_dir() -> PathBuf {
    data_dir()
}

/// Resolve the data directory (AAR_DIR override, else ~/.aar)
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AAR_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aar")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                url: default_api_url(),
            },
            paths: PathsConfig {
                data_dir: data_dir(),
            },
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: data_dir(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and defaults
    pub fn load() -> Result<Self> {
        let mut config = match std::fs::read_to_string(data_dir().join("config.toml")) {
            Ok(raw) => toml::from_str(&raw).context("Invalid config.toml")?,
            Err(_) => Self::default(),
        };

        // Environment overrides
        if let Ok(url) = std::env::var("AAR_API_URL") {
            config.api.url = url;
        }

        Ok(config)
    }

    /// Write configuration back to the config file
    pub fn save(&self) -> Result<()> {
        let dir = &self.paths.data_dir;
        std::fs::create_dir_all(dir)?;

        let raw = toml::to_string_pretty(self)?;
        std::fs::write(dir.join("config.toml"), raw)?;
        Ok(())
    }

    /// Path of the stored bearer token
    pub fn token_file(&self) -> PathBuf {
        self.paths.data_dir.join("token")
    }

    /// Read the stored bearer token, if logged in
    pub fn stored_token(&self) -> Option<String> {
        std::fs::read_to_string(self.token_file())
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|token| !token.is_empty())
    }
}
