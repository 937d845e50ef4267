use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::gemini;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Errors raised while loading configuration or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API key is absent (or blank) in the environment.
    #[error("GEMINI_API_KEY environment variable is not set")]
    MissingCredential,
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}

/// Top-level configuration loaded from `config.yaml`.
///
/// Every field has a default so the server runs without a file at all.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
    /// Origins allowed by the CORS layer.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    /// Gemini provider settings.
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Settings for the Gemini provider.  The API key never lives here.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL of the Generative Language API.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_model() -> String {
    gemini::DEFAULT_MODEL.to_string()
}

fn default_endpoint() -> String {
    gemini::DEFAULT_ENDPOINT.to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Config {
    /// Read and parse a YAML configuration file.
    pub async fn load(path: &Path) -> Result<Config, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load `explicit` if given; otherwise `config.yaml` in the working
    /// directory when it exists, else built-in defaults.
    pub async fn resolve(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path).await;
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if tokio::fs::try_exists(fallback).await.unwrap_or(false) {
            Self::load(fallback).await
        } else {
            tracing::debug!("no config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Config, serde_yaml_ng::Error> {
        // An empty file deserialises as unit, not as an empty mapping.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml_ng::from_str(contents)
    }
}

/// Read the Gemini API key from the environment.
///
/// A variable that is set but blank counts as missing.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingCredential)
}
