//! Client configuration
//!
//! Loaded from a TOML file under the platform config directory, with
//! `REHEARSE_*` environment variables taking precedence. A missing file is
//! not an error; a malformed one is.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the backend clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the interview backend
    pub base_url: String,
    /// Bearer token for the authenticated endpoints
    pub api_token: Option<String>,
    /// Delay between displayed word tokens while streaming
    pub word_delay_ms: u64,
    /// Timeout for the plain request/response endpoints
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_token: None,
            word_delay_ms: 30,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value}")]
    Env { key: String, value: String },
}

impl Config {
    /// Load configuration from the config file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_env_from(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Path of the config file (`<config dir>/rehearse/config.toml`)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("rehearse").join("config.toml"))
    }

    fn from_file(path: PathBuf) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let config = toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?;
        debug!("Loaded config file");
        Ok(config)
    }

    /// Apply `REHEARSE_*` overrides from an arbitrary lookup
    pub fn apply_env_from(
        &mut self,
        get: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = get("REHEARSE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(token) = get("REHEARSE_API_TOKEN") {
            self.api_token = Some(token);
        }
        if let Some(raw) = get("REHEARSE_WORD_DELAY_MS") {
            self.word_delay_ms = raw.parse().map_err(|_| ConfigError::Env {
                key: "REHEARSE_WORD_DELAY_MS".to_string(),
                value: raw,
            })?;
        }
        if let Some(raw) = get("REHEARSE_TIMEOUT_SECS") {
            self.request_timeout_secs = raw.parse().map_err(|_| ConfigError::Env {
                key: "REHEARSE_TIMEOUT_SECS".to_string(),
                value: raw,
            })?;
        }
        Ok(())
    }

    /// Inter-token display delay
    pub fn word_delay(&self) -> Duration {
        Duration::from_millis(self.word_delay_ms)
    }

    /// Request timeout for the plain endpoints
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.word_delay_ms, 30);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_parse_file_contents() {
        let config: Config =
            toml::from_str("base_url = \"https://api.example.com/\"\nword_delay_ms = 10\n")
                .unwrap();
        assert_eq!(config.base(), "https://api.example.com");
        assert_eq!(config.word_delay(), Duration::from_millis(10));
        // Unset fields keep their defaults
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut env = HashMap::new();
        env.insert("REHEARSE_BASE_URL", "http://10.0.0.2:9999");
        env.insert("REHEARSE_API_TOKEN", "secret");
        env.insert("REHEARSE_WORD_DELAY_MS", "5");

        let mut config = Config::default();
        config
            .apply_env_from(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2:9999");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.word_delay_ms, 5);
    }

    #[test]
    fn test_env_rejects_garbage_numbers() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(|key| (key == "REHEARSE_WORD_DELAY_MS").then(|| "fast".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { .. }));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [not toml").unwrap();
        let err = Config::from_file(path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
