use std::path::{Path, PathBuf};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding [`Config::api_url`]
pub const API_URL_ENV: &str = "REELSHELF_API_URL";

const APP_DIR: &str = "reelshelf";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No user configuration directory on this platform")]
    NoConfigDir,

    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3001/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// `<config_dir>/reelshelf/config.json`, when the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Defaults, then the config file, then the environment.
    ///
    /// A missing or unreadable file falls back to defaults.
    pub fn load() -> Self {
        let config = match Self::default_path() {
            Some(path) if path.exists() => {
                Self::load_from(&path).unwrap_or_else(|err| {
                    warn!("[Config] {err}; using defaults");
                    Self::default()
                })
            }
            _ => Self::default(),
        };

        config.with_env_override(std::env::var(API_URL_ENV).ok())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let mut config: Config =
            serde_json::from_str(&content).map_err(|source| {
                ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        config.api_url = normalize_base_url(&config.api_url);
        Ok(config)
    }

    /// Apply an API URL override, as read from [`API_URL_ENV`]
    pub fn with_env_override(mut self, api_url: Option<String>) -> Self {
        if let Some(api_url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api_url = normalize_base_url(&api_url);
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::InvalidUrl {
                url: self.api_url.clone(),
                reason: e.to_string(),
            })
            .and_then(|url| {
                if url.cannot_be_a_base() {
                    Err(ConfigError::InvalidUrl {
                        url: self.api_url.clone(),
                        reason: "not a base URL".to_string(),
                    })
                } else {
                    Ok(())
                }
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Write to [`Config::default_path`] and return where it went
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Add a scheme when missing and drop trailing slashes, so
/// `localhost:3001/api/` becomes `http://localhost:3001/api`.
pub fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let normalized = if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
    {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    if normalized != raw {
        warn!(
            "[ApiClient] Normalized base URL from '{}' to '{}'",
            raw, normalized
        );
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_scheme_and_trailing_slash() {
        assert_eq!(
            normalize_base_url(" localhost:3001/api/ "),
            "http://localhost:3001/api"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com"),
            "https://api.example.com"
        );
    }

    #[test]
    fn env_override_wins_unless_blank() {
        let config = Config::default()
            .with_env_override(Some("api.example.com/v2/".into()));
        assert_eq!(config.api_url, "http://api.example.com/v2");

        let config = Config::default().with_env_override(Some("  ".into()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(Config::default().validate().is_ok());

        let zero = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::ZeroTimeout)));

        let bad = Config {
            api_url: "http://exa mple.com".into(),
            ..Config::default()
        };
        assert!(matches!(bad.validate(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            api_url: "https://shelf.example.com/api".into(),
            request_timeout_secs: 5,
        };

        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        std::fs::write(&path, r#"{ "api_url": "localhost:9000/" }"#).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_url, "http://localhost:9000");
        assert_eq!(loaded.request_timeout_secs, 30);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));

        assert!(matches!(
            Config::load_from(&dir.path().join("missing.json")),
            Err(ConfigError::Io { .. })
        ));
    }
}
