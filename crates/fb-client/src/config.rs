//! Client configuration.
//!
//! Layers, later wins: built-in defaults, the TOML file
//! (`~/.fb/config.toml`, or `~/.fb/config.<profile>.toml`), then the
//! `FB_API_URL` environment variable. Command-line flags go on top in the
//! CLI.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const ENV_API_URL: &str = "FB_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot find home directory")]
    NoHome,
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Token saved by `fb login`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl ClientConfig {
    /// Defaults, then the profile's file if it exists, then the environment.
    pub fn load(profile: Option<&str>) -> Result<Self, ConfigError> {
        let path = Self::config_path(profile)?;
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read `path`; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("config: loaded {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override from environment variables, read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        let filename = match profile {
            Some(p) => format!("config.{p}.toml"),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".fb").join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ClientConfig::from_toml_str("timeout_secs = 5\n").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.token, None);
    }

    #[test]
    fn env_overrides_file() {
        let mut config =
            ClientConfig::from_toml_str("base_url = \"http://forms.internal/api\"\n").unwrap();
        config.apply_env(|key| (key == ENV_API_URL).then(|| "http://localhost:9000/api".into()));
        assert_eq!(config.base_url, "http://localhost:9000/api");

        config.apply_env(|_| Some("   ".into()));
        assert_eq!(config.base_url, "http://localhost:9000/api");
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("timeout_secs = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn save_then_read_back() {
        let path = std::env::temp_dir()
            .join(format!("fb-config-{}", std::process::id()))
            .join("config.toml");
        let config = ClientConfig {
            token: Some("tok".into()),
            ..ClientConfig::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(ClientConfig::from_file(&path).unwrap(), config);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_file_is_default() {
        let path = std::env::temp_dir().join("fb-config-does-not-exist.toml");
        assert_eq!(ClientConfig::from_file(&path).unwrap(), ClientConfig::default());
    }
}
