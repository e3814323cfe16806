//! Configuration management for Crosspub

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Crosspub backend, without a trailing path
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Platforms pre-selected by the compose CLI when none are given
    #[serde(default)]
    pub platforms: Vec<String>,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// A missing file is not an error; the built-in defaults are returned
    /// so first runs work without any setup.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Write this configuration to `path`, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::WriteError)?;
        }
        std::fs::write(path, content).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
            },
            defaults: DefaultsConfig {
                platforms: Vec::new(),
            },
        }
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CROSSPUB_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("crosspub").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default_config();
        assert_eq!(config.api.base_url, "http://localhost:5000");
        assert!(config.defaults.platforms.is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default_config();
        config.api.base_url = "http://127.0.0.1:9999".to_string();
        config.defaults.platforms = vec!["facebook".to_string(), "twitter".to_string()];
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.api.base_url, "http://127.0.0.1:9999");
        assert_eq!(loaded.defaults.platforms, vec!["facebook", "twitter"]);
    }

    #[test]
    fn test_parse_failure_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api = \"not a table\"").unwrap();

        let err = Config::load_from_path(&path).unwrap_err();
        assert!(format!("{}", err).starts_with("Configuration error:"));
    }

    #[test]
    fn test_defaults_platforms_optional_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://localhost:5000\"\n\n[defaults]\n")
            .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert!(config.defaults.platforms.is_empty());
    }

    #[test]
    #[serial]
    fn test_env_var_overrides_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::env::set_var("CROSSPUB_CONFIG", &path);

        let resolved = resolve_config_path().unwrap();
        assert_eq!(resolved, path);

        std::env::remove_var("CROSSPUB_CONFIG");
    }

    #[test]
    #[serial]
    fn test_load_falls_back_to_defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("CROSSPUB_CONFIG", dir.path().join("absent.toml"));

        let config = Config::load().unwrap();
        assert_eq!(config.api.base_url, "http://localhost:5000");

        std::env::remove_var("CROSSPUB_CONFIG");
    }
}
