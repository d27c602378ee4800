//! Configuration management for fxhandlers
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use fxhandlers::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Registry file name: {}", config.profile.file_name);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `FXHANDLERS__<section>__<key>`
//!
//! Examples:
//! - `FXHANDLERS__PROFILE__PROFILE_ID=abcd1234.default-release`
//! - `FXHANDLERS__PROFILE__REGISTRY_FILE=/tmp/handlers.json`
//! - `FXHANDLERS__LAUNCHER__OPENER=gio,open`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/fxhandlers.toml`.
//! This can be overridden using the `FXHANDLERS_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, LauncherConfig, LoggingConfig, ProfileConfig};
pub use validation::{ValidationError, check_profile_id};

use thiserror::Error;

use crate::handlers::Registry;
use crate::profile::ProfileLocator;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`FXHANDLERS__*`)
    /// 2. TOML file (default: `config/fxhandlers.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Unloaded registry for the configured profile or file
    pub fn registry(&self) -> Registry {
        let mut registry = Registry::new(ProfileLocator::from(&self.profile));
        registry.set_os_user(self.profile.os_user.clone());
        registry.set_profile_id(self.profile.profile_id.clone());
        if self.profile.registry_file.is_some() {
            registry.set_filename(self.profile.registry_file.clone());
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[profile]
profile_id = "main.default"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.profile.profile_id.as_deref(), Some("main.default"));
    }

    #[test]
    fn test_validation_catches_bad_profile_id() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[profile]
profile_id = "../../etc"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(ValidationError::InvalidProfileId(_))
        ));
    }

    #[test]
    fn test_registry_from_config() {
        let temp_dir = TempDir::new().unwrap();
        let profile = temp_dir.path().join("p.default");
        fs::create_dir(&profile).unwrap();
        fs::write(
            profile.join("handlers.json"),
            r#"{"schemes": {"irc": {"action": 3}}}"#,
        )
        .unwrap();

        let config_path = temp_dir.path().join("test.toml");
        fs::write(
            &config_path,
            format!("[profile]\nprofiles_dir = {:?}\n", temp_dir.path().display().to_string()),
        )
        .unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        let mut registry = config.registry();
        assert!(registry.lookup_by_scheme("irc").is_ok());
    }

    #[test]
    fn test_registry_file_skips_discovery() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("custom.json");
        fs::write(&file, r#"{"mimeTypes": {"text/plain": {"action": 0}}}"#).unwrap();

        let mut config = Config::default();
        config.profile.registry_file = Some(file.clone());
        config.profile.profiles_dir = Some(temp_dir.path().join("missing"));

        let mut registry = config.registry();
        assert!(registry.lookup_by_mime("text/plain").is_ok());
        assert_eq!(registry.filename(), Some(file.as_path()));
    }
}
