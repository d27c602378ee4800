use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "FXHANDLERS_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/fxhandlers.toml";
const ENV_PREFIX: &str = "FXHANDLERS";
const ENV_SEPARATOR: &str = "__";
const LIST_SEPARATOR: &str = ",";
const LIST_KEYS: &[&str] = &["launcher.shell", "launcher.opener", "launcher.browser"];

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    load_with_environment(config_path, environment())
}

fn load_with_environment(
    config_path: PathBuf,
    environment: Environment,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::debug!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    let config = builder.add_source(environment).build()?;
    config.try_deserialize()
}

// FXHANDLERS__PROFILE__PROFILE_ID -> profile.profile_id
// FXHANDLERS__LAUNCHER__OPENER=gio,open -> launcher.opener
fn environment() -> Environment {
    let mut environment = Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .list_separator(LIST_SEPARATOR)
        .try_parsing(true);
    for key in LIST_KEYS {
        environment = environment.with_list_parse_key(key);
    }
    environment
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.profile.file_name, "handlers.json");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[profile]
os_user = "bob"
profiles_dir = "/srv/firefox"
marker = ".dev-edition"

[launcher]
shell = ["bash", "-lc"]
browser = ["firefox", "--new-tab"]

[logging]
filter = "fxhandlers=debug"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.profile.os_user.as_deref(), Some("bob"));
        assert_eq!(config.profile.profiles_dir, Some(PathBuf::from("/srv/firefox")));
        assert_eq!(config.profile.marker, ".dev-edition");
        assert_eq!(config.launcher.shell, vec!["bash", "-lc"]);
        assert_eq!(
            config.launcher.browser,
            Some(vec!["firefox".to_string(), "--new-tab".to_string()])
        );
        assert_eq!(config.logging.filter, "fxhandlers=debug");
    }

    fn vars(pairs: &[(&str, &str)]) -> config::Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_environment_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");
        fs::write(
            &config_path,
            "[profile]\nmarker = \".dev-edition\"\n[logging]\nfilter = \"info\"\n",
        )
        .unwrap();

        let environment = environment().source(Some(vars(&[
            ("FXHANDLERS__PROFILE__MARKER", ".default-release"),
            ("FXHANDLERS__PROFILE__PROFILE_ID", "abcd1234.default-release"),
            ("FXHANDLERS__LOGGING__FILTER", "fxhandlers=trace"),
        ])));
        let config = load_with_environment(config_path, environment).unwrap();

        assert_eq!(config.profile.marker, ".default-release");
        assert_eq!(
            config.profile.profile_id.as_deref(),
            Some("abcd1234.default-release")
        );
        assert_eq!(config.logging.filter, "fxhandlers=trace");
    }

    #[test]
    fn test_environment_launcher_lists() {
        let temp_dir = TempDir::new().unwrap();
        let environment = environment().source(Some(vars(&[
            ("FXHANDLERS__LAUNCHER__OPENER", "gio,open"),
            ("FXHANDLERS__LAUNCHER__BROWSER", "firefox,--new-tab"),
        ])));
        let config =
            load_with_environment(temp_dir.path().join("missing.toml"), environment).unwrap();

        assert_eq!(config.launcher.opener, vec!["gio", "open"]);
        assert_eq!(
            config.launcher.browser,
            Some(vec!["firefox".to_string(), "--new-tab".to_string()])
        );
    }
}
