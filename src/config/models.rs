use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::profile::{DEFAULT_FILE_NAME, DEFAULT_MARKER};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileConfig,
    #[serde(default)]
    pub launcher: LauncherConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which browser profile to read `handlers.json` from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// OS user whose profiles are searched (default: current user)
    pub os_user: Option<String>,
    /// Profile directory name (default: shortest name containing `marker`)
    pub profile_id: Option<String>,
    /// Overrides the platform profiles directory
    pub profiles_dir: Option<PathBuf>,
    /// Explicit registry file; skips profile discovery
    pub registry_file: Option<PathBuf>,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    #[serde(default = "default_marker")]
    pub marker: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            os_user: None,
            profile_id: None,
            profiles_dir: None,
            registry_file: None,
            file_name: default_file_name(),
            marker: default_marker(),
        }
    }
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

/// Command prefixes used to perform dispatches
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LauncherConfig {
    /// Runs a full command line, which is appended as the last argument
    #[serde(default = "default_shell")]
    pub shell: Vec<String>,
    /// OS generic "open"
    #[serde(default = "default_opener")]
    pub opener: Vec<String>,
    /// Opens urls in the browser; falls back to `opener`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Vec<String>>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            opener: default_opener(),
            browser: None,
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

fn default_shell() -> Vec<String> {
    if cfg!(target_os = "windows") {
        argv(&["cmd", "/C"])
    } else {
        argv(&["sh", "-c"])
    }
}

fn default_opener() -> Vec<String> {
    if cfg!(target_os = "windows") {
        argv(&["cmd", "/C", "start", ""])
    } else if cfg!(target_os = "macos") {
        argv(&["open"])
    } else {
        argv(&["xdg-open"])
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "warn".to_string()
}
