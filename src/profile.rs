//! Browser profile discovery
//!
//! The handler registry lives at `<profiles root>/<profile>/handlers.json`.
//! When no profile id is given, the profile directory is picked among the
//! directories whose name contains a marker (`.default` unless configured),
//! preferring the shortest name.

use std::path::{Path, PathBuf};

use crate::config::ProfileConfig;
use crate::error::{Error, Result};

pub const DEFAULT_FILE_NAME: &str = "handlers.json";
pub const DEFAULT_MARKER: &str = ".default";

/// Resolves the registry file for an OS user / profile id pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLocator {
    /// Overrides the platform profiles root
    pub profiles_dir: Option<PathBuf>,
    pub marker: String,
    pub file_name: String,
}

impl Default for ProfileLocator {
    fn default() -> Self {
        Self {
            profiles_dir: None,
            marker: DEFAULT_MARKER.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl From<&ProfileConfig> for ProfileLocator {
    fn from(config: &ProfileConfig) -> Self {
        Self {
            profiles_dir: config.profiles_dir.clone(),
            marker: config.marker.clone(),
            file_name: config.file_name.clone(),
        }
    }
}

impl ProfileLocator {
    pub fn with_profiles_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    /// Directory holding every profile of `os_user` (current user when `None`)
    pub fn profiles_root(&self, os_user: Option<&str>) -> Result<PathBuf> {
        let root = match &self.profiles_dir {
            Some(dir) => dir.clone(),
            None => default_profiles_root().ok_or_else(|| Error::NoProfileFound {
                dir: PathBuf::new(),
            })?,
        };

        match (os_user, dirs::home_dir()) {
            (Some(user), Some(home)) => Ok(rebase_for_user(&root, &home, user)),
            _ => Ok(root),
        }
    }

    pub fn profile_dir(&self, os_user: Option<&str>, profile_id: Option<&str>) -> Result<PathBuf> {
        let root = self.profiles_root(os_user)?;
        match profile_id {
            Some(id) => Ok(root.join(id)),
            None => select_profile(&root, &self.marker),
        }
    }

    pub fn registry_path(&self, os_user: Option<&str>, profile_id: Option<&str>) -> Result<PathBuf> {
        Ok(self
            .profile_dir(os_user, profile_id)?
            .join(&self.file_name))
    }
}

/// Platform location of browser profiles for the current user
pub fn default_profiles_root() -> Option<PathBuf> {
    if cfg!(target_os = "windows") {
        dirs::config_dir().map(|dir| dir.join("Mozilla").join("Firefox").join("Profiles"))
    } else if cfg!(target_os = "macos") {
        dirs::config_dir().map(|dir| dir.join("Firefox").join("Profiles"))
    } else {
        dirs::home_dir().map(|dir| dir.join(".mozilla").join("firefox"))
    }
}

/// Move `path` from under `home` to under the sibling home of `user`.
///
/// Paths outside `home` are returned unchanged.
pub fn rebase_for_user(path: &Path, home: &Path, user: &str) -> PathBuf {
    match (path.strip_prefix(home), home.parent()) {
        (Ok(rest), Some(homes)) => homes.join(user).join(rest),
        _ => path.to_path_buf(),
    }
}

/// Pick the profile directory under `root` whose name contains `marker`,
/// shortest name first.
pub fn select_profile(root: &Path, marker: &str) -> Result<PathBuf> {
    let not_found = || Error::NoProfileFound {
        dir: root.to_path_buf(),
    };

    let entries = std::fs::read_dir(root).map_err(|_| not_found())?;
    let mut candidates: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.contains(marker))
        .collect();

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let Some(chosen) = candidates.first() else {
        return Err(not_found());
    };

    if candidates.len() > 1 {
        tracing::warn!(
            candidates = ?candidates,
            chosen = %chosen,
            "Multiple profiles to choose from"
        );
    }

    Ok(root.join(chosen))
}
