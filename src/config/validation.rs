use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Launcher command '{field}' must not be empty")]
    EmptyLauncherCommand { field: &'static str },

    #[error("Registry file name must be a plain file name, got '{0}'")]
    InvalidFileName(String),

    #[error("Profile id must be a directory name, got '{0}'")]
    InvalidProfileId(String),

    #[error("Profile marker must not be empty")]
    EmptyMarker,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_profile(config)?;
    validate_launcher(config)?;
    Ok(())
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
}

/// A profile id names one directory under the profiles root
pub fn check_profile_id(id: &str) -> Result<(), ValidationError> {
    if is_plain_name(id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidProfileId(id.to_string()))
    }
}

/// Profile ids and the registry file name are joined onto directories
fn validate_profile(config: &Config) -> Result<(), ValidationError> {
    let profile = &config.profile;

    if !is_plain_name(&profile.file_name) {
        return Err(ValidationError::InvalidFileName(profile.file_name.clone()));
    }

    if let Some(ref id) = profile.profile_id {
        check_profile_id(id)?;
    }

    if profile.marker.is_empty() {
        return Err(ValidationError::EmptyMarker);
    }

    Ok(())
}

fn validate_launcher(config: &Config) -> Result<(), ValidationError> {
    let launcher = &config.launcher;

    if launcher.shell.is_empty() {
        return Err(ValidationError::EmptyLauncherCommand { field: "shell" });
    }

    if launcher.opener.is_empty() {
        return Err(ValidationError::EmptyLauncherCommand { field: "opener" });
    }

    if launcher.browser.as_ref().is_some_and(Vec::is_empty) {
        return Err(ValidationError::EmptyLauncherCommand { field: "browser" });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_file_name_with_separator() {
        let mut config = Config::default();
        config.profile.file_name = "../handlers.json".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidFileName(_))));
    }

    #[test]
    fn test_profile_id_with_separator() {
        let mut config = Config::default();
        config.profile.profile_id = Some("a/b".to_string());

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::InvalidProfileId(_))));
    }

    #[test]
    fn test_empty_marker() {
        let mut config = Config::default();
        config.profile.marker.clear();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyMarker)));
    }

    #[test]
    fn test_empty_launcher_commands() {
        let mut config = Config::default();
        config.launcher.opener.clear();

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::EmptyLauncherCommand { field: "opener" })
        ));

        let mut config = Config::default();
        config.launcher.browser = Some(Vec::new());

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::EmptyLauncherCommand { field: "browser" })
        ));
    }
}
