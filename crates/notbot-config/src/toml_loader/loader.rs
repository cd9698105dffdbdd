//! Core TOML config loading.

use crate::schema::NotbotConfig;
use notbot_common::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};

use super::paths::default_config_path;

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// Nothing at the default location; built-in defaults apply.
    Defaults(PathBuf),
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Defaults(path) => write!(f, "built-in defaults (no file at {})", path.display()),
        }
    }
}

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. Validation is left to the
/// caller so CLI overrides can be applied first.
pub fn load_from_path(path: &Path) -> Result<NotbotConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: NotbotConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/notbot/config.toml`
///
/// A missing file is not an error: built-in defaults are returned.
pub fn load_default() -> Result<(NotbotConfig, ConfigSource), ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok((config, ConfigSource::File(path))),
        Err(ConfigError::FileNotFound(_)) => Ok((NotbotConfig::default(), ConfigSource::Defaults(path))),
        Err(e) => Err(e),
    }
}
