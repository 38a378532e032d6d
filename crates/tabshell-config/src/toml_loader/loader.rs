//! Core TOML config loading: read from path or platform default.

use crate::schema::ShellConfig;
use crate::validation;
use std::path::Path;
use tabshell_common::ConfigError;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path};

/// Load config from a specific TOML file path.
///
/// Missing fields take their serde defaults. Validation failures are logged
/// and the parsed config is returned as-is; `load_config` is the strict entry
/// point.
pub fn load_from_path(path: &Path) -> Result<ShellConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ParseError(format!("failed to read {}: {e}", path.display())))?;

    let config: ShellConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), error = %e, "config has out-of-range values");
    }

    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load config from the platform-specific default path.
///
/// On Linux: `~/.config/tabshell/config.toml`
/// On macOS: `~/Library/Application Support/tabshell/config.toml`
///
/// If the file does not exist, a commented default is written and defaults
/// are returned.
pub fn load_default() -> Result<ShellConfig, ConfigError> {
    let path = default_config_path()?;

    match load_from_path(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) => {
            info!(path = %path.display(), "no config found, creating default");
            create_default_config(&path)?;
            Ok(ShellConfig::default())
        }
        Err(e) => Err(e),
    }
}
