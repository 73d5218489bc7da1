//! Configuration loading.
//!
//! One user config file at `~/.shelltabs/config.toml`, merged over
//! built-in defaults. A missing file is not an error; an unreadable or
//! unparsable file is logged and replaced with defaults; a broken config
//! must never keep the engine from starting.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::config::types::ShellTabsConfig;
use crate::config::validation::validate_config;

/// Directory all shelltabs state lives under (default: `~/.shelltabs`).
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".shelltabs")
}

pub fn config_file_path() -> PathBuf {
    data_dir().join("config.toml")
}

/// Directory session snapshots are written to.
pub fn state_dir() -> PathBuf {
    data_dir().join("state")
}

/// Load the config file at `path`, falling back to defaults on any
/// failure other than validation.
///
/// Corrupt content is a warning, not an error: the returned config is
/// the built-in default set. A config that parses but fails validation
/// is also replaced with defaults, since a half-applied config is harder
/// to reason about than none.
pub fn load_or_default(path: &Path) -> ShellTabsConfig {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return ShellTabsConfig::default();
        }
        Err(e) => {
            warn!(
                event = "core.config.read_failed",
                path = %path.display(),
                error = %e,
                message = "Failed to read config file, using defaults"
            );
            return ShellTabsConfig::default();
        }
    };

    let config: ShellTabsConfig = match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!(
                event = "core.config.parse_failed",
                path = %path.display(),
                error = %e,
                message = "Failed to parse config file, using defaults"
            );
            return ShellTabsConfig::default();
        }
    };

    match validate_config(&config) {
        Ok(()) => config,
        Err(e) => {
            warn!(
                event = "core.config.validation_failed",
                path = %path.display(),
                error = %e,
                message = "Config failed validation, using defaults"
            );
            ShellTabsConfig::default()
        }
    }
}
