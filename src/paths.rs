//! Path resolution for seedkeep
//!
//! # Environment Variables
//!
//! - `SEEDKEEP_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/seedkeep`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `SEEDKEEP_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/seedkeep` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\seedkeep`
//!    - macOS/Linux: `~/.config/seedkeep`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "SEEDKEEP_CONFIG_DIR";

/// File name of the config inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the seedkeep config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("seedkeep");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("seedkeep");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("seedkeep");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Resolve the config file: an explicit path wins over the config directory
pub fn config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(&path.to_string_lossy())),
        None => Ok(config_dir()?.join(CONFIG_FILE)),
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
