//! Unified path management for refract configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/refract/           # Config directory
//! ├── secret.json              # API keys and secrets
//! └── config.toml              # Model configuration (optional)
//!
//! ~/.local/share/refract/      # Data directory
//! └── refactor_history_v1.json # Persisted history slot
//! ```

use refract_core::{RefractError, Result};
use std::path::PathBuf;

/// Unified path resolution for refract.
pub struct RefractPaths;

impl RefractPaths {
    /// Returns the refract configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/refract/`)
    /// - `Err(_)`: Could not determine the platform config directory
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("refract"))
            .ok_or_else(|| RefractError::config("Cannot find config directory"))
    }

    /// Returns the refract data directory, used for the history slot.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to data directory (e.g., `~/.local/share/refract/`)
    /// - `Err(_)`: Could not determine the platform data directory
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("refract"))
            .ok_or_else(|| RefractError::config("Cannot find data directory"))
    }

    /// Returns the path to the secrets file.
    pub fn secret_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("secret.json"))
    }
}
