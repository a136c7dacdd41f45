//! Model configuration loading.
//!
//! Reads `~/.config/refract/config.toml` when it exists; a missing or empty
//! file yields the defaults. This file only selects models; secrets live in
//! `secret.json`.

use crate::paths::RefractPaths;
use refract_core::Result;
use refract_core::config::RemoteConfig;
use std::fs;
use std::path::Path;

/// Loads the remote model configuration from the default config file path.
pub fn load_remote_config() -> Result<RemoteConfig> {
    let path = RefractPaths::config_dir()?.join("config.toml");
    load_remote_config_from(&path)
}

/// Loads the remote model configuration from an explicit path.
///
/// # Returns
///
/// - `Ok(RemoteConfig)`: parsed configuration, or defaults when the file is
///   missing or empty
/// - `Err(_)`: the file exists but cannot be read or parsed
pub fn load_remote_config_from(path: &Path) -> Result<RemoteConfig> {
    if !path.exists() {
        return Ok(RemoteConfig::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(RemoteConfig::default());
    }

    Ok(toml::from_str(&content)?)
}
