//! Secret loading from `secret.json`.

use crate::paths::RefractPaths;
use async_trait::async_trait;
use refract_core::config::SecretConfig;
use refract_core::secret::SecretService;
use std::path::PathBuf;

/// [`SecretService`] backed by a JSON file on disk.
///
/// Error messages name the file, never its contents.
pub struct SecretServiceImpl {
    secret_path: PathBuf,
}

impl SecretServiceImpl {
    /// Creates a service reading from the default location
    /// (`~/.config/refract/secret.json`).
    pub fn default_location() -> Result<Self, String> {
        let secret_path = RefractPaths::secret_file().map_err(|e| e.to_string())?;
        Ok(Self { secret_path })
    }

    /// Creates a service reading from an explicit path.
    pub fn new(secret_path: impl Into<PathBuf>) -> Self {
        Self {
            secret_path: secret_path.into(),
        }
    }
}

#[async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        if !self.secret_path.exists() {
            return Ok(SecretConfig::default());
        }

        let content = tokio::fs::read_to_string(&self.secret_path)
            .await
            .map_err(|e| format!("Failed to read {:?}: {}", self.secret_path, e))?;

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {:?}: {}", self.secret_path, e))
    }

    async fn secret_file_exists(&self) -> bool {
        self.secret_path.exists()
    }
}
