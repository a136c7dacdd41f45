//! API-key loading boundary.
//!
//! The Gemini client is constructed from a [`SecretConfig`]; this trait keeps
//! the core ignorant of where that config comes from (a file in
//! `refract-infrastructure`, a fixture in tests).

use crate::config::SecretConfig;

/// Source of secret configuration for remote clients.
///
/// Error strings returned by implementations must describe the failure
/// without reproducing any key material, since they end up in logs and
/// user-facing errors.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: the available secrets, possibly empty
    /// - `Err(String)`: the backing source exists but could not be read or
    ///   parsed
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    /// Whether a secret source is present at all.
    async fn secret_file_exists(&self) -> bool;
}
