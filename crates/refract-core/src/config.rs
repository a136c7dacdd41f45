//! Configuration models for the Refract core.

use serde::{Deserialize, Serialize};

/// Maximum number of submissions retained in history.
///
/// Kept small so the artifact-stripped projection fits comfortably inside
/// size-constrained durable storage.
pub const DEFAULT_MAX_HISTORY: usize = 5;

/// Secrets loaded from `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    /// Gemini API credentials, when configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini API credentials.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiSecret {
    pub api_key: String,
}

/// Remote model selection.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RemoteConfig {
    /// Model used for the structured refactor call.
    #[serde(default = "default_text_model")]
    pub text_model: String,
    /// Model used for logic-diagram generation.
    #[serde(default = "default_image_model")]
    pub image_model: String,
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            text_model: default_text_model(),
            image_model: default_image_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_config_defaults() {
        let config = RemoteConfig::default();
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert_eq!(config.image_model, "gemini-2.5-flash-image");
    }

    #[test]
    fn test_secret_config_parses_gemini_block() {
        let config: SecretConfig =
            serde_json::from_str(r#"{"gemini": {"api_key": "k-123"}}"#).unwrap();
        assert_eq!(config.gemini.unwrap().api_key, "k-123");
    }

    #[test]
    fn test_secret_config_tolerates_empty_object() {
        let config: SecretConfig = serde_json::from_str("{}").unwrap();
        assert!(config.gemini.is_none());
    }
}
