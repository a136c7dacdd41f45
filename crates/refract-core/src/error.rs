//! Error types for the Refract orchestration core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Refract core.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum RefractError {
    /// A remote generative call failed (network, auth, malformed response,
    /// or no usable payload).
    #[error("Remote call failed: {message}")]
    RemoteCall {
        message: String,
        /// HTTP status code, when the failure came from an HTTP response.
        status_code: Option<u16>,
        /// Whether retrying the same call may succeed.
        retryable: bool,
    },

    /// A persistence write was rejected by the storage layer for size reasons.
    #[error("Storage capacity exceeded: payload of {payload_bytes} bytes over limit")]
    CapacityExceeded { payload_bytes: usize },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RefractError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a non-retryable RemoteCall error with no status code.
    pub fn remote_call(message: impl Into<String>) -> Self {
        Self::RemoteCall {
            message: message.into(),
            status_code: None,
            retryable: false,
        }
    }

    /// Creates a RemoteCall error carrying an HTTP status.
    pub fn remote_status(status_code: u16, message: impl Into<String>, retryable: bool) -> Self {
        Self::RemoteCall {
            message: message.into(),
            status_code: Some(status_code),
            retryable,
        }
    }

    /// Creates a CapacityExceeded error for a payload of the given size.
    pub fn capacity_exceeded(payload_bytes: usize) -> Self {
        Self::CapacityExceeded { payload_bytes }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a RemoteCall error
    pub fn is_remote_call(&self) -> bool {
        matches!(self, Self::RemoteCall { .. })
    }

    /// Check if this is a CapacityExceeded error
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if a retry of the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteCall { retryable: true, .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RefractError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RefractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RefractError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for RefractError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, RefractError>`.
pub type Result<T> = std::result::Result<T, RefractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_call_helpers() {
        let err = RefractError::remote_call("service unreachable");
        assert!(err.is_remote_call());
        assert!(!err.is_retryable());

        let err = RefractError::remote_status(429, "rate limited", true);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_capacity_exceeded() {
        let err = RefractError::capacity_exceeded(4096);
        assert!(err.is_capacity_exceeded());
        assert!(err.to_string().contains("4096"));
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: RefractError = parse_err.into();
        assert!(err.is_serialization());
    }
}
