//! Error types for meeting AI operations.

use std::fmt;

/// Universal error type that abstracts provider-specific errors into common variants.
///
/// All provider and store implementations map their native errors to these variants,
/// preserving context while keeping a provider-agnostic interface for callers.
#[derive(Debug)]
pub enum Error {
    /// API key or access token failures. Credentials are missing, invalid or expired.
    Authentication(String),

    /// Network connectivity issues, DNS failures, dropped connections or broken streams.
    Network(String),

    /// Invalid parameters, missing required settings, or malformed configuration.
    Configuration(String),

    /// The provider accepted the request but answered with an error
    /// (non-2xx status, or an error payload inside a 2xx body).
    Provider { status: Option<u16>, message: String },

    /// Failed to deserialize a provider payload into the expected type.
    Deserialization(String),

    /// A summary store could not read or write a record.
    Storage(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Provider {
                status: Some(status),
                message,
            } => write!(f, "Provider error ({}): {}", status, message),
            Error::Provider {
                status: None,
                message,
            } => write!(f, "Provider error: {}", message),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_includes_status_when_known() {
        let err = Error::Provider {
            status: Some(429),
            message: "too many requests".to_string(),
        };
        assert_eq!(err.to_string(), "Provider error (429): too many requests");
    }

    #[test]
    fn test_provider_error_display_without_status() {
        let err = Error::Provider {
            status: None,
            message: "Open api qps request limit reached".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Provider error: Open api qps request limit reached"
        );
    }

    #[test]
    fn test_serde_json_error_converts_to_deserialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Deserialization(_)));
    }
}
