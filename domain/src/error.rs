//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers (`meeting_ai`, `tokio` tasks). The `source` field holds the original
/// error that caused the domain error. `web` uses the `error_kind` to pick the
/// HTTP status and the `Display` output as the message shown to callers.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Config(String),
    Validation(String),
    Storage(String),
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer,
/// i.e. failures reported by or while talking to an LLM provider.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network(String),
    Provider(String),
    Other(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Validation(message.into())),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Validation(_))
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Internal(kind) => match kind {
                InternalErrorKind::Config(msg) => write!(f, "configuration error: {msg}"),
                InternalErrorKind::Validation(msg) => write!(f, "{msg}"),
                InternalErrorKind::Storage(msg) => write!(f, "summary store error: {msg}"),
                InternalErrorKind::Other(msg) => write!(f, "{msg}"),
            },
            DomainErrorKind::External(kind) => match kind {
                ExternalErrorKind::Network(msg) => write!(f, "{msg}"),
                ExternalErrorKind::Provider(msg) => write!(f, "{msg}"),
                ExternalErrorKind::Other(msg) => write!(f, "{msg}"),
            },
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `meeting_ai` layer to the `domain` layer.
impl From<meeting_ai::Error> for Error {
    fn from(err: meeting_ai::Error) -> Self {
        let message = err.to_string();
        let error_kind = match &err {
            meeting_ai::Error::Network(_) => {
                DomainErrorKind::External(ExternalErrorKind::Network(message))
            }
            meeting_ai::Error::Authentication(_) | meeting_ai::Error::Provider { .. } => {
                DomainErrorKind::External(ExternalErrorKind::Provider(message))
            }
            meeting_ai::Error::Deserialization(_) => {
                DomainErrorKind::External(ExternalErrorKind::Other(message))
            }
            meeting_ai::Error::Configuration(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Config(message))
            }
            meeting_ai::Error::Storage(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Storage(message))
            }
            meeting_ai::Error::Other(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(message))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error {
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(format!(
                "generation task failed: {err}"
            ))),
            source: Some(Box::new(err)),
        }
    }
}
