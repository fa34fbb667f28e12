//! Types for chat-completion operations.

use crate::Error;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;

/// Speaker of a single chat turn.
///
/// Only `user` and `assistant` are accepted from callers; context built by the
/// service is sent as a `user` turn because not every provider accepts `system`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One `{role, content}` pair in the ordered conversation sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Lazy, finite, non-restartable sequence of generated text fragments.
///
/// Providers never yield empty fragments. An `Err` item ends the generation;
/// consumers should stop polling after the first error.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// Outcome of a generation request: the full text, or fragments still to arrive.
pub enum Generation {
    Complete(String),
    Streaming(FragmentStream),
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Generation::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            Generation::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serializes_with_lowercase_role() {
        let message = Message::assistant("The release is on the 15th.");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({"role": "assistant", "content": "The release is on the 15th."})
        );
    }

    #[test]
    fn test_message_rejects_unknown_role() {
        let result = serde_json::from_value::<Message>(json!({"role": "tool", "content": "x"}));
        assert!(result.is_err());
    }
}
