use anyhow::Result;
use serde::Serialize;

/// One `{role, content}` entry of the `messages` array sent to `/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub role: String,
    pub content: String,
}

impl Turn {
    /// Parses `role:content`; a value without a known role prefix is a user turn.
    pub fn parse(input: &str) -> Result<Self> {
        let (role, content) = match input.split_once(':') {
            Some((role @ ("user" | "assistant"), content)) => (role, content),
            _ => ("user", input),
        };
        if content.trim().is_empty() {
            anyhow::bail!("Invalid turn format. Expected [user|assistant:]content");
        }
        Ok(Self {
            role: role.to_string(),
            content: content.trim().to_string(),
        })
    }
}
