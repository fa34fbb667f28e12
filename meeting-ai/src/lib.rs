//! Meeting AI abstraction layer for chat-completion providers and summary storage.
//!
//! This crate provides trait-based abstractions for the meeting minutes workflow:
//! - Chat-completion providers that generate text, whole or as a stream of fragments
//! - Stores that remember the latest summary generated for a meeting
//!
//! The design is provider-agnostic, enabling applications to swap between
//! different LLM vendors (Qianfan, DeepSeek, any OpenAI-compatible endpoint) and
//! storage backends without changing application code.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::Error;
pub use types::chat::{FragmentStream, Generation, Message, Role};
pub use types::meeting::MeetingRecord;
