//! Meeting minutes domain layer.
//!
//! Turns subtitle transcripts into plain text, talks to the configured LLM
//! provider and keeps generated summaries so follow-up questions about the same
//! meeting can be answered without summarizing it again.

pub mod error;
pub mod gateway;
pub mod minutes;
pub mod summary_cache;
pub mod transcript;

pub use meeting_ai::{Message, Role};
