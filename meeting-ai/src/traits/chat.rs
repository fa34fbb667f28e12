//! Chat-completion provider trait.

use crate::types::chat::{FragmentStream, Generation, Message};
use crate::Error;
use async_trait::async_trait;

/// Abstraction for LLM chat-completion backends.
///
/// Implementations wrap a single vendor API (Qianfan, DeepSeek or any OpenAI-compatible
/// endpoint). One implementation is chosen at startup and shared by every request.
/// Implementations must not retry; failures are reported to the caller as-is.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the full answer for `messages` and return it once complete.
    ///
    /// Returns an empty string when the provider answers without any content.
    async fn complete(&self, messages: &[Message]) -> std::result::Result<String, Error>;

    /// Start a streaming generation for `messages`.
    ///
    /// The returned stream is lazy: fragments are pulled from the provider as the
    /// caller polls. Empty fragments are skipped by the implementation.
    async fn stream(&self, messages: &[Message]) -> std::result::Result<FragmentStream, Error>;

    /// Return unique identifier for this provider (e.g., "qianfan", "deepseek").
    fn provider_id(&self) -> &str;

    /// Model name sent with every request.
    fn model(&self) -> &str;

    /// Dispatch to [`Provider::complete`] or [`Provider::stream`] based on `streaming`.
    async fn generate(
        &self,
        messages: &[Message],
        streaming: bool,
    ) -> std::result::Result<Generation, Error> {
        if streaming {
            Ok(Generation::Streaming(self.stream(messages).await?))
        } else {
            Ok(Generation::Complete(self.complete(messages).await?))
        }
    }
}
