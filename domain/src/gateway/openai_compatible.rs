//! OpenAI-compatible chat-completion client (DeepSeek by default).
//!
//! Talks to any endpoint implementing `POST /chat/completions`, in both the
//! single-response and the server-sent-events streaming form.

use super::{ensure_success, event_stream};
use async_trait::async_trait;
use futures::TryStreamExt;
use log::*;
use meeting_ai::traits::chat::Provider;
use meeting_ai::{Error, FragmentStream, Message};
use serde::{Deserialize, Serialize};

/// Request body for a chat completion
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
}

/// Response from a non-streaming chat completion
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One streamed chunk of a chat completion
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible API client
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    provider_id: String,
    base_url: String,
    model: String,
    has_api_key: bool,
}

impl OpenAiCompatibleClient {
    /// Create a client for `base_url`. Without an API key the client is still built,
    /// but every request fails with an authentication error.
    pub fn new(
        provider_id: &str,
        api_key: Option<&str>,
        base_url: &str,
        model: &str,
    ) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(api_key) = api_key {
            let mut header_value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(
                    |e| {
                        warn!("Failed to create auth header: {:?}", e);
                        Error::Configuration("Invalid API key format".to_string())
                    },
                )?;
            header_value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, header_value);
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            provider_id: provider_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            has_api_key: api_key.is_some(),
        })
    }

    async fn send(&self, messages: &[Message], stream: bool) -> Result<reqwest::Response, Error> {
        if !self.has_api_key {
            return Err(Error::Authentication(format!(
                "no API key configured for {}",
                self.provider_id
            )));
        }

        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            stream,
        };

        debug!(
            "Sending {} message(s) to {} model {} (stream={})",
            messages.len(),
            self.provider_id,
            self.model,
            stream
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call {} chat completions: {:?}", self.provider_id, e);
                Error::Network(e.to_string())
            })?;

        ensure_success(&self.provider_id, response).await
    }
}

#[async_trait]
impl Provider for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, Error> {
        let response = self.send(messages, false).await?;
        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse {} response: {:?}", self.provider_id, e);
            Error::Deserialization(format!("Invalid response from {}: {e}", self.provider_id))
        })?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }

    async fn stream(&self, messages: &[Message]) -> Result<FragmentStream, Error> {
        let response = self.send(messages, true).await?;
        let fragments =
            event_stream::data_payloads(response).try_filter_map(|payload| async move {
                let chunk: ChatCompletionChunk = serde_json::from_str(&payload)?;
                Ok::<_, Error>(chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|content| !content.is_empty()))
            });
        Ok(Box::pin(fragments))
    }

    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(base_url: &str) -> OpenAiCompatibleClient {
        OpenAiCompatibleClient::new("deepseek", Some("sk-test"), base_url, "deepseek-chat").unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::Json(json!({
                "model": "deepseek-chat",
                "messages": [{"role": "user", "content": "Summarize"}],
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "id": "cmpl-1",
                    "choices": [
                        {"index": 0, "message": {"role": "assistant", "content": "Topic: roadmap"}},
                        {"index": 1, "message": {"role": "assistant", "content": "ignored"}}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let answer = client(&server.url())
            .complete(&[Message::user("Summarize")])
            .await
            .unwrap();

        assert_eq!(answer, "Topic: roadmap");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_without_choices_returns_empty_string() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(json!({"id": "cmpl-2", "choices": []}).to_string())
            .create_async()
            .await;

        let answer = client(&server.url())
            .complete(&[Message::user("Summarize")])
            .await
            .unwrap();

        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn test_stream_yields_delta_content_and_skips_empty_chunks() {
        let mut server = Server::new_async().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
            ": keep-alive\n\n",
            "data: {\"choices\":[{\"delta\":{}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" team\"}}]}\n\n",
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"after done\"}}]}\n\n"
        );
        let _mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::PartialJson(json!({"stream": true})))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await;

        let fragments = client(&server.url())
            .stream(&[Message::user("Summarize")])
            .await
            .unwrap();
        let collected: Vec<String> = fragments.map(|f| f.unwrap()).collect().await;

        assert_eq!(collected, vec!["Hello".to_string(), " team".to_string()]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_provider_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(&[Message::user("Summarize")])
            .await
            .unwrap_err();

        match err {
            Error::Provider { status, message } => {
                assert_eq!(status, Some(500));
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_any_request() {
        let client =
            OpenAiCompatibleClient::new("deepseek", None, "http://127.0.0.1:9", "deepseek-chat")
                .unwrap();
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
