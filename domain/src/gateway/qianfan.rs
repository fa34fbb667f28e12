//! Baidu Qianfan (ERNIE) chat-completion client.
//!
//! Authenticates with the OAuth client-credentials flow using the configured
//! access/secret key pair, caches the access token until shortly before it
//! expires, and calls the ERNIE chat endpoint matching the configured model.

use super::{ensure_success, event_stream};
use async_trait::async_trait;
use futures::TryStreamExt;
use log::*;
use meeting_ai::traits::chat::Provider;
use meeting_ai::{Error, FragmentStream, Message};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const PROVIDER_ID: &str = "qianfan";
const CHAT_PATH: &str = "/rpc/2.0/ai_custom/v1/wenxinworkshop/chat";
const TOKEN_PATH: &str = "/oauth/2.0/token";

/// Tokens are refreshed this long before Qianfan says they expire.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Qianfan error codes meaning the access token is invalid or expired.
const TOKEN_ERROR_CODES: [i64; 2] = [110, 111];

/// Maps a model name to its chat endpoint path segment.
pub fn endpoint_for_model(model: &str) -> String {
    match model {
        "ERNIE-4.0-8K" => "completions_pro".to_string(),
        "ERNIE-3.5-8K" => "completions".to_string(),
        "ERNIE-Speed-8K" => "ernie_speed".to_string(),
        "ERNIE-Lite-8K" => "ernie-lite-8k".to_string(),
        "ERNIE-4.0-Turbo-8K" => "ernie-4.0-turbo-8k".to_string(),
        other => other.to_lowercase(),
    }
}

/// Response from the OAuth token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Request body for an ERNIE chat call
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
    stream: bool,
}

/// Response body of an ERNIE chat call, also the shape of each streamed event.
/// Errors are reported inside a 200 response through `error_code`/`error_msg`.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

/// Qianfan API client
pub struct QianfanClient {
    client: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
    secret_key: Option<String>,
    model: String,
    endpoint: String,
    token: Mutex<Option<AccessToken>>,
}

impl QianfanClient {
    /// Create a client for `model`. Missing keys are only reported when a request is made.
    pub fn new(
        access_key: Option<String>,
        secret_key: Option<String>,
        base_url: &str,
        model: &str,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
            secret_key,
            model: model.to_string(),
            endpoint: endpoint_for_model(model),
            token: Mutex::new(None),
        })
    }

    /// Return a cached access token, fetching a new one when absent or about to expire.
    async fn access_token(&self) -> Result<String, Error> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let (Some(access_key), Some(secret_key)) = (&self.access_key, &self.secret_key) else {
            return Err(Error::Authentication(
                "QIANFAN_ACCESS_KEY and QIANFAN_SECRET_KEY must both be configured".to_string(),
            ));
        };

        let url = format!("{}{}", self.base_url, TOKEN_PATH);
        debug!("Requesting Qianfan access token");

        let response = self
            .client
            .post(&url)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", access_key.as_str()),
                ("client_secret", secret_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to request Qianfan access token: {:?}", e);
                Error::Network(e.to_string())
            })?;

        let response = ensure_success(PROVIDER_ID, response).await?;
        let token: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Qianfan token response: {:?}", e);
            Error::Deserialization(format!("Invalid token response from Qianfan: {e}"))
        })?;

        let Some(value) = token.access_token else {
            let reason = token
                .error_description
                .or(token.error)
                .unwrap_or_else(|| "no access_token in response".to_string());
            error!("Qianfan rejected credentials: {}", reason);
            return Err(Error::Authentication(reason));
        };

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(0));
        let access_token = AccessToken {
            value: value.clone(),
            refresh_at: Instant::now() + lifetime.saturating_sub(TOKEN_EXPIRY_MARGIN),
        };
        *cached = Some(access_token);
        info!("Obtained Qianfan access token valid for {}s", lifetime.as_secs());

        Ok(value)
    }

    async fn send(&self, messages: &[Message], stream: bool) -> Result<reqwest::Response, Error> {
        let access_token = self.access_token().await?;
        let url = format!("{}{}/{}", self.base_url, CHAT_PATH, self.endpoint);

        debug!(
            "Sending {} message(s) to Qianfan model {} (stream={})",
            messages.len(),
            self.model,
            stream
        );

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", access_token.as_str())])
            .json(&ChatRequest { messages, stream })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to call Qianfan chat: {:?}", e);
                Error::Network(e.to_string())
            })?;

        ensure_success(PROVIDER_ID, response).await
    }

    /// Turn an in-body error into an `Error`, dropping the cached token when Qianfan
    /// says it is no longer valid so the next request fetches a fresh one.
    async fn check_result(&self, response: ChatResponse) -> Result<String, Error> {
        match response.error_code {
            None => Ok(response.result),
            Some(code) => {
                let message = response
                    .error_msg
                    .unwrap_or_else(|| "unknown error".to_string());
                error!("Qianfan API error {}: {}", code, message);
                if TOKEN_ERROR_CODES.contains(&code) {
                    *self.token.lock().await = None;
                    Err(Error::Authentication(format!("{message} (error_code {code})")))
                } else {
                    Err(Error::Provider {
                        status: None,
                        message: format!("{message} (error_code {code})"),
                    })
                }
            }
        }
    }
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

fn parse_chat_response(payload: &str) -> Result<ChatResponse, Error> {
    Ok(serde_json::from_str(payload)?)
}

#[async_trait]
impl Provider for QianfanClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, Error> {
        let response = self.send(messages, false).await?;
        let body = response.text().await.map_err(|e| Error::Network(e.to_string()))?;
        self.check_result(parse_chat_response(&body)?).await
    }

    async fn stream(&self, messages: &[Message]) -> Result<FragmentStream, Error> {
        let response = self.send(messages, true).await?;

        // Request-level failures come back as a plain JSON body instead of an event stream
        if is_json(&response) {
            let body = response.text().await.map_err(|e| Error::Network(e.to_string()))?;
            let result = self.check_result(parse_chat_response(&body)?).await?;
            let single: Vec<Result<String, Error>> = if result.is_empty() {
                Vec::new()
            } else {
                vec![Ok(result)]
            };
            return Ok(Box::pin(futures::stream::iter(single)));
        }

        let fragments = event_stream::data_payloads(response).try_filter_map(|payload| async move {
            let event = parse_chat_response(&payload)?;
            if let Some(code) = event.error_code {
                return Err(Error::Provider {
                    status: None,
                    message: format!(
                        "{} (error_code {code})",
                        event.error_msg.unwrap_or_else(|| "unknown error".to_string())
                    ),
                });
            }
            Ok(Some(event.result).filter(|fragment| !fragment.is_empty()))
        });
        Ok(Box::pin(fragments))
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn client(base_url: &str) -> QianfanClient {
        QianfanClient::new(
            Some("test-ak".to_string()),
            Some("test-sk".to_string()),
            base_url,
            "ERNIE-4.0-8K",
        )
        .unwrap()
    }

    async fn mock_token(server: &mut ServerGuard, hits: usize) -> mockito::Mock {
        server
            .mock("POST", TOKEN_PATH)
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()),
                Matcher::UrlEncoded("client_id".into(), "test-ak".into()),
                Matcher::UrlEncoded("client_secret".into(), "test-sk".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": "token-123", "expires_in": 2592000}).to_string())
            .expect(hits)
            .create_async()
            .await
    }

    #[test]
    fn test_endpoint_for_model_maps_known_models() {
        assert_eq!(endpoint_for_model("ERNIE-4.0-8K"), "completions_pro");
        assert_eq!(endpoint_for_model("ERNIE-3.5-8K"), "completions");
        assert_eq!(endpoint_for_model("ERNIE-Speed-8K"), "ernie_speed");
        assert_eq!(endpoint_for_model("ERNIE-Tiny-8K"), "ernie-tiny-8k");
    }

    #[tokio::test]
    async fn test_complete_fetches_token_once_and_returns_result() {
        let mut server = Server::new_async().await;
        let token_mock = mock_token(&mut server, 1).await;
        let chat_mock = server
            .mock("POST", "/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions_pro")
            .match_query(Matcher::UrlEncoded(
                "access_token".into(),
                "token-123".into(),
            ))
            .match_body(Matcher::Json(json!({
                "messages": [{"role": "user", "content": "Summarize"}],
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"id": "as-1", "result": "会议主题：产品规划", "is_end": true}).to_string())
            .expect(2)
            .create_async()
            .await;

        let client = client(&server.url());
        let first = client.complete(&[Message::user("Summarize")]).await.unwrap();
        let second = client.complete(&[Message::user("Summarize")]).await.unwrap();

        assert_eq!(first, "会议主题：产品规划");
        assert_eq!(second, first);
        token_mock.assert_async().await;
        chat_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_in_body_error_code_is_a_provider_error() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let _mock = server
            .mock("POST", "/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions_pro")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"error_code": 18, "error_msg": "Open api qps request limit reached"}).to_string())
            .create_async()
            .await;

        let err = client(&server.url())
            .complete(&[Message::user("Summarize")])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Provider error: Open api qps request limit reached (error_code 18)"
        );
    }

    #[tokio::test]
    async fn test_stream_yields_results_and_skips_empty_events() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let body = concat!(
            "data: {\"id\":\"as-2\",\"result\":\"会议\",\"is_end\":false}\n\n",
            "data: {\"id\":\"as-2\",\"result\":\"\",\"is_end\":false}\n\n",
            "data: {\"id\":\"as-2\",\"result\":\"纪要\",\"is_end\":true}\n\n"
        );
        let _mock = server
            .mock("POST", "/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions_pro")
            .match_query(Matcher::Any)
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

        assert_eq!(collected, vec!["会议".to_string(), "纪要".to_string()]);
    }

    #[tokio::test]
    async fn test_stream_reports_json_error_body() {
        let mut server = Server::new_async().await;
        let _token = mock_token(&mut server, 1).await;
        let _mock = server
            .mock("POST", "/rpc/2.0/ai_custom/v1/wenxinworkshop/chat/completions_pro")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"error_code": 111, "error_msg": "Access token expired"}).to_string())
            .create_async()
            .await;

        let result = client(&server.url())
            .stream(&[Message::user("Summarize")])
            .await;

        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[tokio::test]
    async fn test_missing_keys_fail_without_calling_qianfan() {
        let client = QianfanClient::new(None, None, "http://127.0.0.1:9", "ERNIE-4.0-8K").unwrap();
        let err = client.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }
}
