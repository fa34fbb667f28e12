use anyhow::{Context, Result};
use futures_util::stream::{Stream, StreamExt};
use log::*;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::turn::Turn;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Envelope {
    pub status: u16,
    pub data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnvelopeData {
    pub answer: String,
    pub is_end: u8,
}

impl Envelope {
    pub fn is_end(&self) -> bool {
        self.data.is_end == 1
    }
}

#[derive(Debug, Serialize)]
pub struct MeetingRequest<'a> {
    pub log_id: &'a str,
    pub srt_text: &'a str,
    pub meeting_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<&'a [Turn]>,
    pub stream: bool,
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<Value> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach the health endpoint")?;

        if !response.status().is_success() {
            anyhow::bail!("Health check failed: {}", response.status());
        }

        response.json().await.context("Failed to parse health response")
    }

    /// Sends a non-streaming request and returns its single envelope, whatever its status.
    pub async fn send(&self, path: &str, request: &MeetingRequest<'_>) -> Result<Envelope> {
        let response = self.post(path, request).await?;
        response
            .json()
            .await
            .context("Failed to parse response envelope")
    }

    /// Sends a streaming request and yields envelopes as their lines arrive.
    pub async fn send_streaming(
        &self,
        path: &str,
        request: &MeetingRequest<'_>,
    ) -> Result<impl Stream<Item = Result<Envelope>>> {
        let response = self.post(path, request).await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            anyhow::bail!("Request failed: {} - Response: {}", status, body);
        }
        Ok(envelopes(response))
    }

    async fn post(&self, path: &str, request: &MeetingRequest<'_>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {url} (stream: {})", request.stream);

        self.client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {path}"))
    }
}

fn envelopes(response: Response) -> impl Stream<Item = Result<Envelope>> {
    let mut buffer = Vec::new();
    response
        .bytes_stream()
        .map(move |chunk| -> Result<Vec<Envelope>> {
            let chunk = chunk.context("Response stream interrupted")?;
            buffer.extend_from_slice(&chunk);
            let mut parsed = Vec::new();
            while let Some(line) = take_line(&mut buffer) {
                if let Some(envelope) = parse_line(&line)? {
                    parsed.push(envelope);
                }
            }
            Ok(parsed)
        })
        .flat_map(|batch| {
            let items: Vec<Result<Envelope>> = match batch {
                Ok(envelopes) => envelopes.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures_util::stream::iter(items)
        })
}

fn take_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let newline = buffer.iter().position(|&byte| byte == b'\n')?;
    let mut line: Vec<u8> = buffer.drain(..=newline).collect();
    line.pop();
    Some(line)
}

fn parse_line(line: &[u8]) -> Result<Option<Envelope>> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(Some)
        .with_context(|| format!("Failed to parse envelope line: {text}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_line_keeps_partial_tail_buffered() {
        let mut buffer = b"{\"a\":1}\n{\"b\"".to_vec();
        assert_eq!(take_line(&mut buffer).unwrap(), b"{\"a\":1}".to_vec());
        assert!(take_line(&mut buffer).is_none());
        assert_eq!(buffer, b"{\"b\"".to_vec());
    }

    #[test]
    fn parse_line_reads_envelopes_and_skips_blank_lines() {
        let envelope = parse_line(br#"{"status":200,"data":{"answer":"","is_end":1}}"#)
            .unwrap()
            .unwrap();
        assert!(envelope.is_end());
        assert_eq!(envelope.status, 200);
        assert!(parse_line(b"  ").unwrap().is_none());
        assert!(parse_line(b"not json").is_err());
    }

    #[test]
    fn chat_request_serializes_messages() {
        let turns = [Turn::parse("When do we ship?").unwrap()];
        let request = MeetingRequest {
            log_id: "log-1",
            srt_text: "Hello team.",
            meeting_id: "m1",
            messages: Some(&turns),
            stream: false,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["stream"], false);
    }
}
