use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use domain::error::Error as DomainError;
use log::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::Error;

pub(crate) mod chat_controller;
pub(crate) mod health_check_controller;
pub(crate) mod summary_controller;

pub(crate) const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Payload of every `/summary` and `/chat` reply, streamed or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct Envelope {
    /// HTTP-like status of this envelope: 200, 400 or 500.
    pub(crate) status: u16,
    pub(crate) data: EnvelopeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct EnvelopeData {
    /// Generated text, a fragment of it, or an error message.
    pub(crate) answer: String,
    /// 1 on the last envelope of a response, 0 otherwise.
    pub(crate) is_end: u8,
}

impl Envelope {
    /// Successful, final envelope carrying the whole answer.
    pub(crate) fn complete(answer: impl Into<String>) -> Self {
        Self::complete_with_status(StatusCode::OK, answer)
    }

    pub(crate) fn complete_with_status(status: StatusCode, answer: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            data: EnvelopeData {
                answer: answer.into(),
                is_end: 1,
            },
        }
    }

    /// Non-final envelope carrying one streamed fragment.
    pub(crate) fn fragment(answer: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK.as_u16(),
            data: EnvelopeData {
                answer: answer.into(),
                is_end: 0,
            },
        }
    }

    /// Terminal marker of a successful stream.
    pub(crate) fn end() -> Self {
        Self::complete("")
    }

    /// Final envelope describing a failed generation; `context` names the operation.
    pub(crate) fn failure(err: &DomainError, context: &str) -> Self {
        let status = Error::status_code(err);
        let answer = if status == StatusCode::BAD_REQUEST {
            err.to_string()
        } else {
            format!("{context}: {err}")
        };
        Self::complete_with_status(status, answer)
    }

    /// One NDJSON line: the envelope followed by `\n`.
    pub(crate) fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_string(&self) {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
                body,
            )
                .into_response(),
            Err(e) => {
                error!("Failed to serialize response envelope: {e}");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
