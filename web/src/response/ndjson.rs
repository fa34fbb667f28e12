//! Newline-delimited envelope responses for streamed generations.
//!
//! Each fragment becomes one `is_end = 0` envelope on its own line. A stream that
//! runs to completion ends with `Envelope::end()`; a failure ends it with a single
//! 500 envelope instead. The HTTP status is always 200 since the first lines may
//! already have been sent when a failure occurs.

use crate::controller::{Envelope, JSON_UTF8};
use async_stream::stream;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use domain::minutes::AnswerStream;
use futures::{Stream, StreamExt};
use log::*;

/// Frames `fragments` as envelopes, appending exactly one terminal envelope.
pub(crate) fn envelopes(
    log_id: String,
    context: &'static str,
    mut fragments: AnswerStream,
) -> impl Stream<Item = Envelope> + Send + 'static {
    stream! {
        while let Some(fragment) = fragments.next().await {
            match fragment {
                Ok(fragment) => yield Envelope::fragment(fragment),
                Err(e) => {
                    error!("[{log_id}] {context}: {e}");
                    yield Envelope::failure(&e, context);
                    return;
                }
            }
        }
        yield Envelope::end();
    }
}

/// Streams `fragments` to the caller as NDJSON envelopes.
pub(crate) fn respond(log_id: String, context: &'static str, fragments: AnswerStream) -> Response {
    let lines = envelopes(log_id, context, fragments).map(|envelope| envelope.to_line());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
        Body::from_stream(lines),
    )
        .into_response()
}
