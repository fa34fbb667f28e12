use crate::controller::Envelope;
use crate::params::{self, chat::ChatParams};
use crate::response::ndjson;
use crate::{AppState, Error};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::minutes;
use log::*;

pub(crate) const FAILURE_CONTEXT: &str = "error generating answer";

/// POST answer a question about a meeting
///
/// Uses the cached summary of `meeting_id`, generating it first when the meeting
/// has not been summarized yet. Answers are never cached.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatParams,
    responses(
        (status = 200, description = "One envelope, or newline-delimited envelopes when `stream` is true", body = Envelope),
        (status = 400, description = "Missing required parameters, empty messages or malformed body", body = Envelope),
        (status = 500, description = "The LLM provider failed to generate the summary or the answer", body = Envelope),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    payload: Result<Json<ChatParams>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(params) = payload.map_err(params::invalid_body)?;
    let streaming = params.streaming();
    let (meeting, turns) = params.into_request()?;

    info!(
        "[{}] POST chat for meeting {} with {} message(s) (stream: {streaming})",
        meeting.log_id,
        meeting.meeting_id,
        turns.len()
    );

    let log_id = meeting.log_id.clone();
    if streaming {
        let fragments = minutes::answer_stream(
            app_state.chat_provider.clone(),
            app_state.summary_store.clone(),
            meeting,
            turns,
        );
        return Ok(ndjson::respond(log_id, FAILURE_CONTEXT, fragments));
    }

    let envelope = match minutes::answer_detached(
        app_state.chat_provider.clone(),
        app_state.summary_store.clone(),
        meeting,
        turns,
    )
    .await
    {
        Ok(answer) => Envelope::complete(answer),
        Err(e) => {
            error!("[{log_id}] {FAILURE_CONTEXT}: {e}");
            Envelope::failure(&e, FAILURE_CONTEXT)
        }
    };
    Ok(envelope.into_response())
}
