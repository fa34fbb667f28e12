use crate::controller::Envelope;
use crate::params::{self, summary::SummaryParams};
use crate::response::ndjson;
use crate::{AppState, Error};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domain::minutes;
use log::*;

pub(crate) const FAILURE_CONTEXT: &str = "error generating meeting summary";

/// POST generate the minutes of a meeting from its transcript
///
/// The summary is cached under `meeting_id` and reused by `/chat`.
#[utoipa::path(
    post,
    path = "/summary",
    request_body = SummaryParams,
    responses(
        (status = 200, description = "One envelope, or newline-delimited envelopes when `stream` is true", body = Envelope),
        (status = 400, description = "Missing required parameters or malformed body", body = Envelope),
        (status = 500, description = "The LLM provider failed to generate the summary", body = Envelope),
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    payload: Result<Json<SummaryParams>, JsonRejection>,
) -> Result<Response, Error> {
    let Json(params) = payload.map_err(params::invalid_body)?;
    let streaming = params.streaming();
    let meeting = params.into_meeting()?;

    info!(
        "[{}] POST summary for meeting {} (stream: {streaming})",
        meeting.log_id, meeting.meeting_id
    );

    let log_id = meeting.log_id.clone();
    if streaming {
        let fragments = minutes::summarize_stream(
            app_state.chat_provider.clone(),
            app_state.summary_store.clone(),
            meeting,
        );
        return Ok(ndjson::respond(log_id, FAILURE_CONTEXT, fragments));
    }

    let envelope = match minutes::summarize_detached(
        app_state.chat_provider.clone(),
        app_state.summary_store.clone(),
        meeting,
    )
    .await
    {
        Ok(summary) => Envelope::complete(summary),
        Err(e) => {
            error!("[{log_id}] {FAILURE_CONTEXT}: {e}");
            Envelope::failure(&e, FAILURE_CONTEXT)
        }
    };
    Ok(envelope.into_response())
}
