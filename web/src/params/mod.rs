//! Typed request bodies for the minutes endpoints.
//!
//! Every field is optional at the deserialization layer so that a missing or empty
//! value is reported as a validation failure with the same message whether it was
//! absent, `null` or `""`. Structural problems (invalid JSON, wrong types, unknown
//! chat roles) are rejected by the extractor and surface as `invalid request body`.

use crate::Error;
use axum::extract::rejection::JsonRejection;
use domain::error::Error as DomainError;
use domain::minutes::Meeting;
use domain::transcript;

pub(crate) mod chat;
pub(crate) mod summary;

const MISSING_PARAMETERS: &str = "missing required parameters";

/// Maps a body the `Json` extractor could not decode to a 400 envelope.
pub(crate) fn invalid_body(rejection: JsonRejection) -> Error {
    DomainError::validation(format!("invalid request body: {}", rejection.body_text())).into()
}

/// Fields shared by `/summary` and `/chat`, checked for presence and turned into a [`Meeting`].
pub(crate) fn require_meeting(
    log_id: Option<String>,
    srt_text: Option<String>,
    src_text: Option<String>,
    meeting_id: Option<String>,
) -> Result<Meeting, DomainError> {
    // srt_text wins whenever it carries text; src_text is the legacy field name
    let raw_transcript = present(srt_text).or_else(|| present(src_text));

    match (present(log_id), raw_transcript, present(meeting_id)) {
        (Some(log_id), Some(raw_transcript), Some(meeting_id)) => Ok(Meeting {
            log_id,
            meeting_id,
            transcript: transcript::parse_srt(&raw_transcript),
        }),
        _ => Err(DomainError::validation(MISSING_PARAMETERS)),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
