use domain::error::Error as DomainError;
use domain::minutes::Meeting;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /summary`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct SummaryParams {
    /// Correlation id echoed in server logs.
    #[schema(example = "req-20240501-001")]
    pub(crate) log_id: Option<String>,
    /// Subtitle-formatted transcript.
    pub(crate) srt_text: Option<String>,
    /// Alternative name for `srt_text`, used when `srt_text` is absent or empty.
    pub(crate) src_text: Option<String>,
    #[schema(example = "weekly-sync-42")]
    pub(crate) meeting_id: Option<String>,
    /// Stream the summary as newline-delimited envelopes.
    pub(crate) stream: Option<bool>,
}

impl SummaryParams {
    pub(crate) fn streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    pub(crate) fn into_meeting(self) -> Result<Meeting, DomainError> {
        super::require_meeting(self.log_id, self.srt_text, self.src_text, self.meeting_id)
    }
}
