use domain::error::Error as DomainError;
use domain::minutes::Meeting;
use domain::{Message, Role};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TurnRole {
    User,
    Assistant,
}

/// One prior or current turn of the conversation, oldest first.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ChatTurn {
    pub(crate) role: TurnRole,
    pub(crate) content: String,
}

impl From<ChatTurn> for Message {
    fn from(turn: ChatTurn) -> Self {
        let role = match turn.role {
            TurnRole::User => Role::User,
            TurnRole::Assistant => Role::Assistant,
        };
        Message {
            role,
            content: turn.content,
        }
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ChatParams {
    #[schema(example = "req-20240501-002")]
    pub(crate) log_id: Option<String>,
    pub(crate) srt_text: Option<String>,
    pub(crate) src_text: Option<String>,
    #[schema(example = "weekly-sync-42")]
    pub(crate) meeting_id: Option<String>,
    /// Full conversation supplied by the caller; must not be empty.
    pub(crate) messages: Option<Vec<ChatTurn>>,
    pub(crate) stream: Option<bool>,
}

impl ChatParams {
    pub(crate) fn streaming(&self) -> bool {
        self.stream.unwrap_or(false)
    }

    pub(crate) fn into_request(self) -> Result<(Meeting, Vec<Message>), DomainError> {
        let meeting =
            super::require_meeting(self.log_id, self.srt_text, self.src_text, self.meeting_id)?;

        let turns: Vec<Message> = self
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(Message::from)
            .collect();
        if turns.is_empty() {
            return Err(DomainError::validation("messages must not be empty"));
        }

        Ok((meeting, turns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(body: serde_json::Value) -> ChatParams {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_into_request_keeps_turn_order() {
        let (meeting, turns) = params(json!({
            "log_id": "log-1",
            "srt_text": "Hello team.",
            "meeting_id": "m1",
            "messages": [
                {"role": "user", "content": "When?"},
                {"role": "assistant", "content": "Friday."},
                {"role": "user", "content": "Who?"}
            ]
        }))
        .into_request()
        .unwrap();

        assert_eq!(meeting.meeting_id, "m1");
        assert_eq!(
            turns,
            vec![
                Message::user("When?"),
                Message::assistant("Friday."),
                Message::user("Who?")
            ]
        );
    }

    #[test]
    fn test_into_request_requires_messages() {
        for messages in [json!([]), json!(null)] {
            let err = params(json!({
                "log_id": "log-1",
                "srt_text": "Hello team.",
                "meeting_id": "m1",
                "messages": messages
            }))
            .into_request()
            .unwrap_err();
            assert_eq!(err.to_string(), "messages must not be empty");
        }
    }

    #[test]
    fn test_missing_parameters_are_reported_before_messages() {
        let err = params(json!({"log_id": "log-1", "srt_text": "Hello team."}))
            .into_request()
            .unwrap_err();
        assert_eq!(err.to_string(), "missing required parameters");
    }

    #[test]
    fn test_unknown_role_is_rejected_at_deserialization() {
        let result = serde_json::from_value::<ChatParams>(json!({
            "messages": [{"role": "system", "content": "x"}]
        }));
        assert!(result.is_err());
    }
}
