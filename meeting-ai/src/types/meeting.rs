//! Types for cached meeting state.

use serde::{Deserialize, Serialize};

/// Latest summary generated for a meeting and the plain transcript it came from.
///
/// Overwritten on every successful summary generation for the same meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    pub summary: String,
    pub transcript: String,
}
