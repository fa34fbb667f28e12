//! Meeting summary store trait.

use crate::types::meeting::MeetingRecord;
use crate::Error;
use async_trait::async_trait;

/// Key-value store from meeting identifier to its latest [`MeetingRecord`].
///
/// The default implementation is an unbounded in-process map; a bounded or
/// TTL-aware store can be swapped in without touching request handling.
#[async_trait]
pub trait Store: Send + Sync {
    /// Look up the record for `meeting_id`, if a summary was generated before.
    async fn get(&self, meeting_id: &str) -> Result<Option<MeetingRecord>, Error>;

    /// Insert or overwrite the record for `meeting_id`. Last writer wins.
    async fn put(&self, meeting_id: &str, record: MeetingRecord) -> Result<(), Error>;

    /// Number of meetings with a stored summary.
    async fn count(&self) -> Result<usize, Error>;
}
