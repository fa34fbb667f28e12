//! In-process meeting summary store.

use async_trait::async_trait;
use dashmap::DashMap;
use meeting_ai::traits::summary_store::Store;
use meeting_ai::{Error, MeetingRecord};

/// Unbounded map from meeting identifier to its latest summary.
///
/// Entries live for the lifetime of the process: there is no eviction, no TTL and
/// no capacity bound. Concurrent writers for the same meeting race and the last
/// completed `put` wins.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<String, MeetingRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get(&self, meeting_id: &str) -> Result<Option<MeetingRecord>, Error> {
        Ok(self
            .records
            .get(meeting_id)
            .map(|entry| entry.value().clone()))
    }

    async fn put(&self, meeting_id: &str, record: MeetingRecord) -> Result<(), Error> {
        self.records.insert(meeting_id.to_string(), record);
        Ok(())
    }

    async fn count(&self) -> Result<usize, Error> {
        Ok(self.records.len())
    }
}
