use crate::domain::{AnalyticsEvent, AnalyticsQuery, AnalyticsReport};
use crate::storage::journal::{Journal, JournalError};
use std::path::Path;
use tracing::instrument;

/// Event journal backing the analytics endpoint, kept next to the audit
/// trail under `logs/`.
#[derive(Debug)]
pub struct AnalyticsStore {
    journal: Journal<AnalyticsEvent>,
}

const EVENTS_FILE: &str = "events.jsonl";

impl AnalyticsStore {
    pub fn new(directory: &Path) -> Self {
        AnalyticsStore {
            journal: Journal::new(directory.join(EVENTS_FILE)),
        }
    }

    pub async fn record(&self, event: &AnalyticsEvent) -> Result<(), JournalError> {
        self.journal.append(event).await
    }

    #[instrument(skip_all)]
    pub async fn query(&self, query: &AnalyticsQuery) -> Result<AnalyticsReport, JournalError> {
        let events = self.journal.read_all().await?.into_iter().filter(|event| query.matches(event)).collect();
        Ok(AnalyticsReport::from_events(events))
    }
}
