use crate::domain::{LogEntry, LogPage, LogQuery};
use crate::storage::journal::{Journal, JournalError};
use std::path::Path;
use tracing::instrument;

/// The hub's audit trail, one JSON line per entry under `logs/`.
#[derive(Debug)]
pub struct LogStore {
    journal: Journal<LogEntry>,
}

const AUDIT_FILE: &str = "audit.jsonl";

impl LogStore {
    pub fn new(directory: &Path) -> Self {
        LogStore {
            journal: Journal::new(directory.join(AUDIT_FILE)),
        }
    }

    pub async fn append(&self, entry: &LogEntry) -> Result<(), JournalError> {
        self.journal.append(entry).await
    }

    /// Applies the query filters and keeps the most recent `limit` entries,
    /// oldest first.
    #[instrument(skip_all)]
    pub async fn query(&self, query: &LogQuery) -> Result<LogPage, JournalError> {
        let mut entries: Vec<LogEntry> = self.journal.read_all().await?.into_iter().filter(|entry| query.matches(entry)).collect();

        if let Some(limit) = query.limit {
            if entries.len() > limit {
                entries.drain(..entries.len() - limit);
            }
        }

        Ok(LogPage::from_entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LogKind;
    use pretty_assertions::assert_eq;
    use test_log::test;

    async fn store_with_entries(dir: &Path, messages: &[(&str, LogKind)]) -> Result<LogStore, JournalError> {
        let store = LogStore::new(dir);
        for (message, kind) in messages {
            store.append(&LogEntry::new(*kind, *message)).await?;
        }
        Ok(store)
    }

    #[test(tokio::test)]
    async fn query_honors_the_limit_and_keeps_the_most_recent_entries() -> Result<(), JournalError> {
        let dir = tempfile::tempdir()?;
        let store = store_with_entries(
            dir.path(),
            &[
                ("first", LogKind::System),
                ("second", LogKind::System),
                ("third", LogKind::System),
            ],
        )
        .await?;

        let page = store
            .query(&LogQuery {
                limit: Some(2),
                ..LogQuery::default()
            })
            .await?;

        assert_eq!(page.count, 2);
        let messages: Vec<&str> = page.entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "third"]);

        Ok(())
    }

    #[test(tokio::test)]
    async fn query_filters_by_log_type() -> Result<(), JournalError> {
        let dir = tempfile::tempdir()?;
        let store = store_with_entries(
            dir.path(),
            &[
                ("paired node 1", LogKind::Pairing),
                ("toggled node 1", LogKind::Command),
                ("bridge unreachable", LogKind::Error),
            ],
        )
        .await?;

        let page = store
            .query(&LogQuery {
                log_types: Some(vec![LogKind::Pairing, LogKind::Error]),
                ..LogQuery::default()
            })
            .await?;

        assert_eq!(page.count, 2);
        assert!(page.entries.iter().all(|e| e.r#type != LogKind::Command));

        Ok(())
    }

    #[test(tokio::test)]
    async fn query_of_an_empty_store_returns_an_empty_page() -> Result<(), JournalError> {
        let dir = tempfile::tempdir()?;
        let store = LogStore::new(dir.path());

        let page = store.query(&LogQuery::default()).await?;

        assert_eq!(page, LogPage::from_entries(Vec::new()));

        Ok(())
    }
}
