use crate::extensions::path_ext::FileName;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::marker::PhantomData;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// An append-only JSON-lines file. Appends are serialized behind a mutex so
/// concurrent handlers cannot interleave partial lines.
#[derive(Debug)]
pub struct Journal<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _record: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> Journal<T> {
    pub fn new(path: PathBuf) -> Self {
        Journal {
            path,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub async fn append(&self, record: &T) -> Result<(), JournalError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;

        Ok(())
    }

    /// Reads every record in the journal. A journal that does not exist yet
    /// is empty; a line that no longer parses is skipped with a warning so
    /// one corrupt write cannot take the whole history down.
    pub async fn read_all(&self) -> Result<Vec<T>, JournalError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(JournalError::Io(e)),
        };

        let (records, errors): (Vec<_>, Vec<_>) = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(serde_json::from_str::<T>)
            .partition(Result::is_ok);

        for error in errors.iter().filter_map(|res| res.as_ref().err()) {
            warn!("⚠️ Skipping corrupt record in '{}': {}", self.path.string_file_name(), error);
        }

        Ok(records.into_iter().filter_map(Result::ok).collect())
    }
}

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use test_log::test;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Record {
        id: u64,
        message: String,
    }

    fn record(id: u64) -> Record {
        Record {
            id,
            message: format!("record {id}"),
        }
    }

    #[test(tokio::test)]
    async fn read_all_returns_appended_records_in_order() -> Result<(), JournalError> {
        let dir = tempfile::tempdir()?;
        let journal = Journal::new(dir.path().join("journal.jsonl"));

        journal.append(&record(1)).await?;
        journal.append(&record(2)).await?;

        assert_eq!(journal.read_all().await?, vec![record(1), record(2)]);

        Ok(())
    }

    #[test(tokio::test)]
    async fn read_all_of_a_missing_journal_is_empty() -> Result<(), JournalError> {
        let dir = tempfile::tempdir()?;
        let journal = Journal::<Record>::new(dir.path().join("missing.jsonl"));

        assert_eq!(journal.read_all().await?, Vec::<Record>::new());

        Ok(())
    }

    #[test(tokio::test)]
    async fn read_all_skips_corrupt_lines() -> Result<(), JournalError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("journal.jsonl");
        let journal = Journal::new(path.clone());

        journal.append(&record(1)).await?;
        fs::write(&path, format!("{}\nnot json\n", serde_json::to_string(&record(1))?)).await?;

        assert_eq!(journal.read_all().await?, vec![record(1)]);

        Ok(())
    }
}
