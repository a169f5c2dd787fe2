use crate::domain::Device;
use crate::extensions::path_ext::FileName;
use futures::stream::FuturesUnordered;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReadDirStream;
use tracing::{info, instrument, warn};

/// Persists one JSON credential document per commissioned node under the
/// hub's `credentials/` directory.
#[derive(Debug)]
pub struct CredentialStore {
    directory: PathBuf,
}

impl CredentialStore {
    pub fn new(directory: PathBuf) -> Self {
        CredentialStore { directory }
    }

    pub async fn save(&self, device: &Device) -> Result<(), CredentialStoreError> {
        let document = serde_json::to_string_pretty(device)?;
        fs::write(self.path_for(device.id), document).await?;
        Ok(())
    }

    /// Loads every credential document to seed the device store at boot.
    /// Unreadable documents are logged and skipped; losing one node must not
    /// keep the hub from starting.
    #[instrument(skip_all)]
    pub async fn load_all(&self) -> Result<Vec<Device>, CredentialStoreError> {
        info!("📁 Loading device credentials...");
        let files = self.list_documents().await?;

        let results = load_documents(files).await;
        let (devices, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);

        for error in errors.iter().filter_map(|res| res.as_ref().err()) {
            log_error(error);
        }

        let mut devices = devices.into_iter().filter_map(Result::ok).collect::<Vec<Device>>();
        devices.sort_by_key(|device| device.id);

        info!("📁 Loading device credentials... OK, {} loaded, {} failed", devices.len(), errors.len());
        Ok(devices)
    }

    async fn list_documents(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let dir = fs::read_dir(&self.directory).await?;
        let mut entries = ReadDirStream::new(dir);

        while let Some(entry) = entries.next().await {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
                        files.push(path);
                    }
                }
                Err(err) => warn!("⚠️ Unable to read directory entry: {}", err),
            }
        }

        Ok(files)
    }

    fn path_for(&self, node_id: u64) -> PathBuf {
        self.directory.join(format!("node-{node_id}.json"))
    }
}

async fn load_documents(paths: Vec<PathBuf>) -> Vec<Result<Device, CredentialStoreError>> {
    FuturesUnordered::from_iter(paths.into_iter().map(|path| async move {
        match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| CredentialStoreError::Document { source: e, path }),
            Err(err) => Err(CredentialStoreError::Io(err)),
        }
    }))
    .collect()
    .await
}

fn log_error(error: &CredentialStoreError) {
    match error {
        CredentialStoreError::Document { source, path } => {
            warn!("⚠️ Failed to load credential '{}': {}", path.string_file_name(), source)
        }
        error => warn!("⚠️ {}", error),
    }
}

#[derive(Error, Debug)]
pub enum CredentialStoreError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error("{}", source)]
    Document { source: serde_json::Error, path: PathBuf },
}
