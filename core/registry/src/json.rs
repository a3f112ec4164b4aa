//! JSON blob store backed by the local filesystem.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use docmirror_common::{Error, Result, StoredFile};

use crate::store::FileStore;

/// Durable file store persisting all records as a single JSON array blob.
///
/// Writes go to a temporary file in the same directory followed by a
/// rename, so readers never observe a partially written blob.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store at the given blob path.
    ///
    /// The parent directory is created if it does not exist.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Path of the persisted blob.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Decode the raw blob, keeping only records that still parse.
    fn decode(&self, raw: &[u8]) -> Vec<StoredFile> {
        let values: Vec<serde_json::Value> = match serde_json::from_slice(raw) {
            Ok(values) => values,
            Err(e) => {
                warn!("Registry blob is corrupt, resetting to empty: {}", e);
                return Vec::new();
            }
        };

        let mut files = Vec::with_capacity(values.len());
        for value in values {
            match serde_json::from_value::<StoredFile>(value) {
                Ok(file) => files.push(file),
                Err(e) => warn!("Discarding malformed registry record: {}", e),
            }
        }
        files
    }
}

#[async_trait]
impl FileStore for JsonFileStore {
    async fn read(&self) -> Result<Vec<StoredFile>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Persistence(format!("Failed to read store: {}", e))),
        };

        Ok(self.decode(&raw))
    }

    async fn write(&self, files: &[StoredFile]) -> Result<()> {
        let blob = serde_json::to_vec(files)
            .map_err(|e| Error::Serialization(format!("Failed to encode registry: {}", e)))?;

        let tmp = self.tmp_path();
        fs::write(&tmp, &blob)
            .await
            .map_err(|e| Error::Persistence(format!("Failed to write store: {}", e)))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| Error::Persistence(format!("Failed to replace store: {}", e)))?;

        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Persistence(format!("Failed to clear store: {}", e))),
        }
    }
}
