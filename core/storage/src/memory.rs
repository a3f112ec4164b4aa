//! In-memory cloud provider for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use uuid::Uuid;

use docmirror_common::{Error, ProviderKind, RemoteFile, Result};

use crate::provider::CloudProvider;

#[derive(Debug, Clone)]
struct Entry {
    remote_id: String,
    content: String,
    modified: DateTime<Utc>,
}

/// In-memory cloud provider.
///
/// Stands in for a real backend in tests: holds remote files in a map and
/// exposes knobs for readiness and injected failures. All data is lost on
/// drop.
pub struct MemoryCloudProvider {
    kind: ProviderKind,
    files: RwLock<HashMap<String, Entry>>,
    available: AtomicBool,
    ready: AtomicBool,
    fail_uploads: AtomicBool,
    fail_fetches: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryCloudProvider {
    /// Create an available, ready provider posing as the given backend.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            files: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            ready: AtomicBool::new(true),
            fail_uploads: AtomicBool::new(false),
            fail_fetches: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Toggle the configured state.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Toggle the signed-in state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Make every `upload_file` call fail until toggled back.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make every `fetch_files` call fail until toggled back.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Make every `delete_file` call fail until toggled back.
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Seed a remote file directly, bypassing the upload path.
    pub fn insert_remote(&self, name: &str, content: &str) {
        self.files.write().unwrap().insert(
            name.to_string(),
            Entry {
                remote_id: Uuid::new_v4().to_string(),
                content: content.to_string(),
                modified: Utc::now(),
            },
        );
    }

    /// Remote content for a name, if present.
    pub fn remote_content(&self, name: &str) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(name)
            .map(|e| e.content.clone())
    }

    /// Number of remote files held.
    pub fn remote_count(&self) -> usize {
        self.files.read().unwrap().len()
    }
}

#[async_trait]
impl CloudProvider for MemoryCloudProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn upload_file(&self, name: &str, content: &str) -> Result<()> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(Error::cloud_sync(self.kind, "Simulated upload failure"));
        }
        self.insert_remote(name, content);
        Ok(())
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(Error::cloud_sync(self.kind, "Simulated delete failure"));
        }
        // Absent names are not an error.
        self.files.write().unwrap().remove(name);
        Ok(())
    }

    async fn fetch_files(&self) -> Result<Vec<RemoteFile>> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(Error::cloud_sync(self.kind, "Simulated fetch failure"));
        }
        let files = self.files.read().unwrap();
        Ok(files
            .iter()
            .map(|(name, entry)| RemoteFile {
                name: name.clone(),
                remote_id: entry.remote_id.clone(),
                modified: entry.modified,
                size: entry.content.len() as u64,
                content: entry.content.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_then_fetch() {
        let provider = MemoryCloudProvider::new(ProviderKind::Dropbox);
        provider.upload_file("a.txt", "alpha").await.unwrap();

        let files = provider.fetch_files().await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.txt");
        assert_eq!(files[0].content, "alpha");
        assert_eq!(files[0].size, 5);
    }

    #[tokio::test]
    async fn test_upload_is_create_or_replace() {
        let provider = MemoryCloudProvider::new(ProviderKind::Dropbox);
        provider.upload_file("a.txt", "v1").await.unwrap();
        provider.upload_file("a.txt", "v2").await.unwrap();

        assert_eq!(provider.remote_count(), 1);
        assert_eq!(provider.remote_content("a.txt").unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_delete_absent_name_succeeds() {
        let provider = MemoryCloudProvider::new(ProviderKind::GoogleDrive);
        provider.delete_file("missing.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_injected_failures_are_provider_tagged() {
        let provider = MemoryCloudProvider::new(ProviderKind::GoogleDrive);
        provider.fail_fetches(true);

        let err = provider.fetch_files().await.unwrap_err();
        match err {
            Error::CloudSync { provider, .. } => assert_eq!(provider, ProviderKind::GoogleDrive),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_readiness_knobs() {
        let provider = MemoryCloudProvider::new(ProviderKind::Dropbox);
        assert!(provider.is_available());
        assert!(provider.is_ready().await);

        provider.set_ready(false);
        assert!(!provider.is_ready().await);

        provider.set_available(false);
        assert!(!provider.is_available());
    }
}
