//! Reconciliation engine that orchestrates local and remote state.

use std::sync::Arc;
use tracing::{debug, info, warn};

use docmirror_common::{
    Error, Result, StoredFile, MAX_FILE_BYTES, MAX_TOTAL_BYTES,
};
use docmirror_registry::FileStore;
use docmirror_storage::CloudProvider;

use crate::merge::merge_listings;

/// Result of a reconciliation pass.
#[derive(Debug, Default)]
pub struct Listing {
    /// All known files after the merge, sorted by name.
    pub files: Vec<StoredFile>,
    /// Files present locally but absent from the active provider.
    pub conflicts: Vec<StoredFile>,
}

/// Result of a save: the local write and the remote mirror can succeed
/// independently, and callers must be able to tell "saved but not synced"
/// from "not saved at all".
#[derive(Debug)]
pub struct SaveReceipt {
    /// The committed record, as persisted locally.
    pub file: StoredFile,
    /// The sync failure, if the local write succeeded but mirroring failed.
    pub sync_error: Option<Error>,
}

impl SaveReceipt {
    /// Whether the remote mirror holds this record's content.
    pub fn is_synced(&self) -> bool {
        self.file.synced_provider.is_some()
    }
}

/// Storage usage summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageInfo {
    /// Bytes currently in use.
    pub used: u64,
    /// Bytes remaining before the total limit.
    pub available: u64,
    /// The total limit.
    pub total: u64,
    /// Number of stored files.
    pub file_count: usize,
}

/// Reconciliation engine over one local registry and at most one active
/// cloud provider.
///
/// Single-caller cooperative model: operations are async and may suspend
/// on registry I/O or provider round trips, but the engine never runs two
/// reconciliation passes concurrently. Callers must not overlap mutating
/// calls on one instance.
pub struct MirrorEngine {
    store: Arc<dyn FileStore>,
    provider: Option<Arc<dyn CloudProvider>>,
}

impl MirrorEngine {
    /// Create an engine with no cloud provider (local-only operation).
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self {
            store,
            provider: None,
        }
    }

    /// Create an engine mirroring to the given provider.
    pub fn with_provider(store: Arc<dyn FileStore>, provider: Arc<dyn CloudProvider>) -> Self {
        Self {
            store,
            provider: Some(provider),
        }
    }

    /// The configured provider, if it is both available and ready.
    async fn active_provider(&self) -> Option<Arc<dyn CloudProvider>> {
        let provider = self.provider.as_ref()?;
        if provider.is_available() && provider.is_ready().await {
            Some(provider.clone())
        } else {
            None
        }
    }

    /// One reconciliation pass: read local, fold in the remote listing,
    /// persist the merged truth.
    ///
    /// A remote listing failure degrades to the local view with no
    /// conflicts; sync visibility problems never block local browsing.
    async fn reconcile(&self) -> Result<Listing> {
        let local = self.store.read().await?;

        let Some(provider) = self.active_provider().await else {
            return Ok(Listing {
                files: local,
                conflicts: Vec::new(),
            });
        };

        let remote = match provider.fetch_files().await {
            Ok(remote) => remote,
            Err(e) => {
                warn!("Remote listing failed, serving local view only: {}", e);
                return Ok(Listing {
                    files: local,
                    conflicts: Vec::new(),
                });
            }
        };

        let outcome = merge_listings(local, remote, provider.kind());
        // Self-healing: every pass converges the registry toward what was
        // observed.
        self.store.write(&outcome.files).await?;

        debug!(
            "Reconciled {} files, {} conflicts",
            outcome.files.len(),
            outcome.conflicts.len()
        );

        Ok(Listing {
            files: outcome.files,
            conflicts: outcome.conflicts,
        })
    }

    /// Save a document locally and mirror it to the active provider.
    ///
    /// The local write never depends on the remote outcome; a sync failure
    /// is reported in the receipt after the local commit.
    ///
    /// # Errors
    /// - `InvalidInput` on blank name or content
    /// - `FileTooLarge` above the per-file limit
    /// - `QuotaExceeded` when a new name would overflow the total limit
    /// - `Persistence` when the local write itself fails
    pub async fn save_file(&self, name: &str, content: &str) -> Result<SaveReceipt> {
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("File name cannot be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(Error::InvalidInput(
                "File content cannot be empty".to_string(),
            ));
        }

        let size = content.len() as u64;
        if size > MAX_FILE_BYTES {
            return Err(Error::FileTooLarge {
                name: name.to_string(),
                size,
                limit: MAX_FILE_BYTES,
            });
        }

        // Quota decisions operate on post-merge truth.
        let mut files = self.reconcile().await?.files;
        let existing = files.iter().position(|f| f.name == name);

        // The total limit gates new names only. Overwrites bypass it even
        // when the new content is larger; repeated overwrites can push the
        // registry past the nominal ceiling. Known edge case, kept as-is.
        if existing.is_none() {
            let used: u64 = files.iter().map(|f| f.size).sum();
            if used + size > MAX_TOTAL_BYTES {
                return Err(Error::QuotaExceeded {
                    requested: size,
                    used,
                    limit: MAX_TOTAL_BYTES,
                });
            }
        }

        let index = match existing {
            Some(index) => {
                files[index].replace_content(content);
                index
            }
            None => {
                // Keep the set sorted by name.
                let index = files.partition_point(|f| f.name.as_str() < name);
                files.insert(index, StoredFile::new(name, content));
                index
            }
        };

        // Local durability first, regardless of remote outcome.
        self.store.write(&files).await?;
        info!("Saved {} ({} bytes)", name, size);

        let mut sync_error = None;
        if let Some(provider) = self.active_provider().await {
            match provider.upload_file(name, content).await {
                Ok(()) => {
                    files[index].synced_provider = Some(provider.kind());
                    self.store.write(&files).await?;
                }
                Err(e) => {
                    // The unsynced marker is already persisted; keep the
                    // local commit and hand the failure to the caller.
                    warn!("Upload of {} failed: {}", name, e);
                    sync_error = Some(e);
                }
            }
        }

        Ok(SaveReceipt {
            file: files[index].clone(),
            sync_error,
        })
    }

    /// List all files after a reconciliation pass, with the conflict queue.
    pub async fn list_files(&self) -> Result<Listing> {
        self.reconcile().await
    }

    /// Load a document by name, reconciling first so remote-only files are
    /// loadable transparently.
    ///
    /// # Errors
    /// - `NotFound` if no record matches after reconciliation
    pub async fn load_file(&self, name: &str) -> Result<StoredFile> {
        let listing = self.reconcile().await?;
        listing
            .files
            .into_iter()
            .find(|f| f.name == name)
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", name)))
    }

    /// Whether a document with this name exists after reconciliation.
    pub async fn file_exists(&self, name: &str) -> Result<bool> {
        let listing = self.reconcile().await?;
        Ok(listing.files.iter().any(|f| f.name == name))
    }

    /// Metadata for a document, if present after reconciliation.
    pub async fn file_info(&self, name: &str) -> Result<Option<StoredFile>> {
        let listing = self.reconcile().await?;
        Ok(listing.files.into_iter().find(|f| f.name == name))
    }

    /// Delete a document locally, then best-effort at the provider.
    ///
    /// Local deletion is authoritative: a remote delete failure is logged
    /// and never rolls it back.
    ///
    /// # Errors
    /// - `NotFound` if the name is not in the local registry
    pub async fn delete_file(&self, name: &str) -> Result<()> {
        let mut files = self.store.read().await?;
        let index = files
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", name)))?;

        files.remove(index);
        self.store.write(&files).await?;
        info!("Deleted {}", name);

        if let Some(provider) = self.active_provider().await {
            if let Err(e) = provider.delete_file(name).await {
                warn!("Remote delete of {} failed, local deletion stands: {}", name, e);
            }
        }

        Ok(())
    }

    /// Wipe the local registry.
    ///
    /// Remote files are left intact: clearing is a local-only operation,
    /// retryable per-provider via individual deletes if ever needed.
    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear().await?;
        info!("Cleared local registry");
        Ok(())
    }

    /// Usage summary over the post-merge file set.
    pub async fn storage_info(&self) -> Result<StorageInfo> {
        let listing = self.reconcile().await?;
        let used: u64 = listing.files.iter().map(|f| f.size).sum();
        Ok(StorageInfo {
            used,
            available: MAX_TOTAL_BYTES.saturating_sub(used),
            total: MAX_TOTAL_BYTES,
            file_count: listing.files.len(),
        })
    }

    /// Resolve a conflict by pushing a local-only record to the provider.
    ///
    /// On success the record is marked synced and a fresh reconciliation
    /// pass is returned.
    ///
    /// # Errors
    /// - `NoProvider` when no provider is configured
    /// - `CloudSync` when the provider is not ready or the upload fails
    pub async fn upload_local_only_file(&self, record: &StoredFile) -> Result<Listing> {
        let Some(provider) = self.provider.as_ref() else {
            return Err(Error::NoProvider);
        };
        if !provider.is_available() || !provider.is_ready().await {
            return Err(Error::cloud_sync(provider.kind(), "Provider is not ready"));
        }

        provider.upload_file(&record.name, &record.content).await?;
        info!("Uploaded local-only file {}", record.name);

        let mut files = self.store.read().await?;
        if let Some(file) = files.iter_mut().find(|f| f.name == record.name) {
            file.synced_provider = Some(provider.kind());
            self.store.write(&files).await?;
        }

        self.reconcile().await
    }

    /// Resolve a conflict by dropping a local-only record.
    ///
    /// No provider is contacted; the name disappears from later listings
    /// and cannot reappear from reconciliation since the remote never had
    /// it.
    ///
    /// # Errors
    /// - `NotFound` if the name is not in the local registry
    pub async fn discard_local_only_file(&self, name: &str) -> Result<()> {
        let mut files = self.store.read().await?;
        let index = files
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| Error::NotFound(format!("File not found: {}", name)))?;

        files.remove(index);
        self.store.write(&files).await?;
        info!("Discarded local-only file {}", name);

        Ok(())
    }
}
