//! Common types used throughout DocMirror.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum size of a single document, in bytes (5 MiB).
pub const MAX_FILE_BYTES: u64 = 5 * 1024 * 1024;

/// Maximum combined size of all documents in the registry, in bytes (50 MiB).
pub const MAX_TOTAL_BYTES: u64 = 50 * 1024 * 1024;

/// Identifies a cloud storage backend.
///
/// This is a closed set: the engine depends only on the provider
/// contract, never on a concrete variant, so adding a backend means
/// adding a variant here plus one provider implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Dropbox.
    Dropbox,
    /// Google Drive.
    #[serde(rename = "gdrive")]
    GoogleDrive,
}

impl ProviderKind {
    /// Stable string tag used in configs and the persisted blob.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dropbox => "dropbox",
            Self::GoogleDrive => "gdrive",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One persisted document in the local registry.
///
/// `name` is the primary key: exactly one record per distinct name exists
/// at any time, and providers address remote copies by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Opaque identifier, generated once and stable across overwrites.
    pub id: String,
    /// Unique human-readable key.
    pub name: String,
    /// Document body.
    pub content: String,
    /// Timestamp of first creation, preserved across overwrites.
    pub created_at: DateTime<Utc>,
    /// Byte length of `content`, recomputed on every write.
    pub size: u64,
    /// Provider last confirmed to hold matching content.
    ///
    /// `None` means local-only, unsynced, or in conflict.
    #[serde(default)]
    pub synced_provider: Option<ProviderKind>,
}

impl StoredFile {
    /// Create a fresh record for a name not previously in the registry.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            size: content.len() as u64,
            content,
            created_at: Utc::now(),
            synced_provider: None,
        }
    }

    /// Replace the body, recomputing `size` and resetting the sync marker.
    pub fn replace_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.size = self.content.len() as u64;
        self.synced_provider = None;
    }
}

/// A file as reported by a provider's fetch operation.
///
/// Transient: produced by a provider's `fetch_files` and consumed
/// immediately by the merge pass, never persisted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    /// Name at the provider (matches `StoredFile::name`).
    pub name: String,
    /// Provider-native identifier or path.
    pub remote_id: String,
    /// Last-modified timestamp at the provider.
    pub modified: DateTime<Utc>,
    /// Byte length of `content`.
    pub size: u64,
    /// Fully materialized body; the merge needs content, not just metadata.
    pub content: String,
}
