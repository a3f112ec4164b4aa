//! Cloud provider trait definition.

use async_trait::async_trait;

use docmirror_common::{ProviderKind, RemoteFile, Result};

/// Uniform surface over any cloud storage backend.
///
/// All operations are async and address remote copies by document name.
/// Implementations handle their own transport and rate limiting, and must
/// never mutate the local registry — only the engine does that, after
/// inspecting results.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Which backend this provider talks to.
    fn kind(&self) -> ProviderKind;

    /// Whether the backend is configured (credentials/client id present),
    /// independent of user sign-in state.
    fn is_available(&self) -> bool;

    /// Whether an active, unexpired access grant exists; operations may be
    /// attempted only when this returns true.
    async fn is_ready(&self) -> bool;

    /// Create or replace the remote copy addressed by `name`.
    ///
    /// Idempotent: uploading the same name twice replaces the content.
    ///
    /// # Errors
    /// - `CloudSync` on authentication loss, quota, or transport failure
    async fn upload_file(&self, name: &str, content: &str) -> Result<()>;

    /// Delete the remote copy addressed by `name`.
    ///
    /// Deleting a file that does not exist remotely is not an error; this
    /// is the sole operation permitted to treat not-found as success.
    async fn delete_file(&self, name: &str) -> Result<()>;

    /// Enumerate every file the provider holds for this app's storage
    /// area, with fully materialized content.
    ///
    /// Paginated listings are drained serially before returning; partial
    /// page results are never surfaced.
    async fn fetch_files(&self) -> Result<Vec<RemoteFile>>;
}
