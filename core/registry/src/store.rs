//! File store trait definition.

use async_trait::async_trait;

use docmirror_common::{Result, StoredFile};

/// Durable storage for the full set of locally known documents.
///
/// Implementations are opaque to providers: no network access, no
/// provider knowledge. Every write replaces the entire persisted set,
/// atomically from the caller's perspective.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Read all persisted records.
    ///
    /// Malformed records (missing required fields) are discarded rather
    /// than failing the caller; a totally corrupt store resets to an
    /// empty set. A store that has never been written is empty.
    async fn read(&self) -> Result<Vec<StoredFile>>;

    /// Replace the entire persisted set.
    ///
    /// No partial-file corruption may be visible to subsequent reads.
    ///
    /// # Errors
    /// - Local persistence failure (e.g., host quota exhausted)
    async fn write(&self, files: &[StoredFile]) -> Result<()>;

    /// Remove all persisted state. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<()>;
}
