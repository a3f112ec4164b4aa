//! In-memory file store for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use docmirror_common::{Error, Result, StoredFile};

use crate::store::FileStore;

/// In-memory file store.
///
/// Useful for testing and development. All data is lost on drop. The
/// `fail_next_write` knob lets engine tests exercise the local
/// persistence failure path.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<Vec<StoredFile>>,
    fail_next_write: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with records.
    pub fn with_files(files: Vec<StoredFile>) -> Self {
        Self {
            files: RwLock::new(files),
            fail_next_write: AtomicBool::new(false),
        }
    }

    /// Make the next `write` call fail with a persistence error.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn read(&self) -> Result<Vec<StoredFile>> {
        Ok(self.files.read().unwrap().clone())
    }

    async fn write(&self, files: &[StoredFile]) -> Result<()> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            return Err(Error::Persistence("Simulated write failure".to_string()));
        }
        *self.files.write().unwrap() = files.to_vec();
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.files.write().unwrap().clear();
        Ok(())
    }
}
