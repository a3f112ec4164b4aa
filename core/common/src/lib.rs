//! Common types and errors shared across DocMirror crates.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{ProviderKind, RemoteFile, StoredFile, MAX_FILE_BYTES, MAX_TOTAL_BYTES};
