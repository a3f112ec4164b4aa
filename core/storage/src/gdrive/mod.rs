//! Google Drive storage backend for DocMirror.
//!
//! Uses the Drive v3 API against the application data folder: name-keyed
//! create-or-replace uploads, paginated listing with per-file content
//! download, and delete with not-found tolerated.

pub mod client;
pub mod provider;

pub use client::DriveClient;
pub use provider::{create_gdrive_provider, GDriveProvider};
