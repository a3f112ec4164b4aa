//! Dropbox storage backend for DocMirror.
//!
//! Talks to the Dropbox HTTP API v2: content uploads/downloads through the
//! content endpoint, listing with cursor pagination, and delete with
//! not-found tolerated. Credentials come from an external token source.

pub mod client;
pub mod provider;

pub use client::DropboxClient;
pub use provider::{create_dropbox_provider, DropboxProvider};
