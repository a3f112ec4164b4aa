//! Cloud provider abstraction for DocMirror.
//!
//! This crate provides a trait-based interface over interchangeable cloud
//! backends (Dropbox, Google Drive) and a provider registry for dynamic
//! provider resolution.
//!
//! # Design Principles
//! - Provider isolation: no provider-specific logic leaks into the engine
//! - Async operations: all I/O is async
//! - Providers never touch the local registry; only the engine does
//! - Unified error semantics: every failure is tagged with its provider

pub mod auth;
pub mod dropbox;
pub mod gdrive;
pub mod memory;
pub mod provider;
pub mod registry;

pub use auth::{AccessGrant, StaticTokenSource, TokenSource};
pub use dropbox::DropboxProvider;
pub use gdrive::GDriveProvider;
pub use memory::MemoryCloudProvider;
pub use provider::CloudProvider;
pub use registry::{create_default_registry, ProviderFactory, ProviderRegistry};
