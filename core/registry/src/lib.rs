//! Local registry for DocMirror.
//!
//! Durable storage of the full document set, opaque to providers. The
//! registry persists every record as a single serialized blob under one
//! well-known path and replaces that blob wholesale on every write.

pub mod json;
pub mod memory;
pub mod store;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use store::FileStore;
