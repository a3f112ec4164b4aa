//! Common error types for DocMirror.

use thiserror::Error;

use crate::types::ProviderKind;

/// Top-level error type for DocMirror operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input provided (blank name/content, malformed config).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A single document exceeds the per-file size limit.
    #[error("File too large: '{name}' is {size} bytes (limit {limit})")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// Adding a new document would exceed the total registry limit.
    #[error("Storage quota exceeded: {requested} bytes requested, {used} of {limit} in use")]
    QuotaExceeded { requested: u64, used: u64, limit: u64 },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The local persistence facility rejected an operation.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A cloud provider operation failed (auth loss, transport, rejection).
    #[error("Cloud sync error ({provider}): {message}")]
    CloudSync {
        provider: ProviderKind,
        message: String,
    },

    /// A sync operation was requested with no provider configured.
    #[error("No cloud provider is configured")]
    NoProvider,
}

impl Error {
    /// Build a provider-tagged sync error.
    pub fn cloud_sync(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::CloudSync {
            provider,
            message: message.into(),
        }
    }

    /// Whether this error originated at the provider boundary.
    pub fn is_sync_error(&self) -> bool {
        matches!(self, Self::CloudSync { .. } | Self::NoProvider)
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_sync_error_carries_provider_tag() {
        let err = Error::cloud_sync(ProviderKind::Dropbox, "token revoked");
        assert!(err.is_sync_error());
        assert!(err.to_string().contains("dropbox"));
        assert!(err.to_string().contains("token revoked"));
    }

    #[test]
    fn test_validation_errors_are_not_sync_errors() {
        let err = Error::FileTooLarge {
            name: "big.txt".to_string(),
            size: 10,
            limit: 5,
        };
        assert!(!err.is_sync_error());
    }
}
