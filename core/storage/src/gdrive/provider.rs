//! Google Drive implementation of the cloud provider contract.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use docmirror_common::{Error, ProviderKind, RemoteFile, Result};

use crate::auth::{StaticTokenSource, TokenSource};
use crate::gdrive::client::DriveClient;
use crate::provider::CloudProvider;

/// Cloud provider backed by the Google Drive app data folder.
pub struct GDriveProvider {
    client: DriveClient,
    tokens: Arc<dyn TokenSource>,
}

impl GDriveProvider {
    /// Create a provider over the given token source.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client: DriveClient::new(tokens.clone()),
            tokens,
        }
    }
}

#[async_trait]
impl CloudProvider for GDriveProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GoogleDrive
    }

    fn is_available(&self) -> bool {
        self.tokens.is_configured()
    }

    async fn is_ready(&self) -> bool {
        matches!(self.tokens.access_token().await, Ok(Some(_)))
    }

    async fn upload_file(&self, name: &str, content: &str) -> Result<()> {
        debug!("Uploading {} to Google Drive", name);
        // Drive addresses files by id, so create-or-replace needs a lookup.
        match self.client.find_by_name(name).await? {
            Some(existing) => {
                self.client.update(&existing.id, content).await?;
            }
            None => {
                self.client.create(name, content).await?;
            }
        }
        Ok(())
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        debug!("Deleting {} from Google Drive", name);
        match self.client.find_by_name(name).await? {
            Some(existing) => self.client.delete(&existing.id).await,
            // Absent names are not an error.
            None => Ok(()),
        }
    }

    async fn fetch_files(&self) -> Result<Vec<RemoteFile>> {
        let entries = self.client.list_all().await?;
        let mut files = Vec::new();

        for entry in entries {
            let content = self.client.download(&entry.id).await?;

            files.push(RemoteFile {
                name: entry.name,
                remote_id: entry.id,
                modified: entry.modified_time.unwrap_or_else(Utc::now),
                size: content.len() as u64,
                content,
            });
        }

        debug!("Fetched {} files from Google Drive", files.len());
        Ok(files)
    }
}

/// Factory for the provider registry.
///
/// Expects a config of the form `{ "token": "..." }`.
pub fn create_gdrive_provider(config: serde_json::Value) -> Result<Arc<dyn CloudProvider>> {
    let token = config
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidInput("Google Drive provider requires 'token'".to_string()))?;

    let tokens = Arc::new(StaticTokenSource::from_token(token));
    Ok(Arc::new(GDriveProvider::new(tokens)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_provider_is_not_available() {
        let provider = GDriveProvider::new(Arc::new(StaticTokenSource::unconfigured()));
        assert!(!provider.is_available());
        assert!(!provider.is_ready().await);
    }

    #[tokio::test]
    async fn test_configured_provider_reports_kind() {
        let provider = GDriveProvider::new(Arc::new(StaticTokenSource::from_token("tok")));
        assert!(provider.is_available());
        assert_eq!(provider.kind(), ProviderKind::GoogleDrive);
    }

    #[test]
    fn test_factory_requires_token() {
        assert!(create_gdrive_provider(serde_json::json!({})).is_err());
        assert!(create_gdrive_provider(serde_json::json!({ "token": "tok" })).is_ok());
    }
}
