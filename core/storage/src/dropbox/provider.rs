//! Dropbox implementation of the cloud provider contract.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use docmirror_common::{Error, ProviderKind, RemoteFile, Result};

use crate::auth::{StaticTokenSource, TokenSource};
use crate::dropbox::client::DropboxClient;
use crate::provider::CloudProvider;

/// Cloud provider backed by a Dropbox app folder.
pub struct DropboxProvider {
    client: DropboxClient,
    tokens: Arc<dyn TokenSource>,
}

impl DropboxProvider {
    /// Create a provider over the given token source.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client: DropboxClient::new(tokens.clone()),
            tokens,
        }
    }

    /// App-folder path for a document name.
    fn remote_path(name: &str) -> String {
        format!("/{}", name)
    }
}

#[async_trait]
impl CloudProvider for DropboxProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Dropbox
    }

    fn is_available(&self) -> bool {
        self.tokens.is_configured()
    }

    async fn is_ready(&self) -> bool {
        matches!(self.tokens.access_token().await, Ok(Some(_)))
    }

    async fn upload_file(&self, name: &str, content: &str) -> Result<()> {
        debug!("Uploading {} to Dropbox", name);
        self.client.upload(&Self::remote_path(name), content).await
    }

    async fn delete_file(&self, name: &str) -> Result<()> {
        debug!("Deleting {} from Dropbox", name);
        self.client.delete(&Self::remote_path(name)).await
    }

    async fn fetch_files(&self) -> Result<Vec<RemoteFile>> {
        let entries = self.client.list_all().await?;
        let mut files = Vec::new();

        for entry in entries.into_iter().filter(|e| e.is_file()) {
            let path = entry
                .path_lower
                .clone()
                .unwrap_or_else(|| Self::remote_path(&entry.name));
            let content = self.client.download(&path).await?;

            files.push(RemoteFile {
                name: entry.name,
                remote_id: entry.id.unwrap_or(path),
                modified: entry.server_modified.unwrap_or_else(Utc::now),
                size: content.len() as u64,
                content,
            });
        }

        debug!("Fetched {} files from Dropbox", files.len());
        Ok(files)
    }
}

/// Factory for the provider registry.
///
/// Expects a config of the form `{ "token": "..." }`.
pub fn create_dropbox_provider(config: serde_json::Value) -> Result<Arc<dyn CloudProvider>> {
    let token = config
        .get("token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidInput("Dropbox provider requires 'token'".to_string()))?;

    let tokens = Arc::new(StaticTokenSource::from_token(token));
    Ok(Arc::new(DropboxProvider::new(tokens)))
}
