//! Dropbox API client.

use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use docmirror_common::{Error, ProviderKind, Result};

use crate::auth::TokenSource;

/// Dropbox RPC API base URL.
const API_BASE: &str = "https://api.dropboxapi.com/2";
/// Dropbox content API base URL.
const CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

/// One entry from a folder listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DropboxEntry {
    /// Entry kind: "file", "folder", or "deleted".
    #[serde(rename = ".tag")]
    pub tag: String,
    /// File name without path.
    pub name: String,
    /// Dropbox file id.
    #[serde(default)]
    pub id: Option<String>,
    /// Lowercased full path, used for downloads.
    #[serde(default)]
    pub path_lower: Option<String>,
    /// Server-side modification time.
    #[serde(default)]
    pub server_modified: Option<DateTime<Utc>>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
}

impl DropboxEntry {
    /// Whether this entry is a regular file.
    pub fn is_file(&self) -> bool {
        self.tag == "file"
    }
}

/// Response from `files/list_folder` and its continuation.
#[derive(Debug, Deserialize)]
struct ListFolderResponse {
    entries: Vec<DropboxEntry>,
    cursor: String,
    has_more: bool,
}

/// Dropbox API client.
pub struct DropboxClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
}

impl DropboxClient {
    /// Create a new Dropbox client over the given token source.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        let http = Client::builder()
            .user_agent("DocMirror/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { http, tokens }
    }

    fn sync_err(&self, message: impl Into<String>) -> Error {
        Error::cloud_sync(ProviderKind::Dropbox, message)
    }

    /// Get authorization header value.
    async fn auth_header(&self) -> Result<String> {
        match self.tokens.access_token().await? {
            Some(token) => Ok(format!("Bearer {}", token)),
            None => Err(self.sync_err("No valid access token")),
        }
    }

    /// List every file in the app folder, draining cursor pagination.
    pub async fn list_all(&self) -> Result<Vec<DropboxEntry>> {
        let auth = self.auth_header().await?;
        let mut all_entries = Vec::new();

        let response = self
            .http
            .post(format!("{}/files/list_folder", API_BASE))
            .header(header::AUTHORIZATION, auth.clone())
            .json(&serde_json::json!({ "path": "", "recursive": false }))
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to list folder: {}", e)))?;

        let mut page: ListFolderResponse = self.handle_response(response).await?;
        all_entries.extend(page.entries);

        while page.has_more {
            let response = self
                .http
                .post(format!("{}/files/list_folder/continue", API_BASE))
                .header(header::AUTHORIZATION, auth.clone())
                .json(&serde_json::json!({ "cursor": page.cursor }))
                .send()
                .await
                .map_err(|e| self.sync_err(format!("Failed to continue listing: {}", e)))?;

            page = self.handle_response(response).await?;
            all_entries.extend(page.entries);
        }

        Ok(all_entries)
    }

    /// Download file content as text.
    pub async fn download(&self, path: &str) -> Result<String> {
        let auth = self.auth_header().await?;
        let api_arg = serde_json::json!({ "path": path }).to_string();

        let response = self
            .http
            .post(format!("{}/files/download", CONTENT_BASE))
            .header(header::AUTHORIZATION, auth)
            .header("Dropbox-API-Arg", api_arg)
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to download {}: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.sync_err(format!("Download failed: {} - {}", status, body)));
        }

        response
            .text()
            .await
            .map_err(|e| self.sync_err(format!("Failed to read download body: {}", e)))
    }

    /// Upload content, creating or overwriting the file at `path`.
    pub async fn upload(&self, path: &str, content: &str) -> Result<()> {
        let auth = self.auth_header().await?;
        let api_arg = serde_json::json!({
            "path": path,
            "mode": "overwrite",
            "mute": true
        })
        .to_string();

        let response = self
            .http
            .post(format!("{}/files/upload", CONTENT_BASE))
            .header(header::AUTHORIZATION, auth)
            .header("Dropbox-API-Arg", api_arg)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .body(content.as_bytes().to_vec())
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to upload {}: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.sync_err(format!("Upload failed: {} - {}", status, body)));
        }

        Ok(())
    }

    /// Delete the file at `path`; an already-absent path is not an error.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let auth = self.auth_header().await?;

        let response = self
            .http
            .post(format!("{}/files/delete_v2", API_BASE))
            .header(header::AUTHORIZATION, auth)
            .json(&serde_json::json!({ "path": path }))
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to delete {}: {}", path, e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Dropbox reports missing paths as a 409 with a path_lookup/not_found tag.
        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::CONFLICT && body.contains("not_found") {
            return Ok(());
        }

        Err(self.sync_err(format!("Delete failed: {} - {}", status, body)))
    }

    /// Handle a JSON API response with error mapping.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| self.sync_err(format!("Failed to parse response: {}", e)))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(self.sync_err("Invalid or expired token"))
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(self.sync_err(format!("API error: {} - {}", status, body)))
        }
    }
}
