//! Google Drive API client.

use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;

use docmirror_common::{Error, ProviderKind, Result};

use crate::auth::TokenSource;

/// Google Drive API base URL.
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
/// Google Drive upload API base URL.
const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
/// Hidden per-app storage area.
const APP_DATA_SPACE: &str = "appDataFolder";

/// Google Drive file metadata from the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID.
    pub id: String,
    /// File name.
    pub name: String,
    /// File size in bytes, reported as a decimal string.
    #[serde(default)]
    pub size: Option<String>,
    /// Modified time.
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}

impl DriveFile {
    /// Get size as u64.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_ref().and_then(|s| s.parse().ok())
    }
}

/// Response from listing files.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Google Drive API client scoped to the app data folder.
pub struct DriveClient {
    http: Client,
    tokens: Arc<dyn TokenSource>,
}

impl DriveClient {
    /// Create a new Drive client over the given token source.
    pub fn new(tokens: Arc<dyn TokenSource>) -> Self {
        let http = Client::builder()
            .user_agent("DocMirror/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self { http, tokens }
    }

    fn sync_err(&self, message: impl Into<String>) -> Error {
        Error::cloud_sync(ProviderKind::GoogleDrive, message)
    }

    /// Get authorization header value.
    async fn auth_header(&self) -> Result<String> {
        match self.tokens.access_token().await? {
            Some(token) => Ok(format!("Bearer {}", token)),
            None => Err(self.sync_err("No valid access token")),
        }
    }

    /// List every file in the app data folder, draining pagination.
    pub async fn list_all(&self) -> Result<Vec<DriveFile>> {
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let auth = self.auth_header().await?;
            let mut request = self
                .http
                .get(format!("{}/files", DRIVE_API_BASE))
                .header(header::AUTHORIZATION, auth)
                .query(&[
                    ("spaces", APP_DATA_SPACE),
                    ("q", "trashed = false"),
                    ("fields", "files(id,name,size,modifiedTime),nextPageToken"),
                    ("pageSize", "1000"),
                ]);

            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| self.sync_err(format!("Failed to list files: {}", e)))?;

            let list_response: FileListResponse = self.handle_response(response).await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_files)
    }

    /// Find a file by name in the app data folder.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<DriveFile>> {
        let auth = self.auth_header().await?;
        let query = format!(
            "name = '{}' and trashed = false",
            name.replace('\'', "\\'")
        );

        let response = self
            .http
            .get(format!("{}/files", DRIVE_API_BASE))
            .header(header::AUTHORIZATION, auth)
            .query(&[
                ("spaces", APP_DATA_SPACE),
                ("q", query.as_str()),
                ("fields", "files(id,name,size,modifiedTime)"),
                ("pageSize", "1"),
            ])
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to find file: {}", e)))?;

        let list_response: FileListResponse = self.handle_response(response).await?;
        Ok(list_response.files.into_iter().next())
    }

    /// Download file content as text.
    pub async fn download(&self, file_id: &str) -> Result<String> {
        let auth = self.auth_header().await?;

        let response = self
            .http
            .get(format!("{}/files/{}", DRIVE_API_BASE, file_id))
            .header(header::AUTHORIZATION, auth)
            .query(&[("alt", "media")])
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to download file: {}", e)))?;

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

    /// Create a new file in the app data folder via multipart upload.
    pub async fn create(&self, name: &str, content: &str) -> Result<DriveFile> {
        let auth = self.auth_header().await?;

        let metadata = serde_json::json!({
            "name": name,
            "parents": [APP_DATA_SPACE]
        });
        let metadata_json = serde_json::to_string(&metadata)
            .map_err(|e| Error::Serialization(format!("Failed to encode metadata: {}", e)))?;

        // Build multipart/related body by hand, the way the Drive API expects.
        let boundary = "DocMirrorBoundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata_json.as_bytes());
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(b"Content-Type: text/plain; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(content.as_bytes());
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(format!("--{}--", boundary).as_bytes());

        let response = self
            .http
            .post(format!("{}/files?uploadType=multipart", DRIVE_UPLOAD_BASE))
            .header(header::AUTHORIZATION, auth)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .query(&[("fields", "id,name,size,modifiedTime")])
            .body(body)
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to create file: {}", e)))?;

        self.handle_response(response).await
    }

    /// Replace the content of an existing file.
    pub async fn update(&self, file_id: &str, content: &str) -> Result<DriveFile> {
        let auth = self.auth_header().await?;

        let response = self
            .http
            .patch(format!(
                "{}/files/{}?uploadType=media",
                DRIVE_UPLOAD_BASE, file_id
            ))
            .header(header::AUTHORIZATION, auth)
            .header(header::CONTENT_TYPE, "text/plain; charset=UTF-8")
            .query(&[("fields", "id,name,size,modifiedTime")])
            .body(content.as_bytes().to_vec())
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to update file: {}", e)))?;

        self.handle_response(response).await
    }

    /// Delete a file; an already-absent id is not an error.
    pub async fn delete(&self, file_id: &str) -> Result<()> {
        let auth = self.auth_header().await?;

        let response = self
            .http
            .delete(format!("{}/files/{}", DRIVE_API_BASE, file_id))
            .header(header::AUTHORIZATION, auth)
            .send()
            .await
            .map_err(|e| self.sync_err(format!("Failed to delete file: {}", e)))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(self.sync_err(format!("Delete failed: {} - {}", status, body)))
        }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_file_size_bytes() {
        let file: DriveFile = serde_json::from_str(
            r#"{ "id": "1", "name": "notes.txt", "size": "12345" }"#,
        )
        .unwrap();
        assert_eq!(file.size_bytes(), Some(12345));

        let no_size: DriveFile =
            serde_json::from_str(r#"{ "id": "2", "name": "other.txt" }"#).unwrap();
        assert_eq!(no_size.size_bytes(), None);
    }

    #[test]
    fn test_list_response_parses_page_token() {
        let page: FileListResponse = serde_json::from_str(
            r#"{ "files": [{ "id": "1", "name": "a.txt" }], "nextPageToken": "tok" }"#,
        )
        .unwrap();
        assert_eq!(page.files.len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));
    }

    #[test]
    fn test_drive_file_parses_modified_time() {
        let file: DriveFile = serde_json::from_str(
            r#"{ "id": "1", "name": "a.txt", "modifiedTime": "2024-01-15T12:00:00Z" }"#,
        )
        .unwrap();
        assert!(file.modified_time.is_some());
    }
}
