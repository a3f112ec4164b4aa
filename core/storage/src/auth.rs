//! Access token boundary to the external auth collaborator.
//!
//! Credential acquisition, refresh, and sign-out live outside this core;
//! providers only ask whether credentials are configured and what the
//! current access token is.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use docmirror_common::Result;

/// An access grant with expiration tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessGrant {
    /// Bearer token for API requests.
    pub access_token: String,
    /// When the token expires, if the issuer reported one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessGrant {
    /// Check if the token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        // Consider expired if less than 5 minutes remaining
        match self.expires_at {
            Some(expires_at) => expires_at < Utc::now() + Duration::minutes(5),
            None => false,
        }
    }
}

/// Source of current access tokens for a provider.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Whether credentials are configured at all.
    fn is_configured(&self) -> bool;

    /// The current access token, or `None` when no unexpired grant exists.
    async fn access_token(&self) -> Result<Option<String>>;
}

/// Token source wrapping a fixed grant, typically read from the
/// environment or a credentials file by the caller.
pub struct StaticTokenSource {
    grant: Option<AccessGrant>,
}

impl StaticTokenSource {
    /// Create a source holding the given grant.
    pub fn new(grant: AccessGrant) -> Self {
        Self { grant: Some(grant) }
    }

    /// Create a source from a bare token with no known expiry.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self::new(AccessGrant {
            access_token: token.into(),
            expires_at: None,
        })
    }

    /// Create a source with no credentials configured.
    pub fn unconfigured() -> Self {
        Self { grant: None }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    fn is_configured(&self) -> bool {
        self.grant.is_some()
    }

    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self
            .grant
            .as_ref()
            .filter(|g| !g.is_expired())
            .map(|g| g.access_token.clone()))
    }
}
