//! Access-token seam for the Google Calendar client
//!
//! Token acquisition and refresh live outside this service; the client only
//! needs something that yields a bearer token for a user.

use async_trait::async_trait;
use calbridge_domain::{CalbridgeError, Result};

/// Yields an access token for the given user.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    async fn access_token(&self, user: &str) -> Result<String>;
}

/// Fixed token taken from configuration; suitable for single-tenant
/// deployments and tests.
pub struct StaticTokenSource {
    token: String,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenSource for StaticTokenSource {
    async fn access_token(&self, _user: &str) -> Result<String> {
        if self.token.is_empty() {
            return Err(CalbridgeError::Auth("no access token configured".to_string()));
        }
        Ok(self.token.clone())
    }
}
