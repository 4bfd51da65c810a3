//! Feed service configuration and session credentials.
//!
//! Two pieces of transport metadata accompany every outbound request: the
//! static service key and, once logged in, the bearer token. A config
//! without a token is "not authenticated": the core refuses to open a
//! stream in that state rather than sending an unauthenticated request.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FeedError, Result};

/// Connection settings for the camera feed service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the feed service API.
    pub api_url: Url,

    /// Static service key, sent as `X-API-Key` on every request.
    pub api_key: String,

    /// Bearer token from login; absent until authenticated.
    token: Option<String>,
}

impl FeedConfig {
    /// Create a config with no session token (not authenticated).
    pub fn new(api_url: Url, api_key: impl Into<String>) -> Self {
        Self { api_url, api_key: api_key.into(), token: None }
    }

    /// Attach a session token obtained from login.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Discard the session token (logout).
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// The credentials to attach to outbound requests, or `None` when not
    /// authenticated.
    pub fn credentials(&self) -> Option<Credentials> {
        self.token.as_ref().map(|token| Credentials {
            token: token.clone(),
            api_key: self.api_key.clone(),
        })
    }

    /// Resolve the stream endpoint for a camera's stream key.
    ///
    /// This is the only place stream URLs are constructed; the session
    /// controller never assembles one itself.
    pub fn stream_url(&self, cam_key: &str) -> Result<Url> {
        let mut url = self
            .api_url
            .join(&format!("cameras/video/{cam_key}"))
            .map_err(|e| FeedError::stream_unavailable_with_source("bad stream URL", Box::new(e)))?;
        url.query_pairs_mut().append_pair("api_key", &self.api_key);
        Ok(url)
    }
}

/// Bearer token plus service key, both attached as transport metadata.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: String,
    pub api_key: String,
}

impl Credentials {
    /// Apply both headers to an outbound request.
    pub fn apply(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.token))
            .header("X-API-Key", &self.api_key)
    }
}
