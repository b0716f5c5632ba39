//! Low-level HTTP transport for the Dropbox API v2.
//!
//! All API calls go through a [`DropboxTransport`]. The production
//! implementation, [`DropboxClient`], handles:
//! - Bearer token injection (the token is supplied per call, never stored)
//! - RPC vs content-upload endpoint routing
//! - JSON error envelope parsing
//!
//! Each call is a single attempt. Re-running failed work is left to the
//! queue runtime.

use crate::error::{DropboxError, DropboxResult};
use crate::files::header_safe_json;
use crate::types::{DropboxSyncConfig, DEFAULT_API_BASE, DEFAULT_CONTENT_BASE};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;

/// Header carrying the arguments of content endpoints.
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Network seam used by the processors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DropboxTransport: Send + Sync {
    /// `POST {api_base}/{route}` with a JSON body.
    async fn rpc(
        &self,
        token: &str,
        route: &str,
        body: &serde_json::Value,
    ) -> DropboxResult<serde_json::Value>;

    /// `POST {content_base}/{route}` with `Dropbox-API-Arg` and raw bytes.
    async fn content_upload(
        &self,
        token: &str,
        route: &str,
        api_arg: &serde_json::Value,
        data: &[u8],
    ) -> DropboxResult<serde_json::Value>;
}

/// Show a masked version of a token for logging.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".into();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// reqwest-backed transport.
#[derive(Clone)]
pub struct DropboxClient {
    http: reqwest::Client,
    api_base: String,
    content_base: String,
}

impl std::fmt::Debug for DropboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropboxClient")
            .field("api_base", &self.api_base)
            .field("content_base", &self.content_base)
            .finish()
    }
}

impl DropboxClient {
    /// Create a client against the public Dropbox endpoints.
    pub fn new(timeout: Duration) -> DropboxResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DropboxError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            content_base: DEFAULT_CONTENT_BASE.to_string(),
        })
    }

    pub fn from_config(config: &DropboxSyncConfig) -> DropboxResult<Self> {
        Self::new(Duration::from_secs(config.request_timeout_secs))?
            .with_bases(&config.api_base, &config.content_base)
    }

    /// Override base URLs (proxies, test servers).
    pub fn with_bases(mut self, api: &str, content: &str) -> DropboxResult<Self> {
        self.api_base = validate_base(api)?;
        self.content_base = validate_base(content)?;
        Ok(self)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn content_base(&self) -> &str {
        &self.content_base
    }

    fn auth_header(token: &str) -> DropboxResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| DropboxError::invalid_payload("Access token is not a valid header value"))?;
        headers.insert(AUTHORIZATION, val);
        Ok(headers)
    }

    async fn read_response(url: &str, resp: reqwest::Response) -> DropboxResult<serde_json::Value> {
        let status = resp.status();

        if status.as_u16() == 429 {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = resp.text().await.unwrap_or_default();
            let mut err = DropboxError::from_response(429, &body);
            if let Some(secs) = retry_after {
                warn!("Dropbox 429 rate-limit on {url}, retry after {secs}s");
                err.message = format!("{} (retry after {secs}s)", err.message);
            }
            return Err(err);
        }

        let body = resp
            .text()
            .await
            .map_err(|e| DropboxError::network(format!("Failed to read body from {url}: {e}")))?;

        if !status.is_success() {
            return Err(DropboxError::from_response(status.as_u16(), &body));
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body)
            .map_err(|e| DropboxError::parse(format!("Failed to parse response from {url}: {e} (body: {body})")))
    }
}

fn validate_base(base: &str) -> DropboxResult<String> {
    let parsed = url::Url::parse(base)
        .map_err(|e| DropboxError::config(format!("Invalid base URL '{base}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(base.trim_end_matches('/').to_string()),
        other => Err(DropboxError::config(format!(
            "Unsupported URL scheme '{other}' in '{base}'"
        ))),
    }
}

#[async_trait]
impl DropboxTransport for DropboxClient {
    async fn rpc(
        &self,
        token: &str,
        route: &str,
        body: &serde_json::Value,
    ) -> DropboxResult<serde_json::Value> {
        let url = format!("{}/{}", self.api_base, route);
        debug!("Dropbox RPC {route} (token {})", mask_token(token));

        let resp = self
            .http
            .post(&url)
            .headers(Self::auth_header(token)?)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| DropboxError::network(format!("HTTP request to {url} failed: {e}")))?;

        Self::read_response(&url, resp).await
    }

    async fn content_upload(
        &self,
        token: &str,
        route: &str,
        api_arg: &serde_json::Value,
        data: &[u8],
    ) -> DropboxResult<serde_json::Value> {
        let url = format!("{}/{}", self.content_base, route);
        let api_arg_json = header_safe_json(api_arg)
            .map_err(|e| DropboxError::parse(format!("Failed to serialise {API_ARG_HEADER}: {e}")))?;
        debug!(
            "Dropbox upload {route}, {} bytes (token {})",
            data.len(),
            mask_token(token)
        );

        let resp = self
            .http
            .post(&url)
            .headers(Self::auth_header(token)?)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(API_ARG_HEADER, api_arg_json)
            .body(data.to_vec())
            .send()
            .await
            .map_err(|e| DropboxError::network(format!("Content upload to {url} failed: {e}")))?;

        Self::read_response(&url, resp).await
    }
}
