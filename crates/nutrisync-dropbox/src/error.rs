//! Error type for Dropbox calls.
//!
//! Errors never leave the processors: they are turned into a `false`
//! result and a diagnostic event. The kind/status split exists so the
//! resolver can tell a conflict from a transport failure.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorised error kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropboxErrorKind {
    Auth,
    BadRequest,
    Forbidden,
    NotFound,
    Conflict,
    RateLimited,
    ServerError,
    Network,
    Parse,
    Config,
    InvalidPayload,
}

impl fmt::Display for DropboxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth => write!(f, "Authentication error"),
            Self::BadRequest => write!(f, "Bad request"),
            Self::Forbidden => write!(f, "Forbidden"),
            Self::NotFound => write!(f, "Not found"),
            Self::Conflict => write!(f, "Conflict"),
            Self::RateLimited => write!(f, "Rate limited"),
            Self::ServerError => write!(f, "Server error"),
            Self::Network => write!(f, "Network error"),
            Self::Parse => write!(f, "Parse error"),
            Self::Config => write!(f, "Configuration error"),
            Self::InvalidPayload => write!(f, "Invalid payload"),
        }
    }
}

/// Dropbox API v2 error envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DropboxApiError {
    #[serde(default)]
    pub error_summary: Option<String>,
}

/// Main error type for Dropbox operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropboxError {
    pub kind: DropboxErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl DropboxError {
    pub fn new(kind: DropboxErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(DropboxErrorKind::Network, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(DropboxErrorKind::Parse, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(DropboxErrorKind::Config, message)
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(DropboxErrorKind::InvalidPayload, message)
    }

    /// Build an error from a non-success HTTP response.
    ///
    /// Dropbox answers endpoint-specific failures with 409 and a JSON
    /// envelope; other statuses usually carry plain text.
    pub fn from_response(status: u16, body: &str) -> Self {
        let kind = match status {
            400 => DropboxErrorKind::BadRequest,
            401 => DropboxErrorKind::Auth,
            403 => DropboxErrorKind::Forbidden,
            404 => DropboxErrorKind::NotFound,
            409 => DropboxErrorKind::Conflict,
            429 => DropboxErrorKind::RateLimited,
            500..=599 => DropboxErrorKind::ServerError,
            _ => DropboxErrorKind::Network,
        };

        let envelope: Option<DropboxApiError> = serde_json::from_str(body).ok();
        let message = match envelope.and_then(|e| e.error_summary) {
            Some(summary) => summary,
            None if body.trim().is_empty() => format!("Dropbox API error {status}"),
            None => body.to_string(),
        };

        Self {
            kind,
            message,
            status_code: Some(status),
        }
    }

    /// The provider rejected the call because of existing remote state.
    pub fn is_conflict(&self) -> bool {
        self.status_code == Some(409)
    }

    /// Failed before any HTTP status was received.
    pub fn is_transport(&self) -> bool {
        self.kind == DropboxErrorKind::Network && self.status_code.is_none()
    }
}

impl fmt::Display for DropboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "[{}] HTTP {}: {}", self.kind, status, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for DropboxError {}

impl From<DropboxError> for String {
    fn from(e: DropboxError) -> String {
        e.to_string()
    }
}

pub type DropboxResult<T> = Result<T, DropboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_envelope() {
        let body = r#"{"error_summary":"bad_path/already_shared/..","error":{".tag":"bad_path","bad_path":{".tag":"already_shared"}}}"#;
        let e = DropboxError::from_response(409, body);
        assert_eq!(e.kind, DropboxErrorKind::Conflict);
        assert!(e.is_conflict());
        assert_eq!(e.message, "bad_path/already_shared/..");
    }

    #[test]
    fn plain_text_body_kept() {
        let e = DropboxError::from_response(400, "Error in call to API function");
        assert_eq!(e.kind, DropboxErrorKind::BadRequest);
        assert_eq!(e.message, "Error in call to API function");
    }

    #[test]
    fn empty_body_message() {
        let e = DropboxError::from_response(503, "");
        assert_eq!(e.kind, DropboxErrorKind::ServerError);
        assert_eq!(e.message, "Dropbox API error 503");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(DropboxError::from_response(401, "").kind, DropboxErrorKind::Auth);
        assert_eq!(DropboxError::from_response(429, "").kind, DropboxErrorKind::RateLimited);
        assert!(!DropboxError::from_response(404, "").is_conflict());
    }

    #[test]
    fn transport_vs_http() {
        assert!(DropboxError::network("connection reset").is_transport());
        assert!(!DropboxError::from_response(302, "").is_transport());
    }

    #[test]
    fn display_includes_status() {
        let e = DropboxError::from_response(409, "");
        assert_eq!(e.to_string(), "[Conflict] HTTP 409: Dropbox API error 409");
        let s: String = DropboxError::network("timeout").into();
        assert_eq!(s, "[Network error] timeout");
    }
}
