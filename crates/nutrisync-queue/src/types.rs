//! Work items and per-invocation execution context.

use serde::{Deserialize, Serialize};

/// One unit of queued work, immutable once dequeued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    /// Name of the registered processor that handles this item.
    pub operation_type: String,
    /// Identifies the local resource (e.g. the shopping list id).
    pub resource_key: String,
    /// Operation-specific data.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WorkItem {
    pub fn new(
        operation_type: impl Into<String>,
        resource_key: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            operation_type: operation_type.into(),
            resource_key: resource_key.into(),
            payload,
        }
    }
}

/// Context supplied by the runtime for a single invocation.
///
/// Processors read the token and drop the context when they return; it is
/// never cached.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(default)]
    pub token: Option<String>,
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("has_token", &self.token().is_some())
            .finish()
    }
}

impl ExecutionContext {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }

    /// The bearer token, if one is present and not blank.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
