//! Sharing processor: shares app folders and manages their members.

use crate::api::DropboxApi;
use crate::diagnostics::{DiagnosticSink, SyncEvent};
use crate::error::DropboxError;
use crate::paths::AppPaths;
use crate::resolver::FolderIdentityResolver;
use crate::types::AccessLevel;
use async_trait::async_trait;
use nutrisync_queue::{ExecutionContext, Processor, WorkItem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PROCESSOR: &str = "dropbox-sharing";

/// Sharing payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SharingRequest {
    ShareFolder {
        #[serde(rename = "folderPath")]
        folder_path: String,
    },
    Invite {
        #[serde(rename = "folderPath")]
        folder_path: String,
        email: String,
    },
    Remove {
        #[serde(rename = "folderPath")]
        folder_path: String,
        email: String,
    },
}

impl SharingRequest {
    pub fn from_payload(payload: &serde_json::Value) -> Result<Self, DropboxError> {
        let req = Self::deserialize(payload)
            .map_err(|e| DropboxError::invalid_payload(e.to_string()))?;
        if let Self::Invite { email, .. } | Self::Remove { email, .. } = &req {
            if email.trim().is_empty() {
                return Err(DropboxError::invalid_payload("email must not be empty"));
            }
        }
        Ok(req)
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::ShareFolder { .. } => "share_folder",
            Self::Invite { .. } => "invite",
            Self::Remove { .. } => "remove",
        }
    }

    pub fn folder_path(&self) -> &str {
        match self {
            Self::ShareFolder { folder_path }
            | Self::Invite { folder_path, .. }
            | Self::Remove { folder_path, .. } => folder_path,
        }
    }
}

pub struct SharingProcessor {
    api: DropboxApi,
    resolver: FolderIdentityResolver,
    paths: AppPaths,
    sink: Arc<dyn DiagnosticSink>,
}

impl SharingProcessor {
    pub fn new(
        api: DropboxApi,
        resolver: FolderIdentityResolver,
        paths: AppPaths,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            api,
            resolver,
            paths,
            sink,
        }
    }

    fn failed(&self, request: &SharingRequest, path: &str, status: Option<u16>, detail: String) -> bool {
        self.sink.emit(SyncEvent::SharingFailed {
            operation: request.operation(),
            path: path.to_string(),
            status,
            detail,
        });
        false
    }

    async fn execute(&self, token: &str, request: &SharingRequest) -> bool {
        let path = self.paths.normalize(request.folder_path());
        self.sink.emit(SyncEvent::SharingStarted {
            operation: request.operation(),
            path: path.clone(),
        });

        let result = match request {
            SharingRequest::ShareFolder { .. } => self.api.request_share(token, &path).await,
            SharingRequest::Invite { email, .. } => {
                let Some(folder) = self.resolver.resolve(token, &path).await else {
                    return self.failed(request, &path, None, "shared folder id unresolved".into());
                };
                self.api
                    .add_folder_member(token, &folder.shared_folder_id, email, AccessLevel::Editor)
                    .await
            }
            SharingRequest::Remove { email, .. } => {
                let Some(folder) = self.resolver.resolve(token, &path).await else {
                    return self.failed(request, &path, None, "shared folder id unresolved".into());
                };
                self.api
                    .remove_folder_member(token, &folder.shared_folder_id, email)
                    .await
            }
        };

        match result {
            Ok(()) => {
                self.sink.emit(SyncEvent::SharingSucceeded {
                    operation: request.operation(),
                    path,
                });
                true
            }
            Err(e) => self.failed(request, &path, e.status_code, e.message),
        }
    }
}

#[async_trait]
impl Processor for SharingProcessor {
    async fn process(&self, item: &WorkItem, ctx: &ExecutionContext) -> bool {
        let Some(token) = ctx.token() else {
            self.sink.emit(SyncEvent::MissingToken { processor: PROCESSOR });
            return false;
        };

        let request = match SharingRequest::from_payload(&item.payload) {
            Ok(req) => req,
            Err(e) => {
                self.sink.emit(SyncEvent::InvalidPayload {
                    processor: PROCESSOR,
                    detail: e.message,
                });
                return false;
            }
        };

        self.execute(token, &request).await
    }
}
