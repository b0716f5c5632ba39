//! Upload processor: writes a shopping list to its Dropbox document.

use crate::api::DropboxApi;
use crate::diagnostics::{DiagnosticSink, SyncEvent};
use crate::error::{DropboxError, DropboxResult};
use crate::paths::AppPaths;
use async_trait::async_trait;
use nutrisync_queue::{ExecutionContext, Processor, WorkItem};
use std::sync::Arc;

const PROCESSOR: &str = "shopping-lists";

/// Payload key that overrides the derived document path.
pub const PATH_OVERRIDE_KEY: &str = "path";

pub struct UploadProcessor {
    api: DropboxApi,
    paths: AppPaths,
    sink: Arc<dyn DiagnosticSink>,
}

impl UploadProcessor {
    pub fn new(api: DropboxApi, paths: AppPaths, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { api, paths, sink }
    }

    /// `payload.path` verbatim when present, otherwise the nested-layout
    /// document path for the item's resource key.
    pub fn target_path(&self, item: &WorkItem) -> String {
        item.payload
            .get(PATH_OVERRIDE_KEY)
            .and_then(|p| p.as_str())
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.paths.list_document(&item.resource_key))
    }

    /// Pretty-printed document bytes.
    ///
    /// The uploaded document is not the raw payload: a top-level `path`
    /// key is removed, since it only addresses the upload, and a `null`
    /// payload is rejected instead of being written as `null`.
    ///
    /// Object keys come out sorted, so identical input always yields
    /// identical bytes.
    pub fn render_document(payload: &serde_json::Value) -> DropboxResult<Vec<u8>> {
        if payload.is_null() {
            return Err(DropboxError::invalid_payload("payload is empty"));
        }
        let mut document = payload.clone();
        if let Some(obj) = document.as_object_mut() {
            obj.remove(PATH_OVERRIDE_KEY);
        }
        serde_json::to_vec_pretty(&document)
            .map_err(|e| DropboxError::invalid_payload(format!("cannot serialise payload: {e}")))
    }
}

#[async_trait]
impl Processor for UploadProcessor {
    async fn process(&self, item: &WorkItem, ctx: &ExecutionContext) -> bool {
        let Some(token) = ctx.token() else {
            self.sink.emit(SyncEvent::MissingToken { processor: PROCESSOR });
            return false;
        };

        let body = match Self::render_document(&item.payload) {
            Ok(body) => body,
            Err(e) => {
                self.sink.emit(SyncEvent::InvalidPayload {
                    processor: PROCESSOR,
                    detail: e.message,
                });
                return false;
            }
        };

        let path = self.target_path(item);
        self.sink.emit(SyncEvent::UploadStarted {
            path: path.clone(),
            bytes: body.len(),
        });

        match self.api.upload_overwrite(token, &path, &body).await {
            Ok(_) => {
                self.sink.emit(SyncEvent::UploadSucceeded { path });
                true
            }
            Err(e) => {
                self.sink.emit(SyncEvent::UploadFailed {
                    path,
                    status: e.status_code,
                    detail: e.message,
                });
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ROUTE_UPLOAD;
    use crate::client::MockDropboxTransport;
    use crate::diagnostics::{EventLevel, MemorySink};
    use serde_json::json;

    fn processor(mock: MockDropboxTransport) -> (UploadProcessor, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let p = UploadProcessor::new(
            DropboxApi::new(Arc::new(mock)),
            AppPaths::default(),
            sink.clone(),
        );
        (p, sink)
    }

    fn list_item() -> WorkItem {
        WorkItem::new("shopping-lists", "abc123", json!({"id": "abc123", "name": "Semana", "items": []}))
    }

    #[tokio::test]
    async fn missing_token_makes_no_call() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload().times(0);
        mock.expect_rpc().times(0);
        let (p, sink) = processor(mock);

        assert!(!p.process(&list_item(), &ExecutionContext::anonymous()).await);
        assert!(!p.process(&list_item(), &ExecutionContext::with_token("")).await);
        assert!(sink.contains(|e| matches!(e, SyncEvent::MissingToken { .. })));
    }

    #[tokio::test]
    async fn derived_path_and_overwrite() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload()
            .withf(|token, route, arg, _| {
                token == "tok"
                    && route == ROUTE_UPLOAD
                    && arg["path"] == "/NutriInfo/lists/abc123/shopping-list.json"
                    && arg["mode"] == "overwrite"
                    && arg["autorename"] == false
            })
            .times(1)
            .returning(|_, _, _, _| Ok(json!({"name": "shopping-list.json"})));
        let (p, sink) = processor(mock);

        assert!(p.process(&list_item(), &ExecutionContext::with_token("tok")).await);
        assert!(sink.contains(|e| matches!(e, SyncEvent::UploadSucceeded { .. })));
    }

    #[tokio::test]
    async fn path_override_used_verbatim_and_stripped() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload()
            .withf(|_, _, arg, data| {
                let doc: serde_json::Value = serde_json::from_slice(data).unwrap();
                arg["path"] == "/NutriInfo/shopping-list-abc123.json" && doc.get("path").is_none()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(json!({})));
        let (p, _) = processor(mock);

        let item = WorkItem::new(
            "shopping-lists",
            "abc123",
            json!({"path": "/NutriInfo/shopping-list-abc123.json", "name": "Semana"}),
        );
        assert!(p.process(&item, &ExecutionContext::with_token("tok")).await);
    }

    #[tokio::test]
    async fn http_error_is_failure() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload()
            .times(1)
            .returning(|_, _, _, _| {
                Err(DropboxError::from_response(
                    409,
                    r#"{"error_summary":"path/insufficient_space/..","error":{".tag":"path"}}"#,
                ))
            });
        let (p, sink) = processor(mock);

        assert!(!p.process(&list_item(), &ExecutionContext::with_token("tok")).await);
        assert!(sink.contains(|e| matches!(
            e,
            SyncEvent::UploadFailed { status: Some(409), detail, .. } if detail.contains("insufficient_space")
        )));
    }

    #[tokio::test]
    async fn server_error_is_failure() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload()
            .returning(|_, _, _, _| Err(DropboxError::from_response(500, "oops")));
        let (p, _) = processor(mock);
        assert!(!p.process(&list_item(), &ExecutionContext::with_token("tok")).await);
    }

    #[tokio::test]
    async fn network_error_is_failure() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload()
            .returning(|_, _, _, _| Err(DropboxError::network("dns failure")));
        let (p, sink) = processor(mock);

        assert!(!p.process(&list_item(), &ExecutionContext::with_token("tok")).await);
        assert_eq!(sink.count_at(EventLevel::Error), 1);
    }

    #[tokio::test]
    async fn null_payload_rejected_without_call() {
        let mut mock = MockDropboxTransport::new();
        mock.expect_content_upload().times(0);
        let (p, sink) = processor(mock);

        let item = WorkItem::new("shopping-lists", "abc123", serde_json::Value::Null);
        assert!(!p.process(&item, &ExecutionContext::with_token("tok")).await);
        assert!(sink.contains(|e| matches!(e, SyncEvent::InvalidPayload { .. })));
    }

    #[test]
    fn render_is_pretty_and_stable() {
        let a = json!({"name": "Semana", "id": "abc123", "items": [{"b": 1, "a": 2}]});
        let b = json!({"items": [{"a": 2, "b": 1}], "id": "abc123", "name": "Semana"});
        let ra = UploadProcessor::render_document(&a).unwrap();
        let rb = UploadProcessor::render_document(&b).unwrap();
        assert_eq!(ra, rb);
        let text = String::from_utf8(ra).unwrap();
        assert!(text.starts_with("{\n  \"id\""));
    }

    #[test]
    fn blank_override_falls_back() {
        let (p, _) = processor(MockDropboxTransport::new());
        let item = WorkItem::new("shopping-lists", "k", json!({"path": "  "}));
        assert_eq!(p.target_path(&item), "/NutriInfo/lists/k/shopping-list.json");
    }
}
