use async_trait::async_trait;
use nutrisync::dropbox::{
    DiagnosticSink, DropboxResult, DropboxSyncConfig, DropboxTransport, MemorySink, Sleeper,
    SyncEvent,
};
use nutrisync::queue::{ExecutionContext, Processor, QueueRegistry, RegistryError, WorkItem};
use nutrisync::{register_processors, BootstrapError, SyncProcessors};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every call and answers from a fixed route table.
struct ScriptedTransport {
    responses: Vec<(&'static str, Value)>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<(&'static str, Value)>) -> Arc<Self> {
        Arc::new(Self {
            responses,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn routes(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
    }

    fn answer(&self, route: &str) -> Value {
        self.responses
            .iter()
            .find(|(r, _)| *r == route)
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null)
    }
}

#[async_trait]
impl DropboxTransport for ScriptedTransport {
    async fn rpc(&self, _token: &str, route: &str, body: &Value) -> DropboxResult<Value> {
        self.calls.lock().unwrap().push((route.to_string(), body.clone()));
        Ok(self.answer(route))
    }

    async fn content_upload(
        &self,
        _token: &str,
        route: &str,
        api_arg: &Value,
        _data: &[u8],
    ) -> DropboxResult<Value> {
        self.calls.lock().unwrap().push((route.to_string(), api_arg.clone()));
        Ok(self.answer(route))
    }
}

struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

fn processors(transport: Arc<ScriptedTransport>, sink: Arc<MemorySink>) -> SyncProcessors {
    SyncProcessors::with_transport(
        transport,
        &DropboxSyncConfig::default(),
        Arc::new(NoSleep),
        sink,
    )
}

#[test]
fn missing_registry_is_reported() {
    let sink = Arc::new(MemorySink::new());
    let procs = processors(ScriptedTransport::new(vec![]), sink.clone());

    let result = register_processors(None, &procs, sink.as_ref());
    assert!(matches!(result, Err(BootstrapError::MissingRegistry)));
    assert_eq!(sink.events(), vec![SyncEvent::RegistryMissing]);
}

#[test]
fn registers_both_processors() {
    let sink = Arc::new(MemorySink::new());
    let procs = processors(ScriptedTransport::new(vec![]), sink.clone());
    let mut registry = QueueRegistry::new();

    register_processors(Some(&mut registry), &procs, sink.as_ref()).unwrap();

    assert_eq!(registry.operation_types(), vec!["dropbox-sharing", "shopping-lists"]);
    let registered = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::ProcessorRegistered { .. }))
        .count();
    assert_eq!(registered, 2);
}

#[test]
fn duplicate_registration_fails() {
    let sink = Arc::new(MemorySink::new());
    let procs = processors(ScriptedTransport::new(vec![]), sink.clone());
    let mut registry = QueueRegistry::new();

    register_processors(Some(&mut registry), &procs, sink.as_ref()).unwrap();
    let err = register_processors(Some(&mut registry), &procs, sink.as_ref()).unwrap_err();

    assert!(matches!(
        err,
        BootstrapError::Registry(RegistryError::AlreadyRegistered(ref name)) if name == "shopping-lists"
    ));
    assert!(sink.contains(|e| matches!(
        e,
        SyncEvent::RegistrationFailed { operation_type, .. } if operation_type == "dropbox-sharing"
    )));
}

#[test]
fn from_config_rejects_bad_base_url() {
    let config = DropboxSyncConfig {
        api_base: "ftp://example.com".into(),
        ..DropboxSyncConfig::default()
    };
    let sink: Arc<dyn DiagnosticSink> = Arc::new(MemorySink::new());
    assert!(matches!(
        SyncProcessors::from_config(&config, sink),
        Err(BootstrapError::Client(_))
    ));
}

#[test]
fn from_config_with_defaults() {
    let sink: Arc<dyn DiagnosticSink> = Arc::new(MemorySink::new());
    assert!(SyncProcessors::from_config(&DropboxSyncConfig::default(), sink).is_ok());
}

#[tokio::test]
async fn dispatch_without_token_never_reaches_network() {
    let transport = ScriptedTransport::new(vec![]);
    let sink = Arc::new(MemorySink::new());
    let procs = processors(transport.clone(), sink.clone());
    let mut registry = QueueRegistry::new();
    register_processors(Some(&mut registry), &procs, sink.as_ref()).unwrap();

    let upload = WorkItem::new("shopping-lists", "abc123", json!({"name": "Semana"}));
    let share = WorkItem::new(
        "dropbox-sharing",
        "abc123",
        json!({"type": "share_folder", "folderPath": "groceries"}),
    );

    assert!(!registry.dispatch(&upload, &ExecutionContext::anonymous()).await);
    assert!(!registry.dispatch(&share, &ExecutionContext::anonymous()).await);
    assert!(transport.routes().is_empty());
}

#[tokio::test]
async fn dispatch_upload_to_derived_path() {
    let transport = ScriptedTransport::new(vec![("files/upload", json!({"name": "shopping-list.json"}))]);
    let sink = Arc::new(MemorySink::new());
    let procs = processors(transport.clone(), sink.clone());
    let mut registry = QueueRegistry::new();
    register_processors(Some(&mut registry), &procs, sink.as_ref()).unwrap();

    let item = WorkItem::new("shopping-lists", "abc123", json!({"id": "abc123", "items": []}));
    assert!(registry.dispatch(&item, &ExecutionContext::with_token("tok")).await);

    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["path"], "/NutriInfo/lists/abc123/shopping-list.json");
    assert_eq!(calls[0].1["mode"], "overwrite");
}

#[tokio::test]
async fn dispatch_invite_resolves_then_adds_member() {
    let transport = ScriptedTransport::new(vec![
        ("files/get_metadata", json!({".tag": "folder", "name": "groceries", "shared_folder_id": "sf9"})),
        ("sharing/add_folder_member", Value::Null),
    ]);
    let sink = Arc::new(MemorySink::new());
    let procs = processors(transport.clone(), sink.clone());
    let mut registry = QueueRegistry::new();
    register_processors(Some(&mut registry), &procs, sink.as_ref()).unwrap();

    let item = WorkItem::new(
        "dropbox-sharing",
        "groceries",
        json!({"type": "invite", "folderPath": "groceries", "email": "ana@example.com"}),
    );
    assert!(registry.dispatch(&item, &ExecutionContext::with_token("tok")).await);

    assert_eq!(
        transport.routes(),
        vec!["files/get_metadata", "sharing/add_folder_member"]
    );
    let calls = transport.calls.lock().unwrap();
    assert_eq!(calls[0].1["path"], "/NutriInfo/groceries");
    assert_eq!(calls[1].1["shared_folder_id"], "sf9");
}

#[tokio::test]
async fn custom_app_folder_is_applied() {
    let transport = ScriptedTransport::new(vec![]);
    let sink = Arc::new(MemorySink::new());
    let config = DropboxSyncConfig {
        app_folder: "/Family".into(),
        ..DropboxSyncConfig::default()
    };
    let procs = SyncProcessors::with_transport(transport.clone(), &config, Arc::new(NoSleep), sink);

    let item = WorkItem::new("shopping-lists", "k1", json!({"items": []}));
    assert!(procs.upload.process(&item, &ExecutionContext::with_token("tok")).await);
    assert_eq!(
        transport.calls.lock().unwrap()[0].1["path"],
        "/Family/lists/k1/shopping-list.json"
    );
}
