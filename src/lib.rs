//! # NutriSync
//!
//! Wires the Dropbox sync processors into a host work queue.
//!
//! ```rust,no_run
//! use nutrisync::{config::NutriSyncConfig, logging, register_processors, SyncProcessors};
//! use nutrisync::dropbox::{DiagnosticSink, LogSink};
//! use nutrisync::queue::QueueRegistry;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NutriSyncConfig::load_default()?;
//! logging::init_logging(&config.log_level);
//!
//! let sink: Arc<dyn DiagnosticSink> = Arc::new(LogSink);
//! let processors = SyncProcessors::from_config(&config.dropbox, sink.clone())?;
//! let mut registry = QueueRegistry::new();
//! register_processors(Some(&mut registry), &processors, sink.as_ref())?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;

pub use nutrisync_dropbox as dropbox;
pub use nutrisync_queue as queue;

use nutrisync_dropbox::types::{DROPBOX_SHARING_OPERATION, SHOPPING_LISTS_OPERATION};
use nutrisync_dropbox::{
    AppPaths, DiagnosticSink, DropboxApi, DropboxClient, DropboxError, DropboxSyncConfig,
    DropboxTransport, FolderIdentityResolver, SharingProcessor, Sleeper, SyncEvent, TokioSleeper,
    UploadProcessor,
};
use nutrisync_queue::{Processor, ProcessorRegistry, RegistryError};
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
pub enum BootstrapError {
    /// No registry was handed to [`register_processors`].
    MissingRegistry,
    Registry(RegistryError),
    Client(DropboxError),
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRegistry => write!(f, "Processor registry is not available"),
            Self::Registry(e) => write!(f, "Registration failed: {e}"),
            Self::Client(e) => write!(f, "Dropbox client setup failed: {e}"),
        }
    }
}

impl std::error::Error for BootstrapError {}

impl From<RegistryError> for BootstrapError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<DropboxError> for BootstrapError {
    fn from(e: DropboxError) -> Self {
        Self::Client(e)
    }
}

/// The two Dropbox processors, sharing one transport.
#[derive(Clone)]
pub struct SyncProcessors {
    pub upload: Arc<UploadProcessor>,
    pub sharing: Arc<SharingProcessor>,
}

impl SyncProcessors {
    /// Build both processors over a single HTTP client.
    pub fn from_config(
        config: &DropboxSyncConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self, BootstrapError> {
        let client = DropboxClient::from_config(config)?;
        Ok(Self::with_transport(
            Arc::new(client),
            config,
            Arc::new(TokioSleeper),
            sink,
        ))
    }

    /// Build both processors over an arbitrary transport and sleeper.
    pub fn with_transport(
        transport: Arc<dyn DropboxTransport>,
        config: &DropboxSyncConfig,
        sleeper: Arc<dyn Sleeper>,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let api = DropboxApi::new(transport);
        let paths = AppPaths::new(&config.app_folder);
        let resolver = FolderIdentityResolver::new(
            api.clone(),
            config.share_poll.clone(),
            sleeper,
            config.shared_folder_list_limit,
            sink.clone(),
        );

        Self {
            upload: Arc::new(UploadProcessor::new(api.clone(), paths.clone(), sink.clone())),
            sharing: Arc::new(SharingProcessor::new(api, resolver, paths, sink)),
        }
    }

    fn entries(&self) -> [(&'static str, Arc<dyn Processor>); 2] {
        [
            (SHOPPING_LISTS_OPERATION, self.upload.clone() as Arc<dyn Processor>),
            (DROPBOX_SHARING_OPERATION, self.sharing.clone() as Arc<dyn Processor>),
        ]
    }
}

/// Register `shopping-lists` and `dropbox-sharing` with `registry`.
///
/// Both registrations are attempted; the first failure is returned.
pub fn register_processors(
    registry: Option<&mut dyn ProcessorRegistry>,
    processors: &SyncProcessors,
    sink: &dyn DiagnosticSink,
) -> Result<(), BootstrapError> {
    let Some(registry) = registry else {
        sink.emit(SyncEvent::RegistryMissing);
        return Err(BootstrapError::MissingRegistry);
    };

    let mut first_error = None;
    for (operation_type, processor) in processors.entries() {
        match registry.register_processor(operation_type, processor) {
            Ok(()) => sink.emit(SyncEvent::ProcessorRegistered {
                operation_type: operation_type.to_string(),
            }),
            Err(e) => {
                sink.emit(SyncEvent::RegistrationFailed {
                    operation_type: operation_type.to_string(),
                    detail: e.to_string(),
                });
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
