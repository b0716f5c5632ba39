//! Structured diagnostic events emitted by the processors.
//!
//! Processors never print directly; they hand a [`SyncEvent`] to the
//! [`DiagnosticSink`] they were built with. Production code uses
//! [`LogSink`], tests use [`MemorySink`] and assert on the recorded events.

use serde::Serialize;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Info,
    Warn,
    Error,
}

/// Where a shared-folder identity was found.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    Metadata,
    ShareFolder,
    ShareJob,
    SharedFolderListing,
}

impl fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::ShareFolder => write!(f, "share_folder"),
            Self::ShareJob => write!(f, "share job"),
            Self::SharedFolderListing => write!(f, "shared-folder listing"),
        }
    }
}

/// Step of the folder-identity lookup that raised an error.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LookupStep {
    Metadata,
    ShareFolder,
    JobStatus,
    Listing,
}

impl fmt::Display for LookupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::ShareFolder => write!(f, "share_folder"),
            Self::JobStatus => write!(f, "job status"),
            Self::Listing => write!(f, "listing"),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    MissingToken {
        processor: &'static str,
    },
    InvalidPayload {
        processor: &'static str,
        detail: String,
    },
    UploadStarted {
        path: String,
        bytes: usize,
    },
    UploadSucceeded {
        path: String,
    },
    UploadFailed {
        path: String,
        status: Option<u16>,
        detail: String,
    },
    SharingStarted {
        operation: &'static str,
        path: String,
    },
    SharingSucceeded {
        operation: &'static str,
        path: String,
    },
    SharingFailed {
        operation: &'static str,
        path: String,
        status: Option<u16>,
        detail: String,
    },
    IdentityResolved {
        path: String,
        shared_folder_id: String,
        source: IdentitySource,
    },
    IdentityUnresolved {
        path: String,
    },
    ShareConflict {
        path: String,
    },
    ShareJobFailed {
        job_id: String,
    },
    ShareJobTimedOut {
        job_id: String,
        attempts: u32,
    },
    LookupError {
        step: LookupStep,
        status: Option<u16>,
        detail: String,
    },
    ProcessorRegistered {
        operation_type: String,
    },
    RegistrationFailed {
        operation_type: String,
        detail: String,
    },
    RegistryMissing,
}

impl SyncEvent {
    pub fn level(&self) -> EventLevel {
        match self {
            Self::UploadStarted { .. }
            | Self::UploadSucceeded { .. }
            | Self::SharingStarted { .. }
            | Self::SharingSucceeded { .. }
            | Self::IdentityResolved { .. }
            | Self::ShareConflict { .. }
            | Self::ProcessorRegistered { .. } => EventLevel::Info,
            Self::MissingToken { .. }
            | Self::IdentityUnresolved { .. }
            | Self::ShareJobFailed { .. }
            | Self::ShareJobTimedOut { .. }
            | Self::LookupError { .. } => EventLevel::Warn,
            Self::InvalidPayload { .. }
            | Self::UploadFailed { .. }
            | Self::SharingFailed { .. }
            | Self::RegistrationFailed { .. }
            | Self::RegistryMissing => EventLevel::Error,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToken { processor } => write!(f, "{processor}: missing token"),
            Self::InvalidPayload { processor, detail } => {
                write!(f, "{processor}: invalid payload: {detail}")
            }
            Self::UploadStarted { path, bytes } => write!(f, "uploading {path} ({bytes} bytes)"),
            Self::UploadSucceeded { path } => write!(f, "upload ok: {path}"),
            Self::UploadFailed { path, status, detail } => {
                write!(f, "upload failed: {path}{}: {detail}", status_suffix(status))
            }
            Self::SharingStarted { operation, path } => write!(f, "{operation} on {path}"),
            Self::SharingSucceeded { operation, path } => write!(f, "{operation} ok: {path}"),
            Self::SharingFailed {
                operation,
                path,
                status,
                detail,
            } => write!(
                f,
                "{operation} failed: {path}{}: {detail}",
                status_suffix(status)
            ),
            Self::IdentityResolved {
                path,
                shared_folder_id,
                source,
            } => write!(f, "shared folder {shared_folder_id} for {path} (via {source})"),
            Self::IdentityUnresolved { path } => {
                write!(f, "could not resolve shared folder id for {path}")
            }
            Self::ShareConflict { path } => {
                write!(f, "{path} is already shared, searching shared folders")
            }
            Self::ShareJobFailed { job_id } => write!(f, "share job {job_id} failed"),
            Self::ShareJobTimedOut { job_id, attempts } => {
                write!(f, "share job {job_id} still pending after {attempts} checks")
            }
            Self::LookupError { step, status, detail } => {
                write!(f, "{step} lookup error{}: {detail}", status_suffix(status))
            }
            Self::ProcessorRegistered { operation_type } => {
                write!(f, "registered processor '{operation_type}'")
            }
            Self::RegistrationFailed {
                operation_type,
                detail,
            } => write!(f, "could not register '{operation_type}': {detail}"),
            Self::RegistryMissing => {
                write!(f, "queue registry not available, no processors registered")
            }
        }
    }
}

/// Receives diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&self, event: SyncEvent) {
        match event.level() {
            EventLevel::Info => log::info!(target: "nutrisync::dropbox", "{event}"),
            EventLevel::Warn => log::warn!(target: "nutrisync::dropbox", "{event}"),
            EventLevel::Error => log::error!(target: "nutrisync::dropbox", "{event}"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<SyncEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn contains(&self, pred: impl Fn(&SyncEvent) -> bool) -> bool {
        self.events().iter().any(pred)
    }

    pub fn count_at(&self, level: EventLevel) -> usize {
        self.events().iter().filter(|e| e.level() == level).count()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, event: SyncEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
