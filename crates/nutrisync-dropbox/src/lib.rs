//! # NutriSync – Dropbox Processors
//!
//! Background-queue processors that push NutriInfo data to Dropbox:
//!
//! - **Upload** — writes a shopping list to `<app folder>/lists/<key>/shopping-list.json`
//! - **Sharing** — shares a folder under the app folder, invites or removes members
//! - **Identity** — resolves the shared-folder id of a path (metadata, share, listing)
//! - **Diagnostics** — structured events routed through an injectable sink

pub mod types;
pub mod error;
pub mod client;
pub mod files;
pub mod sharing;
pub mod api;
pub mod paths;
pub mod polling;
pub mod diagnostics;
pub mod resolver;
pub mod shopping_list;
pub mod upload;
pub mod share;

pub use api::DropboxApi;
pub use client::{DropboxClient, DropboxTransport};
pub use diagnostics::{DiagnosticSink, LogSink, MemorySink, SyncEvent};
pub use error::{DropboxError, DropboxErrorKind, DropboxResult};
pub use paths::AppPaths;
pub use polling::{PollPolicy, Sleeper, TokioSleeper};
pub use resolver::{FolderIdentityResolver, ResolvedFolder};
pub use share::{SharingProcessor, SharingRequest};
pub use shopping_list::{shopping_list_work_item, ShoppingListData, ShoppingListItem};
pub use types::DropboxSyncConfig;
pub use upload::UploadProcessor;
