//! Shared types for the Dropbox sync processors.
//!
//! Models the Dropbox HTTP API responses and request payloads used by the
//! processors, plus the integration's configuration.

use crate::polling::PollPolicy;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const DEFAULT_APP_FOLDER: &str = "/NutriInfo";
pub const DEFAULT_API_BASE: &str = "https://api.dropboxapi.com/2";
pub const DEFAULT_CONTENT_BASE: &str = "https://content.dropboxapi.com/2";

/// Operation type the upload processor is registered under.
pub const SHOPPING_LISTS_OPERATION: &str = "shopping-lists";
/// Operation type the sharing processor is registered under.
pub const DROPBOX_SHARING_OPERATION: &str = "dropbox-sharing";

/// Configuration of the Dropbox integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropboxSyncConfig {
    /// Application folder every remote path lives under.
    pub app_folder: String,
    /// RPC endpoint base URL.
    pub api_base: String,
    /// Content (upload) endpoint base URL.
    pub content_base: String,
    /// Transport timeout applied to every request.
    pub request_timeout_secs: u64,
    /// Page size of the shared-folder listing fallback.
    pub shared_folder_list_limit: u32,
    /// Polling budget for asynchronous share jobs.
    pub share_poll: PollPolicy,
}

impl Default for DropboxSyncConfig {
    fn default() -> Self {
        Self {
            app_folder: DEFAULT_APP_FOLDER.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            content_base: DEFAULT_CONTENT_BASE.to_string(),
            request_timeout_secs: 120,
            shared_folder_list_limit: 100,
            share_poll: PollPolicy::default(),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Files
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MetadataTag {
    File,
    Folder,
    Deleted,
}

/// Sharing details attached to folder metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FolderSharingInfo {
    #[serde(default)]
    pub read_only: Option<bool>,
    #[serde(default)]
    pub parent_shared_folder_id: Option<String>,
    #[serde(default)]
    pub shared_folder_id: Option<String>,
}

/// Subset of `files/get_metadata` we rely on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = ".tag", default)]
    pub tag: Option<MetadataTag>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    /// Set on the root of a mounted shared folder.
    #[serde(default)]
    pub shared_folder_id: Option<String>,
    #[serde(default)]
    pub sharing_info: Option<FolderSharingInfo>,
}

impl Metadata {
    /// The sharing identity carried by this entry, if any.
    pub fn shared_folder_id(&self) -> Option<&str> {
        self.shared_folder_id
            .as_deref()
            .or_else(|| {
                self.sharing_info
                    .as_ref()
                    .and_then(|s| s.shared_folder_id.as_deref())
            })
            .filter(|id| !id.is_empty())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Sharing: Folders & Members
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Editor,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => "editor",
        }
    }
}

/// Who may change a shared folder's membership.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AclUpdatePolicy {
    Editors,
}

impl AclUpdatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editors => "editors",
        }
    }
}

/// A shared folder as returned by `share_folder`, the job-status check
/// and `list_folders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SharedFolderMetadata {
    #[serde(default)]
    pub shared_folder_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Only present when the folder is mounted in the caller's Dropbox.
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

impl SharedFolderMetadata {
    pub fn shared_folder_id(&self) -> Option<&str> {
        self.shared_folder_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Response of `sharing/share_folder`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum ShareFolderLaunch {
    Complete(SharedFolderMetadata),
    AsyncJobId { async_job_id: String },
}

/// Response of `sharing/check_share_job_status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum ShareJobStatus {
    InProgress,
    Complete(SharedFolderMetadata),
    Failed {
        #[serde(default)]
        failed: Option<serde_json::Value>,
    },
    #[serde(other)]
    Other,
}

/// Response of `sharing/list_folders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListSharedFoldersResult {
    #[serde(default)]
    pub entries: Vec<SharedFolderMetadata>,
}
