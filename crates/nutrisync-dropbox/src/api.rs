//! Typed wrappers around the Dropbox endpoints used by the processors.

use crate::client::DropboxTransport;
use crate::error::{DropboxError, DropboxResult};
use crate::files::{build_get_metadata, build_overwrite_arg};
use crate::sharing::{
    build_add_folder_member, build_check_job_status, build_list_shared_folders,
    build_remove_folder_member, build_share_folder,
};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const ROUTE_UPLOAD: &str = "files/upload";
pub const ROUTE_GET_METADATA: &str = "files/get_metadata";
pub const ROUTE_SHARE_FOLDER: &str = "sharing/share_folder";
pub const ROUTE_CHECK_SHARE_JOB_STATUS: &str = "sharing/check_share_job_status";
pub const ROUTE_LIST_FOLDERS: &str = "sharing/list_folders";
pub const ROUTE_ADD_FOLDER_MEMBER: &str = "sharing/add_folder_member";
pub const ROUTE_REMOVE_FOLDER_MEMBER: &str = "sharing/remove_folder_member";

fn decode<T: DeserializeOwned>(route: &str, value: serde_json::Value) -> DropboxResult<T> {
    serde_json::from_value(value)
        .map_err(|e| DropboxError::parse(format!("Unexpected {route} response: {e}")))
}

#[derive(Clone)]
pub struct DropboxApi {
    transport: Arc<dyn DropboxTransport>,
}

impl DropboxApi {
    pub fn new(transport: Arc<dyn DropboxTransport>) -> Self {
        Self { transport }
    }

    /// Upload `data` to `path`, replacing whatever is there.
    pub async fn upload_overwrite(
        &self,
        token: &str,
        path: &str,
        data: &[u8],
    ) -> DropboxResult<serde_json::Value> {
        let arg = build_overwrite_arg(path);
        self.transport
            .content_upload(token, ROUTE_UPLOAD, &arg, data)
            .await
    }

    pub async fn get_metadata(&self, token: &str, path: &str) -> DropboxResult<Metadata> {
        let value = self
            .transport
            .rpc(token, ROUTE_GET_METADATA, &build_get_metadata(path))
            .await?;
        decode(ROUTE_GET_METADATA, value)
    }

    /// Share `path` so that editors may manage membership.
    pub async fn share_folder(&self, token: &str, path: &str) -> DropboxResult<ShareFolderLaunch> {
        let body = build_share_folder(path, AclUpdatePolicy::Editors, false);
        let value = self.transport.rpc(token, ROUTE_SHARE_FOLDER, &body).await?;
        decode(ROUTE_SHARE_FOLDER, value)
    }

    /// Same call as [`share_folder`](Self::share_folder) without decoding
    /// the launch result.
    pub async fn request_share(&self, token: &str, path: &str) -> DropboxResult<()> {
        let body = build_share_folder(path, AclUpdatePolicy::Editors, false);
        self.transport.rpc(token, ROUTE_SHARE_FOLDER, &body).await?;
        Ok(())
    }

    pub async fn check_share_job_status(
        &self,
        token: &str,
        async_job_id: &str,
    ) -> DropboxResult<ShareJobStatus> {
        let value = self
            .transport
            .rpc(
                token,
                ROUTE_CHECK_SHARE_JOB_STATUS,
                &build_check_job_status(async_job_id),
            )
            .await?;
        decode(ROUTE_CHECK_SHARE_JOB_STATUS, value)
    }

    /// First page of the shared folders visible to the account.
    pub async fn list_shared_folders(
        &self,
        token: &str,
        limit: u32,
    ) -> DropboxResult<Vec<SharedFolderMetadata>> {
        let value = self
            .transport
            .rpc(token, ROUTE_LIST_FOLDERS, &build_list_shared_folders(limit))
            .await?;
        let page: ListSharedFoldersResult = decode(ROUTE_LIST_FOLDERS, value)?;
        Ok(page.entries)
    }

    pub async fn add_folder_member(
        &self,
        token: &str,
        shared_folder_id: &str,
        email: &str,
        access_level: AccessLevel,
    ) -> DropboxResult<()> {
        let body = build_add_folder_member(shared_folder_id, email, access_level);
        self.transport
            .rpc(token, ROUTE_ADD_FOLDER_MEMBER, &body)
            .await?;
        Ok(())
    }

    /// Remove `email` without leaving them a copy of the folder.
    pub async fn remove_folder_member(
        &self,
        token: &str,
        shared_folder_id: &str,
        email: &str,
    ) -> DropboxResult<()> {
        let body = build_remove_folder_member(shared_folder_id, email, false);
        self.transport
            .rpc(token, ROUTE_REMOVE_FOLDER_MEMBER, &body)
            .await?;
        Ok(())
    }
}
