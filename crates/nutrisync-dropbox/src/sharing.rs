//! Request builders for the sharing endpoints.

use crate::types::{AccessLevel, AclUpdatePolicy};

/// Build share_folder request body.
pub fn build_share_folder(
    path: &str,
    acl_update_policy: AclUpdatePolicy,
    force_async: bool,
) -> serde_json::Value {
    serde_json::json!({
        "path": path,
        "acl_update_policy": acl_update_policy.as_str(),
        "force_async": force_async,
    })
}

/// Build check_share_job_status request body.
pub fn build_check_job_status(async_job_id: &str) -> serde_json::Value {
    serde_json::json!({ "async_job_id": async_job_id })
}

/// Build list_folders request body.
pub fn build_list_shared_folders(limit: u32) -> serde_json::Value {
    serde_json::json!({ "limit": limit })
}

fn email_selector(email: &str) -> serde_json::Value {
    serde_json::json!({ ".tag": "email", "email": email })
}

/// Build add_folder_member request body for a single email invitee.
pub fn build_add_folder_member(
    shared_folder_id: &str,
    email: &str,
    access_level: AccessLevel,
) -> serde_json::Value {
    serde_json::json!({
        "shared_folder_id": shared_folder_id,
        "members": [{
            "member": email_selector(email),
            "access_level": access_level.as_str(),
        }],
        "quiet": false,
    })
}

/// Build remove_folder_member request body.
pub fn build_remove_folder_member(
    shared_folder_id: &str,
    email: &str,
    leave_a_copy: bool,
) -> serde_json::Value {
    serde_json::json!({
        "shared_folder_id": shared_folder_id,
        "member": email_selector(email),
        "leave_a_copy": leave_a_copy,
    })
}
