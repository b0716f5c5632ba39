//! Remote path conventions under the application folder.
//!
//! Every path the processors write to or query goes through
//! [`AppPaths::normalize`] exactly once; normalising an already-prefixed
//! path is a no-op.

use crate::types::DEFAULT_APP_FOLDER;

/// File name of a shopping-list document in the nested layout.
pub const LIST_DOCUMENT_NAME: &str = "shopping-list.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: String,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new(DEFAULT_APP_FOLDER)
    }
}

impl AppPaths {
    /// `root` gains a leading `/` and loses any trailing `/`.
    pub fn new(root: &str) -> Self {
        let trimmed = root.trim().trim_end_matches('/');
        let root = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self { root }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Whether `path` already lives under the application folder.
    pub fn is_under_root(&self, path: &str) -> bool {
        match path.strip_prefix(self.root.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Absolute path under the application folder.
    ///
    /// `"groceries"`, `"/groceries"` and `"/NutriInfo/groceries"` all map
    /// to `"/NutriInfo/groceries"`.
    pub fn normalize(&self, path: &str) -> String {
        let path = path.trim();
        if self.is_under_root(path) {
            return path.trim_end_matches('/').to_string();
        }
        let relative = path.trim_start_matches('/').trim_end_matches('/');
        if relative.is_empty() {
            return self.root.clone();
        }
        format!("{}/{}", self.root, relative)
    }

    /// Current document location: `<root>/lists/<key>/shopping-list.json`.
    pub fn list_document(&self, resource_key: &str) -> String {
        format!("{}/lists/{}/{}", self.root, resource_key, LIST_DOCUMENT_NAME)
    }

    /// Location used before the nested-folder layout:
    /// `<root>/shopping-list-<key>.json`.
    pub fn legacy_list_document(&self, resource_key: &str) -> String {
        format!("{}/shopping-list-{}.json", self.root, resource_key)
    }
}

/// Case-insensitive exact or suffix match of a provider-reported path
/// against the target path.
pub fn path_matches(target: &str, candidate: &str) -> bool {
    let candidate = candidate.trim().trim_end_matches('/').to_lowercase();
    if candidate.is_empty() {
        return false;
    }
    let candidate = if candidate.starts_with('/') {
        candidate
    } else {
        format!("/{candidate}")
    };
    let target = target.trim().trim_end_matches('/').to_lowercase();
    target == candidate || target.ends_with(&candidate)
}
