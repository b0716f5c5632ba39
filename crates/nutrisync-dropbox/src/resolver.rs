//! Shared-folder identity resolution.
//!
//! The `shared_folder_id` of a path is looked up fresh on every call:
//!
//! 1. `files/get_metadata`: the folder may already carry the id.
//! 2. `sharing/share_folder`: sharing it returns the id, or an async job
//!    that is polled within a [`PollPolicy`] budget. A 409 means the folder
//!    is already shared and moves on to step 3.
//! 3. `sharing/list_folders`: one bounded page, matched by path.
//!
//! Nothing here returns an error: failures are reported to the sink and
//! the identity is left unresolved.

use crate::api::DropboxApi;
use crate::diagnostics::{DiagnosticSink, IdentitySource, LookupStep, SyncEvent};
use crate::error::DropboxError;
use crate::paths::path_matches;
use crate::polling::{PollPolicy, Sleeper};
use crate::types::{ShareFolderLaunch, ShareJobStatus};
use std::sync::Arc;

/// A resolved shared-folder identity and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFolder {
    pub shared_folder_id: String,
    pub source: IdentitySource,
}

/// Outcome of a single lookup step.
enum Step {
    Found(ResolvedFolder),
    /// Nothing found; the next step may still succeed.
    Continue,
    /// Stop the protocol without an identity.
    Abort,
}

fn found(id: &str, source: IdentitySource) -> Step {
    Step::Found(ResolvedFolder {
        shared_folder_id: id.to_string(),
        source,
    })
}

#[derive(Clone)]
pub struct FolderIdentityResolver {
    api: DropboxApi,
    poll: PollPolicy,
    sleeper: Arc<dyn Sleeper>,
    list_limit: u32,
    sink: Arc<dyn DiagnosticSink>,
}

impl FolderIdentityResolver {
    pub fn new(
        api: DropboxApi,
        poll: PollPolicy,
        sleeper: Arc<dyn Sleeper>,
        list_limit: u32,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            api,
            poll,
            sleeper,
            list_limit,
            sink,
        }
    }

    /// Resolve the shared-folder id of an already normalised `path`.
    pub async fn resolve(&self, token: &str, path: &str) -> Option<ResolvedFolder> {
        let resolved = match self.from_metadata(token, path).await {
            Step::Found(r) => Some(r),
            Step::Abort => None,
            Step::Continue => match self.from_share_request(token, path).await {
                Step::Found(r) => Some(r),
                Step::Abort => None,
                Step::Continue => match self.from_listing(token, path).await {
                    Step::Found(r) => Some(r),
                    Step::Continue | Step::Abort => None,
                },
            },
        };

        match &resolved {
            Some(r) => self.sink.emit(SyncEvent::IdentityResolved {
                path: path.to_string(),
                shared_folder_id: r.shared_folder_id.clone(),
                source: r.source,
            }),
            None => self.sink.emit(SyncEvent::IdentityUnresolved {
                path: path.to_string(),
            }),
        }
        resolved
    }

    fn lookup_error(&self, step: LookupStep, err: &DropboxError) {
        self.sink.emit(SyncEvent::LookupError {
            step,
            status: err.status_code,
            detail: err.message.clone(),
        });
    }

    /// An HTTP error only skips the step; a transport failure ends the lookup.
    fn after_error(&self, step: LookupStep, err: &DropboxError) -> Step {
        self.lookup_error(step, err);
        if err.is_transport() {
            Step::Abort
        } else {
            Step::Continue
        }
    }

    async fn from_metadata(&self, token: &str, path: &str) -> Step {
        match self.api.get_metadata(token, path).await {
            Ok(meta) => match meta.shared_folder_id() {
                Some(id) => found(id, IdentitySource::Metadata),
                None => Step::Continue,
            },
            Err(e) => self.after_error(LookupStep::Metadata, &e),
        }
    }

    async fn from_share_request(&self, token: &str, path: &str) -> Step {
        match self.api.share_folder(token, path).await {
            Ok(ShareFolderLaunch::Complete(meta)) => match meta.shared_folder_id() {
                Some(id) => found(id, IdentitySource::ShareFolder),
                None => Step::Continue,
            },
            Ok(ShareFolderLaunch::AsyncJobId { async_job_id }) => {
                self.poll_share_job(token, &async_job_id).await
            }
            Err(e) if e.is_conflict() => {
                self.sink.emit(SyncEvent::ShareConflict {
                    path: path.to_string(),
                });
                Step::Continue
            }
            Err(e) => {
                self.lookup_error(LookupStep::ShareFolder, &e);
                Step::Abort
            }
        }
    }

    /// Poll the share job. Only a `complete` status yields an identity;
    /// `failed`, errors and an exhausted budget all end the lookup.
    async fn poll_share_job(&self, token: &str, job_id: &str) -> Step {
        for attempt in 0..self.poll.max_attempts {
            self.sleeper.sleep(self.poll.delay_for(attempt)).await;

            match self.api.check_share_job_status(token, job_id).await {
                Ok(ShareJobStatus::Complete(meta)) => {
                    return match meta.shared_folder_id() {
                        Some(id) => found(id, IdentitySource::ShareJob),
                        None => Step::Abort,
                    };
                }
                Ok(ShareJobStatus::Failed { .. }) => {
                    self.sink.emit(SyncEvent::ShareJobFailed {
                        job_id: job_id.to_string(),
                    });
                    return Step::Abort;
                }
                Ok(ShareJobStatus::InProgress) | Ok(ShareJobStatus::Other) => {}
                Err(e) => {
                    self.lookup_error(LookupStep::JobStatus, &e);
                    return Step::Abort;
                }
            }
        }

        self.sink.emit(SyncEvent::ShareJobTimedOut {
            job_id: job_id.to_string(),
            attempts: self.poll.max_attempts,
        });
        Step::Abort
    }

    async fn from_listing(&self, token: &str, path: &str) -> Step {
        let entries = match self.api.list_shared_folders(token, self.list_limit).await {
            Ok(entries) => entries,
            Err(e) => {
                self.lookup_error(LookupStep::Listing, &e);
                return Step::Abort;
            }
        };

        entries
            .iter()
            .filter(|entry| {
                entry
                    .path_lower
                    .as_deref()
                    .is_some_and(|candidate| path_matches(path, candidate))
            })
            .find_map(|entry| entry.shared_folder_id())
            .map(|id| found(id, IdentitySource::SharedFolderListing))
            .unwrap_or(Step::Continue)
    }
}
