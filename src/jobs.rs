//! Job bookkeeping
//!
//! [`JobRegistry`] tracks the handles a service has issued together with a
//! cancellation token per job. [`MockJobBackend`] stands in for a provider's
//! job API in mock mode.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::MediaError;
use crate::types::{JobHandle, JobStatus, ProviderId, StatusReport};
use crate::utils::CancelHandle;

#[derive(Debug)]
struct JobEntry {
    handle: JobHandle,
    cancel: CancelHandle,
}

/// Handles issued by a service, keyed by job id.
///
/// The lock is never held across an `.await`.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<String, JobEntry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, JobEntry>> {
        self.jobs.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Track a handle; re-registering an id replaces the previous entry.
    pub fn register(&self, handle: JobHandle) -> CancelHandle {
        let cancel = CancelHandle::new();
        self.lock().insert(
            handle.id.clone(),
            JobEntry {
                handle,
                cancel: cancel.clone(),
            },
        );
        cancel
    }

    pub fn get(&self, job_id: &str) -> Option<JobHandle> {
        self.lock().get(job_id).map(|e| e.handle.clone())
    }

    pub fn cancel_handle(&self, job_id: &str) -> Option<CancelHandle> {
        self.lock().get(job_id).map(|e| e.cancel.clone())
    }

    /// Record a status change. Transitions out of terminal states are ignored.
    pub fn update_status(&self, job_id: &str, status: JobStatus) -> Result<JobHandle, MediaError> {
        let mut jobs = self.lock();
        let entry = jobs
            .get_mut(job_id)
            .ok_or_else(|| MediaError::JobNotFound(job_id.to_string()))?;
        entry.handle.transition(status);
        Ok(entry.handle.clone())
    }

    /// Mark a job cancelled and fire its token.
    ///
    /// Returns the handle after the transition; a job that already reached a
    /// terminal state keeps it.
    pub fn cancel(&self, job_id: &str) -> Result<JobHandle, MediaError> {
        let mut jobs = self.lock();
        let entry = jobs
            .get_mut(job_id)
            .ok_or_else(|| MediaError::JobNotFound(job_id.to_string()))?;
        if entry.handle.transition(JobStatus::Cancelled) {
            entry.cancel.cancel();
        }
        Ok(entry.handle.clone())
    }

    /// Drop a job once its outcome has been handed to the caller.
    pub fn forget(&self, job_id: &str) -> Option<JobHandle> {
        self.lock().remove(job_id).map(|e| e.handle)
    }

    /// Drop a job only if it reached a terminal state; jobs still running
    /// stay available for another poll.
    pub fn forget_if_terminal(&self, job_id: &str) -> Option<JobHandle> {
        let mut jobs = self.lock();
        if jobs.get(job_id)?.handle.status.is_terminal() {
            jobs.remove(job_id).map(|e| e.handle)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
struct MockJob {
    queries: u32,
    result: Value,
}

/// In-memory job API used in mock mode.
///
/// Every job reports `processing` until its `completes_after`-th status
/// query, which reports `done` with the stored result and removes the job.
#[derive(Debug)]
pub struct MockJobBackend {
    completes_after: u32,
    jobs: Mutex<HashMap<String, MockJob>>,
}

impl MockJobBackend {
    pub fn new(completes_after: u32) -> Self {
        Self {
            completes_after: completes_after.max(1),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MockJob>> {
        self.jobs.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// A fresh mock job id for `provider`.
    pub fn next_id(provider: ProviderId) -> String {
        format!("mock-{provider}-{}", uuid::Uuid::new_v4().simple())
    }

    /// Accept a job whose final payload is `result`.
    pub fn insert(&self, job_id: impl Into<String>, result: Value) {
        self.lock().insert(
            job_id.into(),
            MockJob { queries: 0, result },
        );
    }

    /// Answer one status query.
    pub fn query(&self, job_id: &str) -> Result<StatusReport, MediaError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| MediaError::JobNotFound(job_id.to_string()))?;
        job.queries = job.queries.saturating_add(1);
        if job.queries < self.completes_after {
            return Ok(StatusReport::pending(JobStatus::Processing));
        }
        let job = jobs
            .remove(job_id)
            .ok_or_else(|| MediaError::JobNotFound(job_id.to_string()))?;
        Ok(StatusReport::done(job.result))
    }

    /// Drop a job that will never be queried again (e.g. after cancellation).
    pub fn discard(&self, job_id: &str) -> bool {
        self.lock().remove(job_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Status queries answered so far for a job.
    pub fn queries(&self, job_id: &str) -> Option<u32> {
        self.lock().get(job_id).map(|j| j.queries)
    }
}
