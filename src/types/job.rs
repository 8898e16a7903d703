//! Asynchronous job handles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ProviderId;

/// Lifecycle of a provider-side job.
///
/// `queued → processing → {done, failed}`, with `cancelled` reachable from
/// any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Done,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub const fn can_transition_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (Self::Queued, Self::Queued | Self::Processing) => true,
            (Self::Processing, Self::Processing) => true,
            (Self::Queued | Self::Processing, Self::Done | Self::Failed | Self::Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Queued => "queued",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Reference to a job accepted by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
    pub provider: ProviderId,
    pub submitted_at: DateTime<Utc>,
    pub status: JobStatus,
}

impl JobHandle {
    /// A freshly accepted job.
    pub fn queued(id: impl Into<String>, provider: ProviderId) -> Self {
        Self {
            id: id.into(),
            provider,
            submitted_at: Utc::now(),
            status: JobStatus::Queued,
        }
    }

    /// Apply a status change, ignoring transitions out of a terminal state.
    ///
    /// Returns whether the status changed.
    pub fn transition(&mut self, next: JobStatus) -> bool {
        if self.status != next && self.status.can_transition_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }
}

/// One answer to a job status query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub status: JobStatus,
    /// Final payload once the job is done
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Provider message when the job failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatusReport {
    pub const fn pending(status: JobStatus) -> Self {
        Self {
            status,
            payload: None,
            error: None,
        }
    }

    pub fn done(payload: Value) -> Self {
        Self {
            status: JobStatus::Done,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            payload: None,
            error: Some(message.into()),
        }
    }
}
