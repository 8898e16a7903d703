//! Result envelopes
//!
//! Every pipeline call ends in a `ResultEnvelope`: success with a
//! provider-specific JSON payload, or failure with a typed `ErrorKind`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Mode, ProviderId};
use crate::error::{ErrorKind, MediaError};

/// Failure details carried by an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Provider-side context for a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderMeta {
    pub provider: ProviderId,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Status queries spent by the poller
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl ProviderMeta {
    pub fn new(provider: ProviderId, mode: Mode) -> Self {
        Self {
            provider,
            mode,
            job_id: None,
            http_status: None,
            request_id: None,
            attempts: None,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}

/// Terminal, provider-agnostic outcome of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<EnvelopeError>,
    pub timing_ms: u64,
    pub provider_meta: ProviderMeta,
}

impl ResultEnvelope {
    pub fn success(data: Value, timing_ms: u64, provider_meta: ProviderMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timing_ms,
            provider_meta,
        }
    }

    pub fn failure(
        kind: ErrorKind,
        message: impl Into<String>,
        timing_ms: u64,
        provider_meta: ProviderMeta,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(EnvelopeError {
                kind,
                message: message.into(),
            }),
            timing_ms,
            provider_meta,
        }
    }

    pub fn from_error(error: &MediaError, timing_ms: u64, provider_meta: ProviderMeta) -> Self {
        Self::failure(error.kind(), error.to_string(), timing_ms, provider_meta)
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Look up a field of the success payload.
    pub fn data_field(&self, name: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(name))
    }

    /// Convert into a `Result`, turning failures back into `MediaError`.
    pub fn into_result(self) -> Result<Value, MediaError> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Ok(Value::Null),
            (false, _, Some(err)) => Err(MediaError::from_kind(err.kind, err.message)),
            (false, _, None) => Err(MediaError::ProviderUnavailable(
                "failure envelope without error details".to_string(),
            )),
        }
    }
}
