//! Provider adapters
//!
//! Each adapter is the only code that knows its provider's wire shapes: how
//! a [`JobRequest`] becomes an HTTP call, how the response becomes envelope
//! data, and what the deterministic mock fixture looks like.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::HttpContext;
use crate::error::MediaError;
use crate::types::{InputRef, JobRequest, ProviderId, StatusReport};

#[cfg(feature = "assemblyai")]
pub mod assembly_ai;
#[cfg(feature = "elevenlabs")]
pub mod eleven_labs;
#[cfg(feature = "remove-bg")]
pub mod remove_bg;
#[cfg(feature = "shotstack")]
pub mod shotstack;
#[cfg(feature = "stripe")]
pub mod stripe;

/// Outcome of a live submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// The provider answered with the final result.
    Immediate {
        data: Value,
        http_status: u16,
        request_id: Option<String>,
    },
    /// The provider accepted a job to be polled.
    Job {
        id: String,
        http_status: u16,
        request_id: Option<String>,
    },
}

/// Mock-mode answer to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Fixture {
    Immediate(Value),
    /// A job whose final payload comes from [`ProviderAdapter::mock_job_result`].
    Job,
}

#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> ProviderId;

    /// Whether submissions return a job id instead of a result.
    fn is_job_based(&self) -> bool {
        false
    }

    async fn submit(&self, http: &HttpContext, request: &JobRequest)
    -> Result<Submission, MediaError>;

    /// Deterministic mock answer shaped like the live success response.
    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError>;

    async fn query_status(
        &self,
        _http: &HttpContext,
        _job_id: &str,
    ) -> Result<StatusReport, MediaError> {
        Err(MediaError::UnsupportedOperation(format!(
            "{} has no job status endpoint",
            self.provider()
        )))
    }

    /// Final payload a mock job reports once done.
    fn mock_job_result(&self, job_id: &str, _request: &JobRequest) -> Value {
        serde_json::json!({ "id": job_id })
    }

    /// Best-effort remote cancellation.
    async fn cancel_remote(&self, _http: &HttpContext, _job_id: &str) -> Result<(), MediaError> {
        Ok(())
    }

    async fn account_info(&self, _http: &HttpContext) -> Result<Value, MediaError> {
        Err(MediaError::UnsupportedOperation(format!(
            "{} has no account endpoint",
            self.provider()
        )))
    }

    fn mock_account_info(&self) -> Result<Value, MediaError> {
        Err(MediaError::UnsupportedOperation(format!(
            "{} has no account endpoint",
            self.provider()
        )))
    }

    /// Voices available for synthesis, as a JSON array.
    async fn voices(&self, _http: &HttpContext) -> Result<Value, MediaError> {
        Err(no_voice_catalog(self.provider()))
    }

    async fn voice(&self, _http: &HttpContext, _voice_id: &str) -> Result<Value, MediaError> {
        Err(no_voice_catalog(self.provider()))
    }

    fn mock_voices(&self) -> Result<Value, MediaError> {
        Err(no_voice_catalog(self.provider()))
    }
}

fn no_voice_catalog(provider: ProviderId) -> MediaError {
    MediaError::UnsupportedOperation(format!("{provider} has no voice catalog"))
}

/// Build the adapter for a provider.
pub fn adapter_for(provider: ProviderId) -> Result<Arc<dyn ProviderAdapter>, MediaError> {
    match provider {
        #[cfg(feature = "remove-bg")]
        ProviderId::RemoveBg => Ok(Arc::new(remove_bg::RemoveBgAdapter::new())),
        #[cfg(feature = "elevenlabs")]
        ProviderId::ElevenLabs => Ok(Arc::new(eleven_labs::ElevenLabsAdapter::new())),
        #[cfg(feature = "assemblyai")]
        ProviderId::AssemblyAi => Ok(Arc::new(assembly_ai::AssemblyAiAdapter::new())),
        #[cfg(feature = "shotstack")]
        ProviderId::Shotstack => Ok(Arc::new(shotstack::ShotstackAdapter::new())),
        #[cfg(feature = "stripe")]
        ProviderId::Stripe => Ok(Arc::new(stripe::StripeAdapter::new())),
        #[allow(unreachable_patterns)]
        other => Err(MediaError::ConfigurationError(format!(
            "provider {other} is not enabled in this build"
        ))),
    }
}

/// Read a string field from a JSON object.
pub(crate) fn str_field<'a>(value: &'a Value, name: &str) -> Option<&'a str> {
    value.get(name).and_then(Value::as_str)
}

/// Reject inputs the adapter cannot express on the wire.
pub(crate) fn wrong_input(provider: ProviderId, input: &InputRef, expected: &str) -> MediaError {
    MediaError::InvalidRequest(format!(
        "{provider} expects {expected} input, got {}",
        input.identifier()
    ))
}
