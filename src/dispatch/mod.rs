//! Request dispatcher
//!
//! Issues one call per request: a real HTTP call through the provider
//! adapter in live mode, or the adapter's deterministic fixture after the
//! configured delay in mock mode. Every outcome is normalized into either a
//! terminal [`ResultEnvelope`] or a pending [`JobHandle`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::defaults;
use crate::error::MediaError;
use crate::jobs::MockJobBackend;
use crate::poller::{JobStatusSource, elapsed_ms};
use crate::providers::{Fixture, ProviderAdapter, Submission};
use crate::types::{JobHandle, JobRequest, Mode, ProviderMeta, ResultEnvelope, StatusReport};

pub mod http;

pub use http::{HttpContext, HttpResponse, classify_http_error};

/// What a dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// Final result (success or typed failure).
    Completed(ResultEnvelope),
    /// Accepted job awaiting polling.
    Pending(JobHandle),
}

impl Dispatched {
    pub fn into_envelope(self) -> Option<ResultEnvelope> {
        match self {
            Self::Completed(envelope) => Some(envelope),
            Self::Pending(_) => None,
        }
    }

    pub fn job(&self) -> Option<&JobHandle> {
        match self {
            Self::Pending(handle) => Some(handle),
            Self::Completed(_) => None,
        }
    }
}

/// Build the shared HTTP client with crate defaults.
pub fn build_http_client() -> Result<reqwest::Client, MediaError> {
    reqwest::Client::builder()
        .connect_timeout(defaults::http::CONNECT_TIMEOUT)
        .pool_max_idle_per_host(defaults::http::MAX_IDLE_PER_HOST)
        .user_agent(defaults::http::USER_AGENT)
        .build()
        .map_err(|e| MediaError::ConfigurationError(format!("failed to build HTTP client: {e}")))
}

/// Dispatches requests for one provider.
pub struct Dispatcher {
    adapter: Arc<dyn ProviderAdapter>,
    http: HttpContext,
    mock_jobs: Arc<MockJobBackend>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider", &self.adapter.provider())
            .field("http", &self.http)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        adapter: Arc<dyn ProviderAdapter>,
        http: HttpContext,
        mock_jobs: Arc<MockJobBackend>,
    ) -> Self {
        Self {
            adapter,
            http,
            mock_jobs,
        }
    }

    pub fn adapter(&self) -> &Arc<dyn ProviderAdapter> {
        &self.adapter
    }

    pub fn http(&self) -> &HttpContext {
        &self.http
    }

    pub fn mode(&self) -> Mode {
        self.http.config().mode
    }

    fn meta(&self) -> ProviderMeta {
        ProviderMeta::new(self.http.provider(), self.mode())
    }

    /// Issue the call for `request`. Never fails: errors become envelopes.
    pub async fn dispatch(&self, request: &JobRequest) -> Dispatched {
        let started = Instant::now();
        let provider = self.http.provider();
        tracing::debug!(target: "moodreel::dispatch", %provider, mode = ?self.mode(), input = %request.input.identifier(), "dispatching");

        let outcome = match self.mode() {
            Mode::Mock => self.dispatch_mock(request).await,
            Mode::Live => self.adapter.submit(&self.http, request).await,
        };

        match outcome {
            Ok(Submission::Immediate {
                data,
                http_status,
                request_id,
            }) => {
                let timing_ms = elapsed_ms(started);
                tracing::info!(target: "moodreel::dispatch", %provider, timing_ms, http_status, "completed");
                Dispatched::Completed(ResultEnvelope::success(
                    data,
                    timing_ms,
                    self.meta()
                        .with_http_status(http_status)
                        .with_request_id(request_id),
                ))
            }
            Ok(Submission::Job { id, .. }) => {
                tracing::info!(target: "moodreel::dispatch", %provider, job_id = %id, "job accepted");
                Dispatched::Pending(JobHandle::queued(id, provider))
            }
            Err(e) => {
                let timing_ms = elapsed_ms(started);
                tracing::warn!(target: "moodreel::dispatch", %provider, timing_ms, kind = %e.kind(), err = %e, "dispatch failed");
                Dispatched::Completed(ResultEnvelope::from_error(&e, timing_ms, self.meta()))
            }
        }
    }

    async fn dispatch_mock(&self, request: &JobRequest) -> Result<Submission, MediaError> {
        tokio::time::sleep(self.http.config().mock_delay()).await;
        match self.adapter.fixture(request)? {
            Fixture::Immediate(data) => Ok(Submission::Immediate {
                data,
                http_status: 200,
                request_id: None,
            }),
            Fixture::Job => {
                let id = MockJobBackend::next_id(self.http.provider());
                self.mock_jobs
                    .insert(id.clone(), self.adapter.mock_job_result(&id, request));
                Ok(Submission::Job {
                    id,
                    http_status: 200,
                    request_id: None,
                })
            }
        }
    }
}

/// Live job status through a provider adapter.
pub struct AdapterStatusSource {
    adapter: Arc<dyn ProviderAdapter>,
    http: HttpContext,
}

impl AdapterStatusSource {
    pub fn new(adapter: Arc<dyn ProviderAdapter>, http: HttpContext) -> Self {
        Self { adapter, http }
    }
}

#[async_trait]
impl JobStatusSource for AdapterStatusSource {
    async fn query(&self, handle: &JobHandle) -> Result<StatusReport, MediaError> {
        self.adapter.query_status(&self.http, &handle.id).await
    }
}

#[cfg(all(test, feature = "all-providers"))]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::error::ErrorKind;
    use crate::providers::adapter_for;
    use crate::types::{InputRef, ProviderId};
    use std::time::Duration;

    fn dispatcher(config: ProviderConfig) -> Dispatcher {
        let adapter = adapter_for(config.provider).unwrap();
        let http = HttpContext::new(reqwest::Client::new(), Arc::new(config), Vec::new());
        Dispatcher::new(adapter, http, Arc::new(MockJobBackend::new(3)))
    }

    #[tokio::test(start_paused = true)]
    async fn mock_dispatch_waits_for_delay() {
        let config = ProviderConfig::stripe("")
            .with_mode(Mode::Mock)
            .with_mock_delay(Duration::from_millis(250));
        let started = Instant::now();
        let outcome = dispatcher(config)
            .dispatch(&JobRequest::new(InputRef::text("price_1")))
            .await;
        assert!(started.elapsed() >= Duration::from_millis(250));
        let envelope = outcome.into_envelope().unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.provider_meta.mode, Mode::Mock);
        assert_eq!(envelope.provider_meta.http_status, Some(200));
    }

    #[tokio::test(start_paused = true)]
    async fn mock_job_dispatch_registers_backend_job() {
        let config = ProviderConfig::shotstack("").with_mode(Mode::Mock);
        let dispatcher = dispatcher(config);
        let request = JobRequest::new(InputRef::document(
            "application/json",
            serde_json::json!({"tracks": []}),
        ));
        let outcome = dispatcher.dispatch(&request).await;
        let handle = outcome.job().unwrap();
        assert_eq!(handle.provider, ProviderId::Shotstack);
        assert_eq!(dispatcher.mock_jobs.queries(&handle.id), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn fixture_errors_become_envelopes() {
        let config = ProviderConfig::stripe("").with_mode(Mode::Mock);
        let outcome = dispatcher(config)
            .dispatch(&JobRequest::new(InputRef::url("https://x/y")))
            .await;
        let envelope = outcome.into_envelope().unwrap();
        assert_eq!(envelope.error_kind(), Some(ErrorKind::InvalidRequest));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failures_are_logged_with_their_kind() {
        let config = ProviderConfig::stripe("").with_mode(Mode::Mock).with_mock_delay(Duration::ZERO);
        dispatcher(config)
            .dispatch(&JobRequest::new(InputRef::url("https://x/y")))
            .await;
        assert!(logs_contain("dispatching"));
        assert!(logs_contain("dispatch failed"));
        assert!(logs_contain("kind=InvalidRequest"));
    }
}
