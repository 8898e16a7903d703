//! Media service
//!
//! One explicit service object per provider. It owns the pipeline
//! validate → rate limit → dispatch → poll and is injected into callers;
//! tests build fresh instances.
//!
//! ```rust,ignore
//! let service = MediaService::builder(ProviderConfig::remove_bg(key))
//!     .with_rate_limiter(limiter.clone())
//!     .build()?;
//! let envelope = service.execute(&JobRequest::new(input)).await;
//! ```

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;

use crate::batch;
use crate::config::ProviderConfig;
use crate::dispatch::{AdapterStatusSource, Dispatched, Dispatcher, HttpContext, build_http_client};
use crate::error::{MediaError, ValidationError};
use crate::jobs::{JobRegistry, MockJobBackend};
use crate::poller::{JobPoller, JobStatusSource, PollPolicy, elapsed_ms};
use crate::providers::{ProviderAdapter, adapter_for};
use crate::rate_limit::RateLimiter;
use crate::types::{
    BatchResult, JobHandle, JobRequest, JobStatus, Mode, ProviderId, ProviderMeta, ResultEnvelope,
};
use crate::utils::{HttpInterceptor, LoggingInterceptor};
use crate::validation;

/// Builder for [`MediaService`].
pub struct MediaServiceBuilder {
    config: ProviderConfig,
    adapter: Option<Arc<dyn ProviderAdapter>>,
    client: Option<reqwest::Client>,
    limiter: Option<Arc<RateLimiter>>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
    http_debug: bool,
    poll_policy: Option<PollPolicy>,
}

impl MediaServiceBuilder {
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            adapter: None,
            client: None,
            limiter: None,
            interceptors: Vec::new(),
            http_debug: true,
            poll_policy: None,
        }
    }

    /// Use a custom adapter instead of the built-in one for the provider.
    pub fn with_adapter(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Share a rate limiter with other services.
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn HttpInterceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Toggle the built-in logging interceptor (on by default).
    pub fn http_debug(mut self, enabled: bool) -> Self {
        self.http_debug = enabled;
        self
    }

    /// Poll budget used by [`MediaService::execute`].
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = Some(policy);
        self
    }

    pub fn build(self) -> Result<MediaService, MediaError> {
        self.config.validate()?;

        let adapter = match self.adapter {
            Some(adapter) => adapter,
            None => adapter_for(self.config.provider)?,
        };
        if adapter.provider() != self.config.provider {
            return Err(MediaError::ConfigurationError(format!(
                "adapter for {} cannot serve {}",
                adapter.provider(),
                self.config.provider
            )));
        }

        let client = match self.client {
            Some(client) => client,
            None => build_http_client()?,
        };
        let mut interceptors = self.interceptors;
        if self.http_debug {
            interceptors.push(Arc::new(LoggingInterceptor));
        }

        let limiter = self.limiter.unwrap_or_else(RateLimiter::shared);
        limiter.set_limit(self.config.provider, self.config.rate_limit.clone());

        let poll_policy = self
            .poll_policy
            .unwrap_or_else(|| PollPolicy::for_provider(self.config.provider));
        let mode = self.config.mode;
        let mock_delay_ms = self.config.mock_delay_ms;
        let config = Arc::new(self.config);
        let http = HttpContext::new(client, config.clone(), interceptors);
        let mock_jobs = Arc::new(MockJobBackend::new(config.mock_completes_after));
        let registry = Arc::new(JobRegistry::new());

        let source: Arc<dyn JobStatusSource> = match mode {
            Mode::Mock => mock_jobs.clone(),
            Mode::Live => Arc::new(AdapterStatusSource::new(adapter.clone(), http.clone())),
        };
        let poller = JobPoller::new(source, mode).with_registry(registry.clone());

        tracing::debug!(target: "moodreel::config", provider = %config.provider, ?mode, base_url = %config.base_url, mock_delay_ms, "media service ready");

        Ok(MediaService {
            dispatcher: Dispatcher::new(adapter, http, mock_jobs.clone()),
            mock_jobs,
            config,
            poller,
            limiter,
            registry,
            poll_policy,
        })
    }
}

/// Pipeline for one provider.
pub struct MediaService {
    config: Arc<ProviderConfig>,
    dispatcher: Dispatcher,
    mock_jobs: Arc<MockJobBackend>,
    poller: JobPoller<Arc<dyn JobStatusSource>>,
    limiter: Arc<RateLimiter>,
    registry: Arc<JobRegistry>,
    poll_policy: PollPolicy,
}

static_assertions::assert_impl_all!(MediaService: Send, Sync);

impl std::fmt::Debug for MediaService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaService")
            .field("provider", &self.config.provider)
            .field("mode", &self.config.mode)
            .field("poll_policy", &self.poll_policy)
            .finish()
    }
}

impl MediaService {
    pub fn builder(config: ProviderConfig) -> MediaServiceBuilder {
        MediaServiceBuilder::new(config)
    }

    /// Service with the built-in adapter and a private rate limiter.
    pub fn new(config: ProviderConfig) -> Result<Self, MediaError> {
        Self::builder(config).build()
    }

    pub fn provider(&self) -> ProviderId {
        self.config.provider
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    fn meta(&self) -> ProviderMeta {
        ProviderMeta::new(self.config.provider, self.config.mode)
    }

    /// Check the request against the provider's limits. No side effects.
    pub fn validate(&self, request: &JobRequest) -> Result<(), ValidationError> {
        validation::validate_request(request, &self.config)
    }

    /// Wait for the rate limiter, then issue the call. Accepted jobs are
    /// registered so they can be looked up and cancelled.
    pub async fn dispatch(&self, request: &JobRequest) -> Dispatched {
        self.limiter.acquire(self.config.provider).await;
        let outcome = self.dispatcher.dispatch(request).await;
        if let Dispatched::Pending(handle) = &outcome {
            self.registry.register(handle.clone());
        }
        outcome
    }

    /// Poll a job until it reaches a terminal state or `policy` runs out.
    pub async fn poll(&self, handle: &JobHandle, policy: PollPolicy) -> ResultEnvelope {
        self.poller.poll(handle, policy).await
    }

    /// Stop tracking a job, e.g. after driving `dispatch` and `poll` by hand.
    pub fn forget(&self, job_id: &str) -> Option<JobHandle> {
        self.mock_jobs.discard(job_id);
        self.registry.forget(job_id)
    }

    /// Full pipeline for one request.
    ///
    /// Invalid input fails fast without touching the rate limiter or the
    /// network. Jobs are polled with the service's poll policy; a job that
    /// finished is dropped from the registry once its envelope is returned,
    /// while one that timed out stays registered for another poll.
    pub async fn execute(&self, request: &JobRequest) -> ResultEnvelope {
        let started = Instant::now();
        if let Err(e) = self.validate(request) {
            tracing::debug!(target: "moodreel::dispatch", provider = %self.config.provider, input = %request.input.identifier(), kind = %e.kind(), "rejected by validation");
            return ResultEnvelope::from_error(
                &MediaError::from(e),
                elapsed_ms(started),
                self.meta(),
            );
        }

        match self.dispatch(request).await {
            Dispatched::Completed(envelope) => envelope,
            Dispatched::Pending(handle) => {
                let mut envelope = self.poll(&handle, self.poll_policy).await;
                envelope.timing_ms = elapsed_ms(started);
                if self.registry.forget_if_terminal(&handle.id).is_some() {
                    self.mock_jobs.discard(&handle.id);
                }
                envelope
            }
        }
    }

    /// Execute requests one after another, in order.
    pub async fn run_batch(&self, requests: Vec<JobRequest>) -> BatchResult {
        batch::run_batch(
            requests,
            |r| r.input.identifier(),
            |r| async move { self.execute(&r).await },
        )
        .await
    }

    /// Execute up to `limit` requests concurrently; results keep input order.
    /// Provider spacing is still enforced by the rate limiter.
    pub async fn run_batch_buffered(&self, requests: Vec<JobRequest>, limit: usize) -> BatchResult {
        batch::run_batch_buffered(
            requests,
            limit,
            |r| r.input.identifier(),
            |r| async move { self.execute(&r).await },
        )
        .await
    }

    /// Cancel a registered job.
    ///
    /// The registry transition happens first and stops any poller waiting on
    /// the job; in live mode the provider is then asked to cancel as well,
    /// best-effort.
    pub async fn cancel(&self, job_id: &str) -> Result<JobHandle, MediaError> {
        let before = self
            .registry
            .get(job_id)
            .ok_or_else(|| MediaError::JobNotFound(job_id.to_string()))?;
        let handle = self.registry.cancel(job_id)?;

        if !before.status.is_terminal() && handle.status == JobStatus::Cancelled {
            tracing::info!(target: "moodreel::dispatch", provider = %self.config.provider, %job_id, "job cancelled");
            self.mock_jobs.discard(job_id);
            if self.config.mode == Mode::Live
                && let Err(e) = self
                    .dispatcher
                    .adapter()
                    .cancel_remote(self.dispatcher.http(), job_id)
                    .await
            {
                tracing::warn!(target: "moodreel::dispatch", provider = %self.config.provider, %job_id, err = %e, "remote cancel failed");
            }
        }
        Ok(handle)
    }

    /// Current handle for a job issued by this service.
    pub fn job(&self, job_id: &str) -> Option<JobHandle> {
        self.registry.get(job_id)
    }

    /// Account or quota details from the provider.
    pub async fn account_info(&self) -> Result<Value, MediaError> {
        let adapter = self.dispatcher.adapter();
        match self.config.mode {
            Mode::Mock => {
                tokio::time::sleep(self.config.mock_delay()).await;
                adapter.mock_account_info()
            }
            Mode::Live => adapter.account_info(self.dispatcher.http()).await,
        }
    }

    /// Voice catalog of a speech provider.
    pub async fn voices(&self) -> Result<Value, MediaError> {
        let adapter = self.dispatcher.adapter();
        match self.config.mode {
            Mode::Mock => {
                tokio::time::sleep(self.config.mock_delay()).await;
                adapter.mock_voices()
            }
            Mode::Live => adapter.voices(self.dispatcher.http()).await,
        }
    }

    /// One voice from the catalog.
    pub async fn voice(&self, voice_id: &str) -> Result<Value, MediaError> {
        let adapter = self.dispatcher.adapter();
        match self.config.mode {
            Mode::Mock => {
                tokio::time::sleep(self.config.mock_delay()).await;
                let voices = adapter.mock_voices()?;
                voices
                    .as_array()
                    .and_then(|all| all.iter().find(|v| v["voice_id"] == voice_id))
                    .cloned()
                    .ok_or_else(|| MediaError::InvalidRequest(format!("unknown voice {voice_id}")))
            }
            Mode::Live => adapter.voice(self.dispatcher.http(), voice_id).await,
        }
    }
}
