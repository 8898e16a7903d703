//! Async job poller
//!
//! Drives a [`JobHandle`] to a terminal state by querying its status at a
//! fixed interval until the job is done, fails, is cancelled, or the attempt
//! budget runs out. Exhausting the budget is reported as `Timeout`; the job
//! id stays valid for another round of polling.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;

use crate::defaults;
use crate::error::MediaError;
use crate::jobs::{JobRegistry, MockJobBackend};
use crate::types::{JobHandle, JobStatus, Mode, ProviderId, ProviderMeta, ResultEnvelope, StatusReport};
use crate::utils::CancelHandle;

/// Where job status answers come from.
#[async_trait]
pub trait JobStatusSource: Send + Sync {
    async fn query(&self, handle: &JobHandle) -> Result<StatusReport, MediaError>;
}

#[async_trait]
impl<T: JobStatusSource + ?Sized> JobStatusSource for Arc<T> {
    async fn query(&self, handle: &JobHandle) -> Result<StatusReport, MediaError> {
        (**self).query(handle).await
    }
}

#[async_trait]
impl JobStatusSource for MockJobBackend {
    async fn query(&self, handle: &JobHandle) -> Result<StatusReport, MediaError> {
        MockJobBackend::query(self, &handle.id)
    }
}

/// Attempt budget and spacing for one polling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub const fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Budget used for a provider when the caller does not pick one.
    pub const fn for_provider(provider: ProviderId) -> Self {
        match provider {
            ProviderId::Shotstack => Self::new(
                defaults::shotstack::POLL_ATTEMPTS,
                defaults::shotstack::POLL_INTERVAL,
            ),
            ProviderId::AssemblyAi => Self::new(
                defaults::assembly_ai::POLL_ATTEMPTS,
                defaults::assembly_ai::POLL_INTERVAL,
            ),
            _ => Self::new(defaults::poll::ATTEMPTS, defaults::poll::INTERVAL),
        }
    }
}

/// Polls jobs from one status source.
pub struct JobPoller<S> {
    source: S,
    mode: Mode,
    registry: Option<Arc<JobRegistry>>,
}

impl<S: JobStatusSource> JobPoller<S> {
    pub fn new(source: S, mode: Mode) -> Self {
        Self {
            source,
            mode,
            registry: None,
        }
    }

    /// Record status transitions in `registry` and honour its cancellations.
    pub fn with_registry(mut self, registry: Arc<JobRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Poll until a terminal state, using the registry's cancel token if the
    /// job is registered.
    pub async fn poll(&self, handle: &JobHandle, policy: PollPolicy) -> ResultEnvelope {
        let cancel = self
            .registry
            .as_ref()
            .and_then(|r| r.cancel_handle(&handle.id))
            .unwrap_or_default();
        self.poll_with_cancel(handle, policy, &cancel).await
    }

    pub async fn poll_with_cancel(
        &self,
        handle: &JobHandle,
        policy: PollPolicy,
        cancel: &CancelHandle,
    ) -> ResultEnvelope {
        let started = Instant::now();
        let meta = ProviderMeta::new(handle.provider, self.mode).with_job_id(&handle.id);
        let mut last_transient: Option<MediaError> = None;
        let mut attempts = 0;

        tracing::debug!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, max_attempts = policy.max_attempts, interval_ms = policy.interval.as_millis() as u64, "polling job");

        for attempt in 1..=policy.max_attempts {
            if cancel.is_cancelled() {
                return self.cancelled(handle, started, meta.with_attempts(attempts));
            }
            attempts = attempt;

            match self.source.query(handle).await {
                Ok(report) => {
                    last_transient = None;
                    self.record(handle, report.status);
                    tracing::trace!(target: "moodreel::poll", job_id = %handle.id, attempt, status = %report.status, "status");
                    match report.status {
                        JobStatus::Done => {
                            tracing::debug!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, attempts, "job done");
                            return ResultEnvelope::success(
                                report.payload.unwrap_or(Value::Null),
                                elapsed_ms(started),
                                meta.with_attempts(attempts),
                            );
                        }
                        JobStatus::Failed => {
                            let message = report
                                .error
                                .unwrap_or_else(|| "provider reported failure".to_string());
                            tracing::warn!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, %message, "job failed");
                            return ResultEnvelope::from_error(
                                &MediaError::ProviderReportedFailure(message),
                                elapsed_ms(started),
                                meta.with_attempts(attempts),
                            );
                        }
                        JobStatus::Cancelled => {
                            return self.cancelled(handle, started, meta.with_attempts(attempts));
                        }
                        JobStatus::Queued | JobStatus::Processing => {}
                    }
                }
                Err(e) if e.is_transient() => {
                    tracing::warn!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, attempt, err = %e, "transient status query failure");
                    last_transient = Some(e);
                }
                Err(e) => {
                    tracing::warn!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, attempt, err = %e, "status query failed");
                    return ResultEnvelope::from_error(
                        &e,
                        elapsed_ms(started),
                        meta.with_attempts(attempts),
                    );
                }
            }

            if attempt < policy.max_attempts && !cancel.sleep(policy.interval).await {
                return self.cancelled(handle, started, meta.with_attempts(attempts));
            }
        }

        let error = match last_transient {
            Some(e) => MediaError::ProviderUnavailable(format!(
                "job {} status unavailable after {attempts} attempts: {e}",
                handle.id
            )),
            None => MediaError::Timeout(format!(
                "job {} not finished after {attempts} attempts",
                handle.id
            )),
        };
        tracing::warn!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, attempts, err = %error, "polling gave up");
        ResultEnvelope::from_error(&error, elapsed_ms(started), meta.with_attempts(attempts))
    }

    fn record(&self, handle: &JobHandle, status: JobStatus) {
        if let Some(registry) = &self.registry {
            // Unregistered handles are polled without bookkeeping
            let _ = registry.update_status(&handle.id, status);
        }
    }

    fn cancelled(&self, handle: &JobHandle, started: Instant, meta: ProviderMeta) -> ResultEnvelope {
        self.record(handle, JobStatus::Cancelled);
        tracing::debug!(target: "moodreel::poll", provider = %handle.provider, job_id = %handle.id, "polling cancelled");
        ResultEnvelope::from_error(
            &MediaError::Cancelled(format!("job {} cancelled", handle.id)),
            elapsed_ms(started),
            meta,
        )
    }
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a fixed script of answers, repeating the last one.
    struct Scripted {
        answers: Mutex<VecDeque<Result<StatusReport, MediaError>>>,
        calls: Mutex<u32>,
    }

    impl Scripted {
        fn new(answers: Vec<Result<StatusReport, MediaError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl JobStatusSource for Scripted {
        async fn query(&self, _handle: &JobHandle) -> Result<StatusReport, MediaError> {
            *self.calls.lock().unwrap() += 1;
            let mut answers = self.answers.lock().unwrap();
            if answers.len() > 1 {
                answers.pop_front().unwrap()
            } else {
                answers.front().cloned().unwrap()
            }
        }
    }

    fn handle() -> JobHandle {
        JobHandle::queued("job-1", ProviderId::Shotstack)
    }

    const POLICY: PollPolicy = PollPolicy::new(5, Duration::from_millis(100));

    #[tokio::test(start_paused = true)]
    async fn queued_processing_done_takes_three_queries() {
        let source = Arc::new(Scripted::new(vec![
            Ok(StatusReport::pending(JobStatus::Queued)),
            Ok(StatusReport::pending(JobStatus::Processing)),
            Ok(StatusReport::done(json!({"url": "https://cdn/v.mp4"}))),
        ]));
        let poller = JobPoller::new(source.clone(), Mode::Live);
        let envelope = poller.poll(&handle(), POLICY).await;
        assert!(envelope.success);
        assert_eq!(envelope.provider_meta.attempts, Some(3));
        assert_eq!(envelope.data_field("url"), Some(&json!("https://cdn/v.mp4")));
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn never_finishing_job_times_out_after_budget() {
        let source = Arc::new(Scripted::new(vec![Ok(StatusReport::pending(
            JobStatus::Processing,
        ))]));
        let poller = JobPoller::new(source.clone(), Mode::Live);
        let started = Instant::now();
        let envelope = poller.poll(&handle(), POLICY).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Timeout));
        assert_eq!(source.calls(), 5);
        // Four sleeps between five queries, none after the last
        assert_eq!(started.elapsed(), Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_reports_provider_message() {
        let source = Scripted::new(vec![Ok(StatusReport::failed("asset not found"))]);
        let envelope = JobPoller::new(source, Mode::Live).poll(&handle(), POLICY).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::ProviderReportedFailure));
        assert!(envelope.error.unwrap().message.contains("asset not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let source = Arc::new(Scripted::new(vec![
            Err(MediaError::ProviderUnavailable("502".into())),
            Err(MediaError::RateLimited("429".into())),
            Ok(StatusReport::done(json!({"ok": true}))),
        ]));
        let envelope = JobPoller::new(source.clone(), Mode::Live)
            .poll(&handle(), POLICY)
            .await;
        assert!(envelope.success);
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_on_last_attempt_is_provider_unavailable() {
        let source = Scripted::new(vec![Err(MediaError::ProviderUnavailable("down".into()))]);
        let envelope = JobPoller::new(source, Mode::Live).poll(&handle(), POLICY).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::ProviderUnavailable));
        assert_eq!(envelope.provider_meta.attempts, Some(5));
    }

    #[tokio::test(start_paused = true)]
    async fn auth_failure_is_surfaced_immediately() {
        let source = Arc::new(Scripted::new(vec![Err(MediaError::AuthFailure(
            "bad key".into(),
        ))]));
        let envelope = JobPoller::new(source.clone(), Mode::Live)
            .poll(&handle(), POLICY)
            .await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::AuthFailure));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_during_sleep_stops_polling() {
        let source = Arc::new(Scripted::new(vec![Ok(StatusReport::pending(
            JobStatus::Processing,
        ))]));
        let registry = Arc::new(JobRegistry::new());
        let job = handle();
        let cancel = registry.register(job.clone());
        let poller = JobPoller::new(source.clone(), Mode::Live).with_registry(registry.clone());

        let canceller = {
            let registry = registry.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(150)).await;
                registry.cancel("job-1").unwrap();
            })
        };
        let envelope = poller.poll(&job, POLICY).await;
        canceller.await.unwrap();

        assert!(cancel.is_cancelled());
        assert_eq!(envelope.error_kind(), Some(ErrorKind::Cancelled));
        assert_eq!(source.calls(), 2);
        assert_eq!(registry.get("job-1").unwrap().status, JobStatus::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn mock_backend_drives_jobs_to_done() {
        let backend = Arc::new(MockJobBackend::new(3));
        backend.insert("job-1", json!({"id": "job-1", "status": "done"}));
        let registry = Arc::new(JobRegistry::new());
        registry.register(handle());
        let envelope = JobPoller::new(backend, Mode::Mock)
            .with_registry(registry.clone())
            .poll(&handle(), POLICY)
            .await;
        assert!(envelope.success);
        assert_eq!(envelope.provider_meta.mode, Mode::Mock);
        assert_eq!(envelope.provider_meta.attempts, Some(3));
        assert_eq!(registry.get("job-1").unwrap().status, JobStatus::Done);
    }

    #[test]
    fn provider_policies() {
        assert_eq!(
            PollPolicy::for_provider(ProviderId::Shotstack),
            PollPolicy::new(60, Duration::from_secs(5))
        );
        assert_eq!(
            PollPolicy::for_provider(ProviderId::AssemblyAi),
            PollPolicy::new(60, Duration::from_secs(2))
        );
    }
}
