#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use moodreel::dispatch::HttpContext;
use moodreel::providers::{Fixture, ProviderAdapter, Submission, adapter_for};
use moodreel::types::StatusReport;
use moodreel::{MediaError, ProviderConfig};
use moodreel::prelude::*;

/// Wraps a built-in adapter and counts how often the provider is reached.
pub struct CountingAdapter {
    inner: Arc<dyn ProviderAdapter>,
    calls: AtomicUsize,
}

impl CountingAdapter {
    pub fn wrap(provider: ProviderId) -> Arc<Self> {
        Arc::new(Self {
            inner: adapter_for(provider).expect("adapter"),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for CountingAdapter {
    fn provider(&self) -> ProviderId {
        self.inner.provider()
    }

    fn is_job_based(&self) -> bool {
        self.inner.is_job_based()
    }

    async fn submit(
        &self,
        http: &HttpContext,
        request: &JobRequest,
    ) -> Result<Submission, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.submit(http, request).await
    }

    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fixture(request)
    }

    async fn query_status(
        &self,
        http: &HttpContext,
        job_id: &str,
    ) -> Result<StatusReport, MediaError> {
        self.inner.query_status(http, job_id).await
    }

    fn mock_job_result(&self, job_id: &str, request: &JobRequest) -> Value {
        self.inner.mock_job_result(job_id, request)
    }
}

/// A JPEG-looking buffer of `len` bytes.
pub fn jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    bytes[..4].copy_from_slice(&[0xFF, 0xD8, 0xFF, 0xE0]);
    bytes
}

pub fn jpeg_request(name: &str, len: usize) -> JobRequest {
    JobRequest::new(InputRef::file(name, "image/jpeg", jpeg(len)))
}

/// Mock-mode config without synthetic latency.
pub fn mock_config(config: ProviderConfig) -> ProviderConfig {
    config
        .with_mode(Mode::Mock)
        .with_mock_delay(Duration::ZERO)
}

/// Mock service whose adapter counts provider calls.
pub fn counting_mock_service(config: ProviderConfig) -> (MediaService, Arc<CountingAdapter>) {
    let adapter = CountingAdapter::wrap(config.provider);
    let service = MediaService::builder(mock_config(config))
        .with_adapter(adapter.clone())
        .build()
        .expect("service");
    (service, adapter)
}
