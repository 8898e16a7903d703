//! HTTP Interceptor interfaces
//!
//! A small interceptor API for live-mode requests. Interceptors can tweak
//! request builders before send, observe responses, and be notified of
//! errors. The hooks are best-effort and should avoid expensive work.

use reqwest::StatusCode;

use crate::error::MediaError;
use crate::types::ProviderId;

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct HttpRequestContext {
    pub request_id: String,
    pub provider: ProviderId,
    pub method: reqwest::Method,
    pub url: String,
}

impl HttpRequestContext {
    pub fn new(provider: ProviderId, method: reqwest::Method, url: impl Into<String>) -> Self {
        Self {
            request_id: generate_request_id(),
            provider,
            method,
            url: url.into(),
        }
    }
}

/// Generate a client-side request id for correlating interceptor callbacks.
pub fn generate_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Return the (possibly modified)
    /// builder or an error to short-circuit the request.
    fn on_before_send(
        &self,
        _ctx: &HttpRequestContext,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, MediaError> {
        Ok(builder)
    }

    /// Called after a response is received, whatever its status.
    fn on_response(&self, _ctx: &HttpRequestContext, _status: StatusCode) {}

    /// Called when the request fails or its status is classified as an error.
    fn on_error(&self, _ctx: &HttpRequestContext, _error: &MediaError) {}
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(
        &self,
        ctx: &HttpRequestContext,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, MediaError> {
        tracing::debug!(target: "moodreel::http", provider=%ctx.provider, method=%ctx.method, url=%ctx.url, request_id=%ctx.request_id, "sending request");
        Ok(builder)
    }

    fn on_response(&self, ctx: &HttpRequestContext, status: StatusCode) {
        tracing::debug!(target: "moodreel::http", provider=%ctx.provider, url=%ctx.url, request_id=%ctx.request_id, status=%status.as_u16(), "response received");
    }

    fn on_error(&self, ctx: &HttpRequestContext, error: &MediaError) {
        tracing::debug!(target: "moodreel::http", provider=%ctx.provider, url=%ctx.url, request_id=%ctx.request_id, err=%error, "request error");
    }
}
