//! Live-mode HTTP plumbing shared by provider adapters
//!
//! Centralizes interceptor notification and status classification so that
//! adapters only describe wire shapes.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::MediaError;
use crate::types::ProviderId;
use crate::utils::{HttpInterceptor, HttpRequestContext};

/// Response headers that carry a provider-side request id.
const REQUEST_ID_HEADERS: [&str; 5] = [
    "x-request-id",
    "request-id",
    "x-trace-id",
    "x-correlation-id",
    "cf-ray",
];

/// Everything an adapter needs to talk to its provider.
#[derive(Clone)]
pub struct HttpContext {
    client: reqwest::Client,
    config: Arc<ProviderConfig>,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl std::fmt::Debug for HttpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContext")
            .field("provider", &self.config.provider)
            .field("base_url", &self.config.base_url)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub request_id: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Decode the body as JSON; undecodable bodies are a provider fault.
    pub fn json(&self) -> Result<Value, MediaError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            MediaError::ProviderUnavailable(format!("undecodable response body: {e}"))
        })
    }

    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn header_u64(&self, name: &str) -> Option<u64> {
        self.header_str(name).and_then(|v| v.trim().parse().ok())
    }

    pub fn header_f64(&self, name: &str) -> Option<f64> {
        self.header_str(name).and_then(|v| v.trim().parse().ok())
    }
}

impl HttpContext {
    pub fn new(
        client: reqwest::Client,
        config: Arc<ProviderConfig>,
        interceptors: Vec<Arc<dyn HttpInterceptor>>,
    ) -> Self {
        Self {
            client,
            config,
            interceptors,
        }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub fn provider(&self) -> ProviderId {
        self.config.provider
    }

    pub(crate) fn api_key(&self) -> &str {
        self.config.expose_api_key()
    }

    /// Start a request against `path` under the configured base URL with the
    /// per-request timeout applied.
    pub fn request(&self, method: Method, path: &str) -> (HttpRequestContext, RequestBuilder) {
        let url = self.config.endpoint(path);
        let ctx = HttpRequestContext::new(self.config.provider, method.clone(), url.clone());
        let builder = self
            .client
            .request(method, url)
            .timeout(self.config.timeout());
        (ctx, builder)
    }

    /// Send a request, notify interceptors, and classify non-2xx statuses.
    pub async fn send(
        &self,
        ctx: &HttpRequestContext,
        mut builder: RequestBuilder,
    ) -> Result<HttpResponse, MediaError> {
        for it in &self.interceptors {
            builder = it.on_before_send(ctx, builder)?;
        }

        let resp = match builder.send().await {
            Ok(resp) => resp,
            Err(e) => return Err(self.notify_error(ctx, MediaError::from(e))),
        };

        let status = resp.status();
        for it in &self.interceptors {
            it.on_response(ctx, status);
        }

        let headers = resp.headers().clone();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let error = classify_http_error(self.config.provider, status, &text, &headers);
            return Err(self.notify_error(ctx, error));
        }

        let body = match resp.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => return Err(self.notify_error(ctx, MediaError::from(e))),
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            request_id: request_id_from(&headers),
            headers,
            body,
        })
    }

    fn notify_error(&self, ctx: &HttpRequestContext, error: MediaError) -> MediaError {
        for it in &self.interceptors {
            it.on_error(ctx, &error);
        }
        error
    }
}

/// First provider request id found in the response headers.
pub fn request_id_from(headers: &HeaderMap) -> Option<String> {
    REQUEST_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

/// Classify a non-2xx response into a typed error.
///
/// The message carries the provider, status, any request ids, and a short
/// body sample for debugging.
pub fn classify_http_error(
    provider: ProviderId,
    status: StatusCode,
    body_text: &str,
    headers: &HeaderMap,
) -> MediaError {
    let ids: Vec<String> = REQUEST_ID_HEADERS
        .iter()
        .filter_map(|k| {
            headers
                .get(*k)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!("{k}={v}"))
        })
        .collect();
    let ids_suffix = if ids.is_empty() {
        String::new()
    } else {
        format!(" ids=[{}]", ids.join(","))
    };
    // Limit body sample size to avoid noisy logs
    let body_sample = body_text.chars().take(200).collect::<String>();
    let code = status.as_u16();
    let message = format!("provider={provider} http={code}{ids_suffix} body_sample={body_sample}");

    match code {
        401 | 403 => MediaError::AuthFailure(message),
        402 => MediaError::InsufficientCredits(message),
        413 => MediaError::PayloadTooLarge(message),
        415 => MediaError::UnsupportedFormat(message),
        429 => {
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            MediaError::RateLimited(format!("{message} retry_after={retry_after}"))
        }
        400..=499 => MediaError::InvalidRequest(message),
        _ => MediaError::ProviderUnavailable(message),
    }
}
