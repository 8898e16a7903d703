//! Shotstack video rendering
//!
//! Renders are jobs: `POST /render` answers with an id that is polled via
//! `GET /render/{id}` and can be cancelled with `DELETE /render/{id}`. The
//! stage (`stage` or `v1`) is part of the configured base URL.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};

use super::{Fixture, ProviderAdapter, Submission, str_field, wrong_input};
use crate::dispatch::HttpContext;
use crate::error::MediaError;
use crate::types::{InputRef, JobRequest, JobStatus, ProviderId, StatusReport};

pub mod timeline;

pub use timeline::{
    MergeField, OutputSettings, SlideImage, Slideshow, Soundtrack, TemplateRender, Thumbnail,
    Transition,
};

#[derive(Debug, Clone, Default)]
pub struct ShotstackAdapter;

impl ShotstackAdapter {
    pub const fn new() -> Self {
        Self
    }

    /// Render body from a document input.
    ///
    /// A document holding a `timeline` key is sent as is (with default
    /// output settings filled in). A `template` document renders a saved
    /// template with its merge fields and is never given output settings.
    /// Any other document is treated as the timeline itself.
    pub fn render_body(request: &JobRequest) -> Result<Value, MediaError> {
        let InputRef::Document { value, .. } = &request.input else {
            return Err(wrong_input(
                ProviderId::Shotstack,
                &request.input,
                "a render document",
            ));
        };

        let is_template = value.get("template").is_some();
        let mut body = if is_template || value.get("timeline").is_some() {
            value.clone()
        } else {
            json!({ "timeline": value })
        };
        if let Some(map) = body.as_object_mut() {
            if !is_template && !map.contains_key("output") {
                map.insert(
                    "output".to_string(),
                    serde_json::to_value(OutputSettings::default())?,
                );
            }
            if let Some(callback) = request.option_str("callback") {
                map.insert("callback".to_string(), Value::String(callback.to_string()));
            }
        }
        Ok(body)
    }

    fn with_key(http: &HttpContext, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("x-api-key", http.api_key())
    }
}

/// Map a render resource (`response` of `GET /render/{id}`) to a status report.
pub fn status_report(render: Value) -> Result<StatusReport, MediaError> {
    match str_field(&render, "status") {
        Some("queued") => Ok(StatusReport::pending(JobStatus::Queued)),
        Some("fetching" | "rendering" | "saving") => {
            Ok(StatusReport::pending(JobStatus::Processing))
        }
        Some("done") => Ok(StatusReport::done(render)),
        Some("failed") => Ok(StatusReport::failed(
            str_field(&render, "error").unwrap_or("Unknown error"),
        )),
        other => Err(MediaError::ParseError(format!(
            "unexpected render status {other:?}"
        ))),
    }
}

#[async_trait]
impl ProviderAdapter for ShotstackAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::Shotstack
    }

    fn is_job_based(&self) -> bool {
        true
    }

    async fn submit(
        &self,
        http: &HttpContext,
        request: &JobRequest,
    ) -> Result<Submission, MediaError> {
        let body = Self::render_body(request)?;
        let (ctx, builder) = http.request(Method::POST, "/render");
        let resp = http
            .send(&ctx, Self::with_key(http, builder).json(&body))
            .await?;
        let answer = resp.json()?;
        let id = answer
            .pointer("/response/id")
            .and_then(Value::as_str)
            .ok_or_else(|| MediaError::ProviderUnavailable("render response has no id".into()))?;

        Ok(Submission::Job {
            id: id.to_string(),
            http_status: resp.status,
            request_id: resp.request_id,
        })
    }

    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError> {
        Self::render_body(request).map(|_| Fixture::Job)
    }

    async fn query_status(
        &self,
        http: &HttpContext,
        job_id: &str,
    ) -> Result<StatusReport, MediaError> {
        let path = format!("/render/{}", urlencoding::encode(job_id));
        let (ctx, builder) = http.request(Method::GET, &path);
        let resp = http.send(&ctx, Self::with_key(http, builder)).await?;
        let answer = resp.json()?;
        let render = answer
            .get("response")
            .cloned()
            .ok_or_else(|| MediaError::ParseError("render status has no response".into()))?;
        status_report(render)
    }

    fn mock_job_result(&self, job_id: &str, request: &JobRequest) -> Value {
        let format = Self::render_body(request)
            .ok()
            .and_then(|body| {
                body.pointer("/output/format")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| crate::defaults::shotstack::FORMAT.to_string());
        json!({
            "id": job_id,
            "status": "done",
            "url": format!("https://cdn.shotstack.io/au/v1/assets/{job_id}.{format}"),
        })
    }

    async fn cancel_remote(&self, http: &HttpContext, job_id: &str) -> Result<(), MediaError> {
        let path = format!("/render/{}", urlencoding::encode(job_id));
        let (ctx, builder) = http.request(Method::DELETE, &path);
        http.send(&ctx, Self::with_key(http, builder)).await?;
        Ok(())
    }
}
