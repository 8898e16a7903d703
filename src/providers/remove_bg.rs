//! Remove.bg background removal
//!
//! `POST /removebg` as multipart form data; the response body is the
//! processed image and metadata arrives in `X-*` headers.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

use super::{Fixture, ProviderAdapter, Submission, wrong_input};
use crate::defaults::remove_bg as defaults;
use crate::dispatch::HttpContext;
use crate::error::MediaError;
use crate::types::{InputRef, JobRequest, ProviderId};

const MOCK_WIDTH: u64 = 1024;
const MOCK_HEIGHT: u64 = 768;
const MOCK_PROCESSING_SECONDS: f64 = 2.8;

#[derive(Debug, Clone, Default)]
pub struct RemoveBgAdapter;

impl RemoveBgAdapter {
    pub const fn new() -> Self {
        Self
    }

    fn output_format(request: &JobRequest) -> String {
        request
            .option_str("format")
            .unwrap_or(defaults::DEFAULT_FORMAT)
            .to_string()
    }

    fn original_size(input: &InputRef) -> Option<u64> {
        match input {
            InputRef::File(file) => Some(file.bytes.len() as u64),
            _ => None,
        }
    }

    fn build_form(request: &JobRequest) -> Result<Form, MediaError> {
        let form = Form::new()
            .text("size", request.option_str("size").unwrap_or("auto").to_string())
            .text("type", request.option_str("type").unwrap_or("auto").to_string())
            .text("format", Self::output_format(request));
        let form = match &request.input {
            InputRef::File(file) => {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.name.clone())
                    .mime_str(&file.resolved_media_type())?;
                form.part("image_file", part)
            }
            InputRef::Url(url) => form.text("image_url", url.clone()),
            other => return Err(wrong_input(ProviderId::RemoveBg, other, "an image file or URL")),
        };
        Ok(match request.option_str("bg_color") {
            Some(color) => form.text("bg_color", color.to_string()),
            None => form,
        })
    }
}

#[async_trait]
impl ProviderAdapter for RemoveBgAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::RemoveBg
    }

    async fn submit(
        &self,
        http: &HttpContext,
        request: &JobRequest,
    ) -> Result<Submission, MediaError> {
        let form = Self::build_form(request)?;
        let (ctx, builder) = http.request(Method::POST, "/removebg");
        let builder = builder
            .header("X-Api-Key", http.api_key())
            .header(reqwest::header::ACCEPT, "image/*")
            .multipart(form);
        let resp = http.send(&ctx, builder).await?;

        let data = json!({
            "format": Self::output_format(request),
            "originalSize": Self::original_size(&request.input),
            "processedSize": resp.body.len() as u64,
            "width": resp.header_u64("x-width"),
            "height": resp.header_u64("x-height"),
            "creditsUsed": resp.header_f64("x-credits-charged"),
            "processingTime": resp.header_f64("x-processing-time"),
            "imageBase64": base64::engine::general_purpose::STANDARD.encode(&resp.body),
        });
        Ok(Submission::Immediate {
            data,
            http_status: resp.status,
            request_id: resp.request_id,
        })
    }

    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError> {
        let (original, image) = match &request.input {
            InputRef::File(file) => (
                Some(file.bytes.len() as u64),
                Value::String(base64::engine::general_purpose::STANDARD.encode(&file.bytes)),
            ),
            InputRef::Url(_) => (None, Value::Null),
            other => return Err(wrong_input(ProviderId::RemoveBg, other, "an image file or URL")),
        };
        // Simulated compression
        let processed = original.map(|size| (size as f64 * 0.7).floor() as u64);

        Ok(Fixture::Immediate(json!({
            "format": Self::output_format(request),
            "originalSize": original,
            "processedSize": processed,
            "width": request.option_u64("width").unwrap_or(MOCK_WIDTH),
            "height": request.option_u64("height").unwrap_or(MOCK_HEIGHT),
            "creditsUsed": 1,
            "processingTime": MOCK_PROCESSING_SECONDS,
            "imageBase64": image,
        })))
    }

    async fn account_info(&self, http: &HttpContext) -> Result<Value, MediaError> {
        let (ctx, builder) = http.request(Method::GET, "/account");
        let resp = http
            .send(&ctx, builder.header("X-Api-Key", http.api_key()))
            .await?;
        let body = resp.json()?;
        // Remove.bg wraps account data in `data.attributes`
        Ok(body
            .pointer("/data/attributes")
            .cloned()
            .unwrap_or(body))
    }

    fn mock_account_info(&self) -> Result<Value, MediaError> {
        Ok(json!({
            "credits": { "total": 50, "subscription": 50, "payg": 0 },
            "api": { "free_calls": 5, "sizes": "all" },
        }))
    }
}
