//! AssemblyAI transcription
//!
//! File inputs are uploaded first (`POST /upload`, raw bytes); URL inputs go
//! straight to `POST /transcript`. Transcripts are jobs polled through
//! `GET /transcript/{id}`.

use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{Fixture, ProviderAdapter, Submission, str_field, wrong_input};
use crate::defaults::assembly_ai as defaults;
use crate::dispatch::HttpContext;
use crate::error::MediaError;
use crate::types::{InputRef, JobRequest, JobStatus, ProviderId, StatusReport};

/// Body of `POST /transcript`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptConfig {
    pub audio_url: String,
    pub language_code: String,
    pub speaker_labels: bool,
    pub auto_chapters: bool,
    pub sentiment_analysis: bool,
    pub entity_detection: bool,
    pub punctuate: bool,
    pub format_text: bool,
    pub dual_channel: bool,
}

impl TranscriptConfig {
    pub fn from_request(audio_url: impl Into<String>, request: &JobRequest) -> Self {
        let flag = |name: &str| request.option_bool(name).unwrap_or(false);
        Self {
            audio_url: audio_url.into(),
            language_code: request
                .option_str("language_code")
                .unwrap_or(defaults::DEFAULT_LANGUAGE)
                .to_string(),
            speaker_labels: flag("speaker_labels"),
            auto_chapters: flag("auto_chapters"),
            sentiment_analysis: flag("sentiment_analysis"),
            entity_detection: flag("entity_detection"),
            punctuate: request.option_bool("punctuate").unwrap_or(true),
            format_text: request.option_bool("format_text").unwrap_or(true),
            dual_channel: flag("dual_channel"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct AssemblyAiAdapter;

impl AssemblyAiAdapter {
    pub const fn new() -> Self {
        Self
    }

    async fn upload(&self, http: &HttpContext, bytes: &[u8]) -> Result<String, MediaError> {
        let (ctx, builder) = http.request(Method::POST, "/upload");
        let builder = builder
            .header(reqwest::header::AUTHORIZATION, http.api_key())
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(bytes.to_vec());
        let resp = http.send(&ctx, builder).await?;
        let upload: UploadResponse = serde_json::from_value(resp.json()?)?;
        tracing::debug!(target: "moodreel::dispatch", provider = %ProviderId::AssemblyAi, bytes = bytes.len(), "audio uploaded");
        Ok(upload.upload_url)
    }
}

/// Map a transcript resource to a status report.
pub fn status_report(transcript: Value) -> Result<StatusReport, MediaError> {
    match str_field(&transcript, "status") {
        Some("queued") => Ok(StatusReport::pending(JobStatus::Queued)),
        Some("processing") => Ok(StatusReport::pending(JobStatus::Processing)),
        Some("completed") => Ok(StatusReport::done(transcript)),
        Some("error") => Ok(StatusReport::failed(
            str_field(&transcript, "error").unwrap_or("transcription failed"),
        )),
        other => Err(MediaError::ParseError(format!(
            "unexpected transcript status {other:?}"
        ))),
    }
}

#[async_trait]
impl ProviderAdapter for AssemblyAiAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::AssemblyAi
    }

    fn is_job_based(&self) -> bool {
        true
    }

    async fn submit(
        &self,
        http: &HttpContext,
        request: &JobRequest,
    ) -> Result<Submission, MediaError> {
        let audio_url = match &request.input {
            InputRef::File(file) => self.upload(http, &file.bytes).await?,
            InputRef::Url(url) => url.clone(),
            other => return Err(wrong_input(ProviderId::AssemblyAi, other, "an audio file or URL")),
        };

        let (ctx, builder) = http.request(Method::POST, "/transcript");
        let builder = builder
            .header(reqwest::header::AUTHORIZATION, http.api_key())
            .json(&TranscriptConfig::from_request(audio_url, request));
        let resp = http.send(&ctx, builder).await?;
        let body = resp.json()?;
        let id = str_field(&body, "id")
            .ok_or_else(|| MediaError::ProviderUnavailable("transcript response has no id".into()))?;

        Ok(Submission::Job {
            id: id.to_string(),
            http_status: resp.status,
            request_id: resp.request_id,
        })
    }

    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError> {
        match &request.input {
            InputRef::File(_) | InputRef::Url(_) => Ok(Fixture::Job),
            other => Err(wrong_input(ProviderId::AssemblyAi, other, "an audio file or URL")),
        }
    }

    async fn query_status(
        &self,
        http: &HttpContext,
        job_id: &str,
    ) -> Result<StatusReport, MediaError> {
        let path = format!("/transcript/{}", urlencoding::encode(job_id));
        let (ctx, builder) = http.request(Method::GET, &path);
        let resp = http
            .send(&ctx, builder.header(reqwest::header::AUTHORIZATION, http.api_key()))
            .await?;
        status_report(resp.json()?)
    }

    fn mock_job_result(&self, job_id: &str, request: &JobRequest) -> Value {
        let config = TranscriptConfig::from_request("mock://audio", request);
        json!({
            "id": job_id,
            "status": "completed",
            "text": "This is a mock transcription of the uploaded audio file.",
            "confidence": 0.95,
            "audio_duration": 30.5,
            "language_code": config.language_code,
            "words": [
                { "text": "This", "start": 0, "end": 400, "confidence": 0.98 },
                { "text": "is", "start": 400, "end": 600, "confidence": 0.99 },
                { "text": "a", "start": 600, "end": 700, "confidence": 0.97 },
                { "text": "mock", "start": 700, "end": 1100, "confidence": 0.96 },
            ],
            "chapters": config.auto_chapters.then(|| json!([{
                "start": 0,
                "end": 30500,
                "headline": "Introduction",
                "summary": "Mock chapter summary",
            }])),
            "sentiment_analysis_results": config.sentiment_analysis.then(|| json!([{
                "text": "This is a mock transcription",
                "sentiment": "NEUTRAL",
                "confidence": 0.8,
                "start": 0,
                "end": 30500,
            }])),
        })
    }
}
