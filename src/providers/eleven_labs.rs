//! ElevenLabs text-to-speech

use async_trait::async_trait;
use base64::Engine;
use reqwest::Method;
use serde::Serialize;
use serde_json::{Value, json};

use super::{Fixture, ProviderAdapter, Submission, wrong_input};
use crate::defaults::eleven_labs as defaults;
use crate::dispatch::HttpContext;
use crate::error::MediaError;
use crate::types::{InputRef, JobRequest, ProviderId};

const AUDIO_MEDIA_TYPE: &str = "audio/mpeg";
const MOCK_AUDIO_BYTES: usize = 1024;

/// Premade voices served in mock mode: (id, name, gender, age, accent, description, use case).
const MOCK_VOICES: [(&str, &str, &str, &str, &str, &str, &str); 3] = [
    (
        "mock-voice-1",
        "Sarah",
        "female",
        "young",
        "american",
        "Warm and friendly female voice",
        "narration",
    ),
    (
        "mock-voice-2",
        "David",
        "male",
        "middle_aged",
        "british",
        "Professional male voice with British accent",
        "audiobook",
    ),
    (
        "mock-voice-3",
        "Emma",
        "female",
        "young",
        "american",
        "Energetic and expressive female voice",
        "conversational",
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub stability: f64,
    pub similarity_boost: f64,
    pub style: f64,
    pub use_speaker_boost: bool,
}

impl VoiceSettings {
    /// Settings from request options, falling back to the defaults.
    pub fn from_request(request: &JobRequest) -> Self {
        Self {
            stability: request.option_f64("stability").unwrap_or(defaults::STABILITY),
            similarity_boost: request
                .option_f64("similarity_boost")
                .unwrap_or(defaults::SIMILARITY_BOOST),
            style: request.option_f64("style").unwrap_or(defaults::STYLE),
            use_speaker_boost: request.option_bool("use_speaker_boost").unwrap_or(true),
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechBody<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Clone, Default)]
pub struct ElevenLabsAdapter;

impl ElevenLabsAdapter {
    pub const fn new() -> Self {
        Self
    }

    fn text(request: &JobRequest) -> Result<&str, MediaError> {
        match &request.input {
            InputRef::Text(text) => Ok(text),
            other => Err(wrong_input(ProviderId::ElevenLabs, other, "text")),
        }
    }

    fn voice_id(request: &JobRequest) -> &str {
        request
            .option_str("voice_id")
            .unwrap_or(defaults::DEFAULT_VOICE)
    }

    fn model_id(request: &JobRequest) -> &str {
        request
            .option_str("model_id")
            .unwrap_or(defaults::DEFAULT_MODEL)
    }

    fn speech_data(request: &JobRequest, text: &str, audio: &[u8]) -> Value {
        json!({
            "voiceId": Self::voice_id(request),
            "modelId": Self::model_id(request),
            "characters": text.chars().count(),
            // Rough estimate: ten characters per second
            "durationEstimate": text.chars().count().div_ceil(10),
            "settings": VoiceSettings::from_request(request),
            "contentType": AUDIO_MEDIA_TYPE,
            "audioBytes": audio.len(),
            "audioBase64": base64::engine::general_purpose::STANDARD.encode(audio),
        })
    }
}

#[async_trait]
impl ProviderAdapter for ElevenLabsAdapter {
    fn provider(&self) -> ProviderId {
        ProviderId::ElevenLabs
    }

    async fn submit(
        &self,
        http: &HttpContext,
        request: &JobRequest,
    ) -> Result<Submission, MediaError> {
        let text = Self::text(request)?;
        let body = SpeechBody {
            text,
            model_id: Self::model_id(request),
            voice_settings: VoiceSettings::from_request(request),
        };
        let path = format!(
            "/text-to-speech/{}",
            urlencoding::encode(Self::voice_id(request))
        );
        let (ctx, builder) = http.request(Method::POST, &path);
        let builder = builder
            .header("xi-api-key", http.api_key())
            .header(reqwest::header::ACCEPT, AUDIO_MEDIA_TYPE)
            .json(&body);
        let resp = http.send(&ctx, builder).await?;

        Ok(Submission::Immediate {
            data: Self::speech_data(request, text, &resp.body),
            http_status: resp.status,
            request_id: resp.request_id,
        })
    }

    fn fixture(&self, request: &JobRequest) -> Result<Fixture, MediaError> {
        let text = Self::text(request)?;
        let silence = [0u8; MOCK_AUDIO_BYTES];
        Ok(Fixture::Immediate(Self::speech_data(request, text, &silence)))
    }

    async fn account_info(&self, http: &HttpContext) -> Result<Value, MediaError> {
        let (ctx, builder) = http.request(Method::GET, "/user");
        let resp = http
            .send(&ctx, builder.header("xi-api-key", http.api_key()))
            .await?;
        resp.json()
    }

    fn mock_account_info(&self) -> Result<Value, MediaError> {
        Ok(json!({
            "subscription": {
                "tier": "free",
                "character_count": 0,
                "character_limit": 10000,
                "status": "active",
            },
        }))
    }

    async fn voices(&self, http: &HttpContext) -> Result<Value, MediaError> {
        let (ctx, builder) = http.request(Method::GET, "/voices");
        let resp = http
            .send(&ctx, builder.header("xi-api-key", http.api_key()))
            .await?;
        let mut body = resp.json()?;
        match body.get_mut("voices").map(Value::take) {
            Some(voices @ Value::Array(_)) => Ok(voices),
            _ => Err(MediaError::ParseError(
                "voice list response has no `voices` array".to_string(),
            )),
        }
    }

    async fn voice(&self, http: &HttpContext, voice_id: &str) -> Result<Value, MediaError> {
        let path = format!("/voices/{}", urlencoding::encode(voice_id));
        let (ctx, builder) = http.request(Method::GET, &path);
        let resp = http
            .send(&ctx, builder.header("xi-api-key", http.api_key()))
            .await?;
        resp.json()
    }

    fn mock_voices(&self) -> Result<Value, MediaError> {
        let voices = MOCK_VOICES
            .iter()
            .map(|(id, name, gender, age, accent, description, use_case)| {
                json!({
                    "voice_id": id,
                    "name": name,
                    "category": "premade",
                    "labels": {
                        "gender": gender,
                        "age": age,
                        "accent": accent,
                        "use_case": use_case,
                    },
                    "description": description,
                    "preview_url": null,
                })
            })
            .collect();
        Ok(Value::Array(voices))
    }
}
