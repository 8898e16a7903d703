//! Request inputs

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::MediaError;
use crate::utils::mime::{canonical_mime, guess_mime, guess_mime_from_path_or_url};

/// Media type reported for plain text inputs.
pub const TEXT_MEDIA_TYPE: &str = "text/plain";

/// An uploaded file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInput {
    /// Original file name (used for multipart uploads and batch identifiers)
    pub name: String,
    /// Declared media type; sniffed from the bytes when absent
    pub media_type: Option<String>,
    /// File contents
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: None,
            bytes,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Read a file from disk, keeping its file name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            MediaError::InvalidRequest(format!("failed to read {}: {e}", path.display()))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    /// Declared media type, then magic bytes, then file extension.
    pub fn resolved_media_type(&self) -> String {
        match &self.media_type {
            Some(declared) if !declared.trim().is_empty() => canonical_mime(declared),
            _ => guess_mime(Some(&self.bytes), Some(&self.name)),
        }
    }
}

/// What a job operates on.
#[derive(Debug, Clone, PartialEq)]
pub enum InputRef {
    File(FileInput),
    Text(String),
    /// Remote media the provider fetches itself
    Url(String),
    /// Structured document such as a render timeline
    Document { media_type: String, value: Value },
}

impl InputRef {
    pub fn file(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::File(FileInput::new(name, bytes).with_media_type(media_type))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn document(media_type: impl Into<String>, value: Value) -> Self {
        Self::Document {
            media_type: media_type.into(),
            value,
        }
    }

    /// Whether there is nothing to process.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::File(file) => file.bytes.is_empty(),
            Self::Text(text) => text.trim().is_empty(),
            Self::Url(url) => url.trim().is_empty(),
            Self::Document { value, .. } => match value {
                Value::Null => true,
                Value::Object(map) => map.is_empty(),
                Value::Array(items) => items.is_empty(),
                _ => false,
            },
        }
    }

    /// Media type used for format checks; `None` when it cannot be determined.
    pub fn media_kind(&self) -> Option<String> {
        match self {
            Self::File(file) => Some(file.resolved_media_type()),
            Self::Text(_) => Some(TEXT_MEDIA_TYPE.to_string()),
            Self::Url(url) => guess_mime_from_path_or_url(url),
            Self::Document { media_type, .. } => Some(canonical_mime(media_type)),
        }
    }

    /// Size counted against the provider limit: bytes for files and documents,
    /// characters for text. URLs carry no local payload.
    pub fn payload_len(&self) -> Option<u64> {
        match self {
            Self::File(file) => Some(file.bytes.len() as u64),
            Self::Text(text) => Some(text.chars().count() as u64),
            Self::Url(_) => None,
            Self::Document { value, .. } => Some(value.to_string().len() as u64),
        }
    }

    /// Short label used to correlate batch results back to callers.
    pub fn identifier(&self) -> String {
        match self {
            Self::File(file) => file.name.clone(),
            Self::Text(text) => {
                let mut label: String = text.chars().take(40).collect();
                if text.chars().count() > 40 {
                    label.push('…');
                }
                label
            }
            Self::Url(url) => url.clone(),
            Self::Document { media_type, .. } => media_type.clone(),
        }
    }
}

/// A single call: input plus recognized options.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    pub input: InputRef,
    pub options: Map<String, Value>,
}

impl JobRequest {
    pub fn new(input: InputRef) -> Self {
        Self {
            input,
            options: Map::new(),
        }
    }

    /// Set an option value
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    /// Merge a JSON object of options; non-object values are ignored.
    pub fn with_options(mut self, options: Value) -> Self {
        if let Value::Object(map) = options {
            self.options.extend(map);
        }
        self
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.get(name).filter(|v| !v.is_null())
    }

    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.option(name).and_then(Value::as_str)
    }

    pub fn option_bool(&self, name: &str) -> Option<bool> {
        self.option(name).and_then(Value::as_bool)
    }

    pub fn option_f64(&self, name: &str) -> Option<f64> {
        self.option(name).and_then(Value::as_f64)
    }

    pub fn option_u64(&self, name: &str) -> Option<u64> {
        self.option(name).and_then(Value::as_u64)
    }
}

impl From<InputRef> for JobRequest {
    fn from(input: InputRef) -> Self {
        Self::new(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_media_type_falls_back_to_sniffing() {
        let png = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let file = FileInput::new("photo.jpg", png);
        assert_eq!(file.resolved_media_type(), "image/png");

        let declared = FileInput::new("photo", vec![1, 2, 3]).with_media_type("Image/JPEG");
        assert_eq!(declared.resolved_media_type(), "image/jpeg");
    }

    #[test]
    fn text_is_measured_in_characters() {
        let input = InputRef::text("héllo");
        assert_eq!(input.payload_len(), Some(5));
        assert_eq!(input.media_kind().as_deref(), Some(TEXT_MEDIA_TYPE));
    }

    #[test]
    fn empty_inputs_are_detected() {
        assert!(InputRef::text("   ").is_empty());
        assert!(InputRef::url("").is_empty());
        assert!(InputRef::document("application/json", json!({})).is_empty());
        assert!(InputRef::File(FileInput::new("a.png", Vec::new())).is_empty());
        assert!(!InputRef::document("application/json", json!({"a": 1})).is_empty());
    }

    #[test]
    fn url_kind_comes_from_extension() {
        let input = InputRef::url("https://cdn.example.com/voice.wav?sig=abc");
        assert_eq!(input.media_kind().as_deref(), Some("audio/wav"));
        assert_eq!(input.payload_len(), None);
    }

    #[test]
    fn options_ignore_nulls() {
        let request = JobRequest::new(InputRef::text("hi"))
            .with_options(json!({"format": "jpg", "width": 640, "preview": null}));
        assert_eq!(request.option_str("format"), Some("jpg"));
        assert_eq!(request.option_u64("width"), Some(640));
        assert!(request.option("preview").is_none());
    }

    #[test]
    fn long_text_identifier_is_truncated() {
        let input = InputRef::text("a".repeat(100));
        assert_eq!(input.identifier().chars().count(), 41);
    }
}
