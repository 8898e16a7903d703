//! Input validation
//!
//! Pure checks run before any rate-limit or network action, so invalid input
//! never costs a provider call. Checks run in a fixed order: empty input,
//! format, then size.

use crate::config::ProviderConfig;
use crate::error::ValidationError;
use crate::types::{InputRef, JobRequest};
use crate::utils::mime::OCTET_STREAM;

/// Validate an input against a provider's limits.
pub fn validate(input: &InputRef, config: &ProviderConfig) -> Result<(), ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let kind = input
        .media_kind()
        .unwrap_or_else(|| OCTET_STREAM.to_string());
    if !config.supports_kind(&kind) {
        return Err(ValidationError::UnsupportedFormat {
            found: kind,
            supported: config.supported_input_kinds.iter().cloned().collect(),
        });
    }

    if let Some(size) = input.payload_len()
        && size > config.max_payload_bytes
    {
        return Err(ValidationError::PayloadTooLarge {
            size,
            max: config.max_payload_bytes,
        });
    }

    Ok(())
}

/// Validate a request's input.
pub fn validate_request(request: &JobRequest, config: &ProviderConfig) -> Result<(), ValidationError> {
    validate(&request.input, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::FileInput;
    use serde_json::json;

    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn jpeg_of(len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        bytes[..4].copy_from_slice(&JPEG_MAGIC);
        bytes
    }

    #[test]
    fn oversized_files_are_rejected() {
        let config = ProviderConfig::remove_bg("k");
        let input = InputRef::file("big.jpg", "image/jpeg", jpeg_of(12 * 1024 * 1024 + 1));
        let err = validate(&input, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadTooLarge);
        assert_eq!(
            err,
            ValidationError::PayloadTooLarge {
                size: 12 * 1024 * 1024 + 1,
                max: 12 * 1024 * 1024
            }
        );
    }

    #[test]
    fn file_at_the_limit_passes() {
        let config = ProviderConfig::remove_bg("k");
        let input = InputRef::file("edge.jpg", "image/jpeg", jpeg_of(12 * 1024 * 1024));
        assert!(validate(&input, &config).is_ok());
    }

    #[test]
    fn unsupported_formats_are_rejected() {
        let config = ProviderConfig::remove_bg("k");
        for media_type in ["image/gif", "application/pdf", "audio/wav"] {
            let input = InputRef::file("x", media_type, vec![1, 2, 3]);
            let err = validate(&input, &config).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedFormat, "{media_type}");
        }
    }

    #[test]
    fn undeclared_type_is_sniffed() {
        let config = ProviderConfig::remove_bg("k");
        let input = InputRef::File(FileInput::new("upload", jpeg_of(64)));
        assert!(validate(&input, &config).is_ok());

        let unknown = InputRef::File(FileInput::new("upload", vec![1, 2, 3]));
        let err = validate(&unknown, &config).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedFormat { ref found, .. } if found == OCTET_STREAM
        ));
    }

    #[test]
    fn empty_is_checked_before_format() {
        let config = ProviderConfig::remove_bg("k");
        let input = InputRef::file("empty.gif", "image/gif", Vec::new());
        assert_eq!(validate(&input, &config), Err(ValidationError::EmptyInput));
    }

    #[test]
    fn text_length_counts_characters() {
        let config = ProviderConfig::eleven_labs("k");
        assert!(validate(&InputRef::text("é".repeat(5000)), &config).is_ok());
        assert_eq!(
            validate(&InputRef::text("a".repeat(5001)), &config)
                .unwrap_err()
                .kind(),
            ErrorKind::PayloadTooLarge
        );
        assert_eq!(
            validate(&InputRef::text(""), &config).unwrap_err().kind(),
            ErrorKind::EmptyInput
        );
    }

    #[test]
    fn urls_are_checked_by_extension_only() {
        let config = ProviderConfig::assembly_ai("k");
        assert!(validate(&InputRef::url("https://cdn.example.com/a.mp3"), &config).is_ok());
        assert_eq!(
            validate(&InputRef::url("https://cdn.example.com/a.png"), &config)
                .unwrap_err()
                .kind(),
            ErrorKind::UnsupportedFormat
        );
    }

    #[test]
    fn documents_are_measured_serialized() {
        let config = ProviderConfig::shotstack("k").with_max_payload_bytes(16);
        let small = InputRef::document("application/json", json!({"a": 1}));
        assert!(validate(&small, &config).is_ok());
        let large = InputRef::document("application/json", json!({"timeline": "x".repeat(32)}));
        assert_eq!(
            validate(&large, &config).unwrap_err().kind(),
            ErrorKind::PayloadTooLarge
        );
    }
}
