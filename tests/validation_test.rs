mod support;

use moodreel::prelude::*;
use support::{counting_mock_service, jpeg_request};

#[tokio::test(start_paused = true)]
async fn oversized_file_never_reaches_the_provider() {
    let (service, adapter) = counting_mock_service(ProviderConfig::remove_bg("k"));
    let request = jpeg_request("huge.jpg", 13 * 1024 * 1024);

    let envelope = service.execute(&request).await;

    assert!(!envelope.success);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::PayloadTooLarge));
    assert_eq!(adapter.calls(), 0);
    assert!(
        service
            .rate_limiter()
            .last_dispatch_at(ProviderId::RemoveBg)
            .await
            .is_none()
    );
}

#[tokio::test(start_paused = true)]
async fn unsupported_format_is_rejected_with_supported_list() {
    let (service, adapter) = counting_mock_service(ProviderConfig::remove_bg("k"));
    let request = JobRequest::new(InputRef::file("anim.gif", "image/gif", vec![b'G'; 64]));

    let envelope = service.execute(&request).await;

    assert_eq!(envelope.error_kind(), Some(ErrorKind::UnsupportedFormat));
    let message = envelope.error.unwrap().message;
    assert!(message.contains("image/gif"));
    assert!(message.contains("image/png"));
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test]
async fn validate_is_pure() {
    let (service, adapter) = counting_mock_service(ProviderConfig::eleven_labs(""));
    let request = JobRequest::new(InputRef::text("x".repeat(5001)));

    let first = service.validate(&request).unwrap_err();
    let second = service.validate(&request).unwrap_err();

    assert_eq!(first, second);
    assert_eq!(first.kind(), ErrorKind::PayloadTooLarge);
    assert_eq!(adapter.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn blank_inputs_are_empty() {
    let (service, _) = counting_mock_service(ProviderConfig::stripe(""));
    for input in [InputRef::text("   "), InputRef::url("")] {
        let envelope = service.execute(&JobRequest::new(input)).await;
        assert_eq!(envelope.error_kind(), Some(ErrorKind::EmptyInput));
    }

    let (render, _) = counting_mock_service(ProviderConfig::shotstack(""));
    let empty_doc = JobRequest::new(InputRef::document("application/json", serde_json::json!({})));
    assert_eq!(
        render.execute(&empty_doc).await.error_kind(),
        Some(ErrorKind::EmptyInput)
    );
}

fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&1_024u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&[0; 1_024]);
    bytes
}

fn flac_bytes() -> Vec<u8> {
    let mut bytes = b"fLaC".to_vec();
    bytes.extend_from_slice(&[0; 1_024]);
    bytes
}

#[tokio::test(start_paused = true)]
async fn sniffed_wav_and_flac_files_are_transcribable() {
    let service = MediaService::new(support::mock_config(ProviderConfig::assembly_ai(""))).unwrap();

    for (suffix, bytes, expected) in [
        (".wav", wav_bytes(), "audio/wav"),
        (".flac", flac_bytes(), "audio/flac"),
    ] {
        let path = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap()
            .into_temp_path();
        tokio::fs::write(&path, bytes).await.unwrap();

        let recording = FileInput::from_path(&path).await.unwrap();
        assert_eq!(recording.resolved_media_type(), expected);

        let request = JobRequest::new(InputRef::File(recording));
        assert!(service.validate(&request).is_ok(), "{suffix}");
        let envelope = service.execute(&request).await;
        assert!(envelope.success, "{suffix}: {envelope:?}");
    }
}

#[tokio::test]
async fn declared_audio_aliases_pass_validation() {
    let (service, _) = counting_mock_service(ProviderConfig::assembly_ai(""));
    for alias in ["audio/x-wav", "audio/wave", "audio/x-flac", "audio/x-m4a"] {
        let request = JobRequest::new(InputRef::file("clip", alias, vec![1; 16]));
        assert!(service.validate(&request).is_ok(), "{alias}");
    }
}
