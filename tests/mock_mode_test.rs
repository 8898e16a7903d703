mod support;

use std::time::Duration;

use moodreel::prelude::*;
use serde_json::{Value, json};
use support::{jpeg_request, mock_config};

fn keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

#[tokio::test(start_paused = true)]
async fn identical_requests_produce_identical_fixtures() {
    let service = MediaService::new(mock_config(ProviderConfig::remove_bg("k"))).unwrap();
    let request = jpeg_request("same.jpg", 5000);

    let first = service.execute(&request).await;
    let second = service.execute(&request).await;

    assert!(first.success && second.success);
    assert_eq!(first.data, second.data);
    assert_eq!(
        keys(first.data.as_ref().unwrap()),
        [
            "creditsUsed",
            "format",
            "height",
            "imageBase64",
            "originalSize",
            "processedSize",
            "processingTime",
            "width"
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn speech_and_checkout_fixtures_are_shaped_like_live_results() {
    let speech = MediaService::new(mock_config(ProviderConfig::eleven_labs(""))).unwrap();
    let envelope = speech
        .execute(&JobRequest::new(InputRef::text("Good morning")).with_option("voice_id", "v1"))
        .await;
    assert_eq!(envelope.data_field("voiceId"), Some(&json!("v1")));
    assert_eq!(envelope.data_field("contentType"), Some(&json!("audio/mpeg")));

    let checkout = MediaService::new(mock_config(ProviderConfig::stripe(""))).unwrap();
    let envelope = checkout
        .execute(&JobRequest::new(InputRef::text("price_premium_monthly")))
        .await;
    assert_eq!(keys(envelope.data.as_ref().unwrap()), ["id", "url"]);
    assert_eq!(envelope.provider_meta.mode, Mode::Mock);
}

#[tokio::test(start_paused = true)]
async fn mock_delay_is_applied_before_the_fixture() {
    let config = ProviderConfig::stripe("")
        .with_mode(Mode::Mock)
        .with_mock_delay(Duration::from_millis(750));
    let service = MediaService::new(config).unwrap();

    let start = tokio::time::Instant::now();
    let envelope = service
        .execute(&JobRequest::new(InputRef::text("price_1")))
        .await;
    assert!(envelope.success);
    assert!(start.elapsed() >= Duration::from_millis(750));
    assert!(envelope.timing_ms >= 750);
}

#[tokio::test(start_paused = true)]
async fn mock_mode_needs_no_api_key_and_never_touches_the_network() {
    // Unroutable base URL: any live call would fail
    let config = mock_config(ProviderConfig::remove_bg("")).with_base_url("http://127.0.0.1:9");
    let service = MediaService::new(config).unwrap();
    let envelope = service.execute(&jpeg_request("x.jpg", 10)).await;
    assert!(envelope.success);
    assert_eq!(envelope.provider_meta.http_status, Some(200));
}

#[tokio::test(start_paused = true)]
async fn thumbnails_and_template_renders_run_as_jobs() {
    let service = MediaService::new(mock_config(ProviderConfig::shotstack(""))).unwrap();

    let thumbnail = Thumbnail::new("https://cdn.example.com/clip.mp4")
        .at(2.0)
        .into_request()
        .unwrap();
    let envelope = service.execute(&thumbnail).await;
    assert!(envelope.success, "{envelope:?}");
    let url = envelope.data_field("url").and_then(Value::as_str).unwrap();
    assert!(url.ends_with(".jpg"), "{url}");

    let template = TemplateRender::new("tmpl-7")
        .with_merge_field("NAME", "Ada")
        .into_request();
    let envelope = service.execute(&template).await;
    assert!(envelope.success, "{envelope:?}");
    assert_eq!(envelope.provider_meta.attempts, Some(3));
}
