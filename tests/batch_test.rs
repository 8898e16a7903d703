mod support;

use moodreel::prelude::*;
use support::{counting_mock_service, jpeg_request};

#[tokio::test(start_paused = true)]
async fn invalid_item_does_not_abort_the_batch() {
    let (service, adapter) = counting_mock_service(ProviderConfig::remove_bg("k"));
    let requests = vec![
        jpeg_request("A.jpg", 2048),
        JobRequest::new(InputRef::file("B.gif", "image/gif", vec![b'G'; 32])),
        jpeg_request("C.jpg", 4096),
    ];

    let result = service.run_batch(requests).await;

    assert_eq!(result.total, 3);
    assert_eq!(result.processed, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.processed + result.failed, result.total);

    let order: Vec<(usize, &str)> = result
        .results
        .iter()
        .map(|item| (item.index, item.input_id.as_str()))
        .collect();
    assert_eq!(order, [(0, "A.jpg"), (1, "B.gif"), (2, "C.jpg")]);

    assert!(result.results[0].envelope.success);
    assert_eq!(
        result.results[1].envelope.error_kind(),
        Some(ErrorKind::UnsupportedFormat)
    );
    assert!(result.results[2].envelope.success);
    assert_eq!(
        result.results[2].envelope.data_field("originalSize"),
        Some(&serde_json::json!(4096))
    );
    // B was rejected before dispatch
    assert_eq!(adapter.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn buffered_batch_matches_sequential_outcome() {
    let (service, _) = counting_mock_service(ProviderConfig::remove_bg("k"));
    let requests = || {
        vec![
            jpeg_request("A.jpg", 100),
            JobRequest::new(InputRef::file("B.gif", "image/gif", vec![b'G'; 32])),
            jpeg_request("C.jpg", 300),
        ]
    };

    let sequential = service.run_batch(requests()).await;
    let buffered = service.run_batch_buffered(requests(), 2).await;

    assert_eq!(buffered.total, sequential.total);
    assert_eq!(buffered.failed, sequential.failed);
    let ids = |r: &BatchResult| -> Vec<String> {
        r.results.iter().map(|i| i.input_id.clone()).collect()
    };
    assert_eq!(ids(&buffered), ids(&sequential));
    for (a, b) in buffered.results.iter().zip(&sequential.results) {
        assert_eq!(a.envelope.data, b.envelope.data);
    }
}

#[tokio::test(start_paused = true)]
async fn batch_of_jobs_polls_each_item() {
    let config = support::mock_config(ProviderConfig::assembly_ai(""));
    let service = MediaService::new(config).unwrap();
    let requests = vec![
        JobRequest::new(InputRef::url("https://cdn.example.com/one.mp3")),
        JobRequest::new(InputRef::url("https://cdn.example.com/two.wav")),
    ];

    let result = service.run_batch(requests).await;

    assert!(result.is_complete_success());
    assert!(result
        .results
        .iter()
        .all(|item| item.envelope.provider_meta.attempts == Some(3)));
}
