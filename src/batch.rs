//! Batch coordinator
//!
//! Runs a list of inputs through a single-item pipeline and collects one
//! result per input, in input order. A failed item never stops the rest.

use std::future::Future;

use futures::StreamExt;

use crate::types::{BatchItem, BatchResult, ResultEnvelope};

/// Process `inputs` one after another.
pub async fn run_batch<T, I, F, Fut>(inputs: Vec<T>, identify: I, pipeline: F) -> BatchResult
where
    I: Fn(&T) -> String,
    F: Fn(T) -> Fut,
    Fut: Future<Output = ResultEnvelope>,
{
    let total = inputs.len();
    tracing::info!(target: "moodreel::batch", total, "batch started");

    let mut items = Vec::with_capacity(total);
    for (index, input) in inputs.into_iter().enumerate() {
        let input_id = identify(&input);
        let envelope = pipeline(input).await;
        log_item(index, &input_id, &envelope);
        items.push(BatchItem {
            index,
            input_id,
            envelope,
        });
    }

    finish(items)
}

/// Process up to `limit` inputs concurrently; results keep input order.
pub async fn run_batch_buffered<T, I, F, Fut>(
    inputs: Vec<T>,
    limit: usize,
    identify: I,
    pipeline: F,
) -> BatchResult
where
    I: Fn(&T) -> String,
    F: Fn(T) -> Fut,
    Fut: Future<Output = ResultEnvelope>,
{
    let total = inputs.len();
    let limit = limit.max(1);
    tracing::info!(target: "moodreel::batch", total, limit, "buffered batch started");

    let items: Vec<BatchItem> = futures::stream::iter(inputs.into_iter().enumerate().map(
        |(index, input)| {
            let input_id = identify(&input);
            let pending = pipeline(input);
            async move {
                let envelope = pending.await;
                log_item(index, &input_id, &envelope);
                BatchItem {
                    index,
                    input_id,
                    envelope,
                }
            }
        },
    ))
    .buffered(limit)
    .collect()
    .await;

    finish(items)
}

fn log_item(index: usize, input_id: &str, envelope: &ResultEnvelope) {
    match envelope.error_kind() {
        None => {
            tracing::debug!(target: "moodreel::batch", index, input = %input_id, timing_ms = envelope.timing_ms, "item succeeded")
        }
        Some(kind) => {
            tracing::warn!(target: "moodreel::batch", index, input = %input_id, %kind, "item failed")
        }
    }
}

fn finish(items: Vec<BatchItem>) -> BatchResult {
    let result = BatchResult::from_items(items);
    tracing::info!(target: "moodreel::batch", processed = result.processed, failed = result.failed, total = result.total, "batch finished");
    result
}
