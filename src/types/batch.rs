//! Batch results

use serde::{Deserialize, Serialize};

use super::ResultEnvelope;

/// One input's outcome within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    /// Position of the input in the submitted list
    pub index: usize,
    /// Caller-facing identifier (file name, text excerpt, URL)
    pub input_id: String,
    pub envelope: ResultEnvelope,
}

/// Ordered outcomes of a batch run.
///
/// `results` mirrors the input order and length; `processed + failed == total`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchResult {
    pub results: Vec<BatchItem>,
    pub processed: usize,
    pub failed: usize,
    pub total: usize,
}

impl BatchResult {
    /// Build from items already in input order.
    pub fn from_items(results: Vec<BatchItem>) -> Self {
        let processed = results.iter().filter(|r| r.envelope.success).count();
        let total = results.len();
        Self {
            results,
            processed,
            failed: total - processed,
            total,
        }
    }

    pub fn successes(&self) -> impl Iterator<Item = &BatchItem> {
        self.results.iter().filter(|r| r.envelope.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &BatchItem> {
        self.results.iter().filter(|r| !r.envelope.success)
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}
