//! Core data types
//!
//! Provider-agnostic request, job, and result types. Callers only ever see
//! these; provider wire formats stay inside the adapters.

pub mod batch;
pub mod envelope;
pub mod input;
pub mod job;
pub mod provider;

pub use batch::{BatchItem, BatchResult};
pub use envelope::{EnvelopeError, ProviderMeta, ResultEnvelope};
pub use input::{FileInput, InputRef, JobRequest, TEXT_MEDIA_TYPE};
pub use job::{JobHandle, JobStatus, StatusReport};
pub use provider::{Mode, ProviderId};
