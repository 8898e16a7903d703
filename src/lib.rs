//! # moodreel - typed orchestration for media processing APIs
//!
//! moodreel wraps heterogeneous third-party media services (Remove.bg,
//! ElevenLabs, AssemblyAI, Shotstack, Stripe Checkout) behind one pipeline:
//!
//! - **Validation** rejects bad input with a typed reason before any network call.
//! - **Rate limiting** spaces calls per provider.
//! - **Dispatch** talks HTTP in live mode or returns deterministic fixtures in mock mode.
//! - **Polling** drives job-based providers (renders, transcripts) to completion.
//! - **Batches** run many inputs with per-item failure isolation.
//!
//! Every call ends in a [`ResultEnvelope`](types::ResultEnvelope); callers
//! never see provider wire formats.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moodreel::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), MediaError> {
//!     let config = ProviderConfig::remove_bg("your-api-key").with_mode(Mode::Mock);
//!     let service = MediaService::new(config)?;
//!
//!     let photo = FileInput::from_path("photo.jpg").await?;
//!     let envelope = service.execute(&JobRequest::new(InputRef::File(photo))).await;
//!     println!("{}", serde_json::to_string_pretty(&envelope)?);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_code)]

pub mod batch;
pub mod config;
pub mod defaults;
pub mod dispatch;
pub mod error;
pub mod jobs;
pub mod poller;
pub mod providers;
pub mod rate_limit;
pub mod service;
pub mod telemetry;
pub mod types;
pub mod utils;
pub mod validation;

pub use config::{ProviderConfig, RateLimitConfig};
pub use error::{ErrorKind, MediaError, ValidationError};
pub use service::{MediaService, MediaServiceBuilder};

pub mod prelude {
    pub use crate::config::{ProviderConfig, ProvidersFile, RateLimitConfig};
    pub use crate::dispatch::Dispatched;
    pub use crate::error::{ErrorKind, MediaError, ValidationError};
    pub use crate::poller::PollPolicy;
    pub use crate::rate_limit::RateLimiter;
    pub use crate::service::{MediaService, MediaServiceBuilder};
    pub use crate::types::{
        BatchItem, BatchResult, FileInput, InputRef, JobHandle, JobRequest, JobStatus, Mode,
        ProviderId, ProviderMeta, ResultEnvelope,
    };
    pub use crate::utils::{CancelHandle, HttpInterceptor, LoggingInterceptor};

    #[cfg(feature = "shotstack")]
    pub use crate::providers::shotstack::{Slideshow, TemplateRender, Thumbnail};
}
