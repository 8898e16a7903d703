//! Error Handling Module
//!
//! This module provides the error types shared by every stage of the pipeline:
//! - `ErrorKind`: the provider-agnostic taxonomy surfaced in result envelopes
//! - `MediaError`: the crate error type returned by fallible operations
//! - `ValidationError`: typed rejection reasons produced before any network call
//!
//! # Example
//!
//! ```rust,ignore
//! use moodreel::error::{ErrorKind, MediaError};
//!
//! let error = MediaError::RateLimited("slow down".into());
//! assert_eq!(error.kind(), ErrorKind::RateLimited);
//! assert!(error.is_transient());
//! ```

mod conversions;
pub mod types;

pub use types::*;
