//! Core error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy reported in `ResultEnvelope::error`.
///
/// Every failure that leaves the crate through an envelope is reduced to one
/// of these kinds; callers branch on the kind and present the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    EmptyInput,
    UnsupportedFormat,
    PayloadTooLarge,
    InvalidRequest,
    AuthFailure,
    InsufficientCredits,
    RateLimited,
    ProviderUnavailable,
    ProviderReportedFailure,
    Timeout,
    Cancelled,
}

impl ErrorKind {
    /// Stable string form (matches the serde representation).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "EmptyInput",
            Self::UnsupportedFormat => "UnsupportedFormat",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::InvalidRequest => "InvalidRequest",
            Self::AuthFailure => "AuthFailure",
            Self::InsufficientCredits => "InsufficientCredits",
            Self::RateLimited => "RateLimited",
            Self::ProviderUnavailable => "ProviderUnavailable",
            Self::ProviderReportedFailure => "ProviderReportedFailure",
            Self::Timeout => "Timeout",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Whether the kind originates in local input validation.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::UnsupportedFormat | Self::PayloadTooLarge
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed rejection produced by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no input provided")]
    EmptyInput,

    #[error("unsupported format '{found}'; supported: {}", supported.join(", "))]
    UnsupportedFormat {
        found: String,
        supported: Vec<String>,
    },

    #[error("payload of {size} exceeds the {max} limit")]
    PayloadTooLarge { size: u64, max: u64 },
}

impl ValidationError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
        }
    }
}

/// Crate error type.
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    AuthFailure(String),

    #[error("Insufficient credits: {0}")]
    InsufficientCredits(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Provider reported failure: {0}")]
    ProviderReportedFailure(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Telemetry initialization error: {0}")]
    TelemetryInit(String),
}

impl MediaError {
    /// Reduce the error to its envelope kind.
    ///
    /// Undecodable provider responses count as the provider being unavailable;
    /// local misuse (unknown job id, unsupported operation, bad configuration)
    /// counts as an invalid request.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(v) => v.kind(),
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::PayloadTooLarge(_) => ErrorKind::PayloadTooLarge,
            Self::InvalidRequest(_)
            | Self::JobNotFound(_)
            | Self::ConfigurationError(_)
            | Self::UnsupportedOperation(_)
            | Self::TelemetryInit(_) => ErrorKind::InvalidRequest,
            Self::AuthFailure(_) => ErrorKind::AuthFailure,
            Self::InsufficientCredits(_) => ErrorKind::InsufficientCredits,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::ProviderUnavailable(_) | Self::ParseError(_) => ErrorKind::ProviderUnavailable,
            Self::ProviderReportedFailure(_) => ErrorKind::ProviderReportedFailure,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Cancelled(_) => ErrorKind::Cancelled,
        }
    }

    /// Errors worth another status query within the poll budget.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::RateLimited(_) | Self::ParseError(_)
        )
    }

    /// Build the error matching an envelope kind.
    pub fn from_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::EmptyInput => Self::Validation(ValidationError::EmptyInput),
            ErrorKind::UnsupportedFormat => Self::UnsupportedFormat(message),
            ErrorKind::PayloadTooLarge => Self::PayloadTooLarge(message),
            ErrorKind::InvalidRequest => Self::InvalidRequest(message),
            ErrorKind::AuthFailure => Self::AuthFailure(message),
            ErrorKind::InsufficientCredits => Self::InsufficientCredits(message),
            ErrorKind::RateLimited => Self::RateLimited(message),
            ErrorKind::ProviderUnavailable => Self::ProviderUnavailable(message),
            ErrorKind::ProviderReportedFailure => Self::ProviderReportedFailure(message),
            ErrorKind::Timeout => Self::Timeout(message),
            ErrorKind::Cancelled => Self::Cancelled(message),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, MediaError>;
