//! Type Conversions for MediaError
//!
//! This module contains From trait implementations for converting
//! common error types into MediaError.

use super::types::MediaError;

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::ProviderUnavailable(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::ProviderUnavailable(format!("connection failed: {err}"))
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::ProviderUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MediaError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for MediaError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigurationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: MediaError = json_err.into();
        assert!(matches!(err, MediaError::ParseError(_)));
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    }

    #[tokio::test]
    async fn test_connection_refused_is_unavailable() {
        // Port 9 (discard) is closed on loopback in test environments.
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .unwrap_err();
        let err: MediaError = err.into();
        assert_eq!(err.kind(), ErrorKind::ProviderUnavailable);
    }
}
