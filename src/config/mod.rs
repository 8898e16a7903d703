//! Provider Configuration
//!
//! `ProviderConfig` describes how to reach one provider: endpoint, key,
//! limits, rate limit, and whether calls go to the network or to fixtures.
//! Presets carry each provider's documented limits; builders override them.
//!
//! Configuration can come from code, from the environment (`env`), or from a
//! JSON overrides file (`file`). Mode is always an explicit field; nothing in
//! the crate inspects the environment on its own.

mod env;
mod file;

pub use env::{MODE_ENV_VAR, SHOTSTACK_STAGE_ENV_VAR};
pub use file::{ProviderOverrides, ProvidersFile};

use std::collections::BTreeSet;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::defaults;
use crate::error::MediaError;
use crate::utils::mime::canonical_mime;
pub use crate::types::{Mode, ProviderId};

/// Request spacing for one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Minimum gap between two dispatches; zero disables spacing
    pub min_interval_ms: u64,
    /// Optional cap on dispatches within any sliding 60s window
    #[validate(range(min = 1))]
    pub max_per_minute: Option<u32>,
}

impl RateLimitConfig {
    pub const fn unlimited() -> Self {
        Self {
            min_interval_ms: 0,
            max_per_minute: None,
        }
    }

    pub fn min_interval(min_interval: Duration) -> Self {
        Self {
            min_interval_ms: min_interval.as_millis() as u64,
            max_per_minute: None,
        }
    }

    pub const fn with_max_per_minute(mut self, max: u32) -> Self {
        self.max_per_minute = Some(max);
        self
    }

    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Per-provider configuration, constructed once at startup.
#[derive(Debug, Clone, Validate)]
pub struct ProviderConfig {
    pub provider: ProviderId,
    /// Base URL for the provider API
    #[validate(url)]
    pub base_url: String,
    /// API key (securely stored)
    pub api_key: SecretString,
    /// Per-request timeout in live mode
    #[validate(range(min = 1))]
    pub timeout_ms: u64,
    /// Byte limit for files and documents, character limit for text
    #[validate(range(min = 1))]
    pub max_payload_bytes: u64,
    /// Accepted media types (lowercase)
    pub supported_input_kinds: BTreeSet<String>,
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,
    pub mode: Mode,
    /// Synthetic latency before mock fixtures are returned
    pub mock_delay_ms: u64,
    /// Status queries after which a mock job completes
    #[validate(range(min = 1))]
    pub mock_completes_after: u32,
}

impl ProviderConfig {
    fn base(
        provider: ProviderId,
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
        max_payload_bytes: u64,
        kinds: &[&str],
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            provider,
            base_url: base_url.to_string(),
            api_key: SecretString::from(api_key.into()),
            timeout_ms: timeout.as_millis() as u64,
            max_payload_bytes,
            supported_input_kinds: kinds.iter().map(|k| k.to_string()).collect(),
            rate_limit,
            mode: Mode::Live,
            mock_delay_ms: defaults::mock::DELAY.as_millis() as u64,
            mock_completes_after: defaults::mock::COMPLETES_AFTER,
        }
    }

    /// Remove.bg: 12MB JPEG/PNG/WebP, one request per second, 50 per minute.
    pub fn remove_bg(api_key: impl Into<String>) -> Self {
        use defaults::remove_bg as d;
        Self::base(
            ProviderId::RemoveBg,
            d::BASE_URL,
            api_key,
            d::TIMEOUT,
            d::MAX_FILE_BYTES,
            d::SUPPORTED_FORMATS,
            RateLimitConfig::min_interval(d::MIN_INTERVAL).with_max_per_minute(d::MAX_PER_MINUTE),
        )
    }

    /// ElevenLabs: plain text up to 5000 characters.
    pub fn eleven_labs(api_key: impl Into<String>) -> Self {
        use defaults::eleven_labs as d;
        Self::base(
            ProviderId::ElevenLabs,
            d::BASE_URL,
            api_key,
            d::TIMEOUT,
            d::MAX_TEXT_CHARS,
            d::SUPPORTED_FORMATS,
            RateLimitConfig::unlimited(),
        )
    }

    /// AssemblyAI: audio/video files up to 512MB, or remote URLs.
    pub fn assembly_ai(api_key: impl Into<String>) -> Self {
        use defaults::assembly_ai as d;
        Self::base(
            ProviderId::AssemblyAi,
            d::BASE_URL,
            api_key,
            d::TIMEOUT,
            d::MAX_FILE_BYTES,
            d::SUPPORTED_FORMATS,
            RateLimitConfig::unlimited(),
        )
    }

    /// Shotstack: JSON render documents against the `stage` environment.
    pub fn shotstack(api_key: impl Into<String>) -> Self {
        use defaults::shotstack as d;
        Self::base(
            ProviderId::Shotstack,
            &shotstack_base_url(d::STAGE),
            api_key,
            d::TIMEOUT,
            d::MAX_DOCUMENT_BYTES,
            d::SUPPORTED_FORMATS,
            RateLimitConfig::unlimited(),
        )
    }

    /// Stripe Checkout: price ids as text.
    pub fn stripe(api_key: impl Into<String>) -> Self {
        use defaults::stripe as d;
        Self::base(
            ProviderId::Stripe,
            d::BASE_URL,
            api_key,
            d::TIMEOUT,
            d::MAX_PRICE_ID_CHARS,
            d::SUPPORTED_FORMATS,
            RateLimitConfig::unlimited(),
        )
    }

    /// Preset for any provider.
    pub fn preset(provider: ProviderId, api_key: impl Into<String>) -> Self {
        match provider {
            ProviderId::RemoveBg => Self::remove_bg(api_key),
            ProviderId::ElevenLabs => Self::eleven_labs(api_key),
            ProviderId::AssemblyAi => Self::assembly_ai(api_key),
            ProviderId::Shotstack => Self::shotstack(api_key),
            ProviderId::Stripe => Self::stripe(api_key),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = SecretString::from(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub const fn with_max_payload_bytes(mut self, max: u64) -> Self {
        self.max_payload_bytes = max;
        self
    }

    pub fn with_supported_input_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_input_kinds = kinds
            .into_iter()
            .map(|k| canonical_mime(&k.into()))
            .collect();
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_mock_delay(mut self, delay: Duration) -> Self {
        self.mock_delay_ms = delay.as_millis() as u64;
        self
    }

    pub const fn with_mock_completes_after(mut self, queries: u32) -> Self {
        self.mock_completes_after = queries;
        self
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub const fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }

    pub const fn is_mock(&self) -> bool {
        matches!(self.mode, Mode::Mock)
    }

    pub fn supports_kind(&self, kind: &str) -> bool {
        let kind = canonical_mime(kind);
        self.supported_input_kinds
            .iter()
            .any(|supported| canonical_mime(supported) == kind)
    }

    pub(crate) fn expose_api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Build the URL for an endpoint path (leading slash optional).
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), MediaError> {
        Validate::validate(self)?;

        if self.supported_input_kinds.is_empty() {
            return Err(MediaError::ConfigurationError(format!(
                "{} accepts no input kinds",
                self.provider
            )));
        }

        if self.mode == Mode::Live && self.api_key.expose_secret().trim().is_empty() {
            return Err(MediaError::ConfigurationError(format!(
                "{} API key cannot be empty in live mode",
                self.provider
            )));
        }

        Ok(())
    }
}

/// Shotstack endpoints are namespaced by stage (`stage` or `v1`).
pub fn shotstack_base_url(stage: &str) -> String {
    format!("{}/{}", defaults::shotstack::API_URL, stage.trim_matches('/'))
}
