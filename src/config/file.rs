//! JSON configuration file
//!
//! ```json
//! {
//!   "mode": "mock",
//!   "providers": {
//!     "remove_bg": { "api_key": "...", "timeout_ms": 20000 },
//!     "shotstack": { "base_url": "https://api.shotstack.io/v1" }
//!   }
//! }
//! ```
//!
//! Each entry overrides fields of the provider preset; the top-level `mode`
//! applies to every provider unless an entry sets its own.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{ProviderConfig, RateLimitConfig};
use crate::error::MediaError;
use crate::types::{Mode, ProviderId};

/// Field overrides for one provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub max_payload_bytes: Option<u64>,
    pub supported_input_kinds: Option<Vec<String>>,
    pub rate_limit: Option<RateLimitConfig>,
    pub mode: Option<Mode>,
    pub mock_delay_ms: Option<u64>,
    pub mock_completes_after: Option<u32>,
}

impl ProviderOverrides {
    /// Apply the overrides on top of `config`.
    pub fn apply(&self, mut config: ProviderConfig) -> ProviderConfig {
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(max) = self.max_payload_bytes {
            config = config.with_max_payload_bytes(max);
        }
        if let Some(kinds) = &self.supported_input_kinds {
            config = config.with_supported_input_kinds(kinds.iter().cloned());
        }
        if let Some(rate_limit) = &self.rate_limit {
            config = config.with_rate_limit(rate_limit.clone());
        }
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(ms) = self.mock_delay_ms {
            config.mock_delay_ms = ms;
        }
        if let Some(queries) = self.mock_completes_after {
            config = config.with_mock_completes_after(queries);
        }
        config
    }
}

/// Contents of a providers configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersFile {
    pub mode: Option<Mode>,
    #[serde(default)]
    pub providers: BTreeMap<ProviderId, ProviderOverrides>,
}

impl ProvidersFile {
    pub fn from_json_str(json: &str) -> Result<Self, MediaError> {
        serde_json::from_str(json)
            .map_err(|e| MediaError::ConfigurationError(format!("invalid providers file: {e}")))
    }

    /// Read and parse a providers file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, MediaError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            MediaError::ConfigurationError(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Validated configuration for `provider`: preset, then file-wide mode,
    /// then the provider's own overrides.
    pub fn config_for(&self, provider: ProviderId) -> Result<ProviderConfig, MediaError> {
        let mut config = ProviderConfig::preset(provider, String::new());
        if let Some(mode) = self.mode {
            config = config.with_mode(mode);
        }
        if let Some(overrides) = self.providers.get(&provider) {
            config = overrides.apply(config);
        }
        config.validate()?;
        Ok(config)
    }

    /// Configurations for every provider listed in the file.
    pub fn configs(&self) -> Result<Vec<ProviderConfig>, MediaError> {
        self.providers
            .keys()
            .map(|provider| self.config_for(*provider))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "mode": "mock",
        "providers": {
            "remove_bg": { "timeout_ms": 5000, "rate_limit": { "min_interval_ms": 250, "max_per_minute": null } },
            "eleven_labs": { "api_key": "xi", "mode": "live" }
        }
    }"#;

    #[test]
    fn overrides_apply_on_top_of_presets() {
        let file = ProvidersFile::from_json_str(SAMPLE).unwrap();

        let remove_bg = file.config_for(ProviderId::RemoveBg).unwrap();
        assert_eq!(remove_bg.mode, Mode::Mock);
        assert_eq!(remove_bg.timeout_ms, 5000);
        assert_eq!(remove_bg.rate_limit.min_interval_ms, 250);
        assert_eq!(remove_bg.rate_limit.max_per_minute, None);
        assert_eq!(remove_bg.max_payload_bytes, 12 * 1024 * 1024);

        let eleven = file.config_for(ProviderId::ElevenLabs).unwrap();
        assert_eq!(eleven.mode, Mode::Live);
        assert_eq!(eleven.api_key.expose_secret(), "xi");

        assert_eq!(file.configs().unwrap().len(), 2);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = ProvidersFile::from_json_str(r#"{"providers": {"stripe": {"apikey": "x"}}}"#)
            .unwrap_err();
        assert!(matches!(err, MediaError::ConfigurationError(_)));
    }

    #[tokio::test]
    async fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let loaded = ProvidersFile::load(file.path()).await.unwrap();
        assert_eq!(loaded.mode, Some(Mode::Mock));
        assert!(ProvidersFile::load("/nonexistent/providers.json").await.is_err());
    }
}
