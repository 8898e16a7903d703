//! Environment-backed configuration
//!
//! Reads `<PROVIDER>_API_KEY`, `<PROVIDER>_BASE_URL`, `MOODREEL_MODE`, and for
//! Shotstack `SHOTSTACK_STAGE`. Only called when the application asks for it.

use super::{ProviderConfig, shotstack_base_url};
use crate::error::MediaError;
use crate::types::{Mode, ProviderId};

/// Selects `live` or `mock` for every provider loaded from the environment.
pub const MODE_ENV_VAR: &str = "MOODREEL_MODE";

/// Shotstack stage (`stage` or `v1`).
pub const SHOTSTACK_STAGE_ENV_VAR: &str = "SHOTSTACK_STAGE";

impl ProviderConfig {
    /// Load a provider configuration from process environment variables.
    pub fn from_env(provider: ProviderId) -> Result<Self, MediaError> {
        Self::from_env_with(provider, |name| std::env::var(name).ok())
    }

    /// Load a provider configuration through an arbitrary variable lookup.
    pub fn from_env_with<F>(provider: ProviderId, lookup: F) -> Result<Self, MediaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = provider.env_prefix();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(&format!("{prefix}_API_KEY")).unwrap_or_default();
        let mut config = Self::preset(provider, api_key);

        if provider == ProviderId::Shotstack
            && let Some(stage) = non_empty(SHOTSTACK_STAGE_ENV_VAR)
        {
            config = config.with_base_url(shotstack_base_url(&stage));
        }
        if let Some(base_url) = non_empty(&format!("{prefix}_BASE_URL")) {
            config = config.with_base_url(base_url);
        }
        if let Some(mode) = non_empty(MODE_ENV_VAR) {
            config = config.with_mode(mode.parse::<Mode>()?);
        }

        tracing::debug!(
            target: "moodreel::config",
            provider = %provider,
            mode = ?config.mode,
            base_url = %config.base_url,
            "loaded provider configuration from environment"
        );

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn reads_key_mode_and_base_url() {
        let config = ProviderConfig::from_env_with(
            ProviderId::RemoveBg,
            lookup(&[
                ("REMOVE_BG_API_KEY", "rb-key"),
                ("REMOVE_BG_BASE_URL", "http://localhost:8080/"),
                ("MOODREEL_MODE", "mock"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_key.expose_secret(), "rb-key");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.mode, Mode::Mock);
    }

    #[test]
    fn missing_key_in_live_mode_is_a_configuration_error() {
        let err = ProviderConfig::from_env_with(ProviderId::ElevenLabs, lookup(&[])).unwrap_err();
        assert!(matches!(err, MediaError::ConfigurationError(_)));
    }

    #[test]
    fn mock_mode_needs_no_key() {
        let config = ProviderConfig::from_env_with(
            ProviderId::AssemblyAi,
            lookup(&[("MOODREEL_MODE", "mock")]),
        )
        .unwrap();
        assert!(config.is_mock());
    }

    #[test]
    fn shotstack_stage_selects_environment() {
        let config = ProviderConfig::from_env_with(
            ProviderId::Shotstack,
            lookup(&[("SHOTSTACK_API_KEY", "k"), ("SHOTSTACK_STAGE", "v1")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.shotstack.io/v1");
    }

    #[test]
    fn bad_mode_is_rejected() {
        let err = ProviderConfig::from_env_with(
            ProviderId::Stripe,
            lookup(&[("STRIPE_API_KEY", "sk"), ("MOODREEL_MODE", "development")]),
        )
        .unwrap_err();
        assert!(matches!(err, MediaError::ConfigurationError(_)));
    }
}
