//! Provider identity and execution mode

use serde::{Deserialize, Serialize};

/// Third-party services the crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    RemoveBg,
    ElevenLabs,
    AssemblyAi,
    Shotstack,
    Stripe,
}

impl ProviderId {
    pub const ALL: [ProviderId; 5] = [
        Self::RemoveBg,
        Self::ElevenLabs,
        Self::AssemblyAi,
        Self::Shotstack,
        Self::Stripe,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RemoveBg => "remove_bg",
            Self::ElevenLabs => "eleven_labs",
            Self::AssemblyAi => "assembly_ai",
            Self::Shotstack => "shotstack",
            Self::Stripe => "stripe",
        }
    }

    /// Prefix used for environment variables (`REMOVE_BG_API_KEY`, ...).
    pub const fn env_prefix(&self) -> &'static str {
        match self {
            Self::RemoveBg => "REMOVE_BG",
            Self::ElevenLabs => "ELEVENLABS",
            Self::AssemblyAi => "ASSEMBLYAI",
            Self::Shotstack => "SHOTSTACK",
            Self::Stripe => "STRIPE",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = crate::error::MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '.'], "_");
        match normalized.as_str() {
            "remove_bg" | "removebg" => Ok(Self::RemoveBg),
            "eleven_labs" | "elevenlabs" => Ok(Self::ElevenLabs),
            "assembly_ai" | "assemblyai" => Ok(Self::AssemblyAi),
            "shotstack" => Ok(Self::Shotstack),
            "stripe" => Ok(Self::Stripe),
            _ => Err(crate::error::MediaError::ConfigurationError(format!(
                "unknown provider '{s}'"
            ))),
        }
    }
}

/// How a service reaches its provider.
///
/// Set once on `ProviderConfig`; nothing switches modes at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Real HTTP calls.
    #[default]
    Live,
    /// Deterministic fixtures after a synthetic delay.
    Mock,
}

impl std::str::FromStr for Mode {
    type Err = crate::error::MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "mock" => Ok(Self::Mock),
            other => Err(crate::error::MediaError::ConfigurationError(format!(
                "invalid mode '{other}', expected 'live' or 'mock'"
            ))),
        }
    }
}
