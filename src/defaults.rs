//! Default Configuration Values
//!
//! This module centralizes the per-provider limits, timeouts, and polling
//! budgets used by the configuration presets.

use std::time::Duration;

/// HTTP client default configurations
pub mod http {
    use super::*;

    /// Default connection timeout for establishing HTTP connections
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Default User-Agent string for HTTP requests
    pub const USER_AGENT: &str = concat!("moodreel/", env!("CARGO_PKG_VERSION"));

    /// Default maximum number of idle connections per host
    pub const MAX_IDLE_PER_HOST: usize = 10;
}

/// Mock mode defaults
pub mod mock {
    use super::*;

    /// Synthetic latency applied before a fixture is returned
    pub const DELAY: Duration = Duration::from_millis(300);

    /// Status queries after which a mock job reports `done`
    pub const COMPLETES_AFTER: u32 = 3;
}

/// Job polling fallback for providers without their own budget
pub mod poll {
    use super::*;

    pub const ATTEMPTS: u32 = 30;
    pub const INTERVAL: Duration = Duration::from_secs(2);
}

/// Remove.bg background removal
pub mod remove_bg {
    use super::*;

    pub const BASE_URL: &str = "https://api.remove.bg/v1.0";
    pub const TIMEOUT: Duration = Duration::from_secs(30);
    /// 12MB upload limit
    pub const MAX_FILE_BYTES: u64 = 12 * 1024 * 1024;
    pub const SUPPORTED_FORMATS: &[&str] = &["image/jpeg", "image/png", "image/webp"];
    /// One request per second
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);
    pub const MAX_PER_MINUTE: u32 = 50;
    pub const DEFAULT_FORMAT: &str = "png";
}

/// ElevenLabs text-to-speech
pub mod eleven_labs {
    use super::*;

    pub const BASE_URL: &str = "https://api.elevenlabs.io/v1";
    pub const TIMEOUT: Duration = Duration::from_secs(30);
    /// Character limit per request
    pub const MAX_TEXT_CHARS: u64 = 5000;
    pub const SUPPORTED_FORMATS: &[&str] = &["text/plain"];
    pub const DEFAULT_MODEL: &str = "eleven_monolingual_v1";
    /// Premade "Sarah" voice
    pub const DEFAULT_VOICE: &str = "EXAVITQu4vr4xnSDxMaL";
    pub const STABILITY: f64 = 0.75;
    pub const SIMILARITY_BOOST: f64 = 0.75;
    pub const STYLE: f64 = 0.0;
}

/// AssemblyAI transcription
pub mod assembly_ai {
    use super::*;

    pub const BASE_URL: &str = "https://api.assemblyai.com/v2";
    pub const TIMEOUT: Duration = Duration::from_secs(60);
    /// 512MB upload limit
    pub const MAX_FILE_BYTES: u64 = 512 * 1024 * 1024;
    pub const SUPPORTED_FORMATS: &[&str] = &[
        "audio/wav",
        "audio/mp3",
        "audio/mpeg",
        "audio/m4a",
        "audio/flac",
        "audio/ogg",
        "video/mp4",
        "video/webm",
    ];
    pub const DEFAULT_LANGUAGE: &str = "en_us";
    pub const POLL_ATTEMPTS: u32 = 60;
    pub const POLL_INTERVAL: Duration = Duration::from_secs(2);
}

/// Shotstack video rendering
pub mod shotstack {
    use super::*;

    pub const API_URL: &str = "https://api.shotstack.io";
    /// `stage` (sandbox) or `v1` (production)
    pub const STAGE: &str = "stage";
    pub const TIMEOUT: Duration = Duration::from_secs(60);
    /// Serialized timeline size limit
    pub const MAX_DOCUMENT_BYTES: u64 = 1024 * 1024;
    pub const SUPPORTED_FORMATS: &[&str] = &["application/json"];
    /// Five minutes
    pub const MAX_VIDEO_SECONDS: f64 = 300.0;
    pub const MAX_SLIDESHOW_SECONDS: f64 = 30.0;
    pub const SECONDS_PER_SLIDE: f64 = 3.0;
    pub const RESOLUTION: &str = "1920x1080";
    pub const FPS: u32 = 30;
    pub const FORMAT: &str = "mp4";
    pub const THUMBNAIL_FORMAT: &str = "jpg";
    pub const THUMBNAIL_OFFSET_SECONDS: f64 = 5.0;
    /// Clip length rendered for a single-frame thumbnail
    pub const THUMBNAIL_CLIP_SECONDS: f64 = 0.1;
    pub const POLL_ATTEMPTS: u32 = 60;
    pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
}

/// Stripe Checkout
pub mod stripe {
    use super::*;

    pub const BASE_URL: &str = "https://api.stripe.com";
    pub const TIMEOUT: Duration = Duration::from_secs(30);
    /// Price ids are short identifiers
    pub const MAX_PRICE_ID_CHARS: u64 = 255;
    pub const SUPPORTED_FORMATS: &[&str] = &["text/plain"];
    pub const SUCCESS_URL: &str = "https://example.com/vip/success?session_id={CHECKOUT_SESSION_ID}";
    pub const CANCEL_URL: &str = "https://example.com/vip";
}
