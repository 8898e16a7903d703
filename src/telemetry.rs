//! Telemetry and tracing utilities
//!
//! Installs a `tracing-subscriber` fmt subscriber for the crate's log
//! targets (`moodreel::dispatch`, `moodreel::poll`, `moodreel::rate_limit`,
//! `moodreel::batch`, `moodreel::http`, `moodreel::config`).
//!
//! ## Example
//!
//! ```rust,ignore
//! use moodreel::telemetry::{init_subscriber, OutputFormat, SubscriberConfig};
//!
//! let config = SubscriberConfig::builder()
//!     .log_level(tracing::Level::DEBUG)
//!     .output_format(OutputFormat::Json)
//!     .build();
//! let _guard = init_subscriber(config)?;
//! ```

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;

use crate::error::MediaError;

pub const LOG_LEVEL_ENV_VAR: &str = "MOODREEL_LOG_LEVEL";
pub const LOG_FORMAT_ENV_VAR: &str = "MOODREEL_LOG_FORMAT";
pub const LOG_FILE_ENV_VAR: &str = "MOODREEL_LOG_FILE";

/// Output format for tracing logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format
    Json,
    /// Compact JSON format
    JsonCompact,
}

impl std::str::FromStr for OutputFormat {
    type Err = MediaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "json-compact" | "json_compact" => Ok(Self::JsonCompact),
            _ => Err(MediaError::TelemetryInit(format!(
                "Invalid log format: {s}. Valid options: text, json, json-compact"
            ))),
        }
    }
}

/// Configuration for tracing subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberConfig {
    pub log_level: tracing::Level,
    pub output_format: OutputFormat,
    /// Write to a file instead of stdout
    pub log_file: Option<PathBuf>,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            log_level: tracing::Level::INFO,
            output_format: OutputFormat::Text,
            log_file: None,
        }
    }
}

impl SubscriberConfig {
    pub fn builder() -> SubscriberConfigBuilder {
        SubscriberConfigBuilder::default()
    }

    pub fn debug() -> Self {
        Self {
            log_level: tracing::Level::DEBUG,
            ..Self::default()
        }
    }

    /// Warnings and above as JSON into `log_file`.
    pub fn production(log_file: PathBuf) -> Self {
        Self {
            log_level: tracing::Level::WARN,
            output_format: OutputFormat::Json,
            log_file: Some(log_file),
        }
    }

    /// Read `MOODREEL_LOG_LEVEL`, `MOODREEL_LOG_FORMAT` and
    /// `MOODREEL_LOG_FILE` through `lookup`.
    pub fn from_env_with<F>(lookup: F) -> Result<Self, MediaError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();
        if let Some(level) = lookup(LOG_LEVEL_ENV_VAR) {
            builder = builder.log_level_str(&level)?;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV_VAR) {
            builder = builder.output_format(format.parse()?);
        }
        if let Some(path) = lookup(LOG_FILE_ENV_VAR).filter(|p| !p.trim().is_empty()) {
            builder = builder.log_file(PathBuf::from(path));
        }
        Ok(builder.build())
    }
}

/// Builder for SubscriberConfig
#[derive(Debug, Default)]
pub struct SubscriberConfigBuilder {
    log_level: Option<tracing::Level>,
    output_format: Option<OutputFormat>,
    log_file: Option<PathBuf>,
}

impl SubscriberConfigBuilder {
    pub fn log_level(mut self, level: tracing::Level) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from a string
    pub fn log_level_str(mut self, level: &str) -> Result<Self, MediaError> {
        let parsed = match level.trim().to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "info" => tracing::Level::INFO,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => {
                return Err(MediaError::TelemetryInit(format!(
                    "Invalid log level: {level}. Valid options: trace, debug, info, warn, error"
                )));
            }
        };
        self.log_level = Some(parsed);
        Ok(self)
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn build(self) -> SubscriberConfig {
        SubscriberConfig {
            log_level: self.log_level.unwrap_or(tracing::Level::INFO),
            output_format: self.output_format.unwrap_or_default(),
            log_file: self.log_file,
        }
    }
}

fn filter_for(level: tracing::Level) -> String {
    format!("moodreel={}", level.as_str().to_lowercase())
}

fn try_init<W>(config: &SubscriberConfig, writer: W, ansi: bool) -> Result<(), MediaError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = filter_for(config.log_level);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(writer)
        .with_ansi(ansi);

    let init_result = match config.output_format {
        OutputFormat::Json => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .try_init(),
        OutputFormat::JsonCompact => builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .flatten_event(true)
            .try_init(),
        OutputFormat::Text => builder.try_init(),
    };

    match init_result {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_msg = e.to_string();
            if error_msg.contains("global default trace dispatcher has already been set")
                || error_msg.contains("logging system was already initialized")
            {
                // Another subscriber is installed; keep it
                Ok(())
            } else {
                Err(MediaError::TelemetryInit(format!(
                    "Failed to initialize tracing: {e}"
                )))
            }
        }
    }
}

fn split_log_path(path: &Path) -> Result<(PathBuf, std::ffi::OsString), MediaError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| {
            MediaError::TelemetryInit(format!("log file path has no file name: {}", path.display()))
        })?
        .to_os_string();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, file_name))
}

/// Initialize the tracing subscriber.
///
/// With a log file configured, events go through a non-blocking writer and
/// the returned guard must be kept alive to flush them. An already installed
/// global subscriber is left in place.
pub fn init_subscriber(config: SubscriberConfig) -> Result<Option<WorkerGuard>, MediaError> {
    match &config.log_file {
        Some(path) => {
            let (dir, file_name) = split_log_path(path)?;
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            try_init(&config, writer, false)?;
            Ok(Some(guard))
        }
        None => {
            try_init(&config, std::io::stdout, true)?;
            Ok(None)
        }
    }
}

pub fn init_default() -> Result<Option<WorkerGuard>, MediaError> {
    init_subscriber(SubscriberConfig::default())
}

pub fn init_debug() -> Result<Option<WorkerGuard>, MediaError> {
    init_subscriber(SubscriberConfig::debug())
}

/// Initialize from `MOODREEL_LOG_LEVEL`, `MOODREEL_LOG_FORMAT` and
/// `MOODREEL_LOG_FILE`.
pub fn init_from_env() -> Result<Option<WorkerGuard>, MediaError> {
    init_subscriber(SubscriberConfig::from_env_with(|name| {
        std::env::var(name).ok()
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn env_config_parses_all_variables() {
        let config = SubscriberConfig::from_env_with(lookup(&[
            ("MOODREEL_LOG_LEVEL", "debug"),
            ("MOODREEL_LOG_FORMAT", "json-compact"),
            ("MOODREEL_LOG_FILE", "/tmp/moodreel.log"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.output_format, OutputFormat::JsonCompact);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/moodreel.log")));
    }

    #[test]
    fn env_config_defaults_when_unset() {
        let config = SubscriberConfig::from_env_with(lookup(&[])).unwrap();
        assert_eq!(config, SubscriberConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let level = SubscriberConfig::from_env_with(lookup(&[("MOODREEL_LOG_LEVEL", "loud")]));
        assert!(matches!(level, Err(MediaError::TelemetryInit(_))));
        let format = SubscriberConfig::from_env_with(lookup(&[("MOODREEL_LOG_FORMAT", "xml")]));
        assert!(matches!(format, Err(MediaError::TelemetryInit(_))));
    }

    #[test]
    fn filter_targets_crate() {
        assert_eq!(filter_for(tracing::Level::WARN), "moodreel=warn");
    }

    #[test]
    fn log_path_is_split_into_dir_and_name() {
        let (dir, name) = split_log_path(Path::new("moodreel.log")).unwrap();
        assert_eq!(dir, PathBuf::from("."));
        assert_eq!(name, "moodreel.log");
        assert!(split_log_path(Path::new("/")).is_err());
    }

    #[test]
    fn init_tolerates_existing_subscriber() {
        let _first = init_default();
        assert!(init_default().is_ok());
    }
}
