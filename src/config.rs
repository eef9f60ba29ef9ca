//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides. The
//! browser build only uses the defaults and the API base URL.

use serde::Deserialize;
use std::time::Duration;

#[cfg(feature = "native")]
use std::path::{Path, PathBuf};

use crate::poll::PollPolicy;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub polling: PollingConfig,

    #[serde(default)]
    pub recording: RecordingConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Status polling schedules
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_message_interval")]
    pub message_interval_ms: u64,

    #[serde(default = "default_message_attempts")]
    pub message_max_attempts: u32,

    #[serde(default = "default_chat_interval")]
    pub chat_interval_ms: u64,

    /// `None` polls until the chat leaves `processing`
    #[serde(default = "default_chat_attempts")]
    pub chat_max_attempts: Option<u32>,

    #[serde(default = "default_voice_interval")]
    pub voice_interval_ms: u64,

    #[serde(default)]
    pub voice_max_attempts: Option<u32>,

    /// Wait after a voice clone completes before its responses are listed
    #[serde(default = "default_responses_delay")]
    pub voice_responses_delay_ms: u64,
}

fn default_message_interval() -> u64 {
    3000
}

fn default_message_attempts() -> u32 {
    60 // ~3 minutes
}

fn default_chat_interval() -> u64 {
    2000
}

fn default_chat_attempts() -> Option<u32> {
    Some(300) // ~10 minutes
}

fn default_voice_interval() -> u64 {
    2000
}

fn default_responses_delay() -> u64 {
    25_000
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            message_interval_ms: default_message_interval(),
            message_max_attempts: default_message_attempts(),
            chat_interval_ms: default_chat_interval(),
            chat_max_attempts: default_chat_attempts(),
            voice_interval_ms: default_voice_interval(),
            voice_max_attempts: None,
            voice_responses_delay_ms: default_responses_delay(),
        }
    }
}

impl PollingConfig {
    /// Reply generation: first check immediately
    pub fn message_policy(&self) -> PollPolicy {
        PollPolicy::every(Duration::from_millis(self.message_interval_ms))
            .max_attempts(self.message_max_attempts)
    }

    /// Chat readiness: first check after one interval
    pub fn chat_policy(&self) -> PollPolicy {
        let interval = Duration::from_millis(self.chat_interval_ms);
        let policy = PollPolicy::every(interval).initial_delay(interval);
        match self.chat_max_attempts {
            Some(max) => policy.max_attempts(max),
            None => policy,
        }
    }

    pub fn voice_policy(&self) -> PollPolicy {
        let policy = PollPolicy::every(Duration::from_millis(self.voice_interval_ms));
        match self.voice_max_attempts {
            Some(max) => policy.max_attempts(max),
            None => policy,
        }
    }

    pub fn voice_responses_delay(&self) -> Duration {
        Duration::from_millis(self.voice_responses_delay_ms)
    }
}

/// Microphone capture and analyser settings
#[derive(Debug, Clone, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_max_seconds")]
    pub max_seconds: u32,

    #[serde(default = "default_fft_size")]
    pub fft_size: u32,

    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    #[serde(default = "default_min_decibels")]
    pub min_decibels: f64,

    #[serde(default = "default_max_decibels")]
    pub max_decibels: f64,

    #[serde(default = "default_mime_type")]
    pub mime_type: String,

    /// Dictation language for the chat input
    #[serde(default = "default_speech_lang")]
    pub speech_lang: String,
}

fn default_max_seconds() -> u32 {
    60
}

fn default_fft_size() -> u32 {
    2048
}

fn default_smoothing() -> f64 {
    0.8
}

fn default_min_decibels() -> f64 {
    -90.0
}

fn default_max_decibels() -> f64 {
    -10.0
}

fn default_mime_type() -> String {
    "audio/wav".to_string()
}

fn default_speech_lang() -> String {
    "ru-RU".to_string()
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_seconds: default_max_seconds(),
            fft_size: default_fft_size(),
            smoothing: default_smoothing(),
            min_decibels: default_min_decibels(),
            max_decibels: default_max_decibels(),
            mime_type: default_mime_type(),
            speech_lang: default_speech_lang(),
        }
    }
}

/// Auth token persistence
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Token file for the CLI; defaults to `<data dir>/tween/auth_token`
    pub token_path: Option<String>,
}

#[cfg(feature = "native")]
impl SessionConfig {
    pub fn token_file(&self) -> PathBuf {
        match &self.token_path {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .map(|p| p.join("tween"))
                .unwrap_or_else(|| PathBuf::from("./.tween"))
                .join("auth_token"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(feature = "native")]
impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tween").join("config.toml")),
            Some(PathBuf::from("./tween.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("TWEEN_API_BASE_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("TWEEN_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.api.request_timeout_secs = t;
            }
        }

        if let Ok(path) = std::env::var("TWEEN_TOKEN_PATH") {
            self.session.token_path = Some(path);
        }

        if let Ok(level) = std::env::var("TWEEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TWEEN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io {
        path: std::path::PathBuf,
        error: String,
    },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse {
        path: std::path::PathBuf,
        error: String,
    },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Digital Tween Configuration
#
# Environment variables override these settings:
# - TWEEN_API_BASE_URL
# - TWEEN_REQUEST_TIMEOUT_SECS
# - TWEEN_TOKEN_PATH
# - TWEEN_LOG_LEVEL
# - TWEEN_LOG_FORMAT

[api]
# Backend base URL
base_url = "http://localhost:3000"

# Request timeout in seconds
request_timeout_secs = 30

[polling]
# Reply video generation: check every 3s, give up after 60 checks
message_interval_ms = 3000
message_max_attempts = 60

# Chat readiness after persona creation
chat_interval_ms = 2000
chat_max_attempts = 300

# Voice clone jobs (no cap unless voice_max_attempts is set)
voice_interval_ms = 2000
# voice_max_attempts = 150

# Wait after a clone completes before listing its responses (ms)
voice_responses_delay_ms = 25000

[recording]
# Hard ceiling for a voice sample
max_seconds = 60

# Analyser settings
fft_size = 2048
smoothing = 0.8
min_decibels = -90.0
max_decibels = -10.0

# Type of the finished recording
mime_type = "audio/wav"

# Dictation language for the chat input
speech_lang = "ru-RU"

[session]
# Where the CLI keeps the auth token
# token_path = "~/.local/share/tween/auth_token"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(all(test, feature = "native"))]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_generated_template() {
        let generated = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(generated.api.base_url, defaults.api.base_url);
        assert_eq!(generated.polling.message_max_attempts, 60);
        assert_eq!(generated.polling.chat_max_attempts, Some(300));
        assert_eq!(generated.polling.voice_max_attempts, None);
        assert_eq!(generated.recording.max_seconds, 60);
        assert_eq!(generated.recording.fft_size, 2048);
        assert_eq!(generated.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api]\nbase_url = \"https://tween.example/\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.api.base(), "https://tween.example");
        assert_eq!(config.polling.message_interval_ms, 3000);
        assert_eq!(config.recording.mime_type, "audio/wav");
    }

    #[test]
    fn test_parse_error_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = 1").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_poll_policies() {
        let polling = PollingConfig::default();

        let message = polling.message_policy();
        assert_eq!(message.max_attempts, Some(60));
        assert_eq!(message.initial_delay, Duration::ZERO);

        let chat = polling.chat_policy();
        assert_eq!(chat.initial_delay, Duration::from_secs(2));
        assert_eq!(chat.max_attempts, Some(300));

        assert_eq!(polling.voice_policy().max_attempts, None);
    }
}
