//! Configuration for the Arelia session core
//!
//! Layered load: built-in defaults, then an optional TOML file
//! (`~/.config/arelia/config.toml`), then `ARELIA_*` environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::{Error, Result};

/// Default chat endpoint URL
const DEFAULT_ENDPOINT: &str = "https://api.arelia.dev/chat";

/// Default fallback phrase shown when an exchange fails
const DEFAULT_FALLBACK: &str = "(Hmm... she doesn't seem to be around right now.)";

/// Default recognition locale
const DEFAULT_LOCALE: &str = "en-US";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default grace period before the capture stop decision, in milliseconds
const DEFAULT_GRACE_MS: u64 = 200;

/// How the endpoint delivers its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Newline-delimited `data:` event stream terminated by `[DONE]`
    #[default]
    Streaming,
    /// Legacy single JSON object `{ "reply": ... }`
    Single,
}

impl ResponseMode {
    /// Parse from a config string; unknown values fall back to streaming
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "single" | "json" => Self::Single,
            "streaming" | "stream" => Self::Streaming,
            other => {
                tracing::warn!(value = other, "unknown response mode, using streaming");
                Self::Streaming
            }
        }
    }
}

/// How the voice capture control is operated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// One activation starts capture, a second stops it
    #[default]
    Toggle,
    /// Capture runs while the control is held; slide outside to cancel
    PressHold,
}

impl InteractionMode {
    /// Parse from a config string; unknown values fall back to toggle
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "press-hold" | "press_hold" | "hold" => Self::PressHold,
            "toggle" => Self::Toggle,
            other => {
                tracing::warn!(value = other, "unknown interaction mode, using toggle");
                Self::Toggle
            }
        }
    }
}

/// Voice capture configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Enable voice input (the capability probe may still hide it)
    pub enabled: bool,

    /// Capture interaction mode
    pub mode: InteractionMode,

    /// Fixed recognition locale (e.g. "en-US")
    pub locale: String,

    /// Keyword hints biasing recognition toward the wake word
    pub hints: Vec<String>,

    /// Grace period between release and the stop decision
    pub grace: Duration,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: InteractionMode::default(),
            locale: DEFAULT_LOCALE.to_string(),
            hints: vec!["arelia".to_string()],
            grace: Duration::from_millis(DEFAULT_GRACE_MS),
        }
    }
}

/// Session core configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Chat endpoint URL
    pub endpoint: Url,

    /// Reply delivery mode
    pub response_mode: ResponseMode,

    /// Fixed phrase surfaced when an exchange fails
    pub fallback_phrase: String,

    /// Request timeout
    pub request_timeout: Duration,

    /// Voice capture configuration
    pub voice: VoiceConfig,
}

/// On-disk configuration file shape (all fields optional)
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    endpoint: Option<String>,
    response_mode: Option<String>,
    fallback_phrase: Option<String>,
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    voice: FileVoiceConfig,
}

#[derive(Debug, Default, Deserialize)]
struct FileVoiceConfig {
    enabled: Option<bool>,
    mode: Option<String>,
    locale: Option<String>,
    hints: Option<Vec<String>>,
    grace_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is valid"),
            response_mode: ResponseMode::default(),
            fallback_phrase: DEFAULT_FALLBACK.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            voice: VoiceConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, config file, then env overrides
    ///
    /// # Errors
    ///
    /// Returns error if the config file exists but cannot be parsed, or if
    /// a configured endpoint URL is invalid
    pub fn load() -> Result<Self> {
        let file = Self::load_file()?.unwrap_or_default();
        Self::from_sources(file)
    }

    /// Locate the config file (`ARELIA_CONFIG` overrides the XDG path)
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("ARELIA_CONFIG") {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("dev", "arelia", "arelia")
            .map(|d| d.config_dir().join("config.toml"))
    }

    fn load_file() -> Result<Option<FileConfig>> {
        let Some(path) = Self::config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let file: FileConfig = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        Ok(Some(file))
    }

    fn from_sources(file: FileConfig) -> Result<Self> {
        let defaults = Self::default();

        let endpoint_str = std::env::var("ARELIA_ENDPOINT")
            .ok()
            .or(file.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let endpoint = Url::parse(&endpoint_str)
            .map_err(|e| Error::Config(format!("invalid endpoint URL '{endpoint_str}': {e}")))?;

        let response_mode = std::env::var("ARELIA_RESPONSE_MODE")
            .ok()
            .or(file.response_mode)
            .map_or_else(ResponseMode::default, |s| ResponseMode::parse(&s));

        let fallback_phrase = std::env::var("ARELIA_FALLBACK")
            .ok()
            .or(file.fallback_phrase)
            .unwrap_or(defaults.fallback_phrase);

        let request_timeout = std::env::var("ARELIA_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .or(file.request_timeout_secs)
            .map_or(defaults.request_timeout, Duration::from_secs);

        let voice_defaults = VoiceConfig::default();
        let disable_voice = std::env::var("ARELIA_DISABLE_VOICE")
            .is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));
        let voice = VoiceConfig {
            enabled: !disable_voice && file.voice.enabled.unwrap_or(voice_defaults.enabled),
            mode: std::env::var("ARELIA_VOICE_MODE")
                .ok()
                .or(file.voice.mode)
                .map_or_else(InteractionMode::default, |s| InteractionMode::parse(&s)),
            locale: std::env::var("ARELIA_LOCALE")
                .ok()
                .or(file.voice.locale)
                .unwrap_or(voice_defaults.locale),
            hints: std::env::var("ARELIA_HINTS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|h| h.trim().to_string())
                        .filter(|h| !h.is_empty())
                        .collect()
                })
                .or(file.voice.hints)
                .unwrap_or(voice_defaults.hints),
            grace: std::env::var("ARELIA_GRACE_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(file.voice.grace_ms)
                .map_or(voice_defaults.grace, Duration::from_millis),
        };

        Ok(Self {
            endpoint,
            response_mode,
            fallback_phrase,
            request_timeout,
            voice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.response_mode, ResponseMode::Streaming);
        assert_eq!(config.voice.mode, InteractionMode::Toggle);
        assert_eq!(config.voice.grace, Duration::from_millis(200));
        assert!(!config.fallback_phrase.is_empty());
    }

    #[test]
    fn mode_parsing() {
        assert_eq!(ResponseMode::parse("single"), ResponseMode::Single);
        assert_eq!(ResponseMode::parse("STREAM"), ResponseMode::Streaming);
        assert_eq!(ResponseMode::parse("bogus"), ResponseMode::Streaming);

        assert_eq!(
            InteractionMode::parse("press-hold"),
            InteractionMode::PressHold
        );
        assert_eq!(InteractionMode::parse("toggle"), InteractionMode::Toggle);
        assert_eq!(InteractionMode::parse("bogus"), InteractionMode::Toggle);
    }

    #[test]
    fn file_config_parses() {
        let file: FileConfig = toml::from_str(
            r#"
            endpoint = "https://example.com/chat"
            response_mode = "single"

            [voice]
            mode = "press-hold"
            hints = ["arelia", "hey arelia"]
            grace_ms = 150
            "#,
        )
        .unwrap();

        assert_eq!(file.endpoint.as_deref(), Some("https://example.com/chat"));
        assert_eq!(file.voice.hints.as_deref().map(<[String]>::len), Some(2));
        assert_eq!(file.voice.grace_ms, Some(150));
    }
}
