//! Configuration for voxbridge
//!
//! Resolution order: built-in defaults, then an optional TOML overlay
//! file, then `VOXBRIDGE_*` environment variables. All file fields are
//! optional so a config file only needs the values it changes.

use std::path::Path;

use serde::Deserialize;

use crate::{Error, Result};

/// Resolved voxbridge configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Transcription service settings
    pub stt: SttConfig,

    /// Speech synthesis settings
    pub tts: TtsConfig,
}

/// Transcription (STT) service settings
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Service host
    pub host: String,

    /// Service port
    pub port: u16,

    /// Total call timeout in seconds
    pub timeout_secs: u64,
}

/// Speech synthesis (TTS) settings
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// API base URL
    pub base_url: String,

    /// API key sent in the `X-API-Key` header
    pub api_key: String,

    /// Voice identifier
    pub voice: String,

    /// Language code for synthesis
    pub language: String,

    /// Requested output sample rate in Hz
    pub sample_rate: u32,

    /// Speech speed multiplier
    pub speed: f32,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            timeout_secs: 30,
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lmnt.com/v1/ai/speech".to_string(),
            api_key: String::new(),
            voice: "3de2b1eb-ace0-40e5-99b5-69522bf53a50".to_string(),
            language: "id".to_string(),
            sample_rate: 24000,
            speed: 1.0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stt: SttConfig::default(),
            tts: TtsConfig::default(),
        }
    }
}

/// Top-level TOML overlay schema
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    stt: SttFileConfig,
    #[serde(default)]
    tts: TtsFileConfig,
}

#[derive(Debug, Default, Deserialize)]
struct SttFileConfig {
    host: Option<String>,
    port: Option<u16>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TtsFileConfig {
    base_url: Option<String>,
    api_key: Option<String>,
    voice: Option<String>,
    language: Option<String>,
    sample_rate: Option<u32>,
    speed: Option<f32>,
}

impl Config {
    /// Load configuration from defaults, an optional TOML file, and the
    /// environment
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or an env
    /// override fails to parse
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = file {
            let raw = std::fs::read_to_string(path)?;
            let overlay: ConfigFile = toml::from_str(&raw)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
            config.apply_file(overlay);
            tracing::debug!(path = %path.display(), "applied config file");
        }

        config.apply_env()?;
        Ok(config)
    }

    fn apply_file(&mut self, file: ConfigFile) {
        if let Some(host) = file.stt.host {
            self.stt.host = host;
        }
        if let Some(port) = file.stt.port {
            self.stt.port = port;
        }
        if let Some(timeout) = file.stt.timeout_secs {
            self.stt.timeout_secs = timeout;
        }
        if let Some(url) = file.tts.base_url {
            self.tts.base_url = url;
        }
        if let Some(key) = file.tts.api_key {
            self.tts.api_key = key;
        }
        if let Some(voice) = file.tts.voice {
            self.tts.voice = voice;
        }
        if let Some(language) = file.tts.language {
            self.tts.language = language;
        }
        if let Some(rate) = file.tts.sample_rate {
            self.tts.sample_rate = rate;
        }
        if let Some(speed) = file.tts.speed {
            self.tts.speed = speed;
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("VOXBRIDGE_STT_HOST") {
            self.stt.host = host;
        }
        if let Ok(port) = std::env::var("VOXBRIDGE_STT_PORT") {
            self.stt.port = port
                .parse()
                .map_err(|_| Error::Config(format!("invalid VOXBRIDGE_STT_PORT: {port}")))?;
        }
        if let Ok(key) = std::env::var("VOXBRIDGE_TTS_API_KEY") {
            self.tts.api_key = key;
        }
        if let Ok(voice) = std::env::var("VOXBRIDGE_TTS_VOICE") {
            self.tts.voice = voice;
        }
        if let Ok(url) = std::env::var("VOXBRIDGE_TTS_URL") {
            self.tts.base_url = url;
        }
        if let Ok(language) = std::env::var("VOXBRIDGE_TTS_LANGUAGE") {
            self.tts.language = language;
        }
        Ok(())
    }
}
