//! Speech synthesis client for the LMNT-style TTS API
//!
//! Issues a JSON POST with an `X-API-Key` header and expects the raw WAV
//! body back, which is decoded before being returned to the caller.
//! Failed attempts (transport, non-2xx status, undecodable body) are
//! retried on a fixed delay up to the attempt budget.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::audio::{self, DecodedAudio};
use crate::{Error, Result};

/// Default synthesis endpoint
const DEFAULT_BASE_URL: &str = "https://api.lmnt.com/v1/ai/speech";

/// Total attempts per synthesize call
const MAX_ATTEMPTS: u32 = 3;

/// Fixed delay between attempts
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Request body for the synthesis API
#[derive(serde::Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    voice: &'a str,
    model: &'a str,
    language: &'a str,
    format: &'a str,
    sample_rate: u32,
    speed: f32,
    conversational: bool,
    top_p: f32,
    temperature: f32,
    return_durations: bool,
}

/// Synthesizes speech from text
///
/// At most one call may be in flight per instance; a second concurrent
/// call fails fast with [`Error::Busy`] instead of queueing.
#[derive(Debug)]
pub struct SpeechSynthesisClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice: String,
    language: String,
    sample_rate: u32,
    speed: f32,
    retry_delay: Duration,
    in_flight: AtomicBool,
}

/// Resets the in-flight flag when the call returns by any path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SpeechSynthesisClient {
    /// Create a new synthesis client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot
    /// be built
    pub fn new(api_key: impl Into<String>, voice: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::Config(
                "API key required for speech synthesis".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            voice: voice.into(),
            language: "id".to_string(),
            sample_rate: 24000,
            speed: 1.0,
            retry_delay: DEFAULT_RETRY_DELAY,
            in_flight: AtomicBool::new(false),
        })
    }

    /// Override the API base URL (used for tests and self-hosted gateways)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the synthesis language code
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Override the requested output sample rate
    #[must_use]
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Override the speech speed multiplier
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Override the delay between retry attempts
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Synthesize text to decoded PCM audio
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a call is already in flight, an input
    /// validation error for empty text, and [`Error::Synthesis`] carrying
    /// the last cause once all attempts are spent
    pub async fn synthesize(&self, text: &str) -> Result<DecodedAudio> {
        if text.is_empty() {
            return Err(Error::Config("text cannot be empty".to_string()));
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("synthesis already in flight, dropping call");
            return Err(Error::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let mut last_error = Error::Transport("no attempts made".to_string());
        for attempt in 1..=MAX_ATTEMPTS {
            match self.request_speech(text).await {
                Ok(audio) => {
                    tracing::info!(
                        attempt,
                        frames = audio.frames(),
                        sample_rate = audio.format.sample_rate,
                        "synthesis complete"
                    );
                    return Ok(audio);
                }
                Err(e) => {
                    tracing::warn!(attempt, max = MAX_ATTEMPTS, error = %e, "synthesis attempt failed");
                    last_error = e;
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Err(Error::Synthesis {
            attempts: MAX_ATTEMPTS,
            source: Box::new(last_error),
        })
    }

    /// One request/decode attempt
    async fn request_speech(&self, text: &str) -> Result<DecodedAudio> {
        let request = SynthesisRequest {
            text,
            voice: &self.voice,
            model: "blizzard",
            language: &self.language,
            format: "wav",
            sample_rate: self.sample_rate,
            speed: self.speed,
            conversational: false,
            top_p: 1.0,
            temperature: 1.0,
            return_durations: false,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("X-API-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("synthesis request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "synthesis API error {status}: {body}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(format!("synthesis body: {e}")))?;
        tracing::debug!(bytes = body.len(), "received audio data");

        // An undecodable body on a 2xx response is still a failed attempt
        audio::decode(&body)
    }
}
