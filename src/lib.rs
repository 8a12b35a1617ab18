//! voxbridge - audio codec and transport bridge for voice assistants
//!
//! This library provides the audio pipeline between a character assistant
//! and its speech services:
//! - WAV encode/decode (RIFF/WAVE containers, PCM only)
//! - A length-prefixed TCP client for a local transcription service
//! - A retrying HTTP client for a cloud speech synthesis API
//!
//! # Data flow
//!
//! ```text
//! captured samples ──► audio::encode ──► TranscriptionClient ──► transcript
//! text ──► SpeechSynthesisClient ──► audio::decode ──► playback samples
//! ```
//!
//! All operations are one-shot: each call owns its buffers exclusively
//! and no state persists between calls.

pub mod audio;
pub mod config;
pub mod error;
pub mod voice;

pub use audio::{DecodedAudio, PcmFormat};
pub use config::{Config, SttConfig, TtsConfig};
pub use error::{Error, Result};
pub use voice::{SpeechSynthesisClient, TranscriptionClient};
