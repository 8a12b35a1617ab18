//! Voice transport module
//!
//! Clients for the local transcription service (raw TCP) and the cloud
//! synthesis API (HTTP). Both are one-shot, single-flight clients: each
//! call owns its buffers and a second call on a busy instance fails fast.

mod synthesize;
mod transcribe;

pub use synthesize::SpeechSynthesisClient;
pub use transcribe::TranscriptionClient;
