//! Error types for voxbridge

use std::time::Duration;

use thiserror::Error;

/// Result type alias for voxbridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in voxbridge
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or input validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// WAV byte stream that cannot be decoded
    #[error("malformed wav: {0}")]
    MalformedWav(String),

    /// Transport failure on the transcription socket (connect/write/read)
    #[error("transport error: {0}")]
    Transport(String),

    /// Call exceeded its wait bound
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A call is already in flight on this client instance
    #[error("client busy: a call is already in flight")]
    Busy,

    /// Speech synthesis failed after exhausting the retry budget
    #[error("synthesis failed after {attempts} attempts: {source}")]
    Synthesis {
        /// Number of attempts made
        attempts: u32,
        /// Last underlying cause
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
