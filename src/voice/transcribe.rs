//! Transcription client for the local STT service
//!
//! Wire protocol: a `u32` little-endian length prefix followed by the raw
//! WAV bytes; the server answers with one newline-terminated UTF-8 line
//! containing the transcript. One request per connection, no pooling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::{Error, Result};

/// Default bound on a whole transcribe call
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One-shot RPC client for the transcription service
///
/// At most one call may be in flight per instance; a second concurrent
/// call fails fast with [`Error::Busy`] instead of queueing.
pub struct TranscriptionClient {
    host: String,
    port: u16,
    timeout: Duration,
    in_flight: AtomicBool,
}

/// Resets the in-flight flag when the call returns by any path
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TranscriptionClient {
    /// Create a client for the given service address
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Override the total call timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a WAV byte stream and return the transcript
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if a call is already in flight,
    /// [`Error::Timeout`] if the call exceeds its bound, and
    /// [`Error::Transport`] on connect/write/read failure or an empty
    /// reply
    pub async fn transcribe(&self, wav: &[u8]) -> Result<String> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("transcription already in flight, dropping call");
            return Err(Error::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);

        tracing::debug!(
            host = %self.host,
            port = self.port,
            wav_bytes = wav.len(),
            "starting transcription"
        );

        let transcript = tokio::time::timeout(self.timeout, self.request(wav))
            .await
            .map_err(|_| Error::Timeout(self.timeout))??;

        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }

    /// One request/response cycle on a fresh connection
    async fn request(&self, wav: &[u8]) -> Result<String> {
        let addr = (self.host.as_str(), self.port);
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| Error::Transport(format!("connect {}:{}: {e}", self.host, self.port)))?;

        #[allow(clippy::cast_possible_truncation)]
        let len = wav.len() as u32;
        stream
            .write_all(&len.to_le_bytes())
            .await
            .map_err(|e| Error::Transport(format!("write length prefix: {e}")))?;
        stream
            .write_all(wav)
            .await
            .map_err(|e| Error::Transport(format!("write payload: {e}")))?;
        stream
            .flush()
            .await
            .map_err(|e| Error::Transport(format!("flush: {e}")))?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| Error::Transport(format!("read response: {e}")))?;

        if read == 0 {
            return Err(Error::Transport("no response".to_string()));
        }

        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }
}
