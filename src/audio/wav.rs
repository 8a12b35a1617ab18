//! RIFF/WAVE codec for PCM audio
//!
//! The encoder always produces the canonical 44-byte header with 16-bit
//! PCM data, which is what the transcription service expects. The decoder
//! accepts 8/16/24/32-bit PCM and locates the `data` chunk by scanning
//! rather than trusting fixed offsets, since TTS responses have shipped
//! with extra chunks between the header and the payload.
//!
//! Known limitation: the `fmt ` fields (channels, sample rate, bit depth)
//! are still read at the canonical fixed offsets, so an extended `fmt `
//! chunk will misparse. The scan-for-`data` robustness is deliberately
//! asymmetric with this.

use crate::{Error, Result};

/// PCM stream parameters read from a WAV header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Number of interleaved channels
    pub channels: u16,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bit depth, one of 8/16/24/32
    pub bits_per_sample: u16,
}

impl PcmFormat {
    /// Bytes per frame (all channels at one time instant)
    #[must_use]
    pub fn bytes_per_frame(&self) -> usize {
        usize::from(self.bits_per_sample / 8) * usize::from(self.channels)
    }
}

/// Decoded PCM audio: format plus normalized interleaved samples
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Format read from the WAV header
    pub format: PcmFormat,
    /// Interleaved samples in [-1.0, 1.0], length = frames x channels
    pub samples: Vec<f32>,
}

impl DecodedAudio {
    /// Number of frames (samples per channel)
    #[must_use]
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.format.channels.max(1))
    }

    /// Playback duration in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        if self.format.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.format.sample_rate)
    }
}

/// Encode normalized `f32` samples as a 16-bit PCM WAV byte stream
///
/// Samples are interleaved by channel. Out-of-range input is clamped to
/// the `i16` range before conversion. An empty buffer produces a valid
/// header-only stream.
///
/// # Errors
///
/// Returns error if `channels` or `sample_rate` is zero
#[allow(clippy::cast_possible_truncation)]
pub fn encode(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    if channels == 0 {
        return Err(Error::Config("channel count must be positive".to_string()));
    }
    if sample_rate == 0 {
        return Err(Error::Config("sample rate must be positive".to_string()));
    }

    let data_len = samples.len() * 2;
    let block_align = u32::from(channels) * 2;
    let byte_rate = sample_rate * block_align;

    let mut out = Vec::with_capacity(44 + data_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&(block_align as u16).to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());

    for &sample in samples {
        let pcm = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        out.extend_from_slice(&pcm.to_le_bytes());
    }

    Ok(out)
}

/// Decode a WAV byte stream into normalized `f32` samples
///
/// Accepts 8/16/24/32-bit PCM, mono or multi-channel. The `data` chunk is
/// located by scanning from offset 36; its size field is ignored and the
/// payload runs to the end of the buffer. A trailing partial frame is
/// dropped.
///
/// # Errors
///
/// Returns [`Error::MalformedWav`] when the stream is shorter than a WAV
/// header, lacks the `RIFF` magic, declares an unsupported bit depth or
/// zero channels, or contains no `data` chunk
pub fn decode(bytes: &[u8]) -> Result<DecodedAudio> {
    if bytes.len() < 44 {
        return Err(Error::MalformedWav(format!(
            "too short: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != b"RIFF" {
        return Err(Error::MalformedWav(
            "bad magic: RIFF header not found".to_string(),
        ));
    }

    // Canonical 16-byte fmt chunk layout
    let channels = u16::from_le_bytes([bytes[22], bytes[23]]);
    let sample_rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let bits_per_sample = u16::from_le_bytes([bytes[34], bytes[35]]);

    if channels == 0 {
        return Err(Error::MalformedWav("zero channel count".to_string()));
    }
    if !matches!(bits_per_sample, 8 | 16 | 24 | 32) {
        return Err(Error::MalformedWav(format!(
            "unsupported bit depth: {bits_per_sample}"
        )));
    }

    let data_start = (36..bytes.len() - 4)
        .find(|&i| &bytes[i..i + 4] == b"data")
        .map(|i| i + 8) // skip tag and chunk-size field
        .ok_or_else(|| Error::MalformedWav("no data chunk".to_string()))?;

    let data_len = bytes.len().saturating_sub(data_start);
    let bytes_per_sample = usize::from(bits_per_sample / 8);
    let bytes_per_frame = bytes_per_sample * usize::from(channels);
    let frames = data_len / bytes_per_frame;

    tracing::debug!(
        channels,
        sample_rate,
        bits_per_sample,
        data_start,
        frames,
        "decoding wav stream"
    );

    let mut samples = vec![0.0f32; frames * usize::from(channels)];
    for frame in 0..frames {
        for ch in 0..usize::from(channels) {
            let byte_index = data_start + frame * bytes_per_frame + ch * bytes_per_sample;
            if byte_index + bytes_per_sample > bytes.len() {
                // Truncated payload; leave this sample at silence
                tracing::warn!(frame, channel = ch, "sample offset past end of buffer");
                continue;
            }
            samples[frame * usize::from(channels) + ch] =
                read_sample(&bytes[byte_index..], bits_per_sample);
        }
    }

    Ok(DecodedAudio {
        format: PcmFormat {
            channels,
            sample_rate,
            bits_per_sample,
        },
        samples,
    })
}

/// Read one little-endian sample and normalize to [-1.0, 1.0]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
fn read_sample(buf: &[u8], bits_per_sample: u16) -> f32 {
    match bits_per_sample {
        8 => (f32::from(buf[0]) - 128.0) / 128.0,
        16 => f32::from(i16::from_le_bytes([buf[0], buf[1]])) / 32_768.0,
        24 => {
            // Manual sign extension from the top byte
            let value =
                (i32::from(buf[2] as i8) << 16) | (i32::from(buf[1]) << 8) | i32::from(buf[0]);
            value as f32 / 8_388_608.0
        }
        32 => i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as f32 / 2_147_483_648.0,
        // Unreachable: bit depth is validated before sampling starts
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Header-only WAV with the bit-depth field patched, plus a raw payload
    fn wav_with_payload(bits: u16, channels: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = encode(&[], 24000, channels).unwrap();
        bytes[34..36].copy_from_slice(&bits.to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn rejects_short_buffer() {
        let err = decode(&[0u8; 43]).unwrap_err();
        assert!(matches!(&err, Error::MalformedWav(r) if r.contains("too short")), "{err}");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = encode(&[0.0; 4], 16000, 1).unwrap();
        bytes[3] = b'X';
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(&err, Error::MalformedWav(r) if r.contains("bad magic")), "{err}");
    }

    #[test]
    fn rejects_missing_data_chunk() {
        let mut bytes = encode(&[0.0; 4], 16000, 1).unwrap();
        bytes[36..40].copy_from_slice(b"LIST");
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(&err, Error::MalformedWav(r) if r.contains("no data chunk")), "{err}");
    }

    #[test]
    fn rejects_unsupported_bit_depth() {
        let bytes = wav_with_payload(12, 1, &[0u8; 6]);
        let err = decode(&bytes).unwrap_err();
        assert!(
            matches!(&err, Error::MalformedWav(r) if r.contains("unsupported bit depth")),
            "{err}"
        );
    }

    #[test]
    fn rejects_zero_channels() {
        let mut bytes = encode(&[0.0; 4], 16000, 1).unwrap();
        bytes[22..24].copy_from_slice(&0u16.to_le_bytes());
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedWav(_)), "{err}");
    }

    #[test]
    fn encode_rejects_zero_channels() {
        assert!(encode(&[0.0], 16000, 0).is_err());
        assert!(encode(&[0.0], 0, 1).is_err());
    }

    #[test]
    fn encode_header_layout() {
        let bytes = encode(&[0.25, -0.25], 16000, 1).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 36 + 4);
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(&bytes[12..16], b"fmt ");
        assert_eq!(u32::from_le_bytes(bytes[16..20].try_into().unwrap()), 16);
        assert_eq!(u16::from_le_bytes(bytes[20..22].try_into().unwrap()), 1);
        assert_eq!(u16::from_le_bytes(bytes[22..24].try_into().unwrap()), 1);
        assert_eq!(
            u32::from_le_bytes(bytes[24..28].try_into().unwrap()),
            16000
        );
        // byte rate = sample rate x block align
        assert_eq!(
            u32::from_le_bytes(bytes[28..32].try_into().unwrap()),
            32000
        );
        assert_eq!(u16::from_le_bytes(bytes[32..34].try_into().unwrap()), 2);
        assert_eq!(u16::from_le_bytes(bytes[34..36].try_into().unwrap()), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 4);
        assert_eq!(bytes.len(), 48);
    }

    #[test]
    fn encode_empty_is_header_only() {
        let bytes = encode(&[], 16000, 1).unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 0);
    }

    #[test]
    fn encode_clamps_out_of_range() {
        let bytes = encode(&[1.5, -1.5], 16000, 1).unwrap();
        let hi = i16::from_le_bytes(bytes[44..46].try_into().unwrap());
        let lo = i16::from_le_bytes(bytes[46..48].try_into().unwrap());
        assert_eq!(hi, i16::MAX);
        assert_eq!(lo, i16::MIN);
    }

    #[test]
    fn decode_8_bit_normalization() {
        let bytes = wav_with_payload(8, 1, &[0, 128, 255]);
        let audio = decode(&bytes).unwrap();

        assert_eq!(audio.format.bits_per_sample, 8);
        assert_eq!(audio.frames(), 3);
        assert_eq!(audio.samples[0], -1.0);
        assert_eq!(audio.samples[1], 0.0);
        assert_eq!(audio.samples[2], 127.0 / 128.0);
    }

    #[test]
    fn decode_16_bit_known_values() {
        let mut payload = Vec::new();
        for v in [0i16, 16384, -16384, i16::MAX, i16::MIN] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let bytes = wav_with_payload(16, 1, &payload);
        let audio = decode(&bytes).unwrap();

        assert_eq!(audio.samples, vec![0.0, 0.5, -0.5, 32767.0 / 32768.0, -1.0]);
    }

    #[test]
    fn decode_24_bit_sign_extension() {
        // LE triples: 0x800000 (min), 0x7FFFFF (max), -1
        let payload = [0x00, 0x00, 0x80, 0xFF, 0xFF, 0x7F, 0xFF, 0xFF, 0xFF];
        let bytes = wav_with_payload(24, 1, &payload);
        let audio = decode(&bytes).unwrap();

        assert_eq!(audio.samples[0], -1.0);
        assert_eq!(audio.samples[1], 8_388_607.0 / 8_388_608.0);
        assert_eq!(audio.samples[2], -1.0 / 8_388_608.0);
    }

    #[test]
    fn decode_32_bit_int() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&i32::MIN.to_le_bytes());
        payload.extend_from_slice(&0i32.to_le_bytes());
        payload.extend_from_slice(&(1i32 << 30).to_le_bytes());
        let bytes = wav_with_payload(32, 1, &payload);
        let audio = decode(&bytes).unwrap();

        assert_eq!(audio.samples, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn trailing_partial_frame_dropped() {
        // 5 payload bytes at 16-bit mono: two whole frames plus one stray byte
        let bytes = wav_with_payload(16, 1, &[0, 0, 0, 0, 7]);
        let audio = decode(&bytes).unwrap();
        assert_eq!(audio.frames(), 2);
    }

    #[test]
    fn stereo_interleaving_preserved() {
        // L/R pairs stay interleaved channel-major per frame
        let samples = vec![0.5, -0.5, 0.25, -0.25];
        let bytes = encode(&samples, 24000, 2).unwrap();
        let audio = decode(&bytes).unwrap();

        assert_eq!(audio.format.channels, 2);
        assert_eq!(audio.frames(), 2);
        for (got, want) in audio.samples.iter().zip(&samples) {
            assert!((got - want).abs() <= 1.0 / 32768.0, "{got} vs {want}");
        }
    }

    #[test]
    fn first_data_match_wins() {
        // A second "data" tag inside the payload must not shift the start
        let mut payload = Vec::new();
        payload.extend_from_slice(&1000i16.to_le_bytes());
        payload.extend_from_slice(b"data");
        payload.extend_from_slice(&2000i16.to_le_bytes());
        let bytes = wav_with_payload(16, 1, &payload);
        let audio = decode(&bytes).unwrap();

        assert_eq!(audio.frames(), 4);
        assert_eq!(audio.samples[0], 1000.0 / 32768.0);
    }
}
