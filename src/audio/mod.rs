//! Audio codec module
//!
//! WAV container encode/decode for the STT and TTS bridges. Capture and
//! playback devices are out of scope; callers hand in and receive plain
//! interleaved `f32` sample buffers.

mod wav;

pub use wav::{DecodedAudio, PcmFormat, decode, encode};
