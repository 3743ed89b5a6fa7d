//! WAV decoding for the voice comparison pipeline.
//!
//! Parses RIFF/WAVE containers and produces a mono f32 waveform in [-1, 1]
//! plus the stream parameters (sample rate, channel count, frame count)
//! that downstream metadata and reporting need.
//!
//! Only uncompressed WAV is handled here. Compressed containers (MP3, M4A,
//! FLAC) are expected to be transcoded to WAV before they reach this crate.

mod error;
mod wav;

pub use error::DecodeError;
pub use wav::{decode_wav, DecodedWav, WavInfo};
