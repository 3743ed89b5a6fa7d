//! Speaker verification: are two voice clips the same speaker?
//!
//! # Architecture
//!
//! The pipeline compares clips in three stages:
//!
//! 1. [`Fbank::compute`]: mono f32 waveform -> log mel filterbank frames
//! 2. [`SpeakerEncoder::embed`]: waveform -> fixed-length embedding vector
//! 3. [`Verifier::verify`]: two embeddings -> cosine score + binary decision
//!
//! The score is the raw cosine similarity of the two embeddings, so its
//! range is [-1, 1]; the binary decision applies the 0.80 threshold.
//!
//! [`SpeakerEncoder`] is the seam for real embedding models. The built-in
//! [`FbankEncoder`] pools filterbank statistics (per-bin mean and standard
//! deviation) into a unit-length vector; it is deterministic and needs no
//! model weights, which makes the pipeline runnable end to end, but it is a
//! spectral fingerprint rather than a trained speaker representation.

mod encoder;
mod error;
pub mod fbank;
mod verifier;

pub use encoder::{FbankEncoder, SpeakerEncoder};
pub use error::VerifyError;
pub use fbank::{l2_normalize, Fbank, FbankConfig};
pub use verifier::{cosine_similarity, Verification, Verifier, DECISION_THRESHOLD};
