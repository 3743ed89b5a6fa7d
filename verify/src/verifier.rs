use std::sync::Arc;

use serde::Serialize;

use crate::encoder::SpeakerEncoder;
use crate::VerifyError;

/// Cosine score at or above which two clips are predicted to be the same
/// speaker.
pub const DECISION_THRESHOLD: f64 = 0.80;

/// Raw output of one verification run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Verification {
    /// Cosine similarity of the two embeddings, in [-1, 1].
    pub score: f64,
    /// `score >= threshold`.
    pub same_speaker: bool,
}

/// Compares two clips with a shared [`SpeakerEncoder`].
#[derive(Clone)]
pub struct Verifier {
    encoder: Arc<dyn SpeakerEncoder>,
    threshold: f64,
}

impl Verifier {
    /// Creates a verifier with the standard 0.80 decision threshold.
    pub fn new(encoder: Arc<dyn SpeakerEncoder>) -> Self {
        Self::with_threshold(encoder, DECISION_THRESHOLD)
    }

    pub fn with_threshold(encoder: Arc<dyn SpeakerEncoder>, threshold: f64) -> Self {
        Self { encoder, threshold }
    }

    /// Embeds both clips and scores them.
    ///
    /// The score is passed through unclamped; downstream classification
    /// handles out-of-range values by contract.
    pub fn verify(
        &self,
        suspect: &[f32],
        suspect_rate_hz: u32,
        evidence: &[f32],
        evidence_rate_hz: u32,
    ) -> Result<Verification, VerifyError> {
        let a = self.encoder.embed(suspect, suspect_rate_hz)?;
        let b = self.encoder.embed(evidence, evidence_rate_hz)?;
        if a.len() != b.len() {
            return Err(VerifyError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }

        let score = cosine_similarity(&a, &b);
        Ok(Verification {
            score,
            same_speaker: score >= self.threshold,
        })
    }
}

/// Cosine similarity of two vectors, computed in f64.
/// Returns 0.0 if either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += x as f64 * y as f64;
        norm_a += x as f64 * x as f64;
        norm_b += y as f64 * y as f64;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom > 0.0 {
        dot / denom
    } else {
        0.0
    }
}
