//! The analysis pipeline shared by the CLI and the HTTP server:
//! decode both clips, verify, classify, render the report.

use chrono::{DateTime, Utc};
use serde::Serialize;
use voicematch_audio::{decode_wav, DecodeError, DecodedWav};
use voicematch_report::{classify, format_report, AudioMeta, MatchTier, VerificationInput};
use voicematch_verify::{Verifier, VerifyError};

/// Pipeline failures, tagged with the clip they came from where relevant.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("{which} audio: {source}")]
    Decode {
        which: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("verification failed: {0}")]
    Verify(#[from] VerifyError),
}

/// One completed analysis, ready for JSON serialization or printing.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub similarity_score: f64,
    pub same_prediction: bool,
    pub tier: MatchTier,
    pub label: String,
    pub color_token: String,
    pub suspect: AudioMeta,
    pub evidence: AudioMeta,
    pub analysis_timestamp: DateTime<Utc>,
    /// Plain-text forensic report, offered to the user as a download.
    pub report: String,
}

/// Runs the full pipeline over two in-memory WAV files.
pub fn analyze(
    verifier: &Verifier,
    suspect_name: &str,
    suspect_bytes: &[u8],
    evidence_name: &str,
    evidence_bytes: &[u8],
) -> Result<Analysis, AnalysisError> {
    let suspect_wav = decode_wav(suspect_bytes).map_err(|source| AnalysisError::Decode {
        which: "suspect",
        source,
    })?;
    let evidence_wav = decode_wav(evidence_bytes).map_err(|source| AnalysisError::Decode {
        which: "evidence",
        source,
    })?;

    let verification = verifier.verify(
        &suspect_wav.samples,
        suspect_wav.info.sample_rate_hz,
        &evidence_wav.samples,
        evidence_wav.info.sample_rate_hz,
    )?;

    let input = VerificationInput {
        similarity_score: verification.score,
        same_prediction: verification.same_speaker,
        suspect: audio_meta(suspect_name, suspect_bytes.len() as u64, &suspect_wav),
        evidence: audio_meta(evidence_name, evidence_bytes.len() as u64, &evidence_wav),
        analysis_timestamp: Utc::now(),
    };
    let classification = classify(input.similarity_score);
    let report = format_report(&input, &classification);

    Ok(Analysis {
        similarity_score: input.similarity_score,
        same_prediction: input.same_prediction,
        tier: classification.tier,
        label: classification.label,
        color_token: classification.color_token,
        suspect: input.suspect,
        evidence: input.evidence,
        analysis_timestamp: input.analysis_timestamp,
        report,
    })
}

fn audio_meta(file_name: &str, size_bytes: u64, wav: &DecodedWav) -> AudioMeta {
    AudioMeta {
        file_name: file_name.to_string(),
        size_bytes,
        duration_seconds: wav.info.duration_seconds(),
        sample_rate_hz: wav.info.sample_rate_hz,
        channel_count: wav.info.channels,
        total_samples: wav.info.frames,
    }
}
