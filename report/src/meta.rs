use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive metadata for one decoded audio clip.
///
/// Derived from the decoded waveform by the caller; this crate only reads it.
/// `total_samples` counts frames per channel, so for a stereo clip it is half
/// the raw sample count. Zero or missing values render as-is in the report
/// rather than being rejected, matching the permissive policy of
/// [`classify`](crate::classify()).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioMeta {
    pub file_name: String,
    pub size_bytes: u64,
    pub duration_seconds: f64,
    pub sample_rate_hz: u32,
    pub channel_count: u16,
    pub total_samples: u64,
}

/// Everything needed to render one analysis: the backend's raw outputs plus
/// the metadata of both clips. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationInput {
    /// Raw similarity score from the verification backend.
    pub similarity_score: f64,
    /// The backend's binary same/different-speaker decision.
    pub same_prediction: bool,
    pub suspect: AudioMeta,
    pub evidence: AudioMeta,
    pub analysis_timestamp: DateTime<Utc>,
}
