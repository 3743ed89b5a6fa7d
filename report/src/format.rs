use crate::classify::Classification;
use crate::meta::{AudioMeta, VerificationInput};

/// Architecture name reported in the MODEL INFORMATION block.
pub const MODEL_ARCHITECTURE: &str = "ECAPA-TDNN";

/// Training corpus name reported in the MODEL INFORMATION block.
pub const MODEL_TRAINING_DATA: &str = "VoxCeleb";

/// Renders a plain-text forensic report for one completed analysis.
///
/// The document is line-oriented and intended for direct download as
/// `text/plain`: a header, the analysis timestamp, one metadata block per
/// clip, the analysis results (score to 6 decimal places), fixed model
/// metadata, and an interpretation sentence selected by tier.
///
/// Performs no I/O and cannot fail; invalid metadata (zero durations, zero
/// sample rates) is rendered verbatim.
pub fn format_report(input: &VerificationInput, classification: &Classification) -> String {
    let prediction = if input.same_prediction {
        "Same Speaker"
    } else {
        "Different Speakers"
    };

    format!(
        "VOICE MATCHER - ANALYSIS REPORT\n\
         =====================================\n\
         \n\
         Analysis Timestamp: {timestamp}\n\
         \n\
         SUSPECT AUDIO:\n\
         {suspect}\
         \n\
         EVIDENCE AUDIO:\n\
         {evidence}\
         \n\
         ANALYSIS RESULTS:\n\
         - Similarity Score: {score:.6}\n\
         - Classification: {label}\n\
         - Binary Prediction: {prediction}\n\
         \n\
         MODEL INFORMATION:\n\
         - Architecture: {arch}\n\
         - Training Data: {corpus}\n\
         - Threshold: 0.80\n\
         \n\
         INTERPRETATION:\n\
         {interpretation}\n",
        timestamp = input.analysis_timestamp.format("%Y-%m-%d %H:%M:%S"),
        suspect = file_block(&input.suspect),
        evidence = file_block(&input.evidence),
        score = input.similarity_score,
        label = classification.label,
        prediction = prediction,
        arch = MODEL_ARCHITECTURE,
        corpus = MODEL_TRAINING_DATA,
        interpretation = classification.tier.interpretation(),
    )
}

fn file_block(meta: &AudioMeta) -> String {
    format!(
        "- File: {}\n\
         - Duration: {:.3}s\n\
         - Sample Rate: {} Hz\n\
         - Channels: {}\n",
        meta.file_name, meta.duration_seconds, meta.sample_rate_hz, meta.channel_count
    )
}
