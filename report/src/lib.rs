//! Verification result classification and report formatting.
//!
//! This crate is the presentation-independent tail of the voice comparison
//! pipeline. It takes the raw similarity score produced by a speaker
//! verification backend and turns it into:
//!
//! 1. [`classify`]: score -> [`Classification`] (tier, label, color token)
//! 2. [`format_report`]: full analysis -> plain-text forensic report
//!
//! Both operations are pure functions with no I/O and no error conditions.
//! Scores are classified into three tiers by fixed thresholds:
//!
//! ```text
//! score <  0.60          No Match        (red)
//! 0.60 <= score < 0.80   Possible Match  (orange)
//! score >= 0.80          Strong Match    (green)
//! ```
//!
//! Scores are not clamped or validated: out-of-range values from the backend
//! classify through the same comparisons. Callers that need strict [0, 1]
//! bounds must enforce them upstream.

mod classify;
mod format;
mod meta;

pub use classify::{
    classify, Classification, MatchTier, POSSIBLE_MATCH_THRESHOLD, STRONG_MATCH_THRESHOLD,
};
pub use format::{format_report, MODEL_ARCHITECTURE, MODEL_TRAINING_DATA};
pub use meta::{AudioMeta, VerificationInput};
