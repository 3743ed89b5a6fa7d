use thiserror::Error;

/// Errors returned by verification operations.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("audio too short: need at least {min_samples} samples, got {got_samples}")]
    AudioTooShort {
        min_samples: usize,
        got_samples: usize,
    },

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("encoder error: {0}")]
    Encoder(String),
}
