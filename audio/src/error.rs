use thiserror::Error;

/// Errors returned by WAV decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("not a RIFF/WAVE file")]
    NotRiff,

    #[error("missing '{0}' chunk")]
    MissingChunk(&'static str),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("truncated file: {0}")]
    Truncated(&'static str),
}
