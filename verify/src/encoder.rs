use crate::fbank::{l2_normalize, Fbank, FbankConfig};
use crate::VerifyError;

/// Minimum clip length in milliseconds for a meaningful embedding.
const MIN_CLIP_MS: usize = 400;

/// Extracts speaker embedding vectors from decoded audio.
///
/// The input is a mono f32 waveform in [-1, 1] at an arbitrary sample rate.
/// The output is a dense f32 vector whose dimensionality is returned by
/// [`SpeakerEncoder::dimension`]. Implementations must be safe for
/// concurrent use; an HTTP server shares one encoder across requests.
pub trait SpeakerEncoder: Send + Sync {
    /// Computes a speaker embedding from a mono waveform.
    fn embed(&self, samples: &[f32], sample_rate_hz: u32) -> Result<Vec<f32>, VerifyError>;

    /// Dimensionality of the embedding vectors.
    fn dimension(&self) -> usize;
}

/// Filterbank-statistics encoder: per-mel-bin mean and standard deviation
/// pooled over all frames, concatenated and L2-normalized.
///
/// Deterministic and weight-free. It captures the long-term spectral shape
/// of a voice, not a trained speaker representation; swap in a neural
/// [`SpeakerEncoder`] for forensic-grade scores.
pub struct FbankEncoder {
    cfg: FbankConfig,
}

impl FbankEncoder {
    /// Creates an encoder with the default 80-mel configuration (160 dims).
    pub fn new() -> Self {
        Self::with_config(FbankConfig::default())
    }

    pub fn with_config(cfg: FbankConfig) -> Self {
        Self { cfg }
    }
}

impl Default for FbankEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeakerEncoder for FbankEncoder {
    fn embed(&self, samples: &[f32], sample_rate_hz: u32) -> Result<Vec<f32>, VerifyError> {
        let min_samples = sample_rate_hz as usize * MIN_CLIP_MS / 1000;
        if samples.len() < min_samples {
            return Err(VerifyError::AudioTooShort {
                min_samples,
                got_samples: samples.len(),
            });
        }

        let fbank = Fbank::new(sample_rate_hz, &self.cfg);
        let features = fbank
            .compute(samples)
            .ok_or_else(|| VerifyError::Encoder("filterbank produced no frames".into()))?;

        // Statistics pooling: mean and std per mel bin over all frames.
        let num_mels = fbank.num_mels();
        let t = features.len() as f64;
        let mut embedding = vec![0.0f32; num_mels * 2];

        for m in 0..num_mels {
            let mut sum = 0.0f64;
            for frame in &features {
                sum += frame[m] as f64;
            }
            let mean = sum / t;

            let mut var_sum = 0.0f64;
            for frame in &features {
                let d = frame[m] as f64 - mean;
                var_sum += d * d;
            }

            embedding[m] = mean as f32;
            embedding[num_mels + m] = (var_sum / t).sqrt() as f32;
        }

        l2_normalize(&mut embedding);
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.cfg.num_mels * 2
    }
}
