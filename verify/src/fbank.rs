//! Log mel filterbank extraction over f32 waveforms.
//!
//! Kaldi-flavored front end: Povey window (hamming^0.85), per-frame DC
//! removal, pre-emphasis 0.97, Cooley-Tukey FFT, triangular mel filterbank.
//! Frame sizes are specified in milliseconds and scaled to the input sample
//! rate, so 44.1kHz uploads work without resampling.

use std::f64::consts::PI;

/// Configures mel filterbank extraction.
#[derive(Debug, Clone)]
pub struct FbankConfig {
    /// Number of mel filterbank channels (default: 80).
    pub num_mels: usize,
    /// Frame length in milliseconds (default: 25).
    pub frame_ms: u32,
    /// Frame shift in milliseconds (default: 10).
    pub shift_ms: u32,
    /// Pre-emphasis coefficient (default: 0.97).
    pub pre_emphasis: f64,
    /// Floor for log energy (default: 1e-10).
    pub energy_floor: f64,
    /// Low cutoff frequency for mel bins in Hz (default: 20).
    pub low_freq: f64,
    /// High cutoff frequency; non-positive means offset from Nyquist
    /// (default: -400, i.e. 7600 Hz at 16kHz input).
    pub high_freq: f64,
}

impl Default for FbankConfig {
    fn default() -> Self {
        Self {
            num_mels: 80,
            frame_ms: 25,
            shift_ms: 10,
            pre_emphasis: 0.97,
            energy_floor: 1e-10,
            low_freq: 20.0,
            high_freq: -400.0,
        }
    }
}

/// A filterbank extractor bound to one sample rate.
///
/// Precomputes the analysis window and mel filter weights once, then
/// [`Fbank::compute`] can run over any number of clips at that rate.
pub struct Fbank {
    num_mels: usize,
    frame_len: usize,
    frame_shift: usize,
    pre_emphasis: f64,
    energy_floor: f64,
    fft_size: usize,
    window: Vec<f64>,
    filterbank: Vec<Vec<f64>>,
}

impl Fbank {
    /// Builds an extractor for the given sample rate.
    pub fn new(sample_rate_hz: u32, cfg: &FbankConfig) -> Self {
        let rate = sample_rate_hz.max(1) as usize;
        let frame_len = (rate * cfg.frame_ms.max(1) as usize) / 1000;
        let frame_shift = (rate * cfg.shift_ms.max(1) as usize) / 1000;
        let frame_len = frame_len.max(2);
        let frame_shift = frame_shift.max(1);

        let fft_size = frame_len.next_power_of_two();
        let window = povey_window(frame_len);

        let high_freq = if cfg.high_freq <= 0.0 {
            rate as f64 / 2.0 + cfg.high_freq
        } else {
            cfg.high_freq
        };
        let filterbank = mel_filterbank(cfg.num_mels.max(1), fft_size, rate, cfg.low_freq, high_freq);

        Self {
            num_mels: cfg.num_mels.max(1),
            frame_len,
            frame_shift,
            pre_emphasis: cfg.pre_emphasis,
            energy_floor: cfg.energy_floor,
            fft_size,
            window,
            filterbank,
        }
    }

    /// Number of mel channels per output frame.
    pub fn num_mels(&self) -> usize {
        self.num_mels
    }

    /// Frame length in samples at the bound rate.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Extracts log mel filterbank features from a mono waveform in [-1, 1].
    ///
    /// Output is `[num_frames][num_mels]`. Returns `None` if the waveform is
    /// shorter than a single frame.
    pub fn compute(&self, samples: &[f32]) -> Option<Vec<Vec<f32>>> {
        if samples.len() < self.frame_len {
            return None;
        }
        let num_frames = (samples.len() - self.frame_len) / self.frame_shift + 1;
        let half_fft = self.fft_size / 2 + 1;

        let mut result = Vec::with_capacity(num_frames);
        let mut frame_buf = vec![0.0f64; self.frame_len];
        let mut fft_buf = vec![(0.0f64, 0.0f64); self.fft_size];

        for f in 0..num_frames {
            let offset = f * self.frame_shift;
            for (dst, &src) in frame_buf.iter_mut().zip(&samples[offset..offset + self.frame_len]) {
                *dst = src as f64;
            }

            // DC removal.
            let mean: f64 = frame_buf.iter().sum::<f64>() / self.frame_len as f64;
            for v in &mut frame_buf {
                *v -= mean;
            }

            // Pre-emphasis, in place from the end of the frame backwards.
            if self.pre_emphasis > 0.0 {
                for i in (1..self.frame_len).rev() {
                    frame_buf[i] -= self.pre_emphasis * frame_buf[i - 1];
                }
                frame_buf[0] *= 1.0 - self.pre_emphasis;
            }

            // Window, zero-pad, FFT.
            for v in &mut fft_buf {
                *v = (0.0, 0.0);
            }
            for i in 0..self.frame_len {
                fft_buf[i] = (frame_buf[i] * self.window[i], 0.0);
            }
            fft(&mut fft_buf);

            // Mel energies over the power spectrum.
            let mut frame = vec![0.0f32; self.num_mels];
            for (m, filter) in self.filterbank.iter().enumerate() {
                let mut energy: f64 = 0.0;
                for (k, &w) in filter.iter().enumerate().take(half_fft) {
                    if w != 0.0 {
                        let (re, im) = fft_buf[k];
                        energy += w * (re * re + im * im);
                    }
                }
                frame[m] = energy.max(self.energy_floor).ln() as f32;
            }
            result.push(frame);
        }

        Some(result)
    }
}

/// L2-normalizes a vector to unit length in-place. Zero vectors are left
/// unchanged.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f64 = v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt();
    if norm > 0.0 {
        let scale = (1.0 / norm) as f32;
        for x in v.iter_mut() {
            *x *= scale;
        }
    }
}

fn hamming_window(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f64 / (n - 1) as f64).cos())
        .collect()
}

/// Povey window (hamming^0.85) used by Kaldi.
fn povey_window(n: usize) -> Vec<f64> {
    hamming_window(n).into_iter().map(|w| w.powf(0.85)).collect()
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0_f64.powf(mel / 2595.0) - 1.0)
}

/// Triangular mel filter weights, `[num_mels][half_fft]`.
fn mel_filterbank(
    num_mels: usize,
    fft_size: usize,
    sample_rate: usize,
    low_freq: f64,
    high_freq: f64,
) -> Vec<Vec<f64>> {
    let half_fft = fft_size / 2 + 1;
    let mel_low = hz_to_mel(low_freq);
    let mel_high = hz_to_mel(high_freq.max(low_freq + 1.0));

    let mel_points: Vec<f64> = (0..num_mels + 2)
        .map(|i| mel_low + i as f64 * (mel_high - mel_low) / (num_mels + 1) as f64)
        .collect();

    let bin_indices: Vec<usize> = mel_points
        .iter()
        .map(|&m| {
            let hz = mel_to_hz(m);
            let bin = (hz * fft_size as f64 / sample_rate as f64).floor() as isize;
            bin.clamp(0, half_fft as isize - 1) as usize
        })
        .collect();

    let mut fb = Vec::with_capacity(num_mels);
    for m in 0..num_mels {
        let mut filter = vec![0.0f64; half_fft];
        let (left, center, right) = (bin_indices[m], bin_indices[m + 1], bin_indices[m + 2]);

        if center > left {
            for k in left..=center {
                filter[k] = (k - left) as f64 / (center - left) as f64;
            }
        }
        if right > center {
            for k in center..=right {
                filter[k] = (right - k) as f64 / (right - center) as f64;
            }
        }
        fb.push(filter);
    }
    fb
}

/// In-place Cooley-Tukey FFT over (real, imag) tuples.
/// Input length must be a power of 2.
fn fft(x: &mut [(f64, f64)]) {
    let n = x.len();
    if n <= 1 {
        return;
    }

    // Bit-reversal permutation.
    let mut j = 0usize;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            x.swap(i, j);
        }
    }

    // Butterflies.
    let mut size = 2;
    while size <= n {
        let half = size / 2;
        let angle = -2.0 * PI / size as f64;
        let wn = (angle.cos(), angle.sin());
        let mut start = 0;
        while start < n {
            let mut w = (1.0, 0.0);
            for k in 0..half {
                let u = x[start + k];
                let v = x[start + k + half];
                let t = (w.0 * v.0 - w.1 * v.1, w.0 * v.1 + w.1 * v.0);
                x[start + k] = (u.0 + t.0, u.1 + t.1);
                x[start + k + half] = (u.0 - t.0, u.1 - t.1);
                w = (w.0 * wn.0 - w.1 * wn.1, w.0 * wn.1 + w.1 * wn.0);
            }
            start += size;
        }
        size <<= 1;
    }
}
