use crate::DecodeError;

/// Stream parameters of a decoded WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavInfo {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Number of frames (samples per channel) in the data chunk.
    pub frames: u64,
}

impl WavInfo {
    /// Clip duration in seconds. Zero when the sample rate is zero.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate_hz == 0 {
            0.0
        } else {
            self.frames as f64 / self.sample_rate_hz as f64
        }
    }
}

/// A decoded WAV file: stream parameters plus a mono f32 waveform.
///
/// Multi-channel input is downmixed by averaging channels per frame,
/// so `samples.len() == info.frames`.
#[derive(Debug, Clone)]
pub struct DecodedWav {
    pub info: WavInfo,
    /// Mono waveform, values in [-1, 1].
    pub samples: Vec<f32>,
}

const WAVE_FORMAT_PCM: u16 = 1;
const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;
const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

#[derive(Debug, Clone, Copy)]
struct FmtChunk {
    audio_format: u16,
    channels: u16,
    sample_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

/// Decodes a complete WAV file from memory.
///
/// Supports 16-bit PCM and 32-bit IEEE float data, mono or multi-channel
/// (downmixed to mono by channel averaging). Unknown chunks are skipped and
/// trailing bytes after the data chunk are ignored; a data chunk whose
/// declared size runs past the end of the buffer is an error.
pub fn decode_wav(data: &[u8]) -> Result<DecodedWav, DecodeError> {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(DecodeError::NotRiff);
    }

    let mut fmt: Option<FmtChunk> = None;
    let mut pcm: Option<&[u8]> = None;

    // Walk the chunk list. Chunk bodies are padded to even length.
    let mut pos = 12;
    while pos + 8 <= data.len() {
        let id = &data[pos..pos + 4];
        let size = u32::from_le_bytes([data[pos + 4], data[pos + 5], data[pos + 6], data[pos + 7]])
            as usize;
        let body_start = pos + 8;

        match id {
            b"fmt " => {
                let body_end = body_start + size;
                if size < 16 || body_end > data.len() {
                    return Err(DecodeError::Truncated("fmt chunk"));
                }
                fmt = Some(parse_fmt(&data[body_start..body_end])?);
            }
            b"data" => {
                let body_end = body_start + size;
                if body_end > data.len() {
                    return Err(DecodeError::Truncated("data chunk"));
                }
                pcm = Some(&data[body_start..body_end]);
            }
            _ => {}
        }

        pos = body_start + size + (size & 1);
    }

    let fmt = fmt.ok_or(DecodeError::MissingChunk("fmt "))?;
    let pcm = pcm.ok_or(DecodeError::MissingChunk("data"))?;

    let block_align = if fmt.block_align != 0 {
        fmt.block_align as usize
    } else {
        fmt.channels as usize * fmt.bits_per_sample as usize / 8
    };
    if block_align == 0 {
        return Err(DecodeError::UnsupportedFormat("zero block align".into()));
    }

    let channels = fmt.channels as usize;
    let frames = pcm.len() / block_align;
    if block_align < channels * fmt.bits_per_sample as usize / 8 {
        return Err(DecodeError::UnsupportedFormat(format!(
            "block align {} too small for {} channels",
            block_align, fmt.channels
        )));
    }
    let samples = match (fmt.audio_format, fmt.bits_per_sample) {
        (WAVE_FORMAT_PCM, 16) => downmix_pcm16(pcm, channels, block_align, frames),
        (WAVE_FORMAT_IEEE_FLOAT, 32) => downmix_f32(pcm, channels, block_align, frames),
        (f, b) => {
            return Err(DecodeError::UnsupportedFormat(format!(
                "audio format {f}, {b} bits per sample"
            )))
        }
    };

    Ok(DecodedWav {
        info: WavInfo {
            sample_rate_hz: fmt.sample_rate,
            channels: fmt.channels,
            bits_per_sample: fmt.bits_per_sample,
            frames: frames as u64,
        },
        samples,
    })
}

fn parse_fmt(body: &[u8]) -> Result<FmtChunk, DecodeError> {
    let mut audio_format = u16::from_le_bytes([body[0], body[1]]);
    let channels = u16::from_le_bytes([body[2], body[3]]);
    let sample_rate = u32::from_le_bytes([body[4], body[5], body[6], body[7]]);
    let block_align = u16::from_le_bytes([body[12], body[13]]);
    let bits_per_sample = u16::from_le_bytes([body[14], body[15]]);

    // WAVE_FORMAT_EXTENSIBLE carries the real format tag in the first two
    // bytes of the SubFormat GUID.
    if audio_format == WAVE_FORMAT_EXTENSIBLE {
        if body.len() < 26 {
            return Err(DecodeError::Truncated("fmt extension"));
        }
        audio_format = u16::from_le_bytes([body[24], body[25]]);
    }

    if channels == 0 {
        return Err(DecodeError::UnsupportedFormat("zero channels".into()));
    }

    Ok(FmtChunk {
        audio_format,
        channels,
        sample_rate,
        block_align,
        bits_per_sample,
    })
}

fn downmix_pcm16(pcm: &[u8], channels: usize, block_align: usize, frames: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(frames);
    for f in 0..frames {
        let mut acc = 0.0f32;
        for c in 0..channels {
            let off = f * block_align + c * 2;
            let s = i16::from_le_bytes([pcm[off], pcm[off + 1]]);
            acc += s as f32 / 32768.0;
        }
        out.push(acc / channels as f32);
    }
    out
}

fn downmix_f32(pcm: &[u8], channels: usize, block_align: usize, frames: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(frames);
    for f in 0..frames {
        let mut acc = 0.0f32;
        for c in 0..channels {
            let off = f * block_align + c * 4;
            acc += f32::from_le_bytes([pcm[off], pcm[off + 1], pcm[off + 2], pcm[off + 3]]);
        }
        out.push(acc / channels as f32);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a minimal PCM16 WAV file from interleaved samples.
    fn make_wav_pcm16(sample_rate: u32, channels: u16, interleaved: &[i16]) -> Vec<u8> {
        let block_align = channels * 2;
        let byte_rate = sample_rate * block_align as u32;
        let data_len = interleaved.len() * 2;

        let mut out = Vec::with_capacity(44 + data_len);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes()); // PCM
        out.extend_from_slice(&channels.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&(data_len as u32).to_le_bytes());
        for s in interleaved {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[test]
    fn decode_mono_pcm16() {
        let samples: Vec<i16> = vec![0, 16384, -16384, 32767];
        let wav = make_wav_pcm16(16_000, 1, &samples);
        let decoded = decode_wav(&wav).unwrap();

        assert_eq!(decoded.info.sample_rate_hz, 16_000);
        assert_eq!(decoded.info.channels, 1);
        assert_eq!(decoded.info.bits_per_sample, 16);
        assert_eq!(decoded.info.frames, 4);
        assert_eq!(decoded.samples.len(), 4);
        assert!((decoded.samples[1] - 0.5).abs() < 1e-4);
        assert!((decoded.samples[2] + 0.5).abs() < 1e-4);
    }

    #[test]
    fn decode_stereo_downmix() {
        // Two frames: (1000, 3000) and (-2000, 2000). Downmix averages.
        let wav = make_wav_pcm16(44_100, 2, &[1000, 3000, -2000, 2000]);
        let decoded = decode_wav(&wav).unwrap();

        assert_eq!(decoded.info.channels, 2);
        assert_eq!(decoded.info.frames, 2);
        assert_eq!(decoded.samples.len(), 2);
        assert!((decoded.samples[0] - 2000.0 / 32768.0).abs() < 1e-6);
        assert!(decoded.samples[1].abs() < 1e-6);
    }

    #[test]
    fn duration_from_frames() {
        let samples = vec![0i16; 16_000];
        let wav = make_wav_pcm16(16_000, 1, &samples);
        let decoded = decode_wav(&wav).unwrap();
        assert!((decoded.info.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_non_riff() {
        assert!(matches!(decode_wav(b"OggS"), Err(DecodeError::NotRiff)));
        assert!(matches!(
            decode_wav(&[0u8; 64]),
            Err(DecodeError::NotRiff)
        ));
    }

    #[test]
    fn rejects_missing_data_chunk() {
        let mut wav = make_wav_pcm16(16_000, 1, &[0, 0]);
        wav.truncate(36); // Cut before the data chunk header.
        assert!(matches!(
            decode_wav(&wav),
            Err(DecodeError::MissingChunk("data"))
        ));
    }

    #[test]
    fn rejects_truncated_data_chunk() {
        let mut wav = make_wav_pcm16(16_000, 1, &[0, 0, 0, 0]);
        wav.truncate(wav.len() - 3); // Data shorter than its declared size.
        assert!(matches!(
            decode_wav(&wav),
            Err(DecodeError::Truncated("data chunk"))
        ));
    }

    #[test]
    fn rejects_unsupported_bit_depth() {
        let mut wav = make_wav_pcm16(16_000, 1, &[0, 0]);
        wav[34] = 8; // bits_per_sample
        wav[35] = 0;
        assert!(matches!(
            decode_wav(&wav),
            Err(DecodeError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn skips_unknown_chunks() {
        // Insert a LIST chunk between fmt and data.
        let base = make_wav_pcm16(8_000, 1, &[100, 200, 300]);
        let mut wav = base[..36].to_vec();
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&4u32.to_le_bytes());
        wav.extend_from_slice(b"INFO");
        wav.extend_from_slice(&base[36..]);
        // Patch the RIFF size (not validated, but keep it honest).
        let riff_size = (wav.len() - 8) as u32;
        wav[4..8].copy_from_slice(&riff_size.to_le_bytes());

        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.info.frames, 3);
    }

    #[test]
    fn decode_extensible_pcm16() {
        // WAVE_FORMAT_EXTENSIBLE: 40-byte fmt chunk, real format tag in the
        // first two bytes of the SubFormat GUID (KSDATAFORMAT_SUBTYPE_PCM).
        let samples: [i16; 4] = [0, 8192, -8192, 1000];
        let data_len = samples.len() * 2;

        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&((12 + 48 + data_len) as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&40u32.to_le_bytes());
        wav.extend_from_slice(&0xFFFEu16.to_le_bytes()); // extensible
        wav.extend_from_slice(&1u16.to_le_bytes()); // channels
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&32_000u32.to_le_bytes()); // byte rate
        wav.extend_from_slice(&2u16.to_le_bytes()); // block align
        wav.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
        wav.extend_from_slice(&22u16.to_le_bytes()); // cbSize
        wav.extend_from_slice(&16u16.to_le_bytes()); // valid bits
        wav.extend_from_slice(&0u32.to_le_bytes()); // channel mask
        wav.extend_from_slice(&[
            0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, // PCM GUID
            0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
        ]);
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_len as u32).to_le_bytes());
        for s in samples {
            wav.extend_from_slice(&s.to_le_bytes());
        }

        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.info.sample_rate_hz, 16_000);
        assert_eq!(decoded.info.channels, 1);
        assert_eq!(decoded.info.bits_per_sample, 16);
        assert_eq!(decoded.info.frames, 4);
        assert!((decoded.samples[1] - 0.25).abs() < 1e-4);
        assert!((decoded.samples[2] + 0.25).abs() < 1e-4);
    }

    #[test]
    fn decode_extensible_truncated_guid() {
        // Extensible tag but the fmt body stops before the SubFormat GUID.
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&30u32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&18u32.to_le_bytes());
        wav.extend_from_slice(&0xFFFEu16.to_le_bytes());
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&16_000u32.to_le_bytes());
        wav.extend_from_slice(&32_000u32.to_le_bytes());
        wav.extend_from_slice(&2u16.to_le_bytes());
        wav.extend_from_slice(&16u16.to_le_bytes());
        wav.extend_from_slice(&0u16.to_le_bytes()); // cbSize = 0, no GUID

        assert!(matches!(
            decode_wav(&wav),
            Err(DecodeError::Truncated("fmt extension"))
        ));
    }

    #[test]
    fn decode_float32() {
        let samples = [0.25f32, -0.5, 1.0];
        let data_len = samples.len() * 4;

        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&3u16.to_le_bytes()); // IEEE float
        wav.extend_from_slice(&1u16.to_le_bytes());
        wav.extend_from_slice(&48_000u32.to_le_bytes());
        wav.extend_from_slice(&(48_000u32 * 4).to_le_bytes());
        wav.extend_from_slice(&4u16.to_le_bytes());
        wav.extend_from_slice(&32u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&(data_len as u32).to_le_bytes());
        for s in samples {
            wav.extend_from_slice(&s.to_le_bytes());
        }

        let decoded = decode_wav(&wav).unwrap();
        assert_eq!(decoded.info.sample_rate_hz, 48_000);
        assert_eq!(decoded.info.frames, 3);
        assert_eq!(decoded.samples, vec![0.25, -0.5, 1.0]);
    }
}
