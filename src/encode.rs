//! Container encoding for captured fragments.
//!
//! Fragments are wrapped in RIFF/WAVE via `hound`, written into memory.

use std::io::Cursor;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("capture format {0:?} is not supported")]
    Unsupported(String),

    #[error("wav encoding failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Sample encoding inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleEncoding {
    Pcm16,
    Float32,
}

/// A capture container the recorder knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub encoding: SampleEncoding,
}

impl Default for CaptureFormat {
    fn default() -> Self {
        Self {
            encoding: SampleEncoding::Pcm16,
        }
    }
}

impl CaptureFormat {
    /// Parse a MIME type such as `audio/wav` or `audio/wav; codecs=float32`
    pub fn from_mime(mime: &str) -> Result<Self, EncodeError> {
        let unsupported = || EncodeError::Unsupported(mime.to_string());
        let mut parts = mime.split(';').map(str::trim);
        let essence = parts.next().unwrap_or_default().to_ascii_lowercase();
        if !matches!(essence.as_str(), "audio/wav" | "audio/wave" | "audio/x-wav") {
            return Err(unsupported());
        }

        let mut encoding = SampleEncoding::Pcm16;
        for param in parts.filter(|p| !p.is_empty()) {
            let (key, value) = param.split_once('=').ok_or_else(unsupported)?;
            if !key.trim().eq_ignore_ascii_case("codecs") {
                return Err(unsupported());
            }
            encoding = match value.trim().trim_matches('"').to_ascii_lowercase().as_str() {
                "pcm16" | "1" => SampleEncoding::Pcm16,
                "float32" | "3" => SampleEncoding::Float32,
                _ => return Err(unsupported()),
            };
        }
        Ok(Self { encoding })
    }

    /// Whether the recorder can produce `mime`
    pub fn is_supported(mime: &str) -> bool {
        Self::from_mime(mime).is_ok()
    }

    pub fn mime(&self) -> &'static str {
        match self.encoding {
            SampleEncoding::Pcm16 => "audio/wav; codecs=pcm16",
            SampleEncoding::Float32 => "audio/wav; codecs=float32",
        }
    }

    fn wav_spec(&self, channels: u16, sample_rate_hz: u32) -> hound::WavSpec {
        match self.encoding {
            SampleEncoding::Pcm16 => hound::WavSpec {
                channels,
                sample_rate: sample_rate_hz,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            },
            SampleEncoding::Float32 => hound::WavSpec {
                channels,
                sample_rate: sample_rate_hz,
                bits_per_sample: 32,
                sample_format: hound::SampleFormat::Float,
            },
        }
    }
}

/// Encode interleaved samples into an in-memory WAV file.
///
/// No samples means no fragment: the result is an empty payload rather
/// than a header-only file.
pub fn encode_wav(
    samples: &[f32],
    channels: u16,
    sample_rate_hz: u32,
    format: CaptureFormat,
) -> Result<Vec<u8>, EncodeError> {
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    let spec = format.wav_spec(channels, sample_rate_hz);
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        match format.encoding {
            SampleEncoding::Pcm16 => {
                for &sample in samples {
                    let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
                    writer.write_sample(scaled)?;
                }
            }
            SampleEncoding::Float32 => {
                for &sample in samples {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
