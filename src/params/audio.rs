//! Signal graph configuration and constants.

use std::ops::Range;
use std::time::Duration;

use crate::audio::Waveform;

/// Oscillator configuration (the "motor" tone)
#[derive(Debug, Clone)]
pub struct ToneParams {
    /// Oscillator shape
    pub waveform: Waveform,

    /// Frequency before the first pitch change (Hz)
    pub initial_frequency_hz: f32,

    /// Linear gain applied between oscillator and filter
    pub gain: f32,
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Saw,
            initial_frequency_hz: 120.0,
            gain: 0.3,
        }
    }
}

/// White noise configuration
#[derive(Debug, Clone)]
pub struct NoiseParams {
    /// Linear gain of the noise before it enters the filter.
    /// 1.0 = noise reaches the filter unattenuated.
    pub gain: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self { gain: 1.0 }
    }
}

/// Smoothing low-pass filter configuration
#[derive(Debug, Clone)]
pub struct FilterParams {
    /// Cutoff frequency (Hz)
    pub cutoff_hz: f32,

    /// Resonance (dimensionless). 1/sqrt(2) = Butterworth response.
    pub q: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff_hz: 2000.0,
            q: std::f32::consts::FRAC_1_SQRT_2,
        }
    }
}

/// Periodic pitch change configuration
#[derive(Debug, Clone)]
pub struct PitchParams {
    /// Time between pitch changes
    pub interval: Duration,

    /// Lowest frequency that can be picked (Hz, inclusive)
    pub min_hz: f32,

    /// Upper bound for picked frequencies (Hz, exclusive)
    pub max_hz: f32,
}

impl Default for PitchParams {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            min_hz: 100.0,
            max_hz: 400.0,
        }
    }
}

impl PitchParams {
    /// Half-open frequency range pitch changes are drawn from
    pub fn range_hz(&self) -> Range<f32> {
        self.min_hz..self.max_hz
    }

    /// Validate configuration (non-empty positive range, non-zero interval)
    pub fn validate(&self) -> Result<(), String> {
        if self.min_hz <= 0.0 || self.min_hz >= self.max_hz {
            return Err(format!(
                "Pitch range must be positive and non-empty, got {}..{}",
                self.min_hz, self.max_hz
            ));
        }
        if self.interval.is_zero() {
            return Err("Pitch change interval must be > 0".to_string());
        }
        Ok(())
    }
}

/// Output stream configuration for renderers that pick their own format
#[derive(Debug, Clone)]
pub struct OutputParams {
    /// Sample rate (Hz)
    pub sample_rate_hz: u32,

    /// Interleaved channel count
    pub channels: u16,

    /// Frames rendered per block by the headless renderer
    /// 128 frames = 2.9ms @ 44.1kHz
    pub block_frames: usize,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            channels: 2,
            block_frames: audio_constants::BLOCK_SIZE,
        }
    }
}

impl OutputParams {
    /// Wall-clock length of one rendered block
    pub fn block_duration(&self) -> Duration {
        Duration::from_secs_f64(self.block_frames as f64 / self.sample_rate_hz as f64)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("Sample rate must be > 0".to_string());
        }
        if self.channels == 0 {
            return Err("Channel count must be > 0".to_string());
        }
        if self.block_frames == 0 {
            return Err("Block size must be > 0".to_string());
        }
        Ok(())
    }
}

/// Audio constants
pub mod audio_constants {
    /// Audio block size (frames per buffer) for the headless renderer
    pub const BLOCK_SIZE: usize = 128;

    /// Hard clip applied to the final mix
    pub const OUTPUT_LIMIT: f32 = 1.0;
}
