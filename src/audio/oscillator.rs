//! Phase-accumulator oscillator.

use std::f32::consts::PI;

use super::pitch::PitchHandle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    #[default]
    Saw,
    Triangle,
    Square,
}

/// Oscillator whose frequency is read from a shared [`PitchHandle`] every sample
pub struct Oscillator {
    waveform: Waveform,
    pitch: PitchHandle,
    /// Phase in [0, 1)
    state: f32,
}

impl Oscillator {
    pub fn new(waveform: Waveform, pitch: PitchHandle) -> Self {
        Self {
            waveform,
            pitch,
            state: 0.0,
        }
    }

    /// Produce the next sample in [-1, 1] and advance the phase
    pub fn next_sample(&mut self, sample_rate_hz: f32) -> f32 {
        let value = match self.waveform {
            Waveform::Sine => (self.state * PI * 2.0).sin(),
            Waveform::Saw => (self.state * 2.0) - 1.0,
            Waveform::Triangle => (((self.state * 2.0) - 1.0).abs() * 2.0) - 1.0,
            Waveform::Square => {
                if self.state < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
        };
        let state_delta = self.pitch.get() / sample_rate_hz;
        let next = (self.state + state_delta).rem_euclid(1.0);
        if !next.is_nan() {
            self.state = next;
        }
        value
    }
}
