//! Biquad low-pass filter.
//!
//! Coefficients follow the RBJ audio EQ cookbook. Each channel keeps its
//! own delay line so interleaved frames can be filtered in place.

use std::f32::consts::PI;

#[derive(Default, Clone, Copy)]
struct ChannelState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

pub struct LowPass {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    channels: Vec<ChannelState>,
}

impl LowPass {
    pub fn new(cutoff_hz: f32, q: f32, sample_rate_hz: f32, channels: usize) -> Self {
        // Keep the cutoff strictly below Nyquist
        let cutoff_hz = cutoff_hz.clamp(1.0, sample_rate_hz * 0.49);
        let w0 = 2.0 * PI * cutoff_hz / sample_rate_hz;
        let alpha = w0.sin() / (2.0 * q);
        let cos_w0 = w0.cos();
        let a0 = 1.0 + alpha;
        Self {
            b0: ((1.0 - cos_w0) / 2.0) / a0,
            b1: (1.0 - cos_w0) / a0,
            b2: ((1.0 - cos_w0) / 2.0) / a0,
            a1: (-2.0 * cos_w0) / a0,
            a2: (1.0 - alpha) / a0,
            channels: vec![ChannelState::default(); channels],
        }
    }

    /// Filter one sample of `channel`
    pub fn process(&mut self, channel: usize, x: f32) -> f32 {
        let s = &mut self.channels[channel];
        let y = self.b0 * x + self.b1 * s.x1 + self.b2 * s.x2 - self.a1 * s.y1 - self.a2 * s.y2;
        s.x2 = s.x1;
        s.x1 = x;
        s.y2 = s.y1;
        s.y1 = y;
        y
    }
}
