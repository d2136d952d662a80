//! Capture tap: duplicates rendered output into a recordable buffer
//! without affecting playback.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Sample layout of the frames flowing through a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapFormat {
    pub sample_rate_hz: u32,
    pub channels: u16,
}

/// Shared handle on the rendered mix.
///
/// While attached, every block the renderer produces is appended to an
/// internal buffer. Detached, offered blocks are ignored.
#[derive(Clone)]
pub struct CaptureTap {
    format: TapFormat,
    buffer: Arc<Mutex<Option<Vec<f32>>>>,
}

impl CaptureTap {
    pub fn new(format: TapFormat) -> Self {
        Self {
            format,
            buffer: Arc::new(Mutex::new(None)),
        }
    }

    pub fn format(&self) -> TapFormat {
        self.format
    }

    /// Interleaved sample count of `duration` of output
    pub fn samples_for(&self, duration: Duration) -> usize {
        let frames = (duration.as_secs_f64() * self.format.sample_rate_hz as f64).ceil() as usize;
        frames * self.format.channels as usize
    }

    /// Start duplicating output into a buffer pre-sized for `expected_samples`.
    /// Returns false if the tap was already attached.
    ///
    /// The allocation happens here, off the audio thread; `offer` only grows
    /// the buffer when more than `expected_samples` arrive.
    pub fn attach(&self, expected_samples: usize) -> bool {
        let captured = Vec::with_capacity(expected_samples);
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if buffer.is_some() {
            return false;
        }
        *buffer = Some(captured);
        true
    }

    /// Stop duplicating output and take everything captured since `attach`
    pub fn detach(&self) -> Option<Vec<f32>> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    #[cfg(test)]
    pub(crate) fn is_attached(&self) -> bool {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Called by the renderer with each interleaved block
    pub fn offer(&self, block: &[f32]) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if let Some(captured) = buffer.as_mut() {
                captured.extend_from_slice(block);
            }
        }
    }
}
