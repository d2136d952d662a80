//! Capture of the mixed signal into fragment payloads.

use std::time::Duration;

use thiserror::Error;

use crate::audio::CaptureTap;
use crate::encode::{encode_wav, CaptureFormat, EncodeError};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture format {0:?} is not supported")]
    Unsupported(String),

    #[error("a capture is already active")]
    AlreadyActive,

    #[error("no capture is active")]
    NotActive,

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// A recordable view of the output
pub trait Capture {
    /// Begin capturing into a fresh buffer
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Stop capturing and return the encoded fragment (possibly empty)
    fn stop(&mut self) -> Result<Vec<u8>, CaptureError>;

    /// Drop anything still attached to the output
    fn release(&mut self);
}

/// Capture backed by the signal graph's tap, encoded to the requested MIME type
pub struct TapCapture {
    tap: CaptureTap,
    mime: String,
    format: Option<CaptureFormat>,
    /// Samples reserved up front for each fragment
    expected_samples: usize,
}

impl TapCapture {
    pub fn new(tap: CaptureTap, mime: impl Into<String>, fragment_duration: Duration) -> Self {
        let expected_samples = tap.samples_for(fragment_duration);
        Self {
            tap,
            mime: mime.into(),
            format: None,
            expected_samples,
        }
    }
}

impl Capture for TapCapture {
    fn start(&mut self) -> Result<(), CaptureError> {
        // Checked on every attempt, as the recorder would query the runtime
        let format = CaptureFormat::from_mime(&self.mime)
            .map_err(|_| CaptureError::Unsupported(self.mime.clone()))?;
        if !self.tap.attach(self.expected_samples) {
            return Err(CaptureError::AlreadyActive);
        }
        log::debug!("Capturing as {}", format.mime());
        self.format = Some(format);
        Ok(())
    }

    fn stop(&mut self) -> Result<Vec<u8>, CaptureError> {
        let samples = self.tap.detach().ok_or(CaptureError::NotActive)?;
        let format = self.format.take().ok_or(CaptureError::NotActive)?;
        let tap_format = self.tap.format();
        let payload = encode_wav(
            &samples,
            tap_format.channels,
            tap_format.sample_rate_hz,
            format,
        )?;
        Ok(payload)
    }

    fn release(&mut self) {
        if self.tap.detach().is_some() {
            log::debug!("Released capture tap with unread samples");
        }
        self.format = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::TapFormat;

    const FRAGMENT: Duration = Duration::from_millis(100);

    fn tap() -> CaptureTap {
        CaptureTap::new(TapFormat {
            sample_rate_hz: 8000,
            channels: 1,
        })
    }

    #[test]
    fn test_unsupported_format_never_attaches() {
        let tap = tap();
        let mut capture = TapCapture::new(tap.clone(), "audio/webm; codecs=opus", FRAGMENT);
        assert!(matches!(capture.start(), Err(CaptureError::Unsupported(_))));
        assert!(!tap.is_attached());
    }

    #[test]
    fn test_stop_encodes_captured_samples() {
        let tap = tap();
        let mut capture = TapCapture::new(tap.clone(), "audio/wav", FRAGMENT);
        capture.start().unwrap();
        tap.offer(&[0.25; 100]);
        let payload = capture.stop().unwrap();
        assert!(payload.starts_with(b"RIFF"));
        assert!(!tap.is_attached());
    }

    #[test]
    fn test_silent_capture_is_empty() {
        let mut capture = TapCapture::new(tap(), "audio/wav", FRAGMENT);
        capture.start().unwrap();
        assert!(capture.stop().unwrap().is_empty());
    }

    #[test]
    fn test_overlapping_start_is_refused() {
        let mut capture = TapCapture::new(tap(), "audio/wav", FRAGMENT);
        capture.start().unwrap();
        assert!(matches!(capture.start(), Err(CaptureError::AlreadyActive)));
        capture.release();
        assert!(capture.start().is_ok());
    }

    #[test]
    fn test_stop_without_start() {
        let mut capture = TapCapture::new(tap(), "audio/wav", FRAGMENT);
        assert!(matches!(capture.stop(), Err(CaptureError::NotActive)));
    }
}
