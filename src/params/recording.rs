//! Fragment recording configuration.

use std::time::Duration;

/// Fragment recording configuration
#[derive(Debug, Clone)]
pub struct RecorderParams {
    /// Length of each recorded fragment
    pub fragment_duration: Duration,

    /// Number of fragments recorded before the recorder stops for good
    /// 6 x 5s = 30 seconds of audio
    pub max_fragments: u32,

    /// Pause between the end of one fragment and the start of the next
    pub pause: Duration,
}

impl Default for RecorderParams {
    fn default() -> Self {
        Self {
            fragment_duration: Duration::from_secs(5),
            max_fragments: 6,
            pause: Duration::from_millis(500),
        }
    }
}

impl RecorderParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.fragment_duration.is_zero() {
            return Err("Fragment duration must be > 0".to_string());
        }
        if self.max_fragments == 0 {
            return Err("At least one fragment must be recorded".to_string());
        }
        Ok(())
    }
}

/// Fragment upload configuration
#[derive(Debug, Clone)]
pub struct UploadParams {
    /// Whole-request deadline, connect through response.
    /// An endpoint that never answers counts as a failed upload after this.
    pub timeout: Duration,
}

impl Default for UploadParams {
    fn default() -> Self {
        Self {
            // One fragment's worth of time
            timeout: Duration::from_secs(5),
        }
    }
}

impl UploadParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout.is_zero() {
            return Err("Upload timeout must be > 0".to_string());
        }
        Ok(())
    }
}
