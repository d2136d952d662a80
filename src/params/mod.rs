//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers of the hum generator are extracted here with:
//! - Physical units (Hz, seconds, linear gain)
//! - Documented ranges and meanings
//! - A `validate` check where a bad value would break the signal path

mod audio;
mod recording;

// Re-export all types
pub use audio::{audio_constants, FilterParams, NoiseParams, OutputParams, PitchParams, ToneParams};
pub use recording::{RecorderParams, UploadParams};
