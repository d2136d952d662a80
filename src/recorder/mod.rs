//! Fragment recorder.
//!
//! Records the mixed output in fixed-length fragments, one at a time, and
//! hands each non-empty fragment to an uploader. The sequencing lives in a
//! pure state machine ([`FragmentRecorder`]); [`run`] drives it with real
//! timers, a [`Capture`] and an [`Upload`](crate::upload::Upload).

mod capture;
mod driver;
mod machine;

pub use capture::{Capture, CaptureError, TapCapture};
pub use driver::{run, RecorderSummary};
pub use machine::{Command, Event, FragmentRecorder, RecorderError, RecorderState};
