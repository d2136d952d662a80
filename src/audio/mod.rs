//! Machinery hum synthesis.
//!
//! A sawtooth "motor" tone and white noise are mixed through a smoothing
//! low-pass filter and played on the output device, while a capture tap
//! duplicates the mix for the fragment recorder.

mod filter;
mod graph;
mod headless;
mod noise;
mod oscillator;
pub mod pitch;
mod system;
mod tap;

// Re-export public types
pub use filter::LowPass;
pub use graph::SignalGraph;
pub use headless::HeadlessSystem;
pub use noise::{NoiseUnavailable, WhiteNoise};
pub use oscillator::{Oscillator, Waveform};
pub use pitch::PitchHandle;
pub use system::AudioSystem;
pub use tap::{CaptureTap, TapFormat};

/// Something that can play a signal graph and hand back a tap on its output.
///
/// Implementations must keep the graph rendering until they are dropped.
pub trait AudioBackend {
    /// Start rendering `graph`. Called at most once per backend.
    fn start(&mut self, graph: SignalGraph) -> anyhow::Result<CaptureTap>;
}
