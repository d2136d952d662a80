//! Shared oscillator frequency and the periodic pitch-change task.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::params::PitchParams;

/// Lock-free frequency shared between the control side and the audio thread.
///
/// Stores the f32 bit pattern in an atomic so the render callback never blocks.
#[derive(Clone, Debug)]
pub struct PitchHandle(Arc<AtomicU32>);

impl PitchHandle {
    pub fn new(frequency_hz: f32) -> Self {
        Self(Arc::new(AtomicU32::new(frequency_hz.to_bits())))
    }

    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    pub fn set(&self, frequency_hz: f32) {
        self.0.store(frequency_hz.to_bits(), Ordering::Relaxed);
    }
}

/// Pick a new frequency uniformly from `[min_hz, max_hz)`
pub fn random_frequency<R: Rng>(rng: &mut R, params: &PitchParams) -> f32 {
    let hz = rng.random_range(params.range_hz());
    // Float rounding in the range mapping can land exactly on the upper bound
    if hz >= params.max_hz {
        params.min_hz
    } else {
        hz
    }
}

/// Choose and apply a new frequency, returning it
pub fn change_frequency<R: Rng>(rng: &mut R, handle: &PitchHandle, params: &PitchParams) -> f32 {
    let hz = random_frequency(rng, params);
    handle.set(hz);
    log::info!("New frequency: {:.2} Hz", hz);
    hz
}

/// Change the pitch every `params.interval`, forever.
///
/// The first change happens one full interval after the call.
pub async fn run_pitch_changes(handle: PitchHandle, params: PitchParams) {
    let mut rng = SmallRng::from_rng(&mut rand::rng());
    let mut interval = tokio::time::interval(params.interval);
    // The first tick of a tokio interval completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        change_frequency(&mut rng, &handle, &params);
    }
}
