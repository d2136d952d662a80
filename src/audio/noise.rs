//! White noise source rendered on the audio thread.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// The platform could not provide entropy to seed the noise generator
#[derive(Debug, Error)]
#[error("white noise unavailable: {0}")]
pub struct NoiseUnavailable(String);

impl NoiseUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Uniform white noise, independent per channel and per sample
pub struct WhiteNoise {
    rng: SmallRng,
}

impl WhiteNoise {
    /// Seed from OS entropy
    pub fn try_new() -> Result<Self, NoiseUnavailable> {
        let rng = SmallRng::try_from_os_rng().map_err(|e| NoiseUnavailable::new(e.to_string()))?;
        Ok(Self { rng })
    }

    /// Deterministic generator
    #[cfg(test)]
    pub(crate) fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next sample in [-1, 1)
    pub fn next_sample(&mut self) -> f32 {
        self.rng.random::<f32>() * 2.0 - 1.0
    }

    /// Write a fresh sample into every channel of one frame
    pub fn fill(&mut self, frame: &mut [f32]) {
        for sample in frame.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
