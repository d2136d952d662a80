//! Fixed signal path: oscillator -> gain -> filter, noise -> filter, filter -> output.

use super::filter::LowPass;
use super::noise::{NoiseUnavailable, WhiteNoise};
use super::oscillator::Oscillator;
use super::pitch::PitchHandle;
use super::tap::{CaptureTap, TapFormat};
use crate::params::{audio_constants::OUTPUT_LIMIT, FilterParams, NoiseParams, ToneParams};

/// The whole hum generator, rendered block by block on the audio thread
pub struct SignalGraph {
    oscillator: Oscillator,
    tone_gain: f32,

    /// None when noise could not be initialised (tone-only output)
    noise: Option<WhiteNoise>,
    noise_gain: f32,

    filter_params: FilterParams,
    filter: LowPass,

    format: TapFormat,
    tap: Option<CaptureTap>,

    /// Scratch frame for noise samples
    noise_frame: Vec<f32>,
}

impl SignalGraph {
    /// Build the graph around an explicit noise source (or none)
    pub fn new(
        tone: &ToneParams,
        noise_params: &NoiseParams,
        filter: &FilterParams,
        pitch: PitchHandle,
        noise: Option<WhiteNoise>,
    ) -> Self {
        let format = TapFormat {
            sample_rate_hz: 44100,
            channels: 2,
        };
        Self {
            oscillator: Oscillator::new(tone.waveform, pitch),
            tone_gain: tone.gain,
            noise,
            noise_gain: noise_params.gain,
            filter_params: filter.clone(),
            filter: LowPass::new(
                filter.cutoff_hz,
                filter.q,
                format.sample_rate_hz as f32,
                format.channels as usize,
            ),
            format,
            tap: None,
            noise_frame: vec![0.0; format.channels as usize],
        }
    }

    /// Build the graph with OS-seeded noise, falling back to tone-only output
    pub fn with_os_noise(
        tone: &ToneParams,
        noise_params: &NoiseParams,
        filter: &FilterParams,
        pitch: PitchHandle,
    ) -> Self {
        Self::with_noise_source(tone, noise_params, filter, pitch, WhiteNoise::try_new)
    }

    /// Build the graph with noise from `make_noise`; a failure degrades to tone-only output
    pub fn with_noise_source<F>(
        tone: &ToneParams,
        noise_params: &NoiseParams,
        filter: &FilterParams,
        pitch: PitchHandle,
        make_noise: F,
    ) -> Self
    where
        F: FnOnce() -> Result<WhiteNoise, NoiseUnavailable>,
    {
        let noise = match make_noise() {
            Ok(noise) => {
                log::info!("White noise source configured");
                Some(noise)
            }
            Err(e) => {
                log::error!("{}; continuing with tone-only output", e);
                None
            }
        };
        Self::new(tone, noise_params, filter, pitch, noise)
    }

    pub fn has_noise(&self) -> bool {
        self.noise.is_some()
    }

    /// Configure the graph for the output format and install a capture tap on the mix
    pub fn prepare(&mut self, format: TapFormat) -> CaptureTap {
        self.format = format;
        self.filter = LowPass::new(
            self.filter_params.cutoff_hz,
            self.filter_params.q,
            format.sample_rate_hz as f32,
            format.channels as usize,
        );
        self.noise_frame = vec![0.0; format.channels as usize];
        let tap = CaptureTap::new(format);
        self.tap = Some(tap.clone());
        tap
    }

    /// Fill an interleaved buffer with the next frames of output
    pub fn render(&mut self, out: &mut [f32]) {
        let channels = self.format.channels as usize;
        let sample_rate_hz = self.format.sample_rate_hz as f32;

        for frame in out.chunks_mut(channels) {
            let tone = self.oscillator.next_sample(sample_rate_hz) * self.tone_gain;
            match self.noise.as_mut() {
                Some(noise) => noise.fill(&mut self.noise_frame),
                None => self.noise_frame.fill(0.0),
            }
            for (channel, sample) in frame.iter_mut().enumerate() {
                let mixed = tone + self.noise_frame[channel] * self.noise_gain;
                *sample = self
                    .filter
                    .process(channel, mixed)
                    .clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);
            }
        }

        if let Some(tap) = &self.tap {
            tap.offer(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(noise: Option<WhiteNoise>) -> SignalGraph {
        SignalGraph::new(
            &ToneParams::default(),
            &NoiseParams::default(),
            &FilterParams::default(),
            PitchHandle::new(120.0),
            noise,
        )
    }

    #[test]
    fn test_unavailable_noise_degrades_to_tone_only() {
        let mut graph = SignalGraph::with_noise_source(
            &ToneParams::default(),
            &NoiseParams::default(),
            &FilterParams::default(),
            PitchHandle::new(120.0),
            || Err(NoiseUnavailable::new("no entropy")),
        );
        assert!(!graph.has_noise());

        let mut out = vec![0.0; 512];
        graph.render(&mut out);
        assert!(out.iter().any(|s| *s != 0.0));
        for frame in out.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
    }

    #[test]
    fn test_available_noise_is_wired_in() {
        let graph = SignalGraph::with_noise_source(
            &ToneParams::default(),
            &NoiseParams::default(),
            &FilterParams::default(),
            PitchHandle::new(120.0),
            || Ok(WhiteNoise::from_seed(9)),
        );
        assert!(graph.has_noise());
    }

    #[test]
    fn test_render_respects_output_limit() {
        let mut graph = graph(Some(WhiteNoise::from_seed(3)));
        let mut out = vec![0.0; 4096];
        graph.render(&mut out);
        assert!(out.iter().all(|s| s.abs() <= OUTPUT_LIMIT));
        assert!(out.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_tone_only_graph_is_identical_across_channels() {
        let mut graph = graph(None);
        assert!(!graph.has_noise());
        let mut out = vec![0.0; 512];
        graph.render(&mut out);
        for frame in out.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(out.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_noise_differs_between_channels() {
        let mut graph = graph(Some(WhiteNoise::from_seed(3)));
        let mut out = vec![0.0; 512];
        graph.render(&mut out);
        assert!(out.chunks(2).any(|frame| frame[0] != frame[1]));
    }

    #[test]
    fn test_tap_receives_rendered_output() {
        let mut graph = graph(Some(WhiteNoise::from_seed(3)));
        let tap = graph.prepare(TapFormat {
            sample_rate_hz: 48000,
            channels: 1,
        });
        let mut before = vec![0.0; 64];
        graph.render(&mut before);

        assert!(tap.attach(0));
        let mut first = vec![0.0; 64];
        let mut second = vec![0.0; 64];
        graph.render(&mut first);
        graph.render(&mut second);
        let captured = tap.detach().unwrap();

        assert_eq!(captured.len(), 128);
        assert_eq!(&captured[..64], &first[..]);
        assert_eq!(&captured[64..], &second[..]);
    }
}
