//! Audio output on the default cpal device.

use anyhow::{anyhow, bail, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::graph::SignalGraph;
use super::tap::{CaptureTap, TapFormat};
use super::AudioBackend;

/// Plays the signal graph on the system's default output device
pub struct AudioSystem {
    device: cpal::Device,

    /// Audio output stream (kept alive)
    stream: Option<cpal::Stream>,
}

impl AudioSystem {
    pub fn new() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        log::info!("cpal host: {}", host.id().name());
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No audio output device found"))?;
        log::info!(
            "cpal device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );
        Ok(Self {
            device,
            stream: None,
        })
    }
}

impl AudioBackend for AudioSystem {
    fn start(&mut self, mut graph: SignalGraph) -> anyhow::Result<CaptureTap> {
        if self.stream.is_some() {
            bail!("Audio output already started");
        }

        let config = self
            .device
            .default_output_config()
            .context("Failed to get audio config")?;
        let stream_config: cpal::StreamConfig = config.into();
        log::info!(
            "Audio: {}Hz, {} channels",
            stream_config.sample_rate.0,
            stream_config.channels
        );

        let tap = graph.prepare(TapFormat {
            sample_rate_hz: stream_config.sample_rate.0,
            channels: stream_config.channels,
        });

        // Build audio output stream; the graph is owned by the callback
        let stream = self
            .device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| graph.render(data),
                |err| log::error!("Audio stream error: {}", err),
                None,
            )
            .context("Failed to build audio stream")?;

        stream.play().context("Failed to start audio stream")?;
        log::info!("Machinery sound started");

        self.stream = Some(stream);
        Ok(tap)
    }
}
