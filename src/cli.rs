//! Command-line argument parsing.

use clap::Parser;

use crate::app::Settings;
use crate::config::{ConfigSource, DEFAULT_CONFIG_PATH};
use crate::encode::CaptureFormat;
use crate::params::OutputParams;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "humtap")]
#[command(about = "Machinery hum generator that records and uploads audio fragments", long_about = None)]
pub struct Args {
    /// Config document: a file path or an http(s) URL
    #[arg(long, value_name = "PATH|URL", default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Render without an audio device
    #[arg(long)]
    pub headless: bool,

    /// Sample rate used by the headless renderer (Hz)
    #[arg(long, value_name = "HZ", default_value = "44100")]
    pub sample_rate: u32,

    /// MIME type fragments are captured as
    #[arg(long, value_name = "MIME", default_value = "audio/wav")]
    pub format: String,

    /// Quit once every fragment is recorded instead of playing on
    #[arg(long)]
    pub exit_when_done: bool,
}

impl Args {
    /// Build run settings from the arguments, keeping every other default
    pub fn settings(&self) -> Settings {
        if !CaptureFormat::is_supported(&self.format) {
            // Not fatal: each recording attempt reports it and is skipped
            log::warn!("Capture format '{}' is not supported", self.format);
        }
        Settings {
            config_source: ConfigSource::parse(&self.config),
            capture_mime: self.format.clone(),
            ..Default::default()
        }
    }

    /// Output configuration for the headless renderer
    pub fn output_params(&self) -> OutputParams {
        OutputParams {
            sample_rate_hz: self.sample_rate,
            ..Default::default()
        }
    }
}
