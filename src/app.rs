//! Startup sequence: config, then sound, then the pitch timer and recorder.

use anyhow::{bail, Context};

use crate::audio::{pitch, AudioBackend, PitchHandle, SignalGraph};
use crate::config::{self, ConfigSource, UploadConfig};
use crate::params::{
    FilterParams, NoiseParams, PitchParams, RecorderParams, ToneParams, UploadParams,
};
use crate::recorder::{self, FragmentRecorder, RecorderSummary, TapCapture};
use crate::upload::Upload;

/// Everything a run needs besides the audio backend and uploader
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_source: ConfigSource,
    /// MIME type fragments are captured as
    pub capture_mime: String,
    pub tone: ToneParams,
    pub noise: NoiseParams,
    pub filter: FilterParams,
    pub pitch: PitchParams,
    pub recorder: RecorderParams,
    pub upload: UploadParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_source: ConfigSource::default(),
            capture_mime: "audio/wav".to_string(),
            tone: ToneParams::default(),
            noise: NoiseParams::default(),
            filter: FilterParams::default(),
            pitch: PitchParams::default(),
            recorder: RecorderParams::default(),
            upload: UploadParams::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Err(e) = self.pitch.validate() {
            bail!("Invalid pitch config: {}", e);
        }
        if let Err(e) = self.recorder.validate() {
            bail!("Invalid recorder config: {}", e);
        }
        if let Err(e) = self.upload.validate() {
            bail!("Invalid upload config: {}", e);
        }
        Ok(())
    }
}

/// Load the config, start the sound and record every fragment.
///
/// A config failure returns before the backend is touched. The backend
/// keeps playing after this returns for as long as the caller holds it.
pub async fn run<B, U, F>(
    settings: &Settings,
    backend: &mut B,
    make_uploader: F,
) -> anyhow::Result<RecorderSummary>
where
    B: AudioBackend,
    U: Upload,
    F: FnOnce(&UploadConfig, &UploadParams) -> anyhow::Result<U>,
{
    settings.validate()?;

    let upload_config = config::load(&settings.config_source)
        .await
        .context("Failed to start")?;
    log::info!("Upload endpoint: {}", upload_config.lambda_api_url);
    let uploader =
        make_uploader(&upload_config, &settings.upload).context("Failed to create uploader")?;
    let mut recorder = FragmentRecorder::new(settings.recorder.clone())?;

    let pitch_handle = PitchHandle::new(settings.tone.initial_frequency_hz);
    let graph = SignalGraph::with_os_noise(
        &settings.tone,
        &settings.noise,
        &settings.filter,
        pitch_handle.clone(),
    );
    let tap = backend.start(graph).context("Failed to start audio")?;

    let pitch_task = tokio::spawn(pitch::run_pitch_changes(pitch_handle, settings.pitch.clone()));

    let mut capture = TapCapture::new(
        tap,
        settings.capture_mime.clone(),
        settings.recorder.fragment_duration,
    );
    let result = recorder::run(&mut recorder, &mut capture, &uploader).await;

    // Pitch keeps drifting while the caller lets the sound play on
    if result.is_err() {
        pitch_task.abort();
    }
    Ok(result?)
}
