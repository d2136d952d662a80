//! Humtap - synthetic machinery hum generator
//!
//! Plays a drifting sawtooth "motor" over filtered white noise, records the
//! mix in fixed-length fragments and uploads each one to the configured
//! endpoint.

use clap::Parser;

use humtap::app::{self, Settings};
use humtap::audio::{AudioBackend, AudioSystem, HeadlessSystem};
use humtap::cli::Args;
use humtap::upload::HttpUploader;

/// Run the recording session, then keep the sound playing until Ctrl-C
async fn play<B: AudioBackend>(
    settings: &Settings,
    mut backend: B,
    exit_when_done: bool,
) -> anyhow::Result<()> {
    let summary = app::run(settings, &mut backend, |config, params| {
        Ok(HttpUploader::new(config.lambda_api_url.clone(), params)?)
    })
    .await?;

    log::info!(
        "Recording finished: {} fragments, {} delivered, {} failed, {} empty, {} stop failures, {} rejected",
        summary.recorded,
        summary.delivered,
        summary.failed_uploads,
        summary.discarded_empty,
        summary.stop_failures,
        summary.rejected_captures
    );

    if !exit_when_done {
        log::info!("Press Ctrl-C to quit");
        tokio::signal::ctrl_c().await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = args.settings();

    let result = if args.headless {
        match HeadlessSystem::new(args.output_params()) {
            Ok(backend) => play(&settings, backend, args.exit_when_done).await,
            Err(e) => Err(e),
        }
    } else {
        match AudioSystem::new() {
            Ok(backend) => play(&settings, backend, args.exit_when_done).await,
            Err(e) => Err(e),
        }
    };

    if let Err(e) = result {
        log::error!("Error starting the system: {:#}", e);
        std::process::exit(1);
    }
}
