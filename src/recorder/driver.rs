//! Async driver executing recorder commands against real timers.

use std::collections::VecDeque;

use log::{error, info, warn};

use super::capture::Capture;
use super::machine::{Command, Event, FragmentRecorder, RecorderError};
use crate::upload::Upload;

/// What happened over a full recording run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecorderSummary {
    /// Fragment slots used (always the configured maximum on completion)
    pub recorded: u32,
    pub delivered: u32,
    pub failed_uploads: u32,
    pub discarded_empty: u32,
    /// Captures that could not be stopped or encoded
    pub stop_failures: u32,
    pub rejected_captures: u32,
}

/// Record fragments until the recorder reaches `Done`.
///
/// Fragments are strictly sequential: each one is captured, stopped,
/// uploaded and released before the next begins.
pub async fn run<C, U>(
    recorder: &mut FragmentRecorder,
    capture: &mut C,
    uploader: &U,
) -> Result<RecorderSummary, RecorderError>
where
    C: Capture,
    U: Upload,
{
    let mut summary = RecorderSummary::default();
    let mut events = VecDeque::from([Event::Begin]);

    while let Some(event) = events.pop_front() {
        for command in recorder.step(event)? {
            match command {
                Command::StartCapture { fragment } => match capture.start() {
                    Ok(()) => {
                        info!("Recording fragment {}...", fragment);
                        events.push_back(Event::CaptureStarted);
                    }
                    Err(e) => {
                        error!("Could not record fragment {}: {}", fragment, e);
                        summary.rejected_captures += 1;
                        events.push_back(Event::CaptureRejected);
                    }
                },
                Command::StopAfter(duration) => {
                    tokio::time::sleep(duration).await;
                    events.push_back(Event::DurationElapsed);
                }
                Command::StopCapture => match capture.stop() {
                    Ok(payload) => events.push_back(Event::Stopped(payload)),
                    Err(e) => {
                        error!("Capture failed while stopping: {}", e);
                        summary.stop_failures += 1;
                        events.push_back(Event::StopFailed);
                    }
                },
                Command::Upload { fragment, payload } => {
                    info!("Uploading fragment {} ({} bytes)", fragment, payload.len());
                    let outcome = uploader.upload(payload).await;
                    if outcome.is_delivered() {
                        info!("Fragment {} {}", fragment, outcome);
                        summary.delivered += 1;
                    } else {
                        error!("Fragment {} upload {}; dropping it", fragment, outcome);
                        summary.failed_uploads += 1;
                    }
                }
                Command::Discard { fragment } => {
                    warn!("Fragment {} is empty, not uploading", fragment);
                    summary.discarded_empty += 1;
                }
                Command::ReleaseTap => capture.release(),
                Command::BeginAfter(pause) => {
                    tokio::time::sleep(pause).await;
                    events.push_back(Event::Begin);
                }
                Command::Finish => {
                    info!(
                        "Recorded all {} fragments; recording stopped",
                        recorder.recorded()
                    );
                }
            }
        }
    }

    summary.recorded = recorder.recorded();
    Ok(summary)
}
