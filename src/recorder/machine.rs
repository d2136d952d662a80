//! Recorder state machine: one transition per external event.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::params::RecorderParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Waiting to begin the next fragment
    Idle,
    /// Capturing fragment `fragment` (1-based)
    Recording { fragment: u32 },
    /// Stop requested, waiting for the captured payload
    Stopping { fragment: u32 },
    /// Every fragment slot is used; terminal
    Done,
}

/// Something that happened outside the state machine
#[derive(Debug)]
pub enum Event {
    /// Time to begin a fragment
    Begin,
    /// The capture tap is live
    CaptureStarted,
    /// The capture could not be started (e.g. unsupported format)
    CaptureRejected,
    /// The fragment duration has passed
    DurationElapsed,
    /// The capture stopped and produced this payload
    Stopped(Vec<u8>),
    /// The capture could not be stopped or encoded; nothing to upload
    StopFailed,
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::Begin => "Begin",
            Event::CaptureStarted => "CaptureStarted",
            Event::CaptureRejected => "CaptureRejected",
            Event::DurationElapsed => "DurationElapsed",
            Event::Stopped(_) => "Stopped",
            Event::StopFailed => "StopFailed",
        }
    }
}

/// Work the driver must perform, in order
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    StartCapture { fragment: u32 },
    StopAfter(Duration),
    StopCapture,
    Upload { fragment: u32, payload: Vec<u8> },
    /// Fragment produced no bytes and is dropped
    Discard { fragment: u32 },
    ReleaseTap,
    BeginAfter(Duration),
    Finish,
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("invalid recorder config: {0}")]
    InvalidParams(String),

    #[error("event {event} is not valid in state {state}")]
    InvalidTransition {
        state: RecorderState,
        event: &'static str,
    },
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderState::Idle => write!(f, "Idle"),
            RecorderState::Recording { fragment } => write!(f, "Recording({})", fragment),
            RecorderState::Stopping { fragment } => write!(f, "Stopping({})", fragment),
            RecorderState::Done => write!(f, "Done"),
        }
    }
}

/// Sequencing of fragment recordings.
///
/// Invariants: `recorded` never decreases and never exceeds
/// `params.max_fragments`; at most one fragment is between `Recording` and
/// `Stopping` at any time; `Done` accepts no further events.
#[derive(Debug)]
pub struct FragmentRecorder {
    params: RecorderParams,
    state: RecorderState,
    recorded: u32,
}

impl FragmentRecorder {
    /// Fails when `params` would let the counter pass its bound
    pub fn new(params: RecorderParams) -> Result<Self, RecorderError> {
        params.validate().map_err(RecorderError::InvalidParams)?;
        Ok(Self {
            params,
            state: RecorderState::Idle,
            recorded: 0,
        })
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Fragment slots used so far
    pub fn recorded(&self) -> u32 {
        self.recorded
    }

    pub fn is_done(&self) -> bool {
        self.state == RecorderState::Done
    }

    /// Apply one event and return the commands it triggers
    pub fn step(&mut self, event: Event) -> Result<Vec<Command>, RecorderError> {
        match (self.state, event) {
            (RecorderState::Idle, Event::Begin) => {
                let fragment = self.recorded + 1;
                self.state = RecorderState::Recording { fragment };
                Ok(vec![Command::StartCapture { fragment }])
            }
            (RecorderState::Recording { .. }, Event::CaptureStarted) => {
                Ok(vec![Command::StopAfter(self.params.fragment_duration)])
            }
            (RecorderState::Recording { fragment }, Event::DurationElapsed) => {
                self.state = RecorderState::Stopping { fragment };
                Ok(vec![Command::StopCapture])
            }
            (RecorderState::Recording { .. }, Event::CaptureRejected)
            | (RecorderState::Stopping { .. }, Event::StopFailed) => {
                // A failed attempt still uses up its slot
                let mut commands = vec![Command::ReleaseTap];
                commands.push(self.complete_fragment());
                Ok(commands)
            }
            (RecorderState::Stopping { fragment }, Event::Stopped(payload)) => {
                let mut commands = Vec::with_capacity(3);
                if payload.is_empty() {
                    commands.push(Command::Discard { fragment });
                } else {
                    commands.push(Command::Upload { fragment, payload });
                }
                commands.push(Command::ReleaseTap);
                commands.push(self.complete_fragment());
                Ok(commands)
            }
            (state, event) => Err(RecorderError::InvalidTransition {
                state,
                event: event.name(),
            }),
        }
    }

    fn complete_fragment(&mut self) -> Command {
        self.recorded += 1;
        if self.recorded < self.params.max_fragments {
            self.state = RecorderState::Idle;
            Command::BeginAfter(self.params.pause)
        } else {
            self.state = RecorderState::Done;
            Command::Finish
        }
    }
}
