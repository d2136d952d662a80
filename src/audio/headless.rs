//! Device-less renderer for machines without an audio output.
//!
//! Renders the graph on its own thread in real-time-sized blocks so the
//! capture tap sees the same timing a sound card would impose.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::bail;

use super::graph::SignalGraph;
use super::tap::{CaptureTap, TapFormat};
use super::AudioBackend;
use crate::params::OutputParams;

pub struct HeadlessSystem {
    params: OutputParams,
    running: Arc<AtomicBool>,
    render_thread: Option<thread::JoinHandle<()>>,
}

impl HeadlessSystem {
    pub fn new(params: OutputParams) -> anyhow::Result<Self> {
        if let Err(e) = params.validate() {
            bail!("Invalid output config: {}", e);
        }
        Ok(Self {
            params,
            running: Arc::new(AtomicBool::new(false)),
            render_thread: None,
        })
    }
}

impl AudioBackend for HeadlessSystem {
    fn start(&mut self, mut graph: SignalGraph) -> anyhow::Result<CaptureTap> {
        if self.render_thread.is_some() {
            bail!("Headless renderer already started");
        }
        let tap = graph.prepare(TapFormat {
            sample_rate_hz: self.params.sample_rate_hz,
            channels: self.params.channels,
        });
        log::info!(
            "Headless audio: {}Hz, {} channels",
            self.params.sample_rate_hz,
            self.params.channels
        );

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let block_duration = self.params.block_duration();
        let mut block = vec![0.0f32; self.params.block_frames * self.params.channels as usize];

        let handle = thread::Builder::new()
            .name("headless-audio".to_string())
            .spawn(move || {
                let started = Instant::now();
                let mut deadline = started;
                while running.load(Ordering::SeqCst) {
                    graph.render(&mut block);
                    deadline += block_duration;
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    }
                }
            })?;
        self.render_thread = Some(handle);
        log::info!("Machinery sound started (headless)");
        Ok(tap)
    }
}

impl Drop for HeadlessSystem {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.render_thread.take() {
            let _ = handle.join();
        }
    }
}
