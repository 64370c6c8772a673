use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::buffer::SignalBuffer;
use crate::config::Configuration;
use crate::error::EngineError;
use crate::frame::LumaFrame;
use crate::pipeline::EstimationPipeline;
use crate::sampler::FrameSampler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Sampling,
    Estimating,
    Stopped,
}

/// Orchestrates the rPPG pipeline.
///
/// Owns the sample buffer and two tasks: a sampling task draining the frame
/// channel through the [`FrameSampler`] into the [`SignalBuffer`], and an
/// estimation task running the [`EstimationPipeline`] on a fresh snapshot
/// once per configured interval. Estimates are published on a broadcast
/// channel (one value per tick) and mirrored into a watch slot holding the
/// last published BPM.
pub struct HeartRateEngine {
    configuration: Configuration,
    buffer: Arc<SignalBuffer>,
    frame_tx: mpsc::Sender<LumaFrame>,
    frame_rx: Option<mpsc::Receiver<LumaFrame>>,
    estimate_tx: broadcast::Sender<u32>,
    current_tx: Option<watch::Sender<u32>>,
    current_rx: watch::Receiver<u32>,
    cancel_token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
    state: Arc<Mutex<EngineState>>,
}

impl HeartRateEngine {
    pub fn builder(configuration: Configuration) -> HeartRateEngineBuilder {
        HeartRateEngineBuilder::new(configuration)
    }

    /// Sender the camera layer pushes luminance frames into.
    pub fn frame_sender(&self) -> mpsc::Sender<LumaFrame> {
        self.frame_tx.clone()
    }

    /// One BPM value per estimation tick. Ticks without enough buffered
    /// signal re-emit the prior value.
    pub fn subscribe(&self) -> broadcast::Receiver<u32> {
        self.estimate_tx.subscribe()
    }

    /// Last published BPM, `NO_ESTIMATE` (0) until the first full pass.
    pub fn current_estimate(&self) -> u32 {
        *self.current_rx.borrow()
    }

    /// Number of samples currently buffered.
    pub fn sample_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn state(&self) -> EngineState {
        *lock_state(&self.state)
    }

    /// Begins accepting frames and schedules periodic estimation.
    pub fn start(&mut self) -> Result<(), EngineError> {
        {
            let mut state = lock_state(&self.state);
            if *state != EngineState::Idle {
                return Err(EngineError::AlreadyStarted);
            }
            *state = EngineState::Sampling;
        }
        // Guarded by the state transition above; both are always present
        // while the engine is idle.
        let frame_rx = self.frame_rx.take().ok_or(EngineError::AlreadyStarted)?;
        let current_tx = self.current_tx.take().ok_or(EngineError::AlreadyStarted)?;

        tracing::info!("engine started");
        self.tasks.push(self.spawn_sampling_task(frame_rx));
        self.tasks.push(self.spawn_estimation_task(current_tx));
        Ok(())
    }

    /// Halts sampling, cancels future estimation ticks and clears the
    /// buffer. An in-progress pass is allowed to finish; its result is
    /// simply stale.
    pub fn stop(&self) -> Result<(), EngineError> {
        let mut state = lock_state(&self.state);
        match *state {
            EngineState::Idle => return Err(EngineError::NotRunning),
            EngineState::Stopped => return Ok(()),
            _ => {}
        }
        *state = EngineState::Stopped;
        drop(state);

        self.cancel_token.cancel();
        self.buffer.clear();
        tracing::info!("engine stopped");
        Ok(())
    }

    fn spawn_sampling_task(&self, mut frame_rx: mpsc::Receiver<LumaFrame>) -> JoinHandle<()> {
        let buffer = Arc::clone(&self.buffer);
        let cancel_token = self.cancel_token.clone();
        let mut sampler = FrameSampler::new(self.configuration.frame_skip);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    maybe_frame = frame_rx.recv() => {
                        let Some(frame) = maybe_frame else { break };
                        if let Some(sample) = sampler.sample(&frame) {
                            buffer.append(sample);
                        }
                    }
                }
            }
            tracing::debug!("sampling task finished");
        })
    }

    fn spawn_estimation_task(&self, current_tx: watch::Sender<u32>) -> JoinHandle<()> {
        let buffer = Arc::clone(&self.buffer);
        let cancel_token = self.cancel_token.clone();
        let estimate_tx = self.estimate_tx.clone();
        let state = Arc::clone(&self.state);
        let pipeline = EstimationPipeline::new(
            self.configuration.min_samples,
            self.configuration.peaks.clone(),
            self.configuration.bpm.clone(),
        );
        let period = Duration::from_millis(self.configuration.estimation_interval_ms);
        tokio::spawn(async move {
            let mut ticks = tokio::time::interval(period);
            ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The interval fires immediately once; skip that tick so the
            // first estimate waits a full period of sampling.
            ticks.tick().await;
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    _ = ticks.tick() => {
                        set_state(&state, EngineState::Estimating);
                        let snapshot = buffer.snapshot();
                        match pipeline.estimate(&snapshot) {
                            Some(bpm) => {
                                tracing::debug!(bpm, samples = snapshot.len(), "estimate published");
                                current_tx.send_replace(bpm);
                                // Receivers may come and go; a tick with no
                                // listener is not an error.
                                let _ = estimate_tx.send(bpm);
                            }
                            None => {
                                tracing::debug!(samples = snapshot.len(), "insufficient data, keeping prior estimate");
                                let _ = estimate_tx.send(*current_tx.borrow());
                            }
                        }
                        set_state(&state, EngineState::Sampling);
                    }
                }
            }
            tracing::debug!("estimation task finished");
        })
    }
}

impl Drop for HeartRateEngine {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

fn lock_state(state: &Mutex<EngineState>) -> std::sync::MutexGuard<'_, EngineState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn set_state(state: &Mutex<EngineState>, next: EngineState) {
    let mut state = lock_state(state);
    // Stop wins over tick-driven transitions.
    if *state != EngineState::Stopped {
        *state = next;
    }
}

pub struct HeartRateEngineBuilder {
    configuration: Configuration,
}

impl HeartRateEngineBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    // Overrides the buffer capacity from the configuration.
    pub fn buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.configuration.buffer_capacity = buffer_capacity;
        self
    }

    // Overrides how many raw frames feed one sample.
    pub fn frame_skip(mut self, frame_skip: u32) -> Self {
        self.configuration.frame_skip = frame_skip;
        self
    }

    // Overrides the estimation tick period.
    pub fn estimation_interval_ms(mut self, estimation_interval_ms: u64) -> Self {
        self.configuration.estimation_interval_ms = estimation_interval_ms;
        self
    }

    // Overrides the effective sampling rate consumed by the BPM formula.
    pub fn sampling_rate_hz(mut self, sampling_rate_hz: f32) -> Self {
        self.configuration.sampling_rate_hz = sampling_rate_hz;
        self.configuration.bpm.sampling_rate_hz = sampling_rate_hz;
        self
    }

    pub fn build(self) -> HeartRateEngine {
        let (frame_tx, frame_rx) = mpsc::channel(self.configuration.frame_channel_size);
        let (estimate_tx, _) = broadcast::channel(self.configuration.estimate_channel_size);
        let (current_tx, current_rx) = watch::channel(crate::pipeline::NO_ESTIMATE);
        HeartRateEngine {
            buffer: Arc::new(SignalBuffer::new(self.configuration.buffer_capacity)),
            configuration: self.configuration,
            frame_tx,
            frame_rx: Some(frame_rx),
            estimate_tx,
            current_tx: Some(current_tx),
            current_rx,
            cancel_token: CancellationToken::new(),
            tasks: Vec::new(),
            state: Arc::new(Mutex::new(EngineState::Idle)),
        }
    }
}
