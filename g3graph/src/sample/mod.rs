/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::registry::{MetricsRegistry, RegistryError};
use crate::store::{Delta, Round, TimeSeriesStore};
use crate::types::{MetricKey, MetricKind};

mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
}

const STATE_IDLE: u8 = 0;
const STATE_SAMPLING: u8 = 1;

/// Marks the sampler busy for its lifetime, even if a registry read panics.
struct SamplingGuard<'a>(&'a AtomicU8);

impl<'a> SamplingGuard<'a> {
    fn enter(state: &'a AtomicU8) -> Self {
        state.store(STATE_SAMPLING, Ordering::Release);
        SamplingGuard(state)
    }
}

impl Drop for SamplingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(STATE_IDLE, Ordering::Release);
    }
}

/// Result of one sampling round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub tick: u64,
    pub timestamp: i64,
    pub recorded: usize,
    pub failed: usize,
}

/// Turns the cumulative metrics of a registry into per interval deltas.
pub struct PeriodicSampler {
    registry: Arc<dyn MetricsRegistry>,
    store: Arc<TimeSeriesStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    state: AtomicU8,
    round_lock: Mutex<()>,
}

impl PeriodicSampler {
    /// Sample `registry` into `store`, once per interval of the store.
    pub fn new(registry: Arc<dyn MetricsRegistry>, store: Arc<TimeSeriesStore>) -> Self {
        PeriodicSampler {
            interval: store.interval(),
            registry,
            store,
            clock: Arc::new(SystemClock),
            state: AtomicU8::new(STATE_IDLE),
            round_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn state(&self) -> SamplerState {
        match self.state.load(Ordering::Acquire) {
            STATE_SAMPLING => SamplerState::Sampling,
            _ => SamplerState::Idle,
        }
    }

    /// Run one round now.
    ///
    /// Rounds are serialized, a call made while another round is running
    /// waits for it to finish. The round becomes visible to readers once
    /// every metric has been recorded.
    pub fn sample_once(&self) -> RoundSummary {
        let _round_guard = self.round_lock.lock().unwrap_or_else(|e| e.into_inner());
        let state_guard = SamplingGuard::enter(&self.state);

        let round = self.store.begin_round(self.clock.now_secs());
        let mut recorded = 0;
        let mut failed = 0;
        for key in self.registry.all_keys() {
            match self.sample_key(&round, &key) {
                Ok(_) => recorded += 1,
                Err(e) => {
                    warn!("failed to sample metric {key} at tick {}: {e}", round.tick);
                    failed += 1;
                }
            }
        }

        self.store.commit_round(&round);
        drop(state_guard);
        debug!(
            "sampling round {} at {}: {recorded} recorded, {failed} failed",
            round.tick, round.timestamp
        );
        RoundSummary {
            tick: round.tick,
            timestamp: round.timestamp,
            recorded,
            failed,
        }
    }

    fn sample_key(&self, round: &Round, key: &MetricKey) -> Result<(), RegistryError> {
        let delta = match key.kind() {
            MetricKind::Counter | MetricKind::Gauge => {
                let current = self.registry.current_value(key)?;
                Delta::Scalar(self.store.scalar_delta(key, current))
            }
            MetricKind::Timing => {
                let current = self.registry.current_histogram(key)?;
                Delta::Histogram(self.store.histogram_delta(key, current))
            }
        };
        self.store.record_tick(round, key, delta);
        Ok(())
    }

    /// Sample every interval until `quit_receiver` fires or is closed.
    ///
    /// The first round runs one interval after start. A round that finishes
    /// late pushes the following deadlines back instead of bursting.
    pub async fn into_running(self, mut quit_receiver: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("sampler started with interval {:?}", self.interval);

        loop {
            tokio::select! {
                biased;

                _ = quit_receiver.recv() => break,
                _ = interval.tick() => {
                    self.sample_once();
                }
            }
        }

        info!("sampler stopped");
    }

    pub fn spawn(self, handle: Option<Handle>) -> SamplerHandle {
        let handle = handle.unwrap_or_else(Handle::current);
        let (quit_sender, quit_receiver) = broadcast::channel(1);
        let join = handle.spawn(self.into_running(quit_receiver));
        SamplerHandle { quit_sender, join }
    }
}

pub struct SamplerHandle {
    quit_sender: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl SamplerHandle {
    /// Stop the sampler and wait for a running round to finish.
    pub async fn stop(self) {
        let _ = self.quit_sender.send(());
        let _ = self.join.await;
    }
}
