/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;

use ahash::AHashMap;

use g3_histogram::Histogram;

use crate::types::{MetricKey, MetricKind};

mod buffer;
pub use buffer::{Sample, TimeSeriesBuffer};

mod baseline;
use baseline::Baselines;

/// Activity of one metric during one sampling interval.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delta {
    Scalar(i64),
    Histogram(Histogram),
}

impl Delta {
    /// The delta of a metric that saw no activity.
    pub fn zero(kind: MetricKind) -> Self {
        if kind.is_scalar() {
            Delta::Scalar(0)
        } else {
            Delta::Histogram(Histogram::new())
        }
    }
}

/// One sampling round, shared by every metric recorded in it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Round {
    pub tick: u64,
    pub timestamp: i64,
}

type SeriesBuffer = Arc<RwLock<TimeSeriesBuffer<Delta>>>;

/// Retained deltas of every metric, aligned to sampling rounds.
///
/// A round is opened with [`TimeSeriesStore::begin_round`], filled with
/// [`TimeSeriesStore::record_tick`] and published with
/// [`TimeSeriesStore::commit_round`]. Readers only see committed rounds.
pub struct TimeSeriesStore {
    capacity: usize,
    interval: Duration,
    rounds: RwLock<TimeSeriesBuffer<()>>,
    series: RwLock<AHashMap<MetricKey, SeriesBuffer>>,
    baselines: Mutex<Baselines>,
}

impl TimeSeriesStore {
    pub fn new(capacity: usize, interval: Duration) -> Self {
        let rounds = TimeSeriesBuffer::new(capacity);
        TimeSeriesStore {
            capacity: rounds.capacity(),
            interval,
            rounds: RwLock::new(rounds),
            series: RwLock::new(AHashMap::default()),
            baselines: Mutex::new(Baselines::default()),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Time between two rounds, also used to space backfilled rows.
    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn interval_secs(&self) -> i64 {
        i64::try_from(self.interval.as_secs()).unwrap_or(i64::MAX)
    }

    /// Open the round following the last committed one.
    ///
    /// Nothing is visible to readers until the round is committed.
    pub fn begin_round(&self, timestamp: i64) -> Round {
        let rounds = self.rounds.read().unwrap_or_else(|e| e.into_inner());
        let tick = rounds.last_tick().map_or(0, |t| t + 1);
        Round { tick, timestamp }
    }

    pub fn commit_round(&self, round: &Round) {
        let mut rounds = self.rounds.write().unwrap_or_else(|e| e.into_inner());
        rounds.push(round.tick, round.timestamp, ());
    }

    /// The most recent committed round.
    pub fn last_round(&self) -> Option<Round> {
        let rounds = self.rounds.read().unwrap_or_else(|e| e.into_inner());
        let tick = rounds.last_tick()?;
        rounds.get(tick).map(|s| Round {
            tick,
            timestamp: s.timestamp,
        })
    }

    pub fn record_tick(&self, round: &Round, key: &MetricKey, delta: Delta) {
        let buffer = self.get_or_insert_buffer(key);
        let mut buffer = buffer.write().unwrap_or_else(|e| e.into_inner());
        buffer.push(round.tick, round.timestamp, delta);
    }

    fn get_or_insert_buffer(&self, key: &MetricKey) -> SeriesBuffer {
        if let Some(buffer) = self.get_buffer(key) {
            return buffer;
        }

        // one spare slot for the round in progress
        let mut map = self.series.write().unwrap_or_else(|e| e.into_inner());
        map.entry(key.clone())
            .or_insert_with(|| Arc::new(RwLock::new(TimeSeriesBuffer::new(self.capacity + 1))))
            .clone()
    }

    fn get_buffer(&self, key: &MetricKey) -> Option<SeriesBuffer> {
        let map = self.series.read().unwrap_or_else(|e| e.into_inner());
        map.get(key).cloned()
    }

    /// Samples of `key` in the committed rounds still retained, oldest first.
    pub fn read(&self, key: &MetricKey) -> Vec<Sample<Delta>> {
        let Some(buffer) = self.get_buffer(key) else {
            return Vec::new();
        };
        let Some(last) = self.last_round() else {
            return Vec::new();
        };
        let first = (last.tick + 1).saturating_sub(self.capacity as u64);

        let buffer = buffer.read().unwrap_or_else(|e| e.into_inner());
        buffer.read_range(first, last.tick)
    }

    /// One row per round of the last `capacity` committed rounds, oldest
    /// first.
    ///
    /// Rounds where `key` has no sample read as zero. If fewer rounds have
    /// run than the store retains, the missing leading rows are given
    /// timestamps one interval apart before the first round.
    pub fn read_window(&self, key: &MetricKey) -> Vec<(i64, Delta)> {
        let Some(buffer) = self.get_buffer(key) else {
            return Vec::new();
        };

        let rounds = self.round_window();
        let buffer = buffer.read().unwrap_or_else(|e| e.into_inner());
        rounds
            .into_iter()
            .map(|(tick, timestamp)| {
                let delta = tick
                    .and_then(|t| buffer.get(t))
                    .map(|s| s.value.clone())
                    .unwrap_or_else(|| Delta::zero(key.kind()));
                (timestamp, delta)
            })
            .collect()
    }

    /// `capacity` (tick, timestamp) pairs, with no tick for synthesized rows.
    fn round_window(&self) -> Vec<(Option<u64>, i64)> {
        let rounds = self.rounds.read().unwrap_or_else(|e| e.into_inner());
        let real = rounds.read();
        let Some(first) = real.first() else {
            return Vec::new();
        };

        let step = self.interval_secs();
        let missing = self.capacity - real.len();
        let mut window = Vec::with_capacity(self.capacity);
        for i in (1..=missing).rev() {
            let back = step.saturating_mul(i as i64);
            window.push((None, first.timestamp.saturating_sub(back)));
        }
        window.extend(real.iter().map(|s| (Some(s.tick), s.timestamp)));
        window
    }

    /// Every key recorded so far, sorted.
    pub fn keys(&self) -> Vec<MetricKey> {
        let map = self.series.read().unwrap_or_else(|e| e.into_inner());
        let mut keys: Vec<MetricKey> = map.keys().cloned().collect();
        keys.sort();
        keys
    }

    fn baselines(&self) -> MutexGuard<'_, Baselines> {
        self.baselines.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Difference between `current` and the previous value of `key`, which
    /// then becomes the new baseline.
    pub fn scalar_delta(&self, key: &MetricKey, current: i64) -> i64 {
        self.baselines().scalar_delta(key, current)
    }

    /// Histogram form of [`TimeSeriesStore::scalar_delta`].
    ///
    /// `current` has to be cumulative, see [`Histogram::subtract`].
    pub fn histogram_delta(&self, key: &MetricKey, current: Histogram) -> Histogram {
        self.baselines().histogram_delta(key, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn scalar_rows(rows: &[(i64, Delta)]) -> Vec<(i64, i64)> {
        rows.iter()
            .map(|(ts, d)| match d {
                Delta::Scalar(v) => (*ts, *v),
                Delta::Histogram(_) => panic!("not a scalar"),
            })
            .collect()
    }

    fn run_round(store: &TimeSeriesStore, timestamp: i64, records: Vec<(&MetricKey, Delta)>) {
        let r = store.begin_round(timestamp);
        for (key, delta) in records {
            store.record_tick(&r, key, delta);
        }
        store.commit_round(&r);
    }

    #[test]
    fn rounds() {
        let store = TimeSeriesStore::new(60, MINUTE);
        assert!(store.last_round().is_none());
        assert_eq!(store.interval(), MINUTE);

        let r0 = store.begin_round(1000);
        assert_eq!(r0.tick, 0);
        assert!(store.last_round().is_none());
        store.commit_round(&r0);
        assert_eq!(store.last_round(), Some(r0));

        let r1 = store.begin_round(1060);
        assert_eq!(r1.tick, 1);
        assert_eq!(store.last_round(), Some(r0));
        store.commit_round(&r1);
        assert_eq!(store.last_round(), Some(r1));
    }

    #[test]
    fn record_and_read() {
        let store = TimeSeriesStore::new(60, MINUTE);
        let key = MetricKey::counter("dogs");
        assert!(store.read(&key).is_empty());
        assert!(store.read_window(&key).is_empty());

        run_round(&store, 1000, vec![(&key, Delta::Scalar(3))]);
        run_round(&store, 1060, vec![(&key, Delta::Scalar(60000))]);

        let samples = store.read(&key);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].timestamp, 1000);
        assert_eq!(samples[0].value, Delta::Scalar(3));
        assert_eq!(samples[1].value, Delta::Scalar(60000));

        assert_eq!(store.keys(), vec![key]);
    }

    #[test]
    fn round_in_progress_is_hidden() {
        let store = TimeSeriesStore::new(2, MINUTE);
        let key = MetricKey::counter("dogs");
        run_round(&store, 1000, vec![(&key, Delta::Scalar(3))]);
        run_round(&store, 1060, vec![(&key, Delta::Scalar(5))]);

        let before = store.read_window(&key);
        let samples_before = store.read(&key);
        assert_eq!(scalar_rows(&before), vec![(1000, 3), (1060, 5)]);

        let r = store.begin_round(1120);
        assert_eq!(store.read_window(&key), before);
        store.record_tick(&r, &key, Delta::Scalar(60000));
        assert_eq!(store.read_window(&key), before);
        assert_eq!(store.read(&key), samples_before);

        store.commit_round(&r);
        let after = scalar_rows(&store.read_window(&key));
        assert_eq!(after, vec![(1060, 5), (1120, 60000)]);
        assert_eq!(store.read(&key).len(), 2);
    }

    #[test]
    fn window_is_backfilled() {
        let store = TimeSeriesStore::new(60, MINUTE);
        let key = MetricKey::counter("dogs");

        run_round(&store, 10_000, vec![(&key, Delta::Scalar(3))]);
        run_round(&store, 10_060, vec![(&key, Delta::Scalar(60000))]);

        let rows = scalar_rows(&store.read_window(&key));
        assert_eq!(rows.len(), 60);
        assert_eq!(rows[0], (10_000 - 58 * 60, 0));
        assert_eq!(&rows[57..], &[(9_940, 0), (10_000, 3), (10_060, 60000)]);
    }

    #[test]
    fn window_fills_missed_rounds() {
        let store = TimeSeriesStore::new(3, MINUTE);
        let key = MetricKey::counter("late");
        let other = MetricKey::timing("other");

        run_round(&store, 0, vec![]);
        run_round(&store, 60, vec![(&other, Delta::zero(MetricKind::Timing))]);
        run_round(&store, 120, vec![(&key, Delta::Scalar(7))]);
        run_round(&store, 180, vec![(&other, Delta::Histogram(Histogram::new()))]);

        let rows = scalar_rows(&store.read_window(&key));
        assert_eq!(rows, vec![(60, 0), (120, 7), (180, 0)]);
        assert_eq!(store.read(&key).len(), 1);

        let rows = store.read_window(&other);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], (120, Delta::Histogram(Histogram::new())));
    }

    #[test]
    fn deltas() {
        let store = TimeSeriesStore::new(60, MINUTE);
        let key = MetricKey::counter("dogs");
        assert_eq!(store.scalar_delta(&key, 3), 3);
        assert_eq!(store.scalar_delta(&key, 10), 7);

        let key = MetricKey::timing("run");
        let mut h = Histogram::new();
        h.add(1);
        assert_eq!(store.histogram_delta(&key, h.clone()).count(), 1);
        h.add(2);
        h.add(3);
        assert_eq!(store.histogram_delta(&key, h).count(), 2);
    }
}
