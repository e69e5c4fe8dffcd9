/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use ahash::AHashMap;

use g3_histogram::{Histogram, SyncHistogram};

use super::{MetricsRegistry, RegistryError};
use crate::types::{MetricKey, MetricKind};

type ValueMap = RwLock<AHashMap<Arc<str>, Arc<AtomicI64>>>;
type TimingMap = RwLock<AHashMap<Arc<str>, Arc<SyncHistogram>>>;

/// In process counters, gauges and timings.
///
/// Metrics are created on first use and live as long as the registry.
#[derive(Default)]
pub struct StatsRegistry {
    counter: ValueMap,
    gauge: ValueMap,
    timing: TimingMap,
}

fn get_or_insert<T: Default>(
    map: &RwLock<AHashMap<Arc<str>, Arc<T>>>,
    name: &str,
) -> Arc<T> {
    {
        let map = map.read().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = map.get(name) {
            return slot.clone();
        }
    }

    let mut map = map.write().unwrap_or_else(|e| e.into_inner());
    map.entry(Arc::from(name)).or_default().clone()
}

fn get<T>(map: &RwLock<AHashMap<Arc<str>, Arc<T>>>, name: &str) -> Option<Arc<T>> {
    let map = map.read().unwrap_or_else(|e| e.into_inner());
    map.get(name).cloned()
}

fn names<T>(map: &RwLock<AHashMap<Arc<str>, Arc<T>>>) -> Vec<Arc<str>> {
    let map = map.read().unwrap_or_else(|e| e.into_inner());
    map.keys().cloned().collect()
}

impl StatsRegistry {
    pub fn new() -> Self {
        StatsRegistry::default()
    }

    /// Add `delta` to a counter and return the new value.
    pub fn incr(&self, name: &str, delta: i64) -> i64 {
        let v = get_or_insert(&self.counter, name);
        v.fetch_add(delta, Ordering::Relaxed).wrapping_add(delta)
    }

    pub fn set_gauge(&self, name: &str, value: i64) {
        let v = get_or_insert(&self.gauge, name);
        v.store(value, Ordering::Relaxed);
    }

    /// Record one timing observation and return the observation count.
    pub fn add_timing(&self, name: &str, value: i64) -> i64 {
        let h = get_or_insert(&self.timing, name);
        h.add(value)
    }

    /// Record a duration as milliseconds.
    pub fn add_duration(&self, name: &str, duration: Duration) -> i64 {
        let millis = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.add_timing(name, millis)
    }

    /// Run `f` and record how long it took.
    pub fn time<T, F>(&self, name: &str, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        let start = Instant::now();
        let r = f();
        self.add_duration(name, start.elapsed());
        r
    }
}

impl MetricsRegistry for StatsRegistry {
    fn all_keys(&self) -> Vec<MetricKey> {
        let mut keys = Vec::new();
        for name in names(&self.counter) {
            keys.push(MetricKey::new(MetricKind::Counter, &name));
        }
        for name in names(&self.gauge) {
            keys.push(MetricKey::new(MetricKind::Gauge, &name));
        }
        for name in names(&self.timing) {
            keys.push(MetricKey::new(MetricKind::Timing, &name));
        }
        keys
    }

    fn current_value(&self, key: &MetricKey) -> Result<i64, RegistryError> {
        let map = match key.kind() {
            MetricKind::Counter => &self.counter,
            MetricKind::Gauge => &self.gauge,
            MetricKind::Timing => {
                return Err(RegistryError::KindMismatch {
                    key: key.clone(),
                    expected: MetricKind::Counter,
                    actual: MetricKind::Timing,
                });
            }
        };
        get(map, key.name())
            .map(|v| v.load(Ordering::Relaxed))
            .ok_or_else(|| RegistryError::NotFound(key.clone()))
    }

    fn current_histogram(&self, key: &MetricKey) -> Result<Histogram, RegistryError> {
        if key.kind() != MetricKind::Timing {
            return Err(RegistryError::KindMismatch {
                key: key.clone(),
                expected: MetricKind::Timing,
                actual: key.kind(),
            });
        }
        get(&self.timing, key.name())
            .map(|h| h.snapshot().into_histogram())
            .ok_or_else(|| RegistryError::NotFound(key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter() {
        let stats = StatsRegistry::new();
        assert_eq!(stats.incr("dogs", 3), 3);
        assert_eq!(stats.incr("dogs", 4), 7);
        assert_eq!(stats.current_value(&MetricKey::counter("dogs")).unwrap(), 7);
        assert!(matches!(
            stats.current_value(&MetricKey::counter("cats")),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn gauge() {
        let stats = StatsRegistry::new();
        stats.set_gauge("load", 10);
        stats.set_gauge("load", 4);
        assert_eq!(stats.current_value(&MetricKey::gauge("load")).unwrap(), 4);
    }

    #[test]
    fn timing() {
        let stats = StatsRegistry::new();
        assert_eq!(stats.add_timing("run", 5), 1);
        assert_eq!(stats.add_duration("run", Duration::from_millis(10)), 2);
        let v: u32 = stats.time("run", || 42);
        assert_eq!(v, 42);

        let h = stats.current_histogram(&MetricKey::timing("run")).unwrap();
        assert_eq!(h.count(), 3);
        assert!(h.sum() >= 15);

        assert!(matches!(
            stats.current_value(&MetricKey::timing("run")),
            Err(RegistryError::KindMismatch { .. })
        ));
        assert!(matches!(
            stats.current_histogram(&MetricKey::counter("run")),
            Err(RegistryError::KindMismatch { .. })
        ));
    }

    #[test]
    fn all_keys() {
        let stats = StatsRegistry::new();
        stats.incr("a", 1);
        stats.set_gauge("b", 1);
        stats.add_timing("c", 1);

        let mut keys: Vec<String> = stats.all_keys().iter().map(|k| k.to_string()).collect();
        keys.sort();
        assert_eq!(keys, vec!["counter:a", "gauge:b", "timing:c"]);
    }
}
