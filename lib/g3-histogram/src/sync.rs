/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::{Mutex, MutexGuard};

use crate::{Distribution, Histogram};

/// A histogram that can be updated and read from many threads.
///
/// Every operation holds the per instance lock, so a snapshot never sees a
/// partially applied update.
#[derive(Debug, Default)]
pub struct SyncHistogram {
    inner: Mutex<Histogram>,
}

impl SyncHistogram {
    pub fn new() -> Self {
        SyncHistogram::default()
    }

    fn lock(&self) -> MutexGuard<'_, Histogram> {
        // a panic while holding the lock can not leave the counters torn
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn add(&self, value: i64) -> i64 {
        self.lock().add(value)
    }

    pub fn merge_from(&self, other: &Histogram) {
        self.lock().merge(other);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn count(&self) -> i64 {
        self.lock().count()
    }

    pub fn snapshot(&self) -> Distribution {
        let copy = self.lock().clone();
        Distribution::new(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn snapshot_is_detached() {
        let h = SyncHistogram::new();
        h.add(10);
        h.add(20);

        let snap = h.snapshot();
        h.add(30);

        assert_eq!(snap.count(), 2);
        assert_eq!(snap.sum(), 30);
        assert_eq!(h.count(), 3);
    }

    #[test]
    fn concurrent_add() {
        let h = Arc::new(SyncHistogram::new());

        let mut handles = Vec::new();
        for t in 0..4 {
            let h = h.clone();
            handles.push(thread::spawn(move || {
                for i in 0..1000 {
                    h.add(t * 1000 + i);
                    if i % 100 == 0 {
                        let snap = h.snapshot();
                        let total: i64 = snap.histogram().buckets().iter().sum();
                        assert_eq!(total, snap.count());
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snap = h.snapshot();
        assert_eq!(snap.count(), 4000);
        assert_eq!(snap.sum(), (0..4000).sum::<i64>());
    }

    #[test]
    fn merge_and_clear() {
        let h = SyncHistogram::new();
        let mut other = Histogram::new();
        other.add(3);
        other.add(4);
        h.merge_from(&other);
        assert_eq!(h.snapshot().into_histogram(), other);

        h.clear();
        assert_eq!(h.count(), 0);
    }
}
