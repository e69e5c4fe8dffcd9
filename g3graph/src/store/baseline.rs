/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use ahash::AHashMap;

use g3_histogram::Histogram;

use crate::types::MetricKey;

/// Last cumulative value seen for every metric.
#[derive(Default)]
pub(super) struct Baselines {
    scalar: AHashMap<MetricKey, i64>,
    histogram: AHashMap<MetricKey, Histogram>,
}

impl Baselines {
    /// Return `current - previous` and keep `current` for the next call.
    pub(super) fn scalar_delta(&mut self, key: &MetricKey, current: i64) -> i64 {
        let previous = self.scalar.insert(key.clone(), current).unwrap_or(0);
        current.wrapping_sub(previous)
    }

    pub(super) fn histogram_delta(&mut self, key: &MetricKey, current: Histogram) -> Histogram {
        match self.histogram.get_mut(key) {
            Some(previous) => {
                let delta = current.subtract(previous);
                *previous = current;
                delta
            }
            None => {
                let delta = current.clone();
                self.histogram.insert(key.clone(), current);
                delta
            }
        }
    }
}
