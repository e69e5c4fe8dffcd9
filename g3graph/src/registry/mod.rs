/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use g3_histogram::Histogram;

use crate::types::{MetricKey, MetricKind};

mod stats;
pub use stats::StatsRegistry;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("metric {0} not found")]
    NotFound(MetricKey),
    #[error("metric {key} is a {actual:?}, not a {expected:?}")]
    KindMismatch {
        key: MetricKey,
        expected: MetricKind,
        actual: MetricKind,
    },
    #[error("metric {key} unavailable: {reason}")]
    Unavailable { key: MetricKey, reason: String },
}

/// Source of the current cumulative value of every metric.
///
/// Counters and timings only ever grow between two reads, gauges may move in
/// both directions.
pub trait MetricsRegistry: Send + Sync {
    fn all_keys(&self) -> Vec<MetricKey>;

    /// Current value of a counter or gauge.
    fn current_value(&self, key: &MetricKey) -> Result<i64, RegistryError>;

    /// Current cumulative histogram of a timing.
    fn current_histogram(&self, key: &MetricKey) -> Result<Histogram, RegistryError>;
}
