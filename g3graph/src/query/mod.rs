/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::sync::Arc;

use g3_histogram::{Histogram, Quantile};

use crate::config::GraphConfig;
use crate::store::{Delta, TimeSeriesStore};
use crate::types::MetricKey;

mod selector;
pub use selector::PercentileSelector;

mod route;
pub use route::route;

/// The percentile table used when none is configured.
///
/// Timing rows without a selector carry one value per entry, in this order.
pub fn default_percentiles() -> Vec<Quantile> {
    vec![
        Quantile::PCT25,
        Quantile::PCT50,
        Quantile::PCT75,
        Quantile::PCT90,
        Quantile::PCT95,
        Quantile::PCT99,
        Quantile::PCT999,
        Quantile::PCT9999,
    ]
}

/// A row is `[timestamp, value]` for counters and gauges, and
/// `[timestamp, count, percentiles...]` for timings.
pub type Row = Vec<i64>;

pub struct QueryAdapter {
    store: Arc<TimeSeriesStore>,
    percentiles: Vec<Quantile>,
    backfill: bool,
}

impl QueryAdapter {
    pub fn new(store: Arc<TimeSeriesStore>) -> Self {
        QueryAdapter {
            store,
            percentiles: default_percentiles(),
            backfill: true,
        }
    }

    pub fn with_config(store: Arc<TimeSeriesStore>, config: &GraphConfig) -> Self {
        QueryAdapter {
            store,
            percentiles: config.percentiles.clone(),
            backfill: config.backfill,
        }
    }

    #[inline]
    pub fn percentiles(&self) -> &[Quantile] {
        &self.percentiles
    }

    pub fn list_keys(&self) -> Vec<String> {
        self.store.keys().iter().map(|k| k.to_string()).collect()
    }

    /// Rows of `key`, oldest first.
    ///
    /// `selector` picks entries of the percentile table by index for timing
    /// rows and is ignored for other kinds. Unknown or malformed keys give
    /// no rows.
    pub fn query(&self, key: &str, selector: Option<&str>) -> Vec<Row> {
        let Ok(key) = MetricKey::from_str(key) else {
            return Vec::new();
        };

        let selected: Vec<f64> = match selector {
            Some(s) => PercentileSelector::parse(s, self.percentiles.len())
                .select(&self.percentiles)
                .map(|q| q.value())
                .collect(),
            None => self.percentiles.iter().map(|q| q.value()).collect(),
        };

        let samples: Vec<(i64, Delta)> = if self.backfill {
            self.store.read_window(&key)
        } else {
            self.store
                .read(&key)
                .into_iter()
                .map(|s| (s.timestamp, s.value))
                .collect()
        };

        samples
            .into_iter()
            .map(|(timestamp, delta)| match delta {
                Delta::Scalar(v) => vec![timestamp, v],
                Delta::Histogram(h) => timing_row(timestamp, &h, &selected),
            })
            .collect()
    }
}

fn timing_row(timestamp: i64, h: &Histogram, percentiles: &[f64]) -> Row {
    let mut row = Vec::with_capacity(percentiles.len() + 2);
    row.push(timestamp);
    row.push(h.count());
    row.extend(percentiles.iter().map(|p| h.percentile(*p)));
    row
}
