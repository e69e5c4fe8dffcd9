/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Periodic time series of counters, gauges and timings.
//!
//! A [`sample::PeriodicSampler`] reads the cumulative value of every metric of
//! a [`registry::MetricsRegistry`] once per interval and records the change
//! since the previous round into a [`store::TimeSeriesStore`]. The retained
//! series are served as json rows by [`query::QueryAdapter`], timing
//! percentiles are computed when requested.

pub mod config;
pub mod query;
pub mod registry;
pub mod sample;
pub mod store;
pub mod types;
