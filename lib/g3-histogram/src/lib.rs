/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod bucket;
pub use bucket::BucketTable;

mod histogram;
pub use histogram::Histogram;

mod distribution;
pub use distribution::Distribution;

mod sync;
pub use sync::SyncHistogram;

mod quantile;
pub use quantile::{Quantile, QuantileParseError};
