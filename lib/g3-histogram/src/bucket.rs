/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use once_cell::sync::Lazy;

const DEFAULT_BUCKET_COUNT: usize = 53;
const DEFAULT_GROWTH_FACTOR: f64 = 1.3;

static GLOBAL_TABLE: Lazy<BucketTable> =
    Lazy::new(|| BucketTable::geometric(DEFAULT_BUCKET_COUNT, DEFAULT_GROWTH_FACTOR));

/// Ascending bucket boundaries shared by histograms.
///
/// Each boundary is an exclusive upper bound: bucket `i` holds values in
/// `[bounds[i-1], bounds[i])`, bucket 0 holds everything below `bounds[0]`
/// and the extra bucket at index `len()` holds everything at or above the
/// last boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTable {
    bounds: Box<[i64]>,
}

impl BucketTable {
    /// The process wide table, 53 boundaries growing by a factor of 1.3.
    pub fn global() -> &'static BucketTable {
        &GLOBAL_TABLE
    }

    /// Build a table of `len` distinct boundaries from the series `growth^k`,
    /// truncated to integers, with duplicates skipped.
    ///
    /// `growth` must be greater than 1.
    pub fn geometric(len: usize, growth: f64) -> Self {
        assert!(growth > 1.0, "growth factor should be greater than 1");

        let mut bounds: Vec<i64> = Vec::with_capacity(len);
        let mut n = 1.0_f64;
        while bounds.len() < len {
            let v = n.floor() as i64;
            if bounds.last().is_none_or(|last| *last < v) {
                bounds.push(v);
            }
            n *= growth;
        }
        BucketTable {
            bounds: bounds.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> &[i64] {
        &self.bounds
    }

    /// Number of finite boundaries, the overflow bucket not included.
    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<i64> {
        self.bounds.get(index).copied()
    }

    /// Find the bucket for `value`.
    ///
    /// This is the smallest `i` with `bounds[i] > value`, so a value equal to
    /// a boundary lands in the next bucket. Returns `len()` for the overflow
    /// bucket.
    pub fn index_of(&self, value: i64) -> usize {
        self.bounds.partition_point(|&b| b <= value)
    }
}
