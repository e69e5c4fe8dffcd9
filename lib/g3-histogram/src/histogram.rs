/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::BucketTable;

/// A log bucket histogram over the global [`BucketTable`].
///
/// All counters are signed: subtracting a snapshot that is not an earlier
/// state of the same histogram leaves negative values instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    buckets: Box<[i64]>,
    count: i64,
    sum: i64,
}

impl Default for Histogram {
    fn default() -> Self {
        Histogram::new()
    }
}

impl Histogram {
    /// Returned by percentile and maximum queries when the value falls in
    /// the overflow bucket.
    pub const UNBOUNDED: i64 = i64::MAX;

    pub fn new() -> Self {
        Histogram {
            buckets: vec![0; BucketTable::global().len() + 1].into_boxed_slice(),
            count: 0,
            sum: 0,
        }
    }

    #[inline]
    pub fn bucket_index(value: i64) -> usize {
        BucketTable::global().index_of(value)
    }

    /// Record one observation and return the new total count.
    pub fn add(&mut self, value: i64) -> i64 {
        self.add_to_bucket(Histogram::bucket_index(value));
        self.sum = self.sum.wrapping_add(value);
        self.count
    }

    /// Increase a bucket and the count, leaving `sum` untouched.
    ///
    /// Out of range indexes go to the overflow bucket.
    pub fn add_to_bucket(&mut self, index: usize) {
        let last = self.buckets.len() - 1;
        let slot = &mut self.buckets[index.min(last)];
        *slot = slot.wrapping_add(1);
        self.count = self.count.wrapping_add(1);
    }

    pub fn clear(&mut self) {
        self.buckets.fill(0);
        self.count = 0;
        self.sum = 0;
    }

    pub fn merge(&mut self, other: &Histogram) {
        if other.count <= 0 {
            return;
        }
        for (b, o) in self.buckets.iter_mut().zip(other.buckets.iter()) {
            *b = b.wrapping_add(*o);
        }
        self.count = self.count.wrapping_add(other.count);
        self.sum = self.sum.wrapping_add(other.sum);
    }

    /// Compute `self - other` into a new histogram.
    ///
    /// `other` must be an earlier snapshot of the histogram `self` was taken
    /// from, otherwise some of the returned counters are negative.
    pub fn subtract(&self, other: &Histogram) -> Histogram {
        let buckets = self
            .buckets
            .iter()
            .zip(other.buckets.iter())
            .map(|(b, o)| b.wrapping_sub(*o))
            .collect();
        Histogram {
            buckets,
            count: self.count.wrapping_sub(other.count),
            sum: self.sum.wrapping_sub(other.sum),
        }
    }

    /// Approximate the value at fraction `p` of the observations.
    ///
    /// The result is the largest value the bucket holding the target rank
    /// can contain, so the error is bounded by the width of that bucket.
    /// Returns 0 when `p * count` is not positive and [`Histogram::UNBOUNDED`]
    /// if the rank is in the overflow bucket.
    pub fn percentile(&self, p: f64) -> i64 {
        let target = p * self.count as f64;
        let mut total = 0_i64;
        let mut index = 0_usize;
        while (total as f64) < target && index < self.buckets.len() {
            total += self.buckets[index];
            index += 1;
        }
        if index == 0 {
            return 0;
        }
        self.bucket_upper_value(index - 1)
    }

    pub fn minimum(&self) -> i64 {
        if self.count == 0 {
            return 0;
        }
        match self.buckets.iter().position(|b| *b != 0) {
            Some(index) => self.bucket_upper_value(index),
            None => 0,
        }
    }

    pub fn maximum(&self) -> i64 {
        if self.buckets[self.buckets.len() - 1] > 0 {
            return Histogram::UNBOUNDED;
        }
        if self.count == 0 {
            return 0;
        }
        match self.buckets.iter().rposition(|b| *b != 0) {
            Some(index) => self.bucket_upper_value(index),
            None => 0,
        }
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum as f64 / self.count as f64
        }
    }

    #[inline]
    pub fn count(&self) -> i64 {
        self.count
    }

    #[inline]
    pub fn sum(&self) -> i64 {
        self.sum
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn buckets(&self) -> &[i64] {
        &self.buckets
    }

    fn bucket_upper_value(&self, index: usize) -> i64 {
        match BucketTable::global().get(index) {
            Some(bound) => bound - 1,
            None => Histogram::UNBOUNDED,
        }
    }
}
