/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use crate::Histogram;

/// An immutable point in time copy of a histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    inner: Histogram,
}

impl Distribution {
    pub(crate) fn new(inner: Histogram) -> Self {
        Distribution { inner }
    }

    #[inline]
    pub fn count(&self) -> i64 {
        self.inner.count()
    }

    #[inline]
    pub fn sum(&self) -> i64 {
        self.inner.sum()
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        self.inner.mean()
    }

    #[inline]
    pub fn minimum(&self) -> i64 {
        self.inner.minimum()
    }

    #[inline]
    pub fn maximum(&self) -> i64 {
        self.inner.maximum()
    }

    #[inline]
    pub fn percentile(&self, p: f64) -> i64 {
        self.inner.percentile(p)
    }

    #[inline]
    pub fn histogram(&self) -> &Histogram {
        &self.inner
    }

    pub fn into_histogram(self) -> Histogram {
        self.inner
    }
}

impl From<Histogram> for Distribution {
    fn from(value: Histogram) -> Self {
        Distribution::new(value)
    }
}
