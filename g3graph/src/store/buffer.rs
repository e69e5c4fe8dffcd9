/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

#[derive(Clone, Debug, PartialEq)]
pub struct Sample<T> {
    pub tick: u64,
    pub timestamp: i64,
    pub value: T,
}

/// Fixed capacity ring of samples indexed by round tick.
///
/// The sample of tick `t` goes to slot `t % capacity`, replacing whatever was
/// written `capacity` ticks before. Only samples of the last `capacity` ticks
/// up to the newest write are visible.
#[derive(Debug)]
pub struct TimeSeriesBuffer<T> {
    slots: Box<[Option<Sample<T>>]>,
    last_tick: Option<u64>,
}

impl<T: Clone> TimeSeriesBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        TimeSeriesBuffer {
            slots: (0..capacity).map(|_| None).collect(),
            last_tick: None,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    fn slot_index(&self, tick: u64) -> usize {
        (tick % self.slots.len() as u64) as usize
    }

    /// Store the sample of `tick`.
    ///
    /// Ticks are expected to grow. A tick older than the newest one written
    /// still lands in its slot but is hidden once out of the visible window.
    pub fn push(&mut self, tick: u64, timestamp: i64, value: T) {
        let index = self.slot_index(tick);
        self.slots[index] = Some(Sample {
            tick,
            timestamp,
            value,
        });
        if self.last_tick.is_none_or(|last| tick > last) {
            self.last_tick = Some(tick);
        }
    }

    /// Lowest tick that is still inside the visible window.
    fn first_visible_tick(&self, last_tick: u64) -> u64 {
        (last_tick + 1).saturating_sub(self.slots.len() as u64)
    }

    /// The sample written for `tick`, if it is still retained.
    pub fn get(&self, tick: u64) -> Option<&Sample<T>> {
        let last_tick = self.last_tick?;
        if tick > last_tick || tick < self.first_visible_tick(last_tick) {
            return None;
        }
        self.slots[self.slot_index(tick)]
            .as_ref()
            .filter(|s| s.tick == tick)
    }

    /// Visible samples, oldest first.
    pub fn read(&self) -> Vec<Sample<T>> {
        let Some(last_tick) = self.last_tick else {
            return Vec::new();
        };
        (self.first_visible_tick(last_tick)..=last_tick)
            .filter_map(|tick| self.get(tick).cloned())
            .collect()
    }

    /// Retained samples with ticks in `first..=last`, oldest first.
    pub fn read_range(&self, first: u64, last: u64) -> Vec<Sample<T>> {
        (first..=last)
            .filter_map(|tick| self.get(tick).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        let Some(last_tick) = self.last_tick else {
            return 0;
        };
        (self.first_visible_tick(last_tick)..=last_tick)
            .filter(|tick| self.get(*tick).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.last_tick.is_none()
    }
}
