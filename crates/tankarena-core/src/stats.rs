//! Rolling telemetry series for debug graphs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::constants::RANGE_EPSILON;

/// Closed value range used to scale a graph axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    /// Range spanning `min..=max`. A zero-width range is widened to a
    /// symmetric band of `RANGE_EPSILON` around the value.
    pub fn new(min: f32, max: f32) -> Self {
        if max - min <= 0.0 {
            let centre = (min + max) * 0.5;
            Self {
                min: centre - RANGE_EPSILON,
                max: centre + RANGE_EPSILON,
            }
        } else {
            Self { min, max }
        }
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    /// Position of `value` within the range, 0 at min and 1 at max.
    pub fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / self.span()
    }
}

/// Fixed-capacity ring of samples, newest last.
#[derive(Debug, Clone, Serialize)]
pub struct SampleHistory {
    capacity: usize,
    samples: VecDeque<f32>,
}

impl SampleHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    pub fn push(&mut self, value: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Auto-scaled range of the stored samples, `None` when empty.
    pub fn range(&self) -> Option<ValueRange> {
        let mut iter = self.samples.iter().copied().filter(|v| v.is_finite());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(ValueRange::new(min, max))
    }
}
