//! Bounded latency history backing the per-target trend charts.

use std::collections::VecDeque;

/// Default number of samples kept per target.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Fixed-capacity FIFO of latency samples for one target.
///
/// Samples are kept oldest first. Once the buffer is full, each push evicts
/// the oldest sample, so the length never exceeds [`capacity`](Self::capacity).
/// Every mutation bumps [`revision`](Self::revision), which the trend renderer
/// uses to decide whether a chart needs redrawing.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleHistory {
    samples: VecDeque<f64>,
    capacity: usize,
    revision: u64,
}

impl Default for SampleHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SampleHistory {
    /// Create an empty history holding at most `capacity` samples.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            revision: 0,
        }
    }

    /// Append a sample, evicting the oldest one when full.
    ///
    /// Negative and non-finite values are stored as 0.
    pub fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sanitize(value));
        self.revision += 1;
    }

    /// Replace the contents with a window reported by the status source.
    ///
    /// Only the newest `capacity` samples of the window are kept.
    pub fn replace_tail(&mut self, window: &[f64]) {
        let skip = window.len().saturating_sub(self.capacity);
        self.samples.clear();
        self.samples.extend(window[skip..].iter().copied().map(sanitize));
        self.revision += 1;
    }

    /// The samples in chronological order, oldest first.
    pub fn samples(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    /// Iterate over the samples without copying.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counter bumped on every mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_evicts_oldest_first() {
        let mut history = SampleHistory::new(3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            history.push(v);
        }
        assert_eq!(history.samples(), vec![2.0, 3.0, 4.0]);
        assert_eq!(history.latest(), Some(4.0));
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut history = SampleHistory::new(5);
        for i in 0..1000 {
            history.push(i as f64);
            assert!(history.len() <= 5);
        }
        assert_eq!(history.samples(), vec![995.0, 996.0, 997.0, 998.0, 999.0]);
    }

    #[test]
    fn test_negative_and_nan_clamped_to_zero() {
        let mut history = SampleHistory::new(4);
        history.push(-12.0);
        history.push(f64::NAN);
        history.push(f64::INFINITY);
        history.push(8.5);
        assert_eq!(history.samples(), vec![0.0, 0.0, 0.0, 8.5]);
    }

    #[test]
    fn test_replace_tail_keeps_newest_window() {
        let mut history = SampleHistory::new(3);
        history.push(100.0);
        history.replace_tail(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(history.samples(), vec![3.0, 4.0, 5.0]);

        history.replace_tail(&[7.0]);
        assert_eq!(history.samples(), vec![7.0]);
    }

    #[test]
    fn test_revision_changes_on_every_mutation() {
        let mut history = SampleHistory::new(2);
        let r0 = history.revision();
        history.push(1.0);
        let r1 = history.revision();
        history.replace_tail(&[1.0]);
        let r2 = history.revision();
        assert!(r0 < r1 && r1 < r2);
    }

    #[test]
    fn test_zero_capacity_coerced() {
        let mut history = SampleHistory::new(0);
        history.push(1.0);
        history.push(2.0);
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.samples(), vec![2.0]);
    }
}
