use std::fmt;

use candid::Nat;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use ringbuffer::{AllocRingBuffer, NonPowerOfTwo, RingBuffer};

use crate::error::{CyclesError, Result};
use crate::types::MAX_USAGE_WINDOW;

/// Simple moving average over the last `window` usage samples.
///
/// When the window is full, recording a new sample evicts the oldest one.
pub struct UsageTracker {
    samples: AllocRingBuffer<Nat, NonPowerOfTwo>,
}

impl UsageTracker {
    pub fn new(window: u64) -> Result<Self> {
        let capacity = Some(window)
            .filter(|window| (1..=MAX_USAGE_WINDOW).contains(window))
            .and_then(|window| usize::try_from(window).ok())
            .ok_or_else(|| {
                CyclesError::InvalidConfig(format!(
                    "usage window must be between 1 and {MAX_USAGE_WINDOW}, got {window}"
                ))
            })?;

        Ok(Self {
            samples: AllocRingBuffer::with_capacity_non_power_of_two(capacity),
        })
    }

    /// Rebuilds the tracker from samples ordered from the oldest to the newest. If there are
    /// more samples than the window holds, only the newest ones are kept.
    pub fn from_samples(window: u64, samples: impl IntoIterator<Item = Nat>) -> Result<Self> {
        let mut tracker = Self::new(window)?;
        for sample in samples {
            tracker.record(sample);
        }

        Ok(tracker)
    }

    pub fn record(&mut self, sample: Nat) {
        self.samples.push(sample);
    }

    /// Average of the samples in the window, or `0.0` if nothing was recorded yet.
    pub fn average(&self) -> f64 {
        let count = self.samples.len();
        if count == 0 {
            return 0.0;
        }

        let total: BigUint = self.samples.iter().map(|sample| &sample.0).sum();
        total.to_f64().unwrap_or(f64::INFINITY) / count as f64
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    pub fn window(&self) -> u64 {
        self.samples.capacity() as u64
    }

    /// Samples in the window, from the oldest to the newest.
    pub fn samples(&self) -> Vec<Nat> {
        self.samples.iter().cloned().collect()
    }
}

impl fmt::Debug for UsageTracker {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UsageTracker")
            .field("window", &self.window())
            .field("samples", &self.samples())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_USAGE_WINDOW;

    fn tracker_with(window: u64, samples: &[u64]) -> UsageTracker {
        UsageTracker::from_samples(window, samples.iter().map(|s| Nat::from(*s))).unwrap()
    }

    #[test]
    fn empty_tracker_averages_to_zero() {
        let tracker = UsageTracker::new(5).unwrap();
        assert!(tracker.is_empty());
        assert_eq!(tracker.average(), 0.0);
    }

    #[test]
    fn averages_recorded_samples() {
        let tracker = tracker_with(5, &[10, 20, 30]);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.average(), 20.0);
    }

    #[test]
    fn oldest_sample_is_evicted_when_window_is_full() {
        let mut tracker = tracker_with(3, &[100, 1, 2]);
        assert_eq!(tracker.average(), 103.0 / 3.0);

        tracker.record(Nat::from(3u64));
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.average(), 2.0);
        assert_eq!(
            tracker.samples(),
            vec![Nat::from(1u64), Nat::from(2u64), Nat::from(3u64)]
        );
    }

    #[test]
    fn restoring_more_samples_than_window_keeps_newest() {
        let tracker = tracker_with(2, &[1, 2, 3, 4]);
        assert_eq!(tracker.samples(), vec![Nat::from(3u64), Nat::from(4u64)]);
        assert_eq!(tracker.window(), 2);
    }

    #[test]
    fn huge_samples_are_averaged() {
        let big = Nat::from(u128::MAX);
        let tracker = UsageTracker::from_samples(2, [big.clone(), big]).unwrap();
        assert_eq!(tracker.average(), u128::MAX as f64);
    }

    #[test]
    fn default_window_holds_thirty_samples() {
        let mut tracker = UsageTracker::new(DEFAULT_USAGE_WINDOW).unwrap();
        assert_eq!(tracker.window(), 30);
        for sample in 1..=31u64 {
            tracker.record(Nat::from(sample));
        }
        assert_eq!(tracker.len(), 30);
        assert_eq!(tracker.average(), 16.5);
    }

    #[test]
    fn odd_window_evicts_oldest() {
        let tracker = tracker_with(7, &[100, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(tracker.window(), 7);
        assert_eq!(tracker.average(), 1.0);
    }

    #[test]
    fn out_of_range_window_is_rejected() {
        for window in [0, MAX_USAGE_WINDOW + 1, u64::MAX] {
            assert!(matches!(
                UsageTracker::new(window),
                Err(CyclesError::InvalidConfig(_))
            ));
        }
    }
}
