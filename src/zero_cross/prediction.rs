//! Rolling-average prediction of the next zero-crossing.
//!
//! Each accepted period sample lands in a fixed-capacity ring; the
//! prediction is "this edge plus the average period".  Averaging over the
//! last [`HISTORY_CAPACITY`] half-cycles smooths out opto-isolator jitter
//! while still following slow drift of the mains frequency.

use std::sync::Arc;

use heapless::HistoryBuffer;

use super::channel::CrossingChannel;
use super::debounce::PeriodSample;
use crate::config::HISTORY_CAPACITY;

/// Ring of the most recent period samples.
///
/// Once full, each write overwrites the oldest sample.
#[derive(Debug, Clone)]
pub struct SignalHistory {
    samples: HistoryBuffer<i32, HISTORY_CAPACITY>,
}

impl Default for SignalHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalHistory {
    pub fn new() -> Self {
        Self {
            samples: HistoryBuffer::new(),
        }
    }

    pub fn push(&mut self, sample: PeriodSample) {
        self.samples.write(sample.as_us());
    }

    /// Number of valid samples (saturates at capacity).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }

    /// Samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = PeriodSample> + '_ {
        self.samples
            .oldest_ordered()
            .copied()
            .map(PeriodSample::from_us)
    }

    /// Mean period rounded to the nearest microsecond, `None` when empty.
    pub fn mean_us(&self) -> Option<i64> {
        let n = self.samples.len() as i64;
        if n == 0 {
            return None;
        }
        let sum: i64 = self.samples.as_slice().iter().map(|&s| i64::from(s)).sum();
        // Samples are strictly positive, so half-up equals half-away-from-zero.
        Some((sum + n / 2) / n)
    }
}

/// Owns the period history and publishes a fresh prediction per sample.
#[derive(Debug)]
pub struct PredictionModel {
    history: SignalHistory,
    channel: Arc<CrossingChannel>,
}

impl PredictionModel {
    pub fn new(channel: Arc<CrossingChannel>) -> Self {
        Self {
            history: SignalHistory::new(),
            channel,
        }
    }

    /// Record `sample` observed at `now_us` and publish the predicted
    /// timestamp of the next crossing.
    ///
    /// Runs in ISR context: no allocation, no locks.
    pub fn observe(&mut self, sample: PeriodSample, now_us: i64) -> i64 {
        self.history.push(sample);
        // History holds at least `sample` now.
        let mean = self.history.mean_us().unwrap_or(i64::from(sample.as_us()));
        let predicted = now_us + mean;
        self.channel.publish(predicted);
        predicted
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }
}
