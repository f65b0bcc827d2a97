//! Zero-cross edge debouncer.
//!
//! The opto-isolator output rings and picks up mains noise, so the GPIO
//! interrupt fires on spurious edges too.  Only intervals consistent with
//! one mains half-cycle become period samples; everything else is dropped
//! without comment.

use crate::config::DimmerConfig;

/// Interval between two consecutive accepted zero-cross edges (µs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PeriodSample(i32);

impl PeriodSample {
    pub const fn from_us(us: i32) -> Self {
        Self(us)
    }

    pub const fn as_us(self) -> i32 {
        self.0
    }
}

/// Rejects edges whose distance to the previous edge lies outside the
/// debounce window.
#[derive(Debug, Clone)]
pub struct EdgeDebouncer {
    previous_edge_us: i64,
    min_us: i64,
    max_us: i64,
}

impl EdgeDebouncer {
    /// `min_us` and `max_us` are exclusive bounds.
    pub const fn new(min_us: i64, max_us: i64) -> Self {
        Self {
            previous_edge_us: 0,
            min_us,
            max_us,
        }
    }

    pub fn from_config(config: &DimmerConfig) -> Self {
        Self::new(config.debounce_min_us, config.debounce_max_us)
    }

    /// Register an edge seen at `now_us`.
    ///
    /// Every edge becomes the new baseline, accepted or not.  ISR-safe:
    /// no allocation, no blocking.
    pub fn on_edge(&mut self, now_us: i64) -> Option<PeriodSample> {
        let interval = now_us - self.previous_edge_us;
        self.previous_edge_us = now_us;

        if interval > self.min_us && interval < self.max_us {
            // Window bounds are well inside i32.
            Some(PeriodSample(interval as i32))
        } else {
            None
        }
    }

    /// Timestamp of the most recent edge, accepted or not.
    pub fn previous_edge_us(&self) -> i64 {
        self.previous_edge_us
    }
}
