//! Zero-cross sensing: the interrupt half of the phase-control loop.
//!
//! ```text
//! ┌──────────────┐   edge    ┌───────────────┐  sample  ┌─────────────────┐  publish  ┌─────────────────┐
//! │ Opto GPIO    │──────────▶│ EdgeDebouncer │─────────▶│ PredictionModel │──────────▶│ CrossingChannel │──▶ task
//! │ (rising ISR) │           │ 5-15 ms window│          │ mean of last 50 │           │ (lock-free)     │
//! └──────────────┘           └───────────────┘          └─────────────────┘           └─────────────────┘
//! ```
//!
//! Everything on the left of the channel runs in interrupt context and is
//! owned by a single [`ZeroCrossMonitor`] created once at boot.

pub mod channel;
pub mod debounce;
pub mod prediction;

use std::sync::Arc;

use crate::config::DimmerConfig;
use channel::CrossingChannel;
use debounce::EdgeDebouncer;
use prediction::{PredictionModel, SignalHistory};

/// Interrupt-side state: debounce baseline plus period history.
///
/// Handed to the GPIO ISR registration as its argument; nothing else
/// touches it afterwards, so no synchronisation is needed beyond the
/// channel.
#[derive(Debug)]
pub struct ZeroCrossMonitor {
    debouncer: EdgeDebouncer,
    model: PredictionModel,
}

impl ZeroCrossMonitor {
    pub fn new(config: &DimmerConfig, channel: Arc<CrossingChannel>) -> Self {
        Self {
            debouncer: EdgeDebouncer::from_config(config),
            model: PredictionModel::new(channel),
        }
    }

    /// ISR body: one call per rising edge seen at `now_us`.
    ///
    /// Returns the published prediction, or `None` if the edge was noise.
    pub fn on_edge(&mut self, now_us: i64) -> Option<i64> {
        let sample = self.debouncer.on_edge(now_us)?;
        Some(self.model.observe(sample, now_us))
    }

    pub fn history(&self) -> &SignalHistory {
        self.model.history()
    }
}
