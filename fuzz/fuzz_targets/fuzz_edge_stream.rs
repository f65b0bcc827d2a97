//! Fuzz target: `ZeroCrossMonitor::on_edge`
//!
//! Turns arbitrary bytes into a stream of edge timestamps (16-bit gaps)
//! and drives them through the interrupt-side pipeline.  Asserts that the
//! history never exceeds capacity, only grows on in-window gaps, and that
//! every published prediction lies one rounded mean period after the edge.
//!
//! cargo fuzz run fuzz_edge_stream

#![no_main]

use std::sync::Arc;

use acdimmer::config::{DimmerConfig, HISTORY_CAPACITY};
use acdimmer::zero_cross::ZeroCrossMonitor;
use acdimmer::zero_cross::channel::CrossingChannel;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let config = DimmerConfig::default();
    let channel = Arc::new(CrossingChannel::new());
    let mut monitor = ZeroCrossMonitor::new(&config, Arc::clone(&channel));

    let mut now: i64 = 0;
    let mut previous: i64 = 0;
    for gap in data.chunks_exact(2) {
        now += i64::from(u16::from_le_bytes([gap[0], gap[1]]));
        let before = monitor.history().len();
        let interval = now - previous;
        previous = now;

        let accepted = interval > config.debounce_min_us && interval < config.debounce_max_us;
        match monitor.on_edge(now) {
            Some(predicted) => {
                assert!(accepted, "gap {interval} must have been rejected");
                let history = monitor.history();
                assert!(history.len() <= HISTORY_CAPACITY);
                assert!(history.len() >= before);
                let mean = history.mean_us().unwrap_or(0);
                assert_eq!(predicted, now + mean);
                assert!(predicted - now > config.debounce_min_us);
                assert!(predicted - now < config.debounce_max_us);
                assert_eq!(channel.try_consume(), Some(predicted));
            }
            None => {
                assert!(!accepted, "gap {interval} must have been accepted");
                assert_eq!(monitor.history().len(), before);
            }
        }
    }
});
