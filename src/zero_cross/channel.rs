//! Lock-free ISR → task handoff of the latest zero-cross prediction.
//!
//! ```text
//! ┌─────────────┐  publish()   ┌────────────────────┐  try_consume()  ┌──────────────┐
//! │ GPIO ISR    │─────────────▶│ predicted_us (i64) │────────────────▶│ control task │
//! │ (producer)  │              │ pending     (bool) │                 │ (consumer)   │
//! └─────────────┘              └────────────────────┘                 └──────────────┘
//! ```
//!
//! Only the freshest prediction matters: a publish overwrites whatever the
//! task has not consumed yet.

use portable_atomic::{AtomicBool, AtomicI64, Ordering};

/// Single-producer / single-consumer cell carrying the predicted timestamp
/// of the next zero-crossing plus an "unconsumed" flag.
///
/// Xtensa has no native 64-bit atomics; `portable_atomic` falls back to an
/// interrupt-safe critical section there and uses native atomics elsewhere.
#[derive(Debug, Default)]
pub struct CrossingChannel {
    predicted_us: AtomicI64,
    pending: AtomicBool,
}

impl CrossingChannel {
    pub const fn new() -> Self {
        Self {
            predicted_us: AtomicI64::new(0),
            pending: AtomicBool::new(false),
        }
    }

    /// Publish a new prediction.  Safe to call from ISR context (lock-free).
    ///
    /// The release store of the flag orders the timestamp store before it.
    pub fn publish(&self, predicted_us: i64) {
        self.predicted_us.store(predicted_us, Ordering::Relaxed);
        self.pending.store(true, Ordering::Release);
    }

    /// Take the latest prediction if one arrived since the last call.
    ///
    /// Returns `None` when nothing new was published.
    pub fn try_consume(&self) -> Option<i64> {
        if self.pending.swap(false, Ordering::AcqRel) {
            Some(self.predicted_us.load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// `true` if a prediction is waiting to be consumed.
    pub fn has_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
