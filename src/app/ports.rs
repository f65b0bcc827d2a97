//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PhaseScheduler (domain)
//! ```
//!
//! Driven adapters (clock, event sinks, config storage) implement these
//! traits.  The [`PhaseScheduler`](crate::scheduler::PhaseScheduler)
//! consumes them via generics, so the control loop never touches ESP-IDF
//! directly and runs unchanged against a simulated clock in tests.

use crate::config::DimmerConfig;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: timer hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic microsecond clock plus the two ways of waiting on it.
pub trait Clock {
    /// Microseconds since boot (monotonic).
    fn now_us(&self) -> i64;

    /// Yielding sleep.  Other tasks may run on this core meanwhile.
    fn sleep_ms(&mut self, ms: u32);

    /// Non-yielding busy-wait with microsecond resolution.
    fn delay_us(&mut self, us: u32);

    /// Busy-wait until `deadline_us`.  Returns immediately if it has passed.
    fn spin_until(&mut self, deadline_us: i64) {
        let remaining = deadline_us - self.now_us();
        if remaining > 0 {
            self.delay_us(u32::try_from(remaining).unwrap_or(u32::MAX));
        }
    }

    /// Hint issued on every empty poll of the crossing channel.
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`DimmerConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<DimmerConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DimmerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
