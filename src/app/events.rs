//! Outbound application events.
//!
//! The [`PhaseScheduler`](crate::scheduler::PhaseScheduler) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on
//! the other side decide what to do with them (log to serial, buffer for
//! a test assertion).

/// Structured events emitted by the control loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop entered its first cycle.
    ControlStarted,

    /// One half-cycle has been handled.
    Cycle(CycleReport),

    /// The control loop observed its cancellation token and returned.
    ControlStopped { cycles: u64 },
}

/// Diagnostic observation for one control cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Dim level after the per-cycle advance (%).
    pub percent: f32,
    /// Final firing delay, latency and phase offset included (µs).
    pub time_until_trigger_us: i64,
    /// `false` when the delay fell outside the firing window.
    pub fired: bool,
}
