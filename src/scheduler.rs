//! Phase-control scheduler: the task half of the control loop.
//!
//! One pass through the state machine handles one mains half-cycle:
//!
//! ```text
//!        ┌──────────────────────────── Advance ◀───────────────┐
//!        ▼                              (ramp, emit Cycle)     │
//! WaitForSignal ──prediction──▶ ScheduleCoarse ──▶ FireFine ───┘
//!   (poll channel)              (yielding sleep)   (spin, fire TRIAC)
//! ```
//!
//! The prediction taken in `WaitForSignal` is carried through both timing
//! states; a newer one published during the coarse sleep waits for the
//! next cycle.
//!
//! All timing goes through the [`Clock`] port, so the whole loop runs on a
//! simulated clock in tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::info;

use crate::app::events::{AppEvent, CycleReport};
use crate::app::ports::{Clock, EventSink};
use crate::config::DimmerConfig;
use crate::control::firing::{firing_offset_us, in_firing_window};
use crate::control::ramp::DimSource;
use crate::drivers::triac::TriacDriver;
use crate::zero_cross::channel::CrossingChannel;

// ═══════════════════════════════════════════════════════════════
//  State machine
// ═══════════════════════════════════════════════════════════════

/// Control-loop state.  Each [`PhaseScheduler::step`] performs the work of
/// the current state and moves to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseState {
    /// Polling the crossing channel for a fresh prediction.
    WaitForSignal,
    /// Prediction in hand; sleep off the bulk of the wait if it is long.
    ScheduleCoarse { predicted_us: i64 },
    /// Compute the firing delay, spin to it and pulse the gate.
    FireFine { predicted_us: i64 },
    /// Half-cycle handled; move the dim level and report.
    Advance { time_until_trigger_us: i64, fired: bool },
}

/// Timing parameters of the loop, taken from [`DimmerConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTiming {
    pub latency_compensation_us: i64,
    pub half_cycle_us: i64,
    pub coarse_sleep_threshold_us: i64,
    pub coarse_sleep_margin_us: i64,
}

impl PhaseTiming {
    pub fn from_config(config: &DimmerConfig) -> Self {
        Self {
            latency_compensation_us: config.latency_compensation_us,
            half_cycle_us: config.half_cycle_us,
            coarse_sleep_threshold_us: config.coarse_sleep_threshold_us,
            coarse_sleep_margin_us: config.coarse_sleep_margin_us,
        }
    }
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self::from_config(&DimmerConfig::default())
    }
}

/// Cooperative stop signal for [`PhaseScheduler::run`].
///
/// Clones share the same flag.  The firmware never cancels; host ports and
/// tests use it for a clean shutdown.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

pub struct PhaseScheduler<C, P, D, L> {
    channel: Arc<CrossingChannel>,
    clock: C,
    triac: TriacDriver<P, D>,
    dim: L,
    timing: PhaseTiming,
    state: PhaseState,
    cycles: u64,
}

impl<C, P, D, L> PhaseScheduler<C, P, D, L>
where
    C: Clock,
    P: OutputPin,
    D: DelayNs,
    L: DimSource,
{
    pub fn new(
        channel: Arc<CrossingChannel>,
        clock: C,
        triac: TriacDriver<P, D>,
        dim: L,
        timing: PhaseTiming,
    ) -> Self {
        Self {
            channel,
            clock,
            triac,
            dim,
            timing,
            state: PhaseState::WaitForSignal,
            cycles: 0,
        }
    }

    pub fn state(&self) -> PhaseState {
        self.state
    }

    /// Completed half-cycles (fired or skipped).
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn dim(&self) -> &L {
        &self.dim
    }

    /// Run the current state once and return the state entered.
    pub fn step(&mut self, sink: &mut impl EventSink) -> PhaseState {
        self.state = match self.state {
            PhaseState::WaitForSignal => match self.channel.try_consume() {
                Some(predicted_us) => PhaseState::ScheduleCoarse { predicted_us },
                None => {
                    self.clock.relax();
                    PhaseState::WaitForSignal
                }
            },

            PhaseState::ScheduleCoarse { predicted_us } => {
                let time_until_trigger = predicted_us - self.clock.now_us();
                if time_until_trigger > self.timing.coarse_sleep_threshold_us {
                    let ms = (time_until_trigger - self.timing.coarse_sleep_margin_us) / 1000;
                    self.clock.sleep_ms(u32::try_from(ms).unwrap_or(u32::MAX));
                }
                PhaseState::FireFine { predicted_us }
            }

            PhaseState::FireFine { predicted_us } => {
                let now = self.clock.now_us();
                let time_until_trigger = predicted_us - now
                    + self.timing.latency_compensation_us
                    + firing_offset_us(self.dim.percent(), self.timing.half_cycle_us);

                let fired = in_firing_window(time_until_trigger, self.timing.half_cycle_us);
                if fired {
                    self.clock.spin_until(now + time_until_trigger);
                    self.triac.fire();
                }
                PhaseState::Advance {
                    time_until_trigger_us: time_until_trigger,
                    fired,
                }
            }

            PhaseState::Advance {
                time_until_trigger_us,
                fired,
            } => {
                self.dim.advance();
                self.cycles += 1;
                sink.emit(&AppEvent::Cycle(CycleReport {
                    percent: self.dim.percent(),
                    time_until_trigger_us,
                    fired,
                }));
                PhaseState::WaitForSignal
            }
        };
        self.state
    }

    /// Step forever, or until `cancel` fires.
    ///
    /// Cancellation is checked between steps, so a cycle already past
    /// `WaitForSignal` finishes its current state first.
    pub fn run(&mut self, sink: &mut impl EventSink, cancel: &CancellationToken) {
        info!("control: phase loop started");
        sink.emit(&AppEvent::ControlStarted);

        while !cancel.is_cancelled() {
            self.step(sink);
        }

        info!("control: phase loop stopped after {} cycles", self.cycles);
        sink.emit(&AppEvent::ControlStopped { cycles: self.cycles });
    }
}
