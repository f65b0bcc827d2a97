//! Simulated hardware for integration tests.
//!
//! `SimClock` owns simulated time.  Mains zero-crossings are queued as
//! timestamps and delivered to a [`ZeroCrossMonitor`] whenever time moves
//! past them, exactly as the GPIO ISR would on the board.  The gate pin
//! records every level change with the simulated time it happened at.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use acdimmer::app::events::{AppEvent, CycleReport};
use acdimmer::app::ports::{Clock, EventSink};
use acdimmer::scheduler::CancellationToken;
use acdimmer::zero_cross::ZeroCrossMonitor;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

/// Simulated time advanced by one empty poll of the crossing channel.
pub const POLL_STEP_US: i64 = 10;

#[derive(Default)]
struct SimState {
    now: Cell<i64>,
    sleeps: RefCell<Vec<u32>>,
    edges: RefCell<VecDeque<i64>>,
    monitor: RefCell<Option<ZeroCrossMonitor>>,
}

// ── SimClock ──────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SimClock {
    state: Rc<SimState>,
}

#[allow(dead_code)]
impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route queued edges to `monitor` as time passes them.
    pub fn attach(&self, monitor: ZeroCrossMonitor) {
        *self.state.monitor.borrow_mut() = Some(monitor);
    }

    /// Queue zero-crossings at the given times (ascending).
    pub fn queue_edges(&self, times: impl IntoIterator<Item = i64>) {
        self.state.edges.borrow_mut().extend(times);
    }

    /// Queue `count` crossings `period_us` apart starting at `first_us`.
    pub fn queue_mains(&self, first_us: i64, period_us: i64, count: usize) {
        self.queue_edges((0..count as i64).map(|i| first_us + i * period_us));
    }

    /// Move time forward to `t`, delivering every edge on the way.
    pub fn advance_to(&self, t: i64) {
        loop {
            let next = self.state.edges.borrow().front().copied();
            match next {
                Some(edge) if edge <= t => {
                    self.state.edges.borrow_mut().pop_front();
                    self.state.now.set(edge);
                    if let Some(m) = self.state.monitor.borrow_mut().as_mut() {
                        m.on_edge(edge);
                    }
                }
                _ => break,
            }
        }
        self.state.now.set(t.max(self.state.now.get()));
    }

    pub fn advance_by(&self, us: i64) {
        self.advance_to(self.state.now.get() + us);
    }

    pub fn sleeps(&self) -> Vec<u32> {
        self.state.sleeps.borrow().clone()
    }

    pub fn history_len(&self) -> usize {
        self.state
            .monitor
            .borrow()
            .as_ref()
            .map_or(0, |m| m.history().len())
    }
}

impl Clock for SimClock {
    fn now_us(&self) -> i64 {
        self.state.now.get()
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.state.sleeps.borrow_mut().push(ms);
        self.advance_by(i64::from(ms) * 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance_by(i64::from(us));
    }

    fn relax(&mut self) {
        self.advance_by(POLL_STEP_US);
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance_by(i64::from(ns.div_ceil(1000)));
    }
}

// ── MockGate ──────────────────────────────────────────────────

/// Gate pin recording `(time, level)` for every write.
pub struct MockGate {
    clock: SimClock,
    pub writes: Rc<RefCell<Vec<(i64, bool)>>>,
}

impl MockGate {
    pub fn new(clock: SimClock) -> Self {
        Self {
            clock,
            writes: Rc::default(),
        }
    }
}

impl ErrorType for MockGate {
    type Error = Infallible;
}

impl OutputPin for MockGate {
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.writes.borrow_mut().push((self.clock.now_us(), true));
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.writes.borrow_mut().push((self.clock.now_us(), false));
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink that keeps everything and can cancel the loop after
/// a fixed number of cycles.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
    stop_after: Option<(u64, CancellationToken)>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancelling_after(cycles: u64, token: CancellationToken) -> Self {
        Self {
            events: Vec::new(),
            stop_after: Some((cycles, token)),
        }
    }

    pub fn cycles(&self) -> Vec<CycleReport> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Cycle(r) => Some(*r),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
        if let Some((limit, token)) = &self.stop_after {
            if self.cycles().len() as u64 >= *limit {
                token.cancel();
            }
        }
    }
}
