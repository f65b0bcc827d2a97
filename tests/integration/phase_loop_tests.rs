//! End-to-end tests for the zero-cross → prediction → scheduler → gate
//! pipeline on simulated time.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use acdimmer::app::events::{AppEvent, CycleReport};
use acdimmer::app::ports::Clock;
use acdimmer::config::DimmerConfig;
use acdimmer::control::ramp::{DimLevelGenerator, DimSource, FixedLevel};
use acdimmer::drivers::triac::TriacDriver;
use acdimmer::scheduler::{CancellationToken, PhaseScheduler, PhaseState, PhaseTiming};
use acdimmer::zero_cross::ZeroCrossMonitor;
use acdimmer::zero_cross::channel::CrossingChannel;

use crate::mock_hw::{MockGate, RecordingSink, SimClock};

type Writes = Rc<RefCell<Vec<(i64, bool)>>>;
type SimScheduler<L> = PhaseScheduler<SimClock, MockGate, SimClock, L>;

struct Rig<L> {
    sched: SimScheduler<L>,
    clock: SimClock,
    writes: Writes,
    channel: Arc<CrossingChannel>,
}

fn rig<L: DimSource>(dim: L) -> Rig<L> {
    let config = DimmerConfig::default();
    let channel = Arc::new(CrossingChannel::new());
    let clock = SimClock::new();
    clock.attach(ZeroCrossMonitor::new(&config, Arc::clone(&channel)));

    let gate = MockGate::new(clock.clone());
    let writes = Rc::clone(&gate.writes);
    let triac = TriacDriver::new(gate, clock.clone(), config.trigger_pulse_us);
    let sched = PhaseScheduler::new(
        Arc::clone(&channel),
        clock.clone(),
        triac,
        dim,
        PhaseTiming::from_config(&config),
    );
    Rig { sched, clock, writes, channel }
}

// ── Worked example: edges at 0/10/20 ms, consumed at 29 ms ────

#[test]
fn three_edges_then_fire_at_half_power() {
    let mut r = rig(FixedLevel(50.0));
    let mut sink = RecordingSink::new();

    r.clock.queue_edges([0, 10_000, 20_000]);
    r.clock.advance_to(20_000);
    assert_eq!(r.clock.history_len(), 2, "first edge only sets the baseline");

    r.clock.advance_to(29_000);
    assert_eq!(r.sched.step(&mut sink), PhaseState::ScheduleCoarse { predicted_us: 30_000 });
    assert_eq!(r.sched.step(&mut sink), PhaseState::FireFine { predicted_us: 30_000 });
    assert!(r.clock.sleeps().is_empty(), "1000us until trigger is under the sleep threshold");

    // 1000 + 900 latency + 5000 phase offset
    assert_eq!(
        r.sched.step(&mut sink),
        PhaseState::Advance { time_until_trigger_us: 6_900, fired: true }
    );
    assert_eq!(*r.writes.borrow(), vec![(35_900, true), (36_000, false)]);

    assert_eq!(r.sched.step(&mut sink), PhaseState::WaitForSignal);
    assert_eq!(
        sink.cycles(),
        vec![CycleReport { percent: 50.0, time_until_trigger_us: 6_900, fired: true }]
    );
}

#[test]
fn early_consumer_sleeps_then_fires_on_time() {
    let mut r = rig(FixedLevel(50.0));
    let mut sink = RecordingSink::new();

    r.clock.queue_edges([0, 10_000, 20_000]);
    r.clock.advance_to(20_000);

    r.sched.step(&mut sink);
    r.sched.step(&mut sink);
    assert_eq!(r.clock.sleeps(), vec![9]);
    assert_eq!(r.clock.now_us(), 29_000);

    r.sched.step(&mut sink);
    assert_eq!(*r.writes.borrow(), vec![(35_900, true), (36_000, false)]);
}

#[test]
fn zero_power_skips_without_touching_the_gate() {
    let mut r = rig(FixedLevel(0.0));
    let mut sink = RecordingSink::new();

    r.clock.queue_edges([0, 10_000, 20_000]);
    r.clock.advance_to(29_000);

    r.sched.step(&mut sink);
    r.sched.step(&mut sink);
    assert_eq!(
        r.sched.step(&mut sink),
        PhaseState::Advance { time_until_trigger_us: 11_900, fired: false }
    );
    r.sched.step(&mut sink);

    assert!(r.writes.borrow().is_empty());
    assert_eq!(
        sink.cycles(),
        vec![CycleReport { percent: 0.0, time_until_trigger_us: 11_900, fired: false }]
    );
}

#[test]
fn prediction_arriving_during_sleep_waits_for_next_cycle() {
    let mut r = rig(FixedLevel(50.0));
    let mut sink = RecordingSink::new();

    // 26 ms edge lands inside the coarse sleep: history 10000/10000/6000,
    // mean 8667, new prediction 34667.
    r.clock.queue_edges([0, 10_000, 20_000, 26_000]);
    r.clock.advance_to(20_000);

    assert_eq!(r.sched.step(&mut sink), PhaseState::ScheduleCoarse { predicted_us: 30_000 });
    assert_eq!(r.sched.step(&mut sink), PhaseState::FireFine { predicted_us: 30_000 });
    assert_eq!(r.clock.history_len(), 3);
    assert!(r.channel.has_pending());

    // Still timed from the 30000 prediction.
    assert_eq!(
        r.sched.step(&mut sink),
        PhaseState::Advance { time_until_trigger_us: 6_900, fired: true }
    );
    assert_eq!(r.writes.borrow()[0], (35_900, true));

    assert_eq!(r.sched.step(&mut sink), PhaseState::WaitForSignal);
    assert_eq!(r.sched.step(&mut sink), PhaseState::ScheduleCoarse { predicted_us: 34_667 });
}

#[test]
fn glitch_edges_do_not_disturb_the_schedule() {
    let mut r = rig(FixedLevel(50.0));
    let mut sink = RecordingSink::new();

    r.clock.queue_edges([0, 10_000, 20_000]);
    r.clock.advance_to(20_000);
    assert_eq!(r.channel.try_consume(), Some(30_000));

    // Ringing 300us after the crossing is rejected.
    r.clock.queue_edges([20_300]);
    r.clock.advance_to(20_500);
    assert_eq!(r.clock.history_len(), 2);
    assert!(!r.channel.has_pending());

    assert_eq!(r.sched.step(&mut sink), PhaseState::WaitForSignal);
}

// ── Closed loop: mains at 50 Hz, test ramp, cancel after N cycles ──

#[test]
fn closed_loop_ramp_runs_until_cancelled() {
    const CYCLES: u64 = 30;

    let mut r = rig(DimLevelGenerator::from_config(&DimmerConfig::default()));
    let cancel = CancellationToken::new();
    let mut sink = RecordingSink::cancelling_after(CYCLES, cancel.clone());

    r.clock.queue_mains(0, 10_000, 1_000);
    r.sched.run(&mut sink, &cancel);

    assert_eq!(sink.events.first(), Some(&AppEvent::ControlStarted));
    assert_eq!(sink.events.last(), Some(&AppEvent::ControlStopped { cycles: CYCLES }));
    assert_eq!(r.sched.cycles(), CYCLES);

    let reports = sink.cycles();
    assert_eq!(reports.len() as u64, CYCLES);
    for rep in &reports {
        assert!((0.0..=95.0).contains(&rep.percent), "percent {} out of range", rep.percent);
        let in_window = rep.time_until_trigger_us > 0 && rep.time_until_trigger_us < 10_000;
        assert_eq!(rep.fired, in_window, "{rep:?}");
    }

    // Every pulse is high then low, 100us wide.
    let writes = r.writes.borrow();
    assert_eq!(writes.len() % 2, 0);
    for pair in writes.chunks(2) {
        assert!(pair[0].1 && !pair[1].1);
        assert_eq!(pair[1].0 - pair[0].0, 100);
    }
    let fired = reports.iter().filter(|rep| rep.fired).count();
    assert_eq!(writes.len() / 2, fired);
    assert!(fired > 0, "ramp passes through firable levels");
}
