//! The deployment wiring on the host: real clock adapter, raw gate pin,
//! pinned-task spawn and cross-thread cancellation.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use acdimmer::adapters::time::Esp32Clock;
use acdimmer::app::events::AppEvent;
use acdimmer::app::ports::{Clock, EventSink};
use acdimmer::config::DimmerConfig;
use acdimmer::control::ramp::FixedLevel;
use acdimmer::drivers::hw_init::GatePin;
use acdimmer::drivers::task_pin::spawn_on_core;
use acdimmer::drivers::triac::TriacDriver;
use acdimmer::pins;
use acdimmer::scheduler::{CancellationToken, PhaseScheduler, PhaseTiming};
use acdimmer::zero_cross::channel::CrossingChannel;

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<AppEvent>>>);

impl EventSink for SharedSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn control_task_consumes_predictions_and_stops_on_cancel() {
    let config = DimmerConfig {
        fixed_percent: Some(90.0),
        ..DimmerConfig::default()
    };
    let channel = Arc::new(CrossingChannel::new());
    let clock = Esp32Clock::new();
    let cancel = CancellationToken::new();
    let sink = SharedSink::default();

    let handle = {
        let channel = Arc::clone(&channel);
        let cancel = cancel.clone();
        let mut sink = sink.clone();
        let config = config.clone();
        spawn_on_core(config.control_task_core, config.control_task_priority, 256, "phase-ctl\0", move || {
            let triac = TriacDriver::new(GatePin::new(pins::TRIAC_GATE_GPIO), clock, config.trigger_pulse_us);
            let mut sched = PhaseScheduler::new(
                channel,
                clock,
                triac,
                FixedLevel(config.fixed_percent.unwrap_or(0.0)),
                PhaseTiming::from_config(&config),
            );
            sched.run(&mut sink, &cancel);
        })
        .unwrap()
    };

    // Feed predictions until the task reports a cycle, or give up.
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        channel.publish(clock.now_us() + 5_000);
        std::thread::sleep(Duration::from_millis(20));
        let done = sink.0.lock().unwrap().iter().any(|e| matches!(e, AppEvent::Cycle(_)));
        if done || Instant::now() > deadline {
            break;
        }
    }

    cancel.cancel();
    handle.join().unwrap();

    let events = sink.0.lock().unwrap();
    assert_eq!(events.first(), Some(&AppEvent::ControlStarted));
    let cycles = events.iter().filter(|e| matches!(e, AppEvent::Cycle(_))).count() as u64;
    assert!(cycles >= 1);
    assert_eq!(events.last(), Some(&AppEvent::ControlStopped { cycles }));
}
