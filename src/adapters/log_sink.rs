//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing control-loop events to the ESP-IDF
//! logger (UART / USB-CDC in production).  One `CYCLE` line per mains
//! half-cycle.

use log::info;

use crate::app::events::{AppEvent, CycleReport};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Render one cycle report as a log line.
pub fn format_cycle(report: &CycleReport) -> String {
    let line = format!(
        "CYCLE | {:.0}% | {}us",
        report.percent, report.time_until_trigger_us
    );
    if report.fired { line } else { line + " | skipped" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Cycle(report) => info!("{}", format_cycle(report)),
            AppEvent::ControlStarted => info!("START | phase control running"),
            AppEvent::ControlStopped { cycles } => info!("STOP | after {} cycles", cycles),
        }
    }
}
