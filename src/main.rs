//! AC dimmer firmware entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                      │
//! │                                                               │
//! │  Esp32Clock       GatePin         LogEventSink   NvsAdapter   │
//! │  (Clock+DelayNs)  (OutputPin)     (EventSink)    (Config)     │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                                                               │
//! │  GPIO ISR ─▶ ZeroCrossMonitor ─▶ CrossingChannel              │
//! │                                        │                      │
//! │  core 1 task:                          ▼                      │
//! │      PhaseScheduler ─▶ TriacDriver   (DimPolicy each cycle)   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Result, anyhow};
use log::{info, warn};

use acdimmer::adapters::log_sink::LogEventSink;
use acdimmer::adapters::nvs::NvsAdapter;
use acdimmer::adapters::time::Esp32Clock;
use acdimmer::app::ports::ConfigPort;
use acdimmer::config::DimmerConfig;
use acdimmer::control::ramp::DimPolicy;
use acdimmer::drivers::hw_init::{self, GatePin};
use acdimmer::drivers::task_pin::spawn_on_core;
use acdimmer::drivers::triac::TriacDriver;
use acdimmer::pins;
use acdimmer::scheduler::{CancellationToken, PhaseScheduler, PhaseTiming};
use acdimmer::zero_cross::ZeroCrossMonitor;
use acdimmer::zero_cross::channel::CrossingChannel;

fn load_config() -> DimmerConfig {
    let nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            return DimmerConfig::default();
        }
    };
    match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            DimmerConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AC Dimmer v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config from NVS (or defaults) ──────────────────────
    let config = load_config();
    info!("Config: {}", serde_json::to_string(&config)?);

    // ── 3. GPIO + zero-cross interrupt ────────────────────────
    hw_init::init_peripherals()?;

    let channel = Arc::new(CrossingChannel::new());
    let monitor = ZeroCrossMonitor::new(&config, Arc::clone(&channel));
    hw_init::attach_zero_cross_isr(monitor)?;

    // ── 4. Phase-control task on the app core ─────────────────
    let cancel = CancellationToken::new();
    let task_config = config.clone();

    let control = spawn_on_core(
        config.control_task_core,
        config.control_task_priority,
        config.control_task_stack_kb,
        "phase-ctl\0",
        move || {
            let triac = TriacDriver::new(
                GatePin::new(pins::TRIAC_GATE_GPIO),
                Esp32Clock::new(),
                task_config.trigger_pulse_us,
            );
            let mut scheduler = PhaseScheduler::new(
                channel,
                Esp32Clock::new(),
                triac,
                DimPolicy::from_config(&task_config),
                PhaseTiming::from_config(&task_config),
            );
            scheduler.run(&mut LogEventSink::new(), &cancel);
        },
    )?;

    info!("Boot complete, phase control running");

    // The loop never cancels itself; joining parks the main task.
    control
        .join()
        .map_err(|_| anyhow!("phase-control task panicked"))?;
    Ok(())
}
