//! System configuration parameters
//!
//! All tunable timing and policy parameters for the phase-control loop.
//! Values can be overridden by a config blob stored in NVS; see
//! [`NvsAdapter`](crate::adapters::nvs::NvsAdapter).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::drivers::task_pin::Core;

/// Capacity of the zero-cross period history.
///
/// Fixed at compile time because the history is a statically sized ring.
pub const HISTORY_CAPACITY: usize = 50;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimmerConfig {
    // --- Zero-cross debounce ---
    /// Shortest accepted edge interval (µs, exclusive).
    pub debounce_min_us: i64,
    /// Longest accepted edge interval (µs, exclusive).
    pub debounce_max_us: i64,

    // --- Phase control ---
    /// Fixed processing-latency compensation added to every firing delay (µs).
    pub latency_compensation_us: i64,
    /// TRIAC gate pulse width (µs).
    pub trigger_pulse_us: u32,
    /// Assumed mains half-cycle length (µs).  Upper bound of the firing window.
    pub half_cycle_us: i64,
    /// Coarse sleep only happens when the trigger is further away than this (µs).
    ///
    /// The sleep is in whole milliseconds and needs the 1000 Hz FreeRTOS
    /// tick set in `sdkconfig.defaults`.
    pub coarse_sleep_threshold_us: i64,
    /// Wake-up margin kept before the trigger when sleeping coarsely (µs).
    pub coarse_sleep_margin_us: i64,

    // --- Dim level ---
    /// Fixed output level (0-100 %).  `None` runs the oscillating test ramp.
    pub fixed_percent: Option<f32>,
    /// Ramp starting level (%).
    pub ramp_start_percent: f32,
    /// Ramp step per half-cycle (%).
    pub ramp_step_percent: f32,
    /// Ramp lower bound (%); going below reverses direction.
    pub ramp_low_percent: f32,
    /// Ramp upper bound (%); going above reverses direction.
    pub ramp_high_percent: f32,

    // --- Control task ---
    /// CPU core the control task is pinned to.
    pub control_task_core: Core,
    /// FreeRTOS priority of the control task.
    pub control_task_priority: u8,
    /// Control task stack size (KiB).
    pub control_task_stack_kb: usize,
}

impl Default for DimmerConfig {
    fn default() -> Self {
        Self {
            // Debounce: one 50/60 Hz half-cycle is 8.3-10 ms
            debounce_min_us: 5_000,
            debounce_max_us: 15_000,

            // Phase control
            latency_compensation_us: 900,
            trigger_pulse_us: 100,
            half_cycle_us: 10_000, // 50 Hz
            coarse_sleep_threshold_us: 2_000,
            coarse_sleep_margin_us: 1_000,

            // Dim level
            fixed_percent: None,
            ramp_start_percent: 1.0,
            ramp_step_percent: 5.0,
            ramp_low_percent: 0.0,
            ramp_high_percent: 95.0,

            // Control task
            control_task_core: Core::App,
            control_task_priority: 10,
            control_task_stack_kb: 6,
        }
    }
}

impl DimmerConfig {
    /// Range-check every field.
    ///
    /// Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_min_us <= 0 {
            return Err(ConfigError::ValidationFailed("debounce_min_us must be > 0"));
        }
        if self.debounce_max_us <= self.debounce_min_us || self.debounce_max_us > 100_000 {
            return Err(ConfigError::ValidationFailed(
                "debounce_max_us must be > debounce_min_us and <= 100000",
            ));
        }
        if !(1_000..=20_000).contains(&self.half_cycle_us) {
            return Err(ConfigError::ValidationFailed(
                "half_cycle_us must be 1000–20000",
            ));
        }
        if !(0..self.half_cycle_us).contains(&self.latency_compensation_us) {
            return Err(ConfigError::ValidationFailed(
                "latency_compensation_us must be 0–half_cycle_us",
            ));
        }
        if self.trigger_pulse_us == 0 || i64::from(self.trigger_pulse_us) >= self.half_cycle_us {
            return Err(ConfigError::ValidationFailed(
                "trigger_pulse_us must be > 0 and < half_cycle_us",
            ));
        }
        if self.coarse_sleep_margin_us < 0 {
            return Err(ConfigError::ValidationFailed(
                "coarse_sleep_margin_us must be >= 0",
            ));
        }
        if self.coarse_sleep_threshold_us < self.coarse_sleep_margin_us {
            return Err(ConfigError::ValidationFailed(
                "coarse_sleep_threshold_us must be >= coarse_sleep_margin_us",
            ));
        }
        if let Some(p) = self.fixed_percent {
            if !(0.0..=100.0).contains(&p) {
                return Err(ConfigError::ValidationFailed("fixed_percent must be 0–100"));
            }
        }
        if !(0.0..=100.0).contains(&self.ramp_low_percent)
            || !(0.0..=100.0).contains(&self.ramp_high_percent)
        {
            return Err(ConfigError::ValidationFailed(
                "ramp bounds must be within 0–100",
            ));
        }
        if self.ramp_low_percent >= self.ramp_high_percent {
            return Err(ConfigError::ValidationFailed(
                "ramp_low_percent must be < ramp_high_percent",
            ));
        }
        // A bounce steps back by twice the step, so two steps must fit.
        let span = self.ramp_high_percent - self.ramp_low_percent;
        if !(self.ramp_step_percent > 0.0 && self.ramp_step_percent * 2.0 <= span) {
            return Err(ConfigError::ValidationFailed(
                "ramp_step_percent must be > 0 and <= half the ramp span",
            ));
        }
        if !(self.ramp_low_percent..=self.ramp_high_percent).contains(&self.ramp_start_percent) {
            return Err(ConfigError::ValidationFailed(
                "ramp_start_percent must lie within the ramp bounds",
            ));
        }
        if !(1..=24).contains(&self.control_task_priority) {
            return Err(ConfigError::ValidationFailed(
                "control_task_priority must be 1–24",
            ));
        }
        if !(2..=32).contains(&self.control_task_stack_kb) {
            return Err(ConfigError::ValidationFailed(
                "control_task_stack_kb must be 2–32",
            ));
        }
        Ok(())
    }
}
