//! Power-to-phase mapping for TRIAC firing.
//!
//! A TRIAC fired at phase angle α conducts for the rest of the half-cycle.
//! Using the cosine power-transfer law, the fraction of the half-cycle
//! cosine area left after α is `(1 + cos α) / 2`, so for a target fraction
//! `p` the angle is `α = acos(2p - 1) = acos(1 - 2(1 - p))`.  The angle is
//! then scaled from `[0, π]` onto `[0, half_cycle]` microseconds.

use core::f64::consts::PI;

/// Delay from zero-cross to gate pulse for `percent` output power (µs).
///
/// 100 % fires immediately, 0 % fires at the very end of the half-cycle.
/// Out-of-range input is clamped; the result is truncated toward zero.
pub fn firing_offset_us(percent: f32, half_cycle_us: i64) -> i64 {
    let p = f64::from(percent.clamp(0.0, 100.0));
    let angle = (1.0 - 2.0 * (100.0 - p) / 100.0).acos();
    (half_cycle_us as f64 * (angle / PI)) as i64
}

/// `true` if a trigger `delay_us` away still lands inside this half-cycle.
///
/// Both bounds are exclusive: a zero delay means the moment has already
/// passed, a full half-cycle delay lands on the next crossing.
pub fn in_firing_window(delay_us: i64, half_cycle_us: i64) -> bool {
    delay_us > 0 && delay_us < half_cycle_us
}
