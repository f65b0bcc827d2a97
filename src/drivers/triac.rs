//! TRIAC gate driver (opto-triac on the gate line).
//!
//! A gate pulse only has to outlast the latching current rise, so the
//! driver holds the gate for a fixed pulse width and releases it; the
//! TRIAC keeps conducting until the next zero-crossing on its own.
//!
//! ## Dual-target design
//!
//! Generic over any `embedded_hal` output pin and delay.  On ESP-IDF the
//! pin is a [`GatePin`](crate::drivers::hw_init::GatePin) and the delay is
//! the ROM busy-wait; in tests both are mocks that record timing.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::warn;

pub struct TriacDriver<P, D> {
    gate: P,
    delay: D,
    pulse_us: u32,
}

impl<P: OutputPin, D: DelayNs> TriacDriver<P, D> {
    pub fn new(gate: P, delay: D, pulse_us: u32) -> Self {
        Self {
            gate,
            delay,
            pulse_us,
        }
    }

    /// Assert the gate for one pulse width, then release it.
    ///
    /// Busy-waits for the whole pulse.  A pin error is logged; the release
    /// edge is attempted regardless so the gate never stays latched high.
    pub fn fire(&mut self) {
        if let Err(e) = self.gate.set_high() {
            warn!("triac: gate assert failed: {:?}", e);
        }
        self.delay.delay_us(self.pulse_us);
        if let Err(e) = self.gate.set_low() {
            warn!("triac: gate release failed: {:?}", e);
        }
    }

    pub fn pulse_us(&self) -> u32 {
        self.pulse_us
    }
}
