//! ESP32 clock adapter.
//!
//! Implements the [`Clock`] port and `embedded_hal`'s [`DelayNs`] for the
//! phase-control loop.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` (µs, monotonic),
//!   `FreeRtos::delay_ms` for the yielding sleep, ROM `Ets::delay_us` for
//!   the busy-wait.
//! - **`not(target_os = "espidf")`**: `std::time::Instant`, thread sleep
//!   and a spin loop, for host-side simulation.

use embedded_hal::delay::DelayNs;

use crate::app::ports::Clock;

#[cfg(target_os = "espidf")]
use esp_idf_hal::delay::{Ets, FreeRtos};

/// Clock adapter for the ESP32-S3 platform.
#[derive(Debug, Clone, Copy)]
pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> i64 {
        // SAFETY: reads the free-running high-resolution timer.
        unsafe { esp_idf_svc::sys::esp_timer_get_time() }
    }

    /// Microseconds since this adapter was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> i64 {
        i64::try_from(self.start.elapsed().as_micros()).unwrap_or(i64::MAX)
    }

    #[cfg(target_os = "espidf")]
    fn busy_wait_us(&self, us: u32) {
        Ets::delay_us(us);
    }

    #[cfg(not(target_os = "espidf"))]
    fn busy_wait_us(&self, us: u32) {
        let deadline = self.uptime_us() + i64::from(us);
        while self.uptime_us() < deadline {
            core::hint::spin_loop();
        }
    }
}

impl Clock for Esp32Clock {
    fn now_us(&self) -> i64 {
        self.uptime_us()
    }

    #[cfg(target_os = "espidf")]
    fn sleep_ms(&mut self, ms: u32) {
        FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    fn delay_us(&mut self, us: u32) {
        self.busy_wait_us(us);
    }
}

impl DelayNs for Esp32Clock {
    fn delay_ns(&mut self, ns: u32) {
        self.busy_wait_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        self.busy_wait_us(us);
    }
}
