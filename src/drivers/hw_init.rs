//! One-shot hardware peripheral initialization.
//!
//! Configures the zero-cross input and TRIAC gate output using raw
//! ESP-IDF sys calls, and registers the zero-cross GPIO interrupt.
//! Called once from `main()` before the control task starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::zero_cross::ZeroCrossMonitor;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerAddFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc)    => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc)    => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerAddFailed(rc) => write!(f, "zero-cross ISR handler add failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control task is spawned.
    unsafe {
        init_gate_output()?;
        init_zero_cross_input()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── Zero-cross input ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_zero_cross_input() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::ZERO_CROSS_GPIO,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: zero-cross input on GPIO{} (pull-up, rising edge)", pins::ZERO_CROSS_GPIO);
    Ok(())
}

// ── TRIAC gate output ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gate_output() -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pins::TRIAC_GATE_GPIO,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    unsafe { gpio_set_level(pins::TRIAC_GATE_GPIO, 0) };

    info!("hw_init: TRIAC gate on GPIO{} (output, low)", pins::TRIAC_GATE_GPIO);
    Ok(())
}

/// Raw GPIO output exposed as an `embedded_hal` pin.
///
/// Writes go straight to `gpio_set_level`; the pin must have been
/// configured as an output by [`init_peripherals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePin {
    gpio: i32,
}

impl GatePin {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl embedded_hal::digital::ErrorType for GatePin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for GatePin {
    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.gpio, true);
        Ok(())
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.gpio, false);
        Ok(())
    }
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // the control task is the only writer of the gate pin.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn zero_cross_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: esp_timer_get_time is a RTC counter read; safe in ISR context.
    let now_us = unsafe { esp_timer_get_time() };
    // SAFETY: `arg` is the monitor leaked in attach_zero_cross_isr(); this
    // ISR is its only user and does not re-enter itself.
    let monitor = unsafe { &mut *arg.cast::<ZeroCrossMonitor>() };
    let _ = monitor.on_edge(now_us);
}

/// Install the GPIO ISR service and hand `monitor` to the zero-cross
/// interrupt.  The monitor lives for the rest of the program.
/// Call after init_peripherals().
#[cfg(target_os = "espidf")]
pub fn attach_zero_cross_isr(monitor: ZeroCrossMonitor) -> Result<(), HwInitError> {
    let arg = Box::into_raw(Box::new(monitor));

    // SAFETY: gpio_install_isr_service tolerates a second install
    // (ESP_ERR_INVALID_STATE).  `arg` is never freed, so the pointer stays
    // valid for as long as the handler is registered.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            drop(Box::from_raw(arg));
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(pins::ZERO_CROSS_GPIO, Some(zero_cross_gpio_isr), arg.cast());
        if ret != ESP_OK as i32 {
            drop(Box::from_raw(arg));
            return Err(HwInitError::IsrHandlerAddFailed(ret));
        }
        gpio_intr_enable(pins::ZERO_CROSS_GPIO);

        info!("hw_init: zero-cross ISR attached (GPIO{})", pins::ZERO_CROSS_GPIO);
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn attach_zero_cross_isr(_monitor: ZeroCrossMonitor) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): zero-cross ISR skipped");
    Ok(())
}
