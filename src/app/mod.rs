//! Application boundary: port traits and outbound events.
//!
//! The control loop reaches the clock, the diagnostic log and config
//! storage only through the traits in [`ports`], keeping the domain
//! layer fully testable without real peripherals.

pub mod events;
pub mod ports;
