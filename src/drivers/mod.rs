//! Gate driver, hardware initialisation, and task placement helpers.

pub mod hw_init;
pub mod task_pin;
pub mod triac;
