//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements          | Connects to                 |
//! |------------|---------------------|-----------------------------|
//! | `log_sink` | EventSink           | Serial log output           |
//! | `nvs`      | ConfigPort          | NVS / in-memory store       |
//! | `time`     | Clock, DelayNs      | esp_timer, FreeRTOS, ROM    |

pub mod log_sink;
pub mod nvs;
pub mod time;
