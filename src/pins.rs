//! GPIO pin assignments for the dimmer board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Zero-cross detector (bidirectional opto-isolator)
// ---------------------------------------------------------------------------

/// Digital input: opto-isolator output, pulled up internally.
/// A rising edge marks one mains zero-crossing.
pub const ZERO_CROSS_GPIO: i32 = 45;

// ---------------------------------------------------------------------------
// TRIAC gate (opto-triac driver)
// ---------------------------------------------------------------------------

/// Digital output: HIGH fires the TRIAC gate.  Must idle LOW.
pub const TRIAC_GATE_GPIO: i32 = 48;
