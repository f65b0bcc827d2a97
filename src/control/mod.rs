//! Phase-control math and dim-level policy.

pub mod firing;
pub mod ramp;
