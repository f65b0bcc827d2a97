//! Dim-level sources.
//!
//! The control loop asks a [`DimSource`] for the target output level once
//! per half-cycle.  Without an external command source the firmware runs
//! [`DimLevelGenerator`], a triangular test ramp that sweeps the lamp up
//! and down one step per half-cycle.

use crate::config::DimmerConfig;

/// Supplies the target output level (0-100 %) for each control cycle.
pub trait DimSource {
    /// Level to use for the current cycle.
    fn percent(&self) -> f32;

    /// Move on to the next cycle's level.
    fn advance(&mut self);
}

/// Triangular oscillation between a low and high bound.
#[derive(Debug, Clone, PartialEq)]
pub struct DimLevelGenerator {
    percent: f32,
    step: f32,
    low: f32,
    high: f32,
}

impl DimLevelGenerator {
    pub fn new(start: f32, step: f32, low: f32, high: f32) -> Self {
        Self {
            percent: start,
            step,
            low,
            high,
        }
    }

    pub fn from_config(config: &DimmerConfig) -> Self {
        Self::new(
            config.ramp_start_percent,
            config.ramp_step_percent,
            config.ramp_low_percent,
            config.ramp_high_percent,
        )
    }

    /// Current signed step; negative while ramping down.
    pub fn step(&self) -> f32 {
        self.step
    }
}

impl Default for DimLevelGenerator {
    fn default() -> Self {
        Self::new(1.0, 5.0, 0.0, 95.0)
    }
}

impl DimSource for DimLevelGenerator {
    fn percent(&self) -> f32 {
        self.percent
    }

    fn advance(&mut self) {
        self.percent += self.step;
        if self.percent > self.high || self.percent < self.low {
            // Undo the overshoot and take one step the other way.
            self.step = -self.step;
            self.percent += self.step * 2.0;
        }
    }
}

/// Constant output level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedLevel(pub f32);

impl DimSource for FixedLevel {
    fn percent(&self) -> f32 {
        self.0
    }

    fn advance(&mut self) {}
}

/// Dim policy selected by configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum DimPolicy {
    Ramp(DimLevelGenerator),
    Fixed(FixedLevel),
}

impl DimPolicy {
    pub fn from_config(config: &DimmerConfig) -> Self {
        match config.fixed_percent {
            Some(p) => Self::Fixed(FixedLevel(p)),
            None => Self::Ramp(DimLevelGenerator::from_config(config)),
        }
    }
}

impl DimSource for DimPolicy {
    fn percent(&self) -> f32 {
        match self {
            Self::Ramp(r) => r.percent(),
            Self::Fixed(f) => f.percent(),
        }
    }

    fn advance(&mut self) {
        match self {
            Self::Ramp(r) => r.advance(),
            Self::Fixed(f) => f.advance(),
        }
    }
}
