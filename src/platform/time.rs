//! Fixed-timestep frame driver
//!
//! Turns variable frame deltas from the host's frame callback into a whole
//! number of fixed simulation steps.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Longest frame delta accepted (seconds); longer stalls are dropped
pub const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct FrameDriver {
    step: f32,
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self::new(SIM_DT)
    }
}

impl FrameDriver {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
            last_time_ms: None,
        }
    }

    /// Steps to run for a frame callback at `time_ms` (host timestamp)
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((time_ms - last) / 1000.0) as f32,
            None => self.step,
        };
        self.last_time_ms = Some(time_ms);
        self.advance(dt)
    }

    /// Steps to run after `dt` seconds
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < MAX_SUBSTEPS {
            self.accumulator -= self.step;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Spiral of death guard
            self.accumulator = self.accumulator.min(self.step);
        }
        substeps
    }

    /// Forget timing history (after pause or restart)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }

    /// Fraction of a step left over, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}
