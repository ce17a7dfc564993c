//! Player lane model and vertical kinematics
//!
//! Lateral motion is a pure convex combination toward the target lane, so it
//! converges without overshoot. Vertical motion is a three-state machine:
//! Standing, Jumping (impulse plus constant gravity) and Sliding (hitbox
//! contracts toward `slide_min_scale`).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{MAX_LANE, MIN_LANE};
use crate::error::SimError;
use crate::tuning::Tuning;
use crate::{approach, lane_x};

/// Contact tolerance for the landing check
const GROUND_EPSILON: f32 = 1e-3;

/// Vertical state; Jumping and Sliding are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum VerticalState {
    #[default]
    Standing,
    Jumping,
    Sliding,
}

/// What happened to the player during one kinematics step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub landed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Target lane in {-1, 0, 1}
    pub lane: i8,
    /// Lateral position, converging toward `lane * lane_width`
    pub x: f32,
    /// Feet elevation above ground (0 when not jumping)
    pub y: f32,
    /// Vertical velocity (units per tick)
    pub vy: f32,
    pub vertical: VerticalState,
    /// Height scale, within [slide_min_scale, 1]
    pub scale_y: f32,
    /// Slide button currently held (applies on landing if airborne)
    pub slide_held: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            lane: 0,
            x: 0.0,
            y: 0.0,
            vy: 0.0,
            vertical: VerticalState::Standing,
            scale_y: 1.0,
            slide_held: false,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift the target lane by `delta`; rejected at the outer lanes
    pub fn shift_lane(&mut self, delta: i8) -> Result<(), SimError> {
        let target = self.lane.saturating_add(delta.signum());
        if delta == 0 || !(MIN_LANE..=MAX_LANE).contains(&target) {
            return Err(SimError::InvalidTransition {
                action: "shift lane",
                state: format!("in lane {}", self.lane),
            });
        }
        self.lane = target;
        Ok(())
    }

    /// Start a jump; only valid while standing
    pub fn jump(&mut self, jump_force: f32) -> Result<(), SimError> {
        if self.vertical != VerticalState::Standing {
            return Err(SimError::invalid("jump", self.vertical));
        }
        self.vertical = VerticalState::Jumping;
        self.vy = jump_force;
        Ok(())
    }

    /// Press or release the slide.
    ///
    /// Pressing while airborne only records the hold; the slide begins on
    /// landing if the button is still down.
    pub fn set_slide(&mut self, active: bool) {
        self.slide_held = active;
        match (active, self.vertical) {
            (true, VerticalState::Standing) => self.vertical = VerticalState::Sliding,
            (false, VerticalState::Sliding) => self.vertical = VerticalState::Standing,
            _ => {}
        }
    }

    /// Advance lateral and vertical motion by one tick
    pub fn update(&mut self, tuning: &Tuning) -> StepOutcome {
        let mut outcome = StepOutcome::default();

        let target_x = lane_x(self.lane, tuning.lane_width);
        self.x = approach(self.x, target_x, tuning.lerp_factor);

        match self.vertical {
            VerticalState::Jumping => {
                // Exact step for constant deceleration: airtime is 2 * force / gravity ticks
                self.y += self.vy - tuning.gravity * 0.5;
                self.vy -= tuning.gravity;
                if self.y <= GROUND_EPSILON {
                    self.y = 0.0;
                    self.vy = 0.0;
                    self.vertical = if self.slide_held {
                        VerticalState::Sliding
                    } else {
                        VerticalState::Standing
                    };
                    outcome.landed = true;
                }
            }
            VerticalState::Sliding | VerticalState::Standing => {
                self.y = 0.0;
                self.vy = 0.0;
            }
        }

        let target_scale = if self.vertical == VerticalState::Sliding {
            tuning.slide_min_scale
        } else {
            1.0
        };
        self.scale_y = approach(self.scale_y, target_scale, tuning.lerp_factor)
            .clamp(tuning.slide_min_scale, 1.0);

        outcome
    }

    pub fn is_jumping(&self) -> bool {
        self.vertical == VerticalState::Jumping
    }

    pub fn is_sliding(&self) -> bool {
        self.vertical == VerticalState::Sliding
    }

    /// Top of the player's hitbox
    pub fn head_height(&self, tuning: &Tuning) -> f32 {
        self.y + tuning.player_height * self.scale_y
    }

    /// Hitbox center, for presentation
    pub fn center(&self, tuning: &Tuning) -> Vec3 {
        Vec3::new(self.x, self.y + tuning.player_height * self.scale_y * 0.5, 0.0)
    }
}
