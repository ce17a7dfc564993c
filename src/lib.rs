//! Lane Runner - simulation core for a three-lane endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, spawning, collisions, session state)
//! - `economy`: Cross-session coins, gems and high score
//! - `game`: Facade wiring the simulation to its collaborators
//! - `platform`: Presentation, notification, input and timing abstractions
//! - `persistence`: Key/value storage for the economy
//! - `tuning`: Data-driven game balance
//! - `audio`: Event to sound-cue mapping

pub mod audio;
pub mod autopilot;
pub mod economy;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use economy::Economy;
pub use error::SimError;
pub use game::Game;
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz frame callback)
    pub const TICK_MS: f64 = 1000.0 / 60.0;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World scroll speed (units per tick)
    pub const INITIAL_SPEED: f32 = 0.4;
    pub const MAX_SPEED: f32 = 1.3;
    pub const SPEED_INCREMENT: f32 = 0.0001;

    /// Lanes sit at -1, 0, 1 times the lane width
    pub const LANE_WIDTH: f32 = 3.0;
    pub const MIN_LANE: i8 = -1;
    pub const MAX_LANE: i8 = 1;
    /// Convex-combination factor for lane and height smoothing
    pub const LERP_FACTOR: f32 = 0.6;

    /// Vertical kinematics (units per tick)
    pub const JUMP_FORCE: f32 = 0.65;
    pub const GRAVITY: f32 = 0.04;
    pub const PLAYER_HEIGHT: f32 = 1.0;
    pub const SLIDE_MIN_SCALE: f32 = 0.5;
    pub const SLIDE_DURATION_MS: f64 = 600.0;

    /// Spawn cadence
    pub const SPAWN_BASE_MS: f64 = 1100.0;
    pub const SPAWN_FLOOR_MS: f64 = 350.0;
    /// Entities appear this far ahead and are culled once they pass `CULL_Z`
    pub const SPAWN_Z: f32 = -100.0;
    pub const CULL_Z: f32 = 10.0;

    /// Hitbox extents
    pub const HIT_DEPTH: f32 = 1.0;
    pub const OBSTACLE_HALF_WIDTH: f32 = 1.0;
    pub const DOUBLE_HALF_WIDTH: f32 = 3.5;
    pub const PICKUP_HALF_WIDTH: f32 = 1.0;
    pub const MAGNET_HALF_WIDTH: f32 = 4.0;
    /// Feet must be at least this high to clear a jump bar
    pub const JUMP_CLEAR_HEIGHT: f32 = 0.1;
    /// Head must be below this to pass under a slide bar
    pub const SLIDE_CLEARANCE: f32 = 0.75;

    /// Scoring
    pub const PASS_VALUE: u32 = 10;
    pub const COIN_VALUE: u32 = 1;
    pub const GEM_VALUE: u32 = 5;
    pub const COMBO_MILESTONE: u32 = 10;
    pub const MULTIPLIER_STEP_PCT: u32 = 10;
    pub const MULTIPLIER_CAP_PCT: u32 = 300;
    pub const PAYOUT_DIVISOR: u64 = 10;

    /// Ad unlocks needed before a crashed run may continue
    pub const ADS_REQUIRED: u32 = 3;
}

/// Lateral world position of a lane index
#[inline]
pub fn lane_x(lane: i8, lane_width: f32) -> f32 {
    lane as f32 * lane_width
}

/// Move `current` toward `target` by a fixed fraction; never overshoots for factor in (0, 1]
#[inline]
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    let next = current + (target - current) * factor;
    if (target - next).abs() < 1e-4 {
        target
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_x() {
        assert_eq!(lane_x(-1, 3.0), -3.0);
        assert_eq!(lane_x(0, 3.0), 0.0);
        assert_eq!(lane_x(1, 3.0), 3.0);
    }

    #[test]
    fn test_approach_never_overshoots() {
        let mut x = 0.0;
        for _ in 0..50 {
            let next = approach(x, 3.0, 0.6);
            assert!(next >= x);
            assert!(next <= 3.0);
            x = next;
        }
        assert_eq!(x, 3.0);
    }
}
