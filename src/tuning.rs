//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so a build can
//! ship alternative balance tables as JSON without recompiling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// What a resumed run keeps after the gate opens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ResumePolicy {
    /// Score, combo, multiplier and speed carry over
    #[default]
    KeepRun,
    /// Run stats reset as on restart; only the economy survives
    ResetRun,
}

/// How a picked-up power-up reaches the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PowerUpPolicy {
    /// Pickup only stocks the inventory; activation is explicit
    #[default]
    Stock,
    /// Magnet and speed activate on pickup
    AutoActivate,
}

/// Whether a shield block breaks the combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ComboPolicy {
    #[default]
    ResetOnBlock,
    KeepOnBlock,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuningError {
    #[error("{field} must be within {range}, got {value}")]
    OutOfRange {
        field: &'static str,
        range: &'static str,
        value: f64,
    },
    #[error("invalid tuning json: {0}")]
    Parse(String),
}

/// Game balance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Clock ===
    pub tick_ms: f64,

    // === Speed ===
    pub initial_speed: f32,
    pub max_speed: f32,
    pub speed_increment: f32,
    /// Scale the per-tick speed increment by the score multiplier
    pub speed_scales_with_multiplier: bool,

    // === Lanes & kinematics ===
    pub lane_width: f32,
    pub lerp_factor: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub player_height: f32,
    pub slide_min_scale: f32,
    pub slide_duration_ms: f64,

    // === Spawning ===
    pub spawn_base_ms: f64,
    pub spawn_floor_ms: f64,
    pub spawn_z: f32,
    pub cull_z: f32,
    pub collectible_chance: f64,
    /// Share of spawned collectibles that are gems
    pub gem_share: f64,
    pub power_up_chance: f64,

    // === Hitboxes ===
    pub hit_depth: f32,
    pub obstacle_half_width: f32,
    pub double_half_width: f32,
    pub pickup_half_width: f32,
    pub magnet_half_width: f32,
    pub jump_clear_height: f32,
    pub slide_clearance: f32,

    // === Scoring & economy ===
    pub pass_value: u32,
    pub coin_value: u32,
    pub gem_value: u32,
    pub combo_milestone: u32,
    pub multiplier_step_pct: u32,
    pub multiplier_cap_pct: u32,
    pub payout_divisor: u64,
    pub power_up_price: u64,

    // === Power-ups ===
    pub effect_duration_ms: f64,
    pub speed_boost_factor: f32,

    // === Policies ===
    pub resume_policy: ResumePolicy,
    pub power_up_policy: PowerUpPolicy,
    pub combo_policy: ComboPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tick_ms: TICK_MS,

            initial_speed: INITIAL_SPEED,
            max_speed: MAX_SPEED,
            speed_increment: SPEED_INCREMENT,
            speed_scales_with_multiplier: false,

            lane_width: LANE_WIDTH,
            lerp_factor: LERP_FACTOR,
            jump_force: JUMP_FORCE,
            gravity: GRAVITY,
            player_height: PLAYER_HEIGHT,
            slide_min_scale: SLIDE_MIN_SCALE,
            slide_duration_ms: SLIDE_DURATION_MS,

            spawn_base_ms: SPAWN_BASE_MS,
            spawn_floor_ms: SPAWN_FLOOR_MS,
            spawn_z: SPAWN_Z,
            cull_z: CULL_Z,
            collectible_chance: 0.5,
            gem_share: 0.2,
            power_up_chance: 0.1,

            hit_depth: HIT_DEPTH,
            obstacle_half_width: OBSTACLE_HALF_WIDTH,
            double_half_width: DOUBLE_HALF_WIDTH,
            pickup_half_width: PICKUP_HALF_WIDTH,
            magnet_half_width: MAGNET_HALF_WIDTH,
            jump_clear_height: JUMP_CLEAR_HEIGHT,
            slide_clearance: SLIDE_CLEARANCE,

            pass_value: PASS_VALUE,
            coin_value: COIN_VALUE,
            gem_value: GEM_VALUE,
            combo_milestone: COMBO_MILESTONE,
            multiplier_step_pct: MULTIPLIER_STEP_PCT,
            multiplier_cap_pct: MULTIPLIER_CAP_PCT,
            payout_divisor: PAYOUT_DIVISOR,
            power_up_price: 50,

            effect_duration_ms: 5000.0,
            speed_boost_factor: 1.5,

            resume_policy: ResumePolicy::KeepRun,
            power_up_policy: PowerUpPolicy::Stock,
            combo_policy: ComboPolicy::ResetOnBlock,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) balance table; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| TuningError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> String {
        // Plain data with no maps keyed by non-strings: serialization cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Reject tables that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        fn check(
            field: &'static str,
            range: &'static str,
            value: f64,
            ok: bool,
        ) -> Result<(), TuningError> {
            if ok {
                Ok(())
            } else {
                Err(TuningError::OutOfRange { field, range, value })
            }
        }

        let lerp = self.lerp_factor as f64;
        check("lerp_factor", "(0, 1]", lerp, lerp > 0.0 && lerp <= 1.0)?;
        check(
            "initial_speed",
            "(0, max_speed]",
            self.initial_speed as f64,
            self.initial_speed > 0.0 && self.initial_speed <= self.max_speed,
        )?;
        check(
            "speed_increment",
            ">= 0",
            self.speed_increment as f64,
            self.speed_increment >= 0.0,
        )?;
        check(
            "speed_boost_factor",
            "> 0",
            self.speed_boost_factor as f64,
            self.speed_boost_factor > 0.0,
        )?;
        check("hit_depth", "> 0", self.hit_depth as f64, self.hit_depth > 0.0)?;
        check(
            "effect_duration_ms",
            ">= 0",
            self.effect_duration_ms,
            self.effect_duration_ms >= 0.0,
        )?;
        check("gravity", "> 0", self.gravity as f64, self.gravity > 0.0)?;
        check("jump_force", "> 0", self.jump_force as f64, self.jump_force > 0.0)?;
        let scale = self.slide_min_scale as f64;
        check("slide_min_scale", "(0, 1]", scale, scale > 0.0 && scale <= 1.0)?;
        check("tick_ms", "> 0", self.tick_ms, self.tick_ms > 0.0)?;
        check(
            "spawn_floor_ms",
            "(0, spawn_base_ms]",
            self.spawn_floor_ms,
            self.spawn_floor_ms > 0.0 && self.spawn_floor_ms <= self.spawn_base_ms,
        )?;
        check(
            "cull_z",
            "> spawn_z",
            self.cull_z as f64,
            self.cull_z > self.spawn_z,
        )?;
        for (field, p) in [
            ("collectible_chance", self.collectible_chance),
            ("gem_share", self.gem_share),
            ("power_up_chance", self.power_up_chance),
        ] {
            check(field, "[0, 1]", p, (0.0..=1.0).contains(&p))?;
        }
        check(
            "payout_divisor",
            "> 0",
            self.payout_divisor as f64,
            self.payout_divisor > 0,
        )?;
        check(
            "combo_milestone",
            "> 0",
            self.combo_milestone as f64,
            self.combo_milestone > 0,
        )?;
        check(
            "multiplier_cap_pct",
            ">= 100",
            self.multiplier_cap_pct as f64,
            self.multiplier_cap_pct >= 100,
        )?;
        Ok(())
    }

    /// Milliseconds between spawn waves at the given speed
    pub fn spawn_interval_ms(&self, speed: f32) -> f64 {
        let ratio = (speed / self.initial_speed) as f64;
        (self.spawn_base_ms / ratio).max(self.spawn_floor_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "jump_force": 0.7, "resume_policy": "ResetRun" }"#)
            .expect("valid json");
        assert_eq!(tuning.jump_force, 0.7);
        assert_eq!(tuning.resume_policy, ResumePolicy::ResetRun);
        assert_eq!(tuning.gravity, GRAVITY);
    }

    #[test]
    fn test_rejects_bad_lerp() {
        let err = Tuning::from_json(r#"{ "lerp_factor": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { field: "lerp_factor", .. }));
    }

    #[test]
    fn test_rejects_speed_and_scroll_breakers() {
        for (json, field) in [
            (r#"{ "speed_increment": -0.01 }"#, "speed_increment"),
            (r#"{ "speed_boost_factor": -1.0 }"#, "speed_boost_factor"),
            (r#"{ "speed_boost_factor": 0.0 }"#, "speed_boost_factor"),
            (r#"{ "hit_depth": 0.0 }"#, "hit_depth"),
            (r#"{ "effect_duration_ms": -5.0 }"#, "effect_duration_ms"),
        ] {
            match Tuning::from_json(json) {
                Err(TuningError::OutOfRange { field: f, .. }) => assert_eq!(f, field),
                other => panic!("{json} accepted: {other:?}"),
            }
        }
        assert!(Tuning::from_json(r#"{ "speed_increment": 0.0 }"#).is_ok());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_exported_table_reloads() {
        let tuning = Tuning {
            power_up_policy: PowerUpPolicy::AutoActivate,
            pass_value: 25,
            ..Default::default()
        };
        let reloaded = Tuning::from_json(&tuning.to_json()).unwrap();
        assert_eq!(reloaded.power_up_policy, PowerUpPolicy::AutoActivate);
        assert_eq!(reloaded.pass_value, 25);
    }

    #[test]
    fn test_spawn_interval_shrinks_and_floors() {
        let tuning = Tuning::default();
        assert!((tuning.spawn_interval_ms(0.4) - 1100.0).abs() < 1e-6);
        assert!((tuning.spawn_interval_ms(0.8) - 550.0).abs() < 1e-3);
        // 1100 / (1.3 / 0.4) = 338 < floor
        assert_eq!(tuning.spawn_interval_ms(1.3), 350.0);
    }
}
