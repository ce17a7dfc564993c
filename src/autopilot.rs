//! Demo autopilot
//!
//! Reads the session and produces the gestures a cautious player would:
//! react to the nearest threat in the current lane, otherwise drift toward
//! pickups when the neighbouring lane is free of walls. Deterministic, so a
//! seeded session replays identically under autopilot.

use crate::lane_x;
use crate::sim::{EntityKind, GameSession, Gesture, ObstacleKind};

#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    /// How many ticks before contact to react
    pub reaction_ticks: f32,
    /// How far ahead to look for walls and pickups
    pub scan_depth: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            reaction_ticks: 4.0,
            scan_depth: 25.0,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gestures for the coming tick
    pub fn decide(&self, session: &GameSession) -> Vec<Gesture> {
        if !session.is_running() {
            return Vec::new();
        }
        let player = &session.player;
        let tuning = &session.tuning;
        let trigger_z = -tuning.hit_depth - session.scroll_step() * self.reaction_ticks;

        // Nearest obstacle about to reach the player's lane
        let threat = session
            .registry
            .iter()
            .filter_map(|e| e.obstacle().map(|kind| (e, kind)))
            .filter(|(e, kind)| {
                e.pos.z >= trigger_z
                    && e.pos.z < tuning.hit_depth
                    && (e.pos.x - lane_x(player.lane, tuning.lane_width)).abs()
                        < kind.half_width(tuning)
            })
            .max_by(|a, b| a.0.pos.z.total_cmp(&b.0.pos.z));

        if let Some((_, kind)) = threat {
            return match kind {
                ObstacleKind::Jump | ObstacleKind::Double if player.is_sliding() => {
                    vec![Gesture::SlideEnd]
                }
                ObstacleKind::Jump | ObstacleKind::Double if !player.is_jumping() => {
                    vec![Gesture::Jump]
                }
                ObstacleKind::Slide if !player.is_sliding() && !player.is_jumping() => {
                    vec![Gesture::SlideTap]
                }
                ObstacleKind::Dodge => self
                    .escape_lane(session)
                    .map(|lane| vec![Gesture::LaneShift(lane - player.lane)])
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
        }

        self.chase_pickup(session)
            .map(|delta| vec![Gesture::LaneShift(delta)])
            .unwrap_or_default()
    }

    /// No wall ahead in `lane` within the scan depth
    fn lane_clear(&self, session: &GameSession, lane: i8) -> bool {
        let tuning = &session.tuning;
        let x = lane_x(lane, tuning.lane_width);
        !session.registry.iter().any(|e| {
            e.obstacle() == Some(ObstacleKind::Dodge)
                && e.pos.z > -self.scan_depth
                && e.pos.z < tuning.hit_depth
                && (e.pos.x - x).abs() < tuning.obstacle_half_width
        })
    }

    /// Adjacent lane to flee to, centre-most first
    fn escape_lane(&self, session: &GameSession) -> Option<i8> {
        let lane = session.player.lane;
        let mut candidates = [lane - 1, lane + 1];
        candidates.sort_by_key(|l| l.abs());
        candidates
            .into_iter()
            .filter(|l| (-1..=1).contains(l))
            .find(|&l| self.lane_clear(session, l))
    }

    /// Lane step toward the nearest pickup ahead, if the way is clear
    fn chase_pickup(&self, session: &GameSession) -> Option<i8> {
        let player = &session.player;
        let target = session
            .registry
            .iter()
            .filter(|e| matches!(e.kind, EntityKind::Collectible(_) | EntityKind::PowerUp(_)))
            .filter(|e| e.pos.z > -self.scan_depth && e.pos.z < 0.0)
            .max_by(|a, b| a.pos.z.total_cmp(&b.pos.z))?;
        let lane = target.lane?;
        if lane == player.lane {
            return None;
        }
        let delta = (lane - player.lane).signum();
        self.lane_clear(session, player.lane + delta).then_some(delta)
    }
}
