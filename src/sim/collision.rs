//! Collision detection and obstacle outcome rules
//!
//! Proximity is an axis-aligned test in the x/z plane around the player,
//! whose z is fixed at 0. Obstacles then apply their subtype rule to decide
//! whether the player's pose clears them.

use super::entity::{CollectibleKind, Entity, EntityId, EntityKind, ObstacleKind, PowerUpKind};
use super::player::Player;
use super::registry::EntityRegistry;
use crate::tuning::Tuning;

/// Player's fixed forward coordinate
pub const PLAYER_Z: f32 = 0.0;

/// Outcome of an obstacle overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The pose satisfies the obstacle's required response
    Clear,
    /// The pose fails it
    Hit,
}

/// Something the player touched this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Obstacle { id: EntityId, kind: ObstacleKind },
    Collectible { id: EntityId, kind: CollectibleKind },
    PowerUp { id: EntityId, kind: PowerUpKind },
}

impl Contact {
    pub fn id(&self) -> EntityId {
        match *self {
            Contact::Obstacle { id, .. }
            | Contact::Collectible { id, .. }
            | Contact::PowerUp { id, .. } => id,
        }
    }
}

/// Apply the obstacle rule table to the player's current pose
pub fn obstacle_verdict(kind: ObstacleKind, player: &Player, tuning: &Tuning) -> Verdict {
    let airborne = player.y >= tuning.jump_clear_height;
    let clear = match kind {
        ObstacleKind::Jump => airborne,
        ObstacleKind::Slide => {
            player.is_sliding() || player.head_height(tuning) < tuning.slide_clearance
        }
        ObstacleKind::Dodge => false,
        ObstacleKind::Double => airborne || player.is_sliding(),
    };
    if clear { Verdict::Clear } else { Verdict::Hit }
}

/// Lateral reach of the overlap test for an entity
pub fn half_width(kind: &EntityKind, magnet_active: bool, tuning: &Tuning) -> f32 {
    match kind {
        EntityKind::Obstacle(obstacle) => obstacle.half_width(tuning),
        EntityKind::Collectible(_) if magnet_active => tuning.magnet_half_width,
        EntityKind::Collectible(_) | EntityKind::PowerUp(_) => tuning.pickup_half_width,
        EntityKind::Decoration => 0.0,
    }
}

/// Axis-aligned overlap between the player and an entity
pub fn overlaps(player: &Player, entity: &Entity, reach: f32, tuning: &Tuning) -> bool {
    (entity.pos.z - PLAYER_Z).abs() < tuning.hit_depth && (entity.pos.x - player.x).abs() < reach
}

/// Collect every contact for this tick, in entity id order
pub fn detect(
    player: &Player,
    registry: &EntityRegistry,
    magnet_active: bool,
    tuning: &Tuning,
) -> Vec<Contact> {
    registry
        .iter()
        .filter(|e| e.kind.collides())
        .filter(|e| overlaps(player, e, half_width(&e.kind, magnet_active, tuning), tuning))
        .filter_map(|e| match e.kind {
            EntityKind::Obstacle(kind) => Some(Contact::Obstacle { id: e.id, kind }),
            EntityKind::Collectible(kind) => Some(Contact::Collectible { id: e.id, kind }),
            EntityKind::PowerUp(kind) => Some(Contact::PowerUp { id: e.id, kind }),
            EntityKind::Decoration => None,
        })
        .collect()
}
