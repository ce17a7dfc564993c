//! Spawned world entities
//!
//! Entity behavior is a closed set of variants so the collision resolver can
//! match exhaustively instead of switching on tags.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

pub type EntityId = u32;

/// Obstacle subtypes and the response each one demands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low bar: feet must be above `jump_clear_height`
    Jump,
    /// High bar: slide, or keep the head under `slide_clearance`
    Slide,
    /// Wall: only changing lanes avoids it
    Dodge,
    /// Wide barrier across adjacent lanes: jump or slide
    Double,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 4] = [
        ObstacleKind::Jump,
        ObstacleKind::Slide,
        ObstacleKind::Dodge,
        ObstacleKind::Double,
    ];

    /// Lateral half-extent used for the overlap test
    pub fn half_width(self, tuning: &Tuning) -> f32 {
        match self {
            ObstacleKind::Double => tuning.double_half_width,
            ObstacleKind::Jump | ObstacleKind::Slide | ObstacleKind::Dodge => {
                tuning.obstacle_half_width
            }
        }
    }

    /// Resting height of the obstacle center
    pub fn base_y(self) -> f32 {
        match self {
            ObstacleKind::Jump => 0.2,
            ObstacleKind::Slide => 2.8,
            ObstacleKind::Dodge => 1.75,
            ObstacleKind::Double => 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin,
    Gem,
}

impl CollectibleKind {
    pub fn value(self, tuning: &Tuning) -> u32 {
        match self {
            CollectibleKind::Coin => tuning.coin_value,
            CollectibleKind::Gem => tuning.gem_value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Widens the pickup reach for collectibles
    Magnet,
    /// Absorbs one failed obstacle
    Shield,
    /// Temporarily multiplies the scroll step
    Speed,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Magnet, PowerUpKind::Shield, PowerUpKind::Speed];

    /// Shield charges are spent on impact rather than activated
    pub fn is_timed(self) -> bool {
        !matches!(self, PowerUpKind::Shield)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    /// Roadside scenery; never collides
    Decoration,
    Collectible(CollectibleKind),
    PowerUp(PowerUpKind),
}

impl EntityKind {
    pub fn collides(&self) -> bool {
        !matches!(self, EntityKind::Decoration)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// x from lane, y fixed per kind, z grows as the world scrolls toward the player
    pub pos: Vec3,
    /// Lane the entity was spawned in (decorations have none)
    pub lane: Option<i8>,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, pos: Vec3, lane: Option<i8>) -> Self {
        Self { id, kind, pos, lane }
    }

    pub fn obstacle(&self) -> Option<ObstacleKind> {
        match self.kind {
            EntityKind::Obstacle(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Presentation-facing description of something to draw
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityDescriptor {
    Player,
    Entity { id: EntityId, kind: EntityKind },
}
