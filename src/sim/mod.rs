//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No presentation, storage or platform dependencies

pub mod collision;
pub mod entity;
pub mod events;
pub mod player;
pub mod registry;
pub mod scheduler;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Contact, PLAYER_Z, Verdict, detect, obstacle_verdict};
pub use entity::{
    CollectibleKind, Entity, EntityDescriptor, EntityId, EntityKind, ObstacleKind, PowerUpKind,
};
pub use events::GameEvent;
pub use player::{Player, VerticalState};
pub use registry::EntityRegistry;
pub use scheduler::{Deferred, Scheduler, TaskId};
pub use spawner::{SpawnWave, Spawner};
pub use state::{ActiveEffect, GamePhase, GameSession, PowerUpInventory, Report, RunStats};
pub use tick::{Gesture, TickInput, apply_gesture, tick};
