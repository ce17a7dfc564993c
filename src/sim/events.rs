//! Game events
//!
//! Emitted by the simulation and the session facade. Presentation and audio
//! collaborators consume them fire-and-forget.

use serde::{Deserialize, Serialize};

use super::entity::{CollectibleKind, EntityId, ObstacleKind, PowerUpKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A run began (`reset` false for a gated resume that kept the run)
    RunStarted { generation: u64, reset: bool },
    Paused,
    Resumed,
    Jumped,
    Landed,
    SlideStarted,
    SlideEnded,
    /// Obstacle left the play area without a collision
    ObstaclePassed {
        id: EntityId,
        kind: ObstacleKind,
        points: u64,
        combo: u32,
    },
    /// Combo reached a milestone and the multiplier grew
    MultiplierRaised { multiplier_pct: u32 },
    CollectiblePicked {
        id: EntityId,
        kind: CollectibleKind,
        value: u32,
        points: u64,
    },
    PowerUpPicked { id: EntityId, kind: PowerUpKind },
    PowerUpActivated { kind: PowerUpKind },
    PowerUpExpired { kind: PowerUpKind },
    /// A shield charge absorbed a failed obstacle
    ShieldBlocked {
        id: EntityId,
        kind: ObstacleKind,
        charges_left: u32,
    },
    Crashed { id: EntityId, kind: ObstacleKind },
    GameOver { score: u64, distance: f32 },
    /// Coins paid out for a finished run
    Payout { coins: u64 },
    NewHighScore { score: u64 },
    Purchased { kind: PowerUpKind, price: u64 },
    /// A request was refused for lack of funds or stock
    PurchaseRejected { needed: u64, available: u64 },
    /// A collaborator call failed; the session carries on
    ExternalFailure { what: String },
}

impl GameEvent {
    /// Short stable name, used for logging and notification routing
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::RunStarted { .. } => "run_started",
            GameEvent::Paused => "paused",
            GameEvent::Resumed => "resumed",
            GameEvent::Jumped => "jump",
            GameEvent::Landed => "land",
            GameEvent::SlideStarted => "slide_start",
            GameEvent::SlideEnded => "slide_end",
            GameEvent::ObstaclePassed { .. } => "obstacle_passed",
            GameEvent::MultiplierRaised { .. } => "multiplier_raised",
            GameEvent::CollectiblePicked { .. } => "pickup",
            GameEvent::PowerUpPicked { .. } => "power_up_pickup",
            GameEvent::PowerUpActivated { .. } => "power_up_activated",
            GameEvent::PowerUpExpired { .. } => "power_up_expired",
            GameEvent::ShieldBlocked { .. } => "blocked",
            GameEvent::Crashed { .. } => "crash",
            GameEvent::GameOver { .. } => "game_over",
            GameEvent::Payout { .. } => "payout",
            GameEvent::NewHighScore { .. } => "high_score",
            GameEvent::Purchased { .. } => "purchase",
            GameEvent::PurchaseRejected { .. } => "purchase_rejected",
            GameEvent::ExternalFailure { .. } => "external_failure",
        }
    }
}
