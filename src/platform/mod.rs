//! Platform abstraction layer
//!
//! The simulation never draws, plays sounds or shows ads itself. It talks to
//! the host through these traits:
//! - `Presenter`: one visual handle per entity, posed every frame
//! - `Notifier`: fire-and-forget game events (HUD, audio)
//! - `ResumeGate`: decides whether a crashed run may continue
//!
//! Input decoding and frame timing live in `input` and `time`.

pub mod input;
pub mod time;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::ADS_REQUIRED;
use crate::sim::{EntityDescriptor, GameEvent};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("presenter failed: {0}")]
    Presenter(String),
    #[error("notifier failed: {0}")]
    Notifier(String),
}

/// Opaque presentation handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(pub u64);

/// Where and how to draw a handle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    /// Vertical squash (1.0 upright, lower while sliding)
    pub scale_y: f32,
}

impl Pose {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            scale_y: 1.0,
        }
    }
}

pub trait Presenter {
    fn spawn_handle(&mut self, descriptor: &EntityDescriptor) -> Result<Handle, PlatformError>;
    fn update_handle(&mut self, handle: Handle, pose: Pose) -> Result<(), PlatformError>;
    fn release_handle(&mut self, handle: Handle) -> Result<(), PlatformError>;
}

pub trait Notifier {
    fn emit(&mut self, event: &GameEvent) -> Result<(), PlatformError>;
}

pub trait ResumeGate {
    fn can_resume(&self) -> bool;
    /// Called once per crash, before any resume attempt
    fn on_game_over(&mut self);
    /// Called after a gated resume went through
    fn on_resumed(&mut self) {}
    /// The host reports one unlock (an ad watched); returns how many are still needed
    fn record_unlock(&mut self) -> u32 {
        0
    }
}

/// Headless presenter; hands out handles and tracks which are live
#[derive(Debug, Clone, Default)]
pub struct NullPresenter {
    next: u64,
    live: std::collections::BTreeSet<Handle>,
}

impl NullPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }
}

impl Presenter for NullPresenter {
    fn spawn_handle(&mut self, _descriptor: &EntityDescriptor) -> Result<Handle, PlatformError> {
        self.next += 1;
        let handle = Handle(self.next);
        self.live.insert(handle);
        Ok(handle)
    }

    fn update_handle(&mut self, handle: Handle, _pose: Pose) -> Result<(), PlatformError> {
        if self.live.contains(&handle) {
            Ok(())
        } else {
            Err(PlatformError::Presenter(format!("unknown handle {}", handle.0)))
        }
    }

    fn release_handle(&mut self, handle: Handle) -> Result<(), PlatformError> {
        if self.live.remove(&handle) {
            Ok(())
        } else {
            Err(PlatformError::Presenter(format!("double release of {}", handle.0)))
        }
    }
}

/// Writes every event to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn emit(&mut self, event: &GameEvent) -> Result<(), PlatformError> {
        match event {
            GameEvent::GameOver { .. } | GameEvent::RunStarted { .. } | GameEvent::NewHighScore { .. } => {
                log::info!("{}: {:?}", event.name(), event)
            }
            _ => log::debug!("{}: {:?}", event.name(), event),
        }
        Ok(())
    }
}

/// Resume unlocked by watching enough ads since the last crash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdUnlockGate {
    unlocked: u32,
    required: u32,
}

impl Default for AdUnlockGate {
    fn default() -> Self {
        Self::new(ADS_REQUIRED)
    }
}

impl AdUnlockGate {
    pub fn new(required: u32) -> Self {
        Self {
            unlocked: 0,
            required,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.required - self.unlocked
    }
}

impl ResumeGate for AdUnlockGate {
    fn can_resume(&self) -> bool {
        self.unlocked >= self.required
    }

    fn on_game_over(&mut self) {
        self.unlocked = 0;
    }

    fn on_resumed(&mut self) {
        self.unlocked = 0;
    }

    fn record_unlock(&mut self) -> u32 {
        self.unlocked = (self.unlocked + 1).min(self.required);
        log::info!("Ad unlock {}/{}", self.unlocked, self.required);
        self.remaining()
    }
}

/// Gate that always allows resuming
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenGate;

impl ResumeGate for OpenGate {
    fn can_resume(&self) -> bool {
        true
    }

    fn on_game_over(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_gate_needs_three_unlocks() {
        let mut gate = AdUnlockGate::default();
        assert!(!gate.can_resume());
        assert_eq!(gate.record_unlock(), 2);
        assert_eq!(gate.record_unlock(), 1);
        assert!(!gate.can_resume());
        assert_eq!(gate.record_unlock(), 0);
        assert!(gate.can_resume());
        // Extra ads do not bank
        assert_eq!(gate.record_unlock(), 0);
    }

    #[test]
    fn test_ad_gate_resets_on_game_over() {
        let mut gate = AdUnlockGate::default();
        gate.record_unlock();
        gate.record_unlock();
        gate.on_game_over();
        assert_eq!(gate.remaining(), 3);
    }

    #[test]
    fn test_null_presenter_tracks_handles() {
        let mut presenter = NullPresenter::new();
        let a = presenter.spawn_handle(&EntityDescriptor::Player).unwrap();
        let b = presenter.spawn_handle(&EntityDescriptor::Player).unwrap();
        assert_ne!(a, b);
        assert_eq!(presenter.live(), 2);
        presenter.update_handle(a, Pose::at(Vec3::ZERO)).unwrap();
        presenter.release_handle(a).unwrap();
        assert!(presenter.release_handle(a).is_err());
        assert!(presenter.update_handle(a, Pose::at(Vec3::ZERO)).is_err());
        assert_eq!(presenter.live(), 1);
    }
}
