//! Sound cues for game events
//!
//! The simulation has no audio backend. `SoundBoard` is a [`Notifier`] that
//! maps events to cues and queues them with their effective volume; the host
//! drains the queue once per frame and plays whatever it likes.

use std::collections::VecDeque;

use crate::platform::{Notifier, PlatformError};
use crate::sim::{GameEvent, ObstacleKind};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    Land,
    Slide,
    /// Obstacle dodged
    Whoosh,
    Coin,
    Gem,
    PowerUp,
    /// Shield absorbed a hit
    ShieldBreak,
    Crash,
    /// Combo milestone
    Multiplier,
    GameOver,
    HighScore,
    Purchase,
    Denied,
}

/// A queued effect at its effective volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub effect: SoundEffect,
    pub volume: f32,
}

/// Most cues kept before the oldest is dropped
pub const MAX_QUEUED: usize = 32;

/// Cue for an event, if it makes a sound
pub fn effect_for(event: &GameEvent) -> Option<SoundEffect> {
    use crate::sim::CollectibleKind;

    let effect = match event {
        GameEvent::Jumped => SoundEffect::Jump,
        GameEvent::Landed => SoundEffect::Land,
        GameEvent::SlideStarted => SoundEffect::Slide,
        // Dodge walls pass silently
        GameEvent::ObstaclePassed { kind, .. } if *kind != ObstacleKind::Dodge => SoundEffect::Whoosh,
        GameEvent::CollectiblePicked { kind: CollectibleKind::Coin, .. } => SoundEffect::Coin,
        GameEvent::CollectiblePicked { kind: CollectibleKind::Gem, .. } => SoundEffect::Gem,
        GameEvent::PowerUpPicked { .. } | GameEvent::PowerUpActivated { .. } => SoundEffect::PowerUp,
        GameEvent::ShieldBlocked { .. } => SoundEffect::ShieldBreak,
        GameEvent::Crashed { .. } => SoundEffect::Crash,
        GameEvent::MultiplierRaised { .. } => SoundEffect::Multiplier,
        GameEvent::GameOver { .. } => SoundEffect::GameOver,
        GameEvent::NewHighScore { .. } => SoundEffect::HighScore,
        GameEvent::Purchased { .. } => SoundEffect::Purchase,
        GameEvent::PurchaseRejected { .. } => SoundEffect::Denied,
        _ => return None,
    };
    Some(effect)
}

#[derive(Debug, Clone)]
pub struct SoundBoard {
    queue: VecDeque<SoundCue>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for SoundBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundBoard {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute; muting also drops anything queued
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.queue.clear();
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        if self.queue.len() == MAX_QUEUED {
            self.queue.pop_front();
        }
        self.queue.push_back(SoundCue { effect, volume });
    }

    /// Take every queued cue, oldest first
    pub fn drain(&mut self) -> Vec<SoundCue> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Notifier for SoundBoard {
    fn emit(&mut self, event: &GameEvent) -> Result<(), PlatformError> {
        if let Some(effect) = effect_for(event) {
            self.play(effect);
        }
        Ok(())
    }
}
