//! Game session state and core simulation types
//!
//! `GameSession` is the single owned aggregate for one play-through: player
//! pose, world entities, timers, the in-run ledger and the phase machine.
//! All mutation goes through its methods or the tick function.

use serde::{Deserialize, Serialize};

use super::entity::{CollectibleKind, EntityId, ObstacleKind, PowerUpKind};
use super::events::GameEvent;
use super::player::Player;
use super::registry::EntityRegistry;
use super::scheduler::{Deferred, Scheduler, TaskId};
use super::spawner::Spawner;
use crate::error::SimError;
use crate::tuning::{ComboPolicy, ResumePolicy, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GamePhase {
    /// Before the first run
    #[default]
    Idle,
    /// Active gameplay
    Running,
    /// Frozen; ticks are no-ops
    Paused,
    /// Run ended on an unshielded hit
    GameOver,
}

/// Stocked power-ups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpInventory {
    pub magnet: u32,
    pub shield: u32,
    pub speed: u32,
}

impl PowerUpInventory {
    pub fn count(&self, kind: PowerUpKind) -> u32 {
        match kind {
            PowerUpKind::Magnet => self.magnet,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::Speed => self.speed,
        }
    }

    pub fn add(&mut self, kind: PowerUpKind, n: u32) {
        let slot = self.slot(kind);
        *slot = slot.saturating_add(n);
    }

    /// Take one from stock; false when empty
    pub fn take(&mut self, kind: PowerUpKind) -> bool {
        let slot = self.slot(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    fn slot(&mut self, kind: PowerUpKind) -> &mut u32 {
        match kind {
            PowerUpKind::Magnet => &mut self.magnet,
            PowerUpKind::Shield => &mut self.shield,
            PowerUpKind::Speed => &mut self.speed,
        }
    }
}

/// Timed power-up currently in effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub expires_at_ms: f64,
    pub task: TaskId,
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub obstacles_passed: u32,
    pub shields_used: u32,
    pub coins_collected: u64,
    pub gems_collected: u64,
}

/// What a transition or tick produced, for the facade to forward
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub events: Vec<GameEvent>,
    /// Entities created (presentation handles needed)
    pub spawned: Vec<EntityId>,
    /// Entities removed (presentation handles to release)
    pub removed: Vec<EntityId>,
}

impl Report {
    pub fn with_event(event: GameEvent) -> Self {
        Self {
            events: vec![event],
            ..Default::default()
        }
    }

    pub fn merge(&mut self, other: Report) {
        self.events.extend(other.events);
        self.spawned.extend(other.spawned);
        self.removed.extend(other.removed);
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameSession {
    pub tuning: Tuning,
    /// Base seed; each generation derives its own spawn stream from it
    pub seed: u64,
    pub phase: GamePhase,
    /// Bumped on every run start; timers from older generations are stale
    pub generation: u64,
    pub player: Player,
    pub registry: EntityRegistry,
    pub spawner: Spawner,
    pub scheduler: Scheduler,
    /// Simulation tick counter for the current run
    pub time_ticks: u64,

    // === Ledger ===
    pub score: u64,
    /// Consecutive successful passes
    pub combo: u32,
    /// Score multiplier in percent (100 = 1.00x)
    multiplier_pct: u32,
    pub distance: f32,
    /// Base scroll speed; never decreases within a session
    pub speed: f32,
    pub inventory: PowerUpInventory,
    pub active_effect: Option<ActiveEffect>,
    pub stats: RunStats,
    /// Part of the score already paid out as coins
    pub settled_score: u64,

    slide_task: Option<TaskId>,
    /// Slide button physically down; a timed release never ends a held slide
    slide_button: bool,
}

impl GameSession {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let speed = tuning.initial_speed;
        Self {
            tuning,
            seed,
            phase: GamePhase::Idle,
            generation: 0,
            player: Player::new(),
            registry: EntityRegistry::new(),
            spawner: Spawner::new(seed),
            scheduler: Scheduler::new(),
            time_ticks: 0,
            score: 0,
            combo: 0,
            multiplier_pct: 100,
            distance: 0.0,
            speed,
            inventory: PowerUpInventory::default(),
            active_effect: None,
            stats: RunStats::default(),
            settled_score: 0,
            slide_task: None,
            slide_button: false,
        }
    }

    pub fn multiplier_pct(&self) -> u32 {
        self.multiplier_pct
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier_pct as f32 / 100.0
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn effect_active(&self, kind: PowerUpKind) -> bool {
        self.active_effect.is_some_and(|e| e.kind == kind)
    }

    /// World units scrolled this tick (speed boost applied)
    pub fn scroll_step(&self) -> f32 {
        if self.effect_active(PowerUpKind::Speed) {
            self.speed * self.tuning.speed_boost_factor
        } else {
            self.speed
        }
    }

    // === Phase transitions ===

    /// Idle -> Running with a fresh run
    pub fn start(&mut self) -> Result<Report, SimError> {
        if self.phase != GamePhase::Idle {
            return Err(SimError::invalid("start", self.phase));
        }
        Ok(self.begin_run(true))
    }

    /// Any phase -> Running with a fresh run
    pub fn restart(&mut self) -> Result<Report, SimError> {
        Ok(self.begin_run(true))
    }

    /// GameOver -> Running, keeping or resetting run stats per `ResumePolicy`.
    ///
    /// The gate deciding whether a resume is allowed lives with the caller.
    pub fn resume_run(&mut self) -> Result<Report, SimError> {
        if self.phase != GamePhase::GameOver {
            return Err(SimError::invalid("resume", self.phase));
        }
        let reset = self.tuning.resume_policy == ResumePolicy::ResetRun;
        Ok(self.begin_run(reset))
    }

    /// Running -> Paused
    pub fn pause(&mut self) -> Result<Report, SimError> {
        if self.phase != GamePhase::Running {
            return Err(SimError::invalid("pause", self.phase));
        }
        self.phase = GamePhase::Paused;
        log::info!("Paused at tick {}", self.time_ticks);
        Ok(Report::with_event(GameEvent::Paused))
    }

    /// Paused -> Running
    pub fn unpause(&mut self) -> Result<Report, SimError> {
        if self.phase != GamePhase::Paused {
            return Err(SimError::invalid("unpause", self.phase));
        }
        self.phase = GamePhase::Running;
        log::info!("Resumed at tick {}", self.time_ticks);
        Ok(Report::with_event(GameEvent::Resumed))
    }

    fn begin_run(&mut self, reset: bool) -> Report {
        self.generation += 1;
        let mut report = Report::default();

        if reset {
            self.score = 0;
            self.combo = 0;
            self.multiplier_pct = 100;
            self.distance = 0.0;
            self.speed = self.tuning.initial_speed;
            self.stats = RunStats::default();
            self.settled_score = 0;
        }

        // Pose and world always reset; older timers become stale by generation
        self.player = Player::new();
        report.removed = self.registry.clear();
        self.active_effect = None;
        self.slide_task = None;
        self.slide_button = false;
        self.time_ticks = 0;

        let stream = self
            .seed
            .wrapping_add(self.generation.wrapping_mul(0x9E37_79B9_7F4A_7C15));
        self.spawner.reseed(stream);
        self.schedule_spawn();

        self.phase = GamePhase::Running;
        log::info!(
            "Run started (generation {}, reset {}, speed {:.3})",
            self.generation,
            reset,
            self.speed
        );
        report.events.push(GameEvent::RunStarted {
            generation: self.generation,
            reset,
        });
        report
    }

    /// Running -> GameOver; freezes every timer
    pub(crate) fn end_run(&mut self) -> GameEvent {
        self.phase = GamePhase::GameOver;
        log::debug!("Dropping {} pending timers", self.scheduler.pending());
        self.scheduler.clear();
        self.slide_task = None;
        log::info!(
            "Game over: score {} distance {:.1} combo {}",
            self.score,
            self.distance,
            self.combo
        );
        GameEvent::GameOver {
            score: self.score,
            distance: self.distance,
        }
    }

    pub(crate) fn schedule_spawn(&mut self) {
        let delay = self.tuning.spawn_interval_ms(self.speed);
        self.scheduler.schedule(delay, self.generation, Deferred::Spawn);
    }

    // === Timed slide ===

    /// Slide for `slide_duration_ms`, then release automatically
    pub(crate) fn start_timed_slide(&mut self) -> Result<(), SimError> {
        if self.player.is_jumping() {
            return Err(SimError::invalid("slide", self.player.vertical));
        }
        self.cancel_slide_timer();
        self.player.set_slide(true);
        self.slide_task = Some(self.scheduler.schedule(
            self.tuning.slide_duration_ms,
            self.generation,
            Deferred::ReleaseSlide,
        ));
        Ok(())
    }

    pub(crate) fn cancel_slide_timer(&mut self) {
        if let Some(id) = self.slide_task.take() {
            self.scheduler.cancel(id);
        }
    }

    pub(crate) fn slide_timer_fired(&mut self) {
        self.slide_task = None;
    }

    pub(crate) fn set_slide_button(&mut self, down: bool) {
        self.slide_button = down;
    }

    pub(crate) fn slide_button_down(&self) -> bool {
        self.slide_button
    }

    // === Power-ups ===

    /// Spend one stocked power-up and start its timed effect
    pub fn activate_power_up(&mut self, kind: PowerUpKind) -> Result<Report, SimError> {
        if self.phase != GamePhase::Running {
            return Err(SimError::invalid("activate power-up", self.phase));
        }
        if !kind.is_timed() {
            return Err(SimError::InvalidTransition {
                action: "activate power-up",
                state: format!("{kind:?} is spent on impact"),
            });
        }
        if !self.inventory.take(kind) {
            return Err(SimError::ResourceExhausted {
                needed: 1,
                available: 0,
            });
        }
        if let Some(previous) = self.active_effect.take() {
            self.scheduler.cancel(previous.task);
        }
        let duration = self.tuning.effect_duration_ms;
        let task = self
            .scheduler
            .schedule(duration, self.generation, Deferred::ExpireEffect(kind));
        self.active_effect = Some(ActiveEffect {
            kind,
            expires_at_ms: self.scheduler.now_ms() + duration,
            task,
        });
        log::debug!("Activated {:?} for {} ms", kind, duration);
        Ok(Report::with_event(GameEvent::PowerUpActivated { kind }))
    }

    /// Remaining milliseconds of the active effect
    pub fn effect_remaining_ms(&self) -> Option<f64> {
        self.active_effect
            .and_then(|e| self.scheduler.remaining_ms(e.task))
    }

    pub(crate) fn expire_effect(&mut self, kind: PowerUpKind) -> Option<GameEvent> {
        if self.effect_active(kind) {
            self.active_effect = None;
            Some(GameEvent::PowerUpExpired { kind })
        } else {
            None
        }
    }

    // === Ledger ===

    /// Credit a dodged obstacle: score, combo and multiplier milestones
    pub(crate) fn credit_pass(&mut self, id: EntityId, kind: ObstacleKind) -> Vec<GameEvent> {
        let points = self.tuning.pass_value as u64 * self.multiplier_pct as u64 / 100;
        self.score += points;
        self.combo += 1;
        self.stats.obstacles_passed += 1;

        let mut events = vec![GameEvent::ObstaclePassed {
            id,
            kind,
            points,
            combo: self.combo,
        }];

        let t = &self.tuning;
        if self.combo % t.combo_milestone == 0 && self.multiplier_pct < t.multiplier_cap_pct {
            self.multiplier_pct = (self.multiplier_pct + t.multiplier_step_pct).min(t.multiplier_cap_pct);
            events.push(GameEvent::MultiplierRaised {
                multiplier_pct: self.multiplier_pct,
            });
        }
        events
    }

    /// Credit a collectible pickup; returns the points scored
    pub(crate) fn credit_collectible(&mut self, kind: CollectibleKind) -> (u32, u64) {
        let value = kind.value(&self.tuning);
        let points = value as u64 * self.multiplier_pct as u64 / 100;
        self.score += points;
        match kind {
            CollectibleKind::Coin => self.stats.coins_collected += value as u64,
            CollectibleKind::Gem => self.stats.gems_collected += value as u64,
        }
        (value, points)
    }

    /// Spend a shield charge on a failed obstacle, if one is stocked
    pub(crate) fn absorb_hit(&mut self) -> bool {
        if !self.inventory.take(PowerUpKind::Shield) {
            return false;
        }
        self.stats.shields_used += 1;
        if self.tuning.combo_policy == ComboPolicy::ResetOnBlock {
            self.combo = 0;
        }
        true
    }

    /// Per-tick speed progression, clamped to `max_speed`
    pub(crate) fn grow_speed(&mut self) {
        let t = &self.tuning;
        if self.speed >= t.max_speed {
            return;
        }
        let increment = if t.speed_scales_with_multiplier {
            t.speed_increment * self.multiplier()
        } else {
            t.speed_increment
        };
        self.speed = (self.speed + increment).min(t.max_speed);
    }
}
