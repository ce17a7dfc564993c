//! Session facade
//!
//! `Game` owns the simulation session, the cross-session economy and every
//! collaborator (storage, presenter, notifier, resume gate). It forwards
//! simulation reports outward, keeps one presentation handle per live
//! entity, pays out finished runs and persists progress. Collaborator
//! failures are logged and surfaced as `ExternalFailure` events; they never
//! change session state.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::economy::Economy;
use crate::error::SimError;
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::platform::time::FrameDriver;
use crate::platform::{
    AdUnlockGate, Handle, LogNotifier, Notifier, NullPresenter, Pose, Presenter, ResumeGate,
};
use crate::sim::{
    CollectibleKind, EntityDescriptor, EntityId, GameEvent, GamePhase, GameSession, Gesture,
    PowerUpKind, Report, TickInput, tick,
};
use crate::tuning::Tuning;

/// Snapshot of what a HUD shows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    pub score: u64,
    pub combo: u32,
    pub multiplier: f32,
    pub distance: f32,
    pub speed: f32,
    pub coins: u64,
    pub gems: u64,
    pub high_score: u64,
    pub active_effect: Option<PowerUpKind>,
    pub shields: u32,
}

pub struct Game {
    session: GameSession,
    economy: Economy,
    store: Box<dyn KeyValueStore>,
    presenter: Box<dyn Presenter>,
    notifier: Box<dyn Notifier>,
    gate: Box<dyn ResumeGate>,
    driver: FrameDriver,
    /// `None` when the presenter failed to create a handle for the entity
    handles: BTreeMap<EntityId, Option<Handle>>,
    player_handle: Option<Handle>,
    gestures: Vec<Gesture>,
    events: Vec<GameEvent>,
}

impl Game {
    /// Headless game with in-memory storage and an ad-unlock resume gate
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            session: GameSession::new(tuning, seed),
            economy: Economy::new(),
            store: Box::new(MemoryStore::new()),
            presenter: Box::new(NullPresenter::new()),
            notifier: Box::new(LogNotifier),
            gate: Box::new(AdUnlockGate::default()),
            driver: FrameDriver::default(),
            handles: BTreeMap::new(),
            player_handle: None,
            gestures: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Use `store` for progress and load the economy from it
    pub fn with_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        match Economy::load(&store) {
            Ok(economy) => self.economy = economy,
            Err(e) => self.external_failure("load economy", e),
        }
        self.store = Box::new(store);
        self
    }

    pub fn with_presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Box::new(presenter);
        self
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_gate(mut self, gate: impl ResumeGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    // === Accessors ===

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Events published since the last `take_events`
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Entities currently holding a presentation handle
    pub fn tracked_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.handles.keys().copied()
    }

    pub fn hud(&self) -> Hud {
        let s = &self.session;
        Hud {
            phase: s.phase,
            score: s.score,
            combo: s.combo,
            multiplier: s.multiplier(),
            distance: s.distance,
            speed: s.speed,
            coins: self.economy.coins,
            gems: self.economy.gems,
            high_score: self.economy.high_score,
            active_effect: s.active_effect.map(|e| e.kind),
            shields: s.inventory.shield,
        }
    }

    // === Transitions ===

    pub fn start(&mut self) -> Result<(), SimError> {
        let result = self.session.start();
        self.apply(result, true)
    }

    pub fn restart(&mut self) -> Result<(), SimError> {
        let result = self.session.restart();
        self.apply(result, true)
    }

    /// Continue a crashed run once the resume gate allows it
    pub fn resume(&mut self) -> Result<(), SimError> {
        if !self.session.is_over() {
            return Err(SimError::invalid("resume", self.session.phase));
        }
        if !self.gate.can_resume() {
            log::debug!("Resume refused: gate locked");
            return Err(SimError::InvalidTransition {
                action: "resume",
                state: "resume is locked".into(),
            });
        }
        let result = self.session.resume_run();
        if result.is_ok() {
            self.gate.on_resumed();
        }
        self.apply(result, true)
    }

    pub fn pause(&mut self) -> Result<(), SimError> {
        let result = self.session.pause();
        self.apply(result, true)
    }

    pub fn unpause(&mut self) -> Result<(), SimError> {
        let result = self.session.unpause();
        self.apply(result, true)
    }

    /// Host reports one resume unlock (an ad watched); returns how many remain
    pub fn record_ad_unlock(&mut self) -> u32 {
        self.gate.record_unlock()
    }

    pub fn activate_power_up(&mut self, kind: PowerUpKind) -> Result<(), SimError> {
        let result = self.session.activate_power_up(kind);
        self.apply(result, false)
    }

    /// Buy one power-up with coins
    pub fn buy_power_up(&mut self, kind: PowerUpKind) -> Result<(), SimError> {
        let price = self.session.tuning.power_up_price;
        if let Err(e) = self.economy.purchase(price) {
            if let SimError::ResourceExhausted { needed, available } = e {
                self.publish(GameEvent::PurchaseRejected { needed, available });
            }
            return Err(e);
        }
        self.session.inventory.add(kind, 1);
        log::info!("Bought {:?} for {} coins", kind, price);
        self.publish(GameEvent::Purchased { kind, price });
        self.persist();
        Ok(())
    }

    fn apply(&mut self, result: Result<Report, SimError>, reset_clock: bool) -> Result<(), SimError> {
        match result {
            Ok(report) => {
                if reset_clock {
                    self.driver.reset();
                }
                self.ensure_player_handle();
                self.absorb(report);
                self.sync_poses();
                Ok(())
            }
            Err(e) => {
                log::debug!("Rejected: {}", e);
                Err(e)
            }
        }
    }

    // === Ticking ===

    /// Queue a gesture for the next tick; dropped unless the run is active
    pub fn push_gesture(&mut self, gesture: Gesture) {
        if self.session.is_running() {
            self.gestures.push(gesture);
        }
    }

    /// Run one fixed simulation step
    pub fn step(&mut self) {
        let input = TickInput {
            gestures: std::mem::take(&mut self.gestures),
        };
        let report = tick(&mut self.session, &input);
        self.absorb(report);
        self.sync_poses();
    }

    /// Frame callback: run as many fixed steps as the elapsed time allows
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let steps = self.driver.frame(time_ms);
        for _ in 0..steps {
            self.step();
        }
        steps
    }

    /// Fraction of a step the frame driver has banked, for render interpolation
    pub fn interpolation(&self) -> f32 {
        self.driver.alpha()
    }

    // === Report handling ===

    fn absorb(&mut self, report: Report) {
        // Entities spawned and consumed within one tick never get a handle
        let transient: Vec<EntityId> = report
            .spawned
            .iter()
            .copied()
            .filter(|id| report.removed.contains(id))
            .collect();
        for id in report.spawned {
            if !transient.contains(&id) {
                self.spawn_handle(id);
            }
        }
        for id in report.removed {
            if !transient.contains(&id) {
                self.release_handle(id);
            }
        }
        for event in report.events {
            self.publish(event.clone());
            self.settle(&event);
        }
    }

    /// Economy side effects of simulation events
    fn settle(&mut self, event: &GameEvent) {
        match *event {
            GameEvent::CollectiblePicked { kind, value, .. } => match kind {
                CollectibleKind::Coin => self.economy.credit_coins(value as u64),
                CollectibleKind::Gem => self.economy.credit_gems(value as u64),
            },
            GameEvent::GameOver { score, .. } => {
                let divisor = self.session.tuning.payout_divisor;
                let settlement = self
                    .economy
                    .settle_run(score, self.session.settled_score, divisor);
                self.session.settled_score = score;

                self.publish(GameEvent::Payout {
                    coins: settlement.payout,
                });
                if settlement.new_high_score {
                    log::info!("New high score: {}", score);
                    self.publish(GameEvent::NewHighScore { score });
                }
                self.persist();
                self.gate.on_game_over();
            }
            _ => {}
        }
    }

    fn publish(&mut self, event: GameEvent) {
        if let Err(e) = self.notifier.emit(&event) {
            log::warn!("Notifier dropped {}: {}", event.name(), e);
            self.events.push(event);
            self.events.push(GameEvent::ExternalFailure {
                what: format!("notify: {e}"),
            });
            return;
        }
        self.events.push(event);
    }

    fn external_failure(&mut self, what: &str, err: impl Display) {
        log::warn!("{} failed: {}", what, err);
        self.publish(GameEvent::ExternalFailure {
            what: format!("{what}: {err}"),
        });
    }

    fn persist(&mut self) {
        if let Err(e) = self.economy.save(self.store.as_mut()) {
            self.external_failure("save economy", e);
        }
    }

    // === Presentation ===

    fn ensure_player_handle(&mut self) {
        if self.player_handle.is_some() {
            return;
        }
        match self.presenter.spawn_handle(&EntityDescriptor::Player) {
            Ok(handle) => self.player_handle = Some(handle),
            Err(e) => self.external_failure("spawn player handle", e),
        }
    }

    fn spawn_handle(&mut self, id: EntityId) {
        let Some(entity) = self.session.registry.get(id) else {
            return;
        };
        let descriptor = EntityDescriptor::Entity {
            id,
            kind: entity.kind,
        };
        match self.presenter.spawn_handle(&descriptor) {
            Ok(handle) => {
                self.handles.insert(id, Some(handle));
            }
            Err(e) => {
                self.handles.insert(id, None);
                self.external_failure("spawn handle", e);
            }
        }
    }

    fn release_handle(&mut self, id: EntityId) {
        debug_assert!(self.handles.contains_key(&id), "no handle for entity {id}");
        match self.handles.remove(&id) {
            Some(Some(handle)) => {
                if let Err(e) = self.presenter.release_handle(handle) {
                    self.external_failure("release handle", e);
                }
            }
            Some(None) => {}
            None => {
                let err = SimError::IntegrityViolation(format!("no handle for entity {id}"));
                log::error!("{}", err);
            }
        }
    }

    fn sync_poses(&mut self) {
        let mut failures = Vec::new();
        let tuning = &self.session.tuning;

        if let Some(handle) = self.player_handle {
            let player = &self.session.player;
            let pose = Pose {
                position: player.center(tuning),
                scale_y: player.scale_y,
            };
            if let Err(e) = self.presenter.update_handle(handle, pose) {
                failures.push(e);
            }
        }
        for entity in self.session.registry.iter() {
            if let Some(Some(handle)) = self.handles.get(&entity.id) {
                if let Err(e) = self.presenter.update_handle(*handle, Pose::at(entity.pos)) {
                    failures.push(e);
                }
            }
        }

        for e in failures {
            self.external_failure("update pose", e);
        }
    }
}
