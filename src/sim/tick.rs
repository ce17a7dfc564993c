//! Fixed timestep simulation tick
//!
//! One tick runs, in order: timers, gestures, player kinematics, spawning,
//! world scroll, collision resolution, culling (pass credit), then speed
//! progression. Nothing here touches presentation or storage.

use serde::{Deserialize, Serialize};

use super::collision::{Contact, Verdict, detect, obstacle_verdict};
use super::entity::{EntityKind, PowerUpKind};
use super::events::GameEvent;
use super::scheduler::Deferred;
use super::state::{GamePhase, GameSession, Report};
use crate::error::SimError;
use crate::tuning::PowerUpPolicy;

/// A discrete player intent, already decoded from raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// Move one lane; the sign picks the direction
    LaneShift(i8),
    Jump,
    /// Slide while held
    SlideStart,
    SlideEnd,
    /// Slide for a fixed duration
    SlideTap,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub gestures: Vec<Gesture>,
}

impl TickInput {
    pub fn gesture(gesture: Gesture) -> Self {
        Self {
            gestures: vec![gesture],
        }
    }
}

/// Apply one gesture to a running session
pub fn apply_gesture(
    session: &mut GameSession,
    gesture: Gesture,
) -> Result<Vec<GameEvent>, SimError> {
    if session.phase != GamePhase::Running {
        return Err(SimError::invalid("steer", session.phase));
    }
    let mut events = Vec::new();
    match gesture {
        Gesture::LaneShift(delta) => session.player.shift_lane(delta)?,
        Gesture::Jump => {
            session.player.jump(session.tuning.jump_force)?;
            events.push(GameEvent::Jumped);
        }
        Gesture::SlideStart => {
            session.cancel_slide_timer();
            session.set_slide_button(true);
            let was_sliding = session.player.is_sliding();
            session.player.set_slide(true);
            if !was_sliding && session.player.is_sliding() {
                events.push(GameEvent::SlideStarted);
            }
        }
        Gesture::SlideEnd => {
            session.cancel_slide_timer();
            session.set_slide_button(false);
            let was_sliding = session.player.is_sliding();
            session.player.set_slide(false);
            if was_sliding {
                events.push(GameEvent::SlideEnded);
            }
        }
        Gesture::SlideTap => {
            let was_sliding = session.player.is_sliding();
            session.start_timed_slide()?;
            if !was_sliding {
                events.push(GameEvent::SlideStarted);
            }
        }
    }
    Ok(events)
}

/// Advance the session by one fixed timestep
pub fn tick(session: &mut GameSession, input: &TickInput) -> Report {
    let mut report = Report::default();
    if session.phase != GamePhase::Running {
        return report;
    }

    session.time_ticks += 1;
    session.scheduler.advance(session.tuning.tick_ms);

    // Timers
    let mut waves_due = 0;
    for action in session.scheduler.drain_due(session.generation) {
        match action {
            Deferred::Spawn => waves_due += 1,
            Deferred::ReleaseSlide => {
                session.slide_timer_fired();
                if session.slide_button_down() {
                    log::debug!("Timed slide release skipped: button held");
                } else if session.player.is_sliding() {
                    session.player.set_slide(false);
                    report.events.push(GameEvent::SlideEnded);
                } else {
                    session.player.slide_held = false;
                }
            }
            Deferred::ExpireEffect(kind) => {
                report.events.extend(session.expire_effect(kind));
            }
        }
    }

    // Gestures
    for &gesture in &input.gestures {
        match apply_gesture(session, gesture) {
            Ok(events) => report.events.extend(events),
            Err(e) => log::debug!("Ignored {:?}: {}", gesture, e),
        }
    }

    // Kinematics
    if session.player.update(&session.tuning).landed {
        report.events.push(GameEvent::Landed);
        if session.player.is_sliding() {
            report.events.push(GameEvent::SlideStarted);
        }
    }

    // Spawning
    for _ in 0..waves_due {
        let wave = session
            .spawner
            .spawn_wave(&mut session.registry, &session.tuning);
        report.spawned.extend(wave.ids());
        session.schedule_spawn();
    }

    // Scroll
    let step = session.scroll_step();
    session.registry.advance(step);
    session.distance += step;

    // Collisions
    let magnet = session.effect_active(PowerUpKind::Magnet);
    let contacts = detect(&session.player, &session.registry, magnet, &session.tuning);
    for contact in contacts {
        match contact {
            Contact::Obstacle { id, kind } => {
                if obstacle_verdict(kind, &session.player, &session.tuning) == Verdict::Clear {
                    continue;
                }
                if session.absorb_hit() {
                    session.registry.remove(id);
                    report.removed.push(id);
                    report.events.push(GameEvent::ShieldBlocked {
                        id,
                        kind,
                        charges_left: session.inventory.shield,
                    });
                    continue;
                }
                report.events.push(GameEvent::Crashed { id, kind });
                report.events.push(session.end_run());
                return report;
            }
            Contact::Collectible { id, kind } => {
                session.registry.remove(id);
                report.removed.push(id);
                let (value, points) = session.credit_collectible(kind);
                report.events.push(GameEvent::CollectiblePicked {
                    id,
                    kind,
                    value,
                    points,
                });
            }
            Contact::PowerUp { id, kind } => {
                session.registry.remove(id);
                report.removed.push(id);
                session.inventory.add(kind, 1);
                report.events.push(GameEvent::PowerUpPicked { id, kind });
                if session.tuning.power_up_policy == PowerUpPolicy::AutoActivate && kind.is_timed()
                {
                    match session.activate_power_up(kind) {
                        Ok(activated) => report.merge(activated),
                        Err(e) => log::warn!("Auto-activation of {:?} failed: {}", kind, e),
                    }
                }
            }
        }
    }

    // Cull and credit passes
    for entity in session.registry.cull(session.tuning.cull_z) {
        report.removed.push(entity.id);
        if let EntityKind::Obstacle(kind) = entity.kind {
            report.events.extend(session.credit_pass(entity.id, kind));
        }
    }

    session.grow_speed();
    report
}
