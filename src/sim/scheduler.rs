//! Generation-keyed deferred tasks
//!
//! Timers (spawn cadence, timed slide release, power-up expiry) are queued
//! against the simulation clock and tagged with the session generation that
//! created them. Entering a new generation makes every older task stale: it
//! is dropped when it comes due instead of mutating the fresh session.

use serde::{Deserialize, Serialize};

use super::entity::PowerUpKind;

pub type TaskId = u64;

/// Work a deferred task performs when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Emit the next spawn wave
    Spawn,
    /// End a timed slide
    ReleaseSlide,
    /// End an active power-up effect
    ExpireEffect(PowerUpKind),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Task {
    id: TaskId,
    due_ms: f64,
    generation: u64,
    action: Deferred,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    /// Monotonic simulation clock in milliseconds
    now_ms: f64,
    tasks: Vec<Task>,
    next_id: TaskId,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Advance the clock; the clock never runs backwards
    pub fn advance(&mut self, dt_ms: f64) {
        if dt_ms > 0.0 {
            self.now_ms += dt_ms;
        }
    }

    /// Queue `action` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: f64, generation: u64, action: Deferred) -> TaskId {
        self.next_id += 1;
        let id = self.next_id;
        self.tasks.push(Task {
            id,
            due_ms: self.now_ms + delay_ms.max(0.0),
            generation,
            action,
        });
        id
    }

    /// Cancel a pending task; returns false if it already fired or never existed
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Remove and return actions that are due, oldest first.
    ///
    /// Tasks from any generation other than `generation` are discarded.
    pub fn drain_due(&mut self, generation: u64) -> Vec<Deferred> {
        let now = self.now_ms;
        let mut due: Vec<Task> = Vec::new();
        self.tasks.retain(|t| {
            if t.due_ms <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));

        due.into_iter()
            .filter_map(|t| {
                if t.generation == generation {
                    Some(t.action)
                } else {
                    log::debug!(
                        "Dropping stale {:?} from generation {} (current {})",
                        t.action,
                        t.generation,
                        generation
                    );
                    None
                }
            })
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Milliseconds until `id` fires, if still pending
    pub fn remaining_ms(&self, id: TaskId) -> Option<f64> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| (t.due_ms - self.now_ms).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_when_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100.0, 1, Deferred::Spawn);
        scheduler.advance(50.0);
        assert!(scheduler.drain_due(1).is_empty());
        scheduler.advance(50.0);
        assert_eq!(scheduler.drain_due(1), vec![Deferred::Spawn]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_due_order_is_by_time() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(30.0, 1, Deferred::ReleaseSlide);
        scheduler.schedule(10.0, 1, Deferred::Spawn);
        scheduler.advance(40.0);
        assert_eq!(
            scheduler.drain_due(1),
            vec![Deferred::Spawn, Deferred::ReleaseSlide]
        );
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(100.0, 1, Deferred::ExpireEffect(PowerUpKind::Speed));
        scheduler.schedule(100.0, 2, Deferred::Spawn);
        scheduler.advance(100.0);
        assert_eq!(scheduler.drain_due(2), vec![Deferred::Spawn]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = Scheduler::new();
        let id = scheduler.schedule(10.0, 1, Deferred::ReleaseSlide);
        assert_eq!(scheduler.remaining_ms(id), Some(10.0));
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        scheduler.advance(20.0);
        assert!(scheduler.drain_due(1).is_empty());
    }
}
