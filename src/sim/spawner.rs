//! Procedural spawning
//!
//! Each wave emits one obstacle and one decoration, plus an optional
//! collectible and power-up decided by independent Bernoulli trials. Lanes
//! are drawn uniformly and independently per entity.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{CollectibleKind, EntityId, EntityKind, ObstacleKind, PowerUpKind};
use super::registry::EntityRegistry;
use crate::consts::{MAX_LANE, MIN_LANE};
use crate::lane_x;
use crate::tuning::Tuning;

/// Ids created by one spawn wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnWave {
    pub obstacle: EntityId,
    pub decoration: EntityId,
    pub collectible: Option<EntityId>,
    pub power_up: Option<EntityId>,
}

impl SpawnWave {
    pub fn ids(&self) -> impl Iterator<Item = EntityId> {
        [Some(self.obstacle), Some(self.decoration), self.collectible, self.power_up]
            .into_iter()
            .flatten()
    }
}

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Restart the random stream (each session generation gets its own stream)
    pub fn reseed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Emit one wave into the registry at the spawn distance
    pub fn spawn_wave(&mut self, registry: &mut EntityRegistry, tuning: &Tuning) -> SpawnWave {
        let z = tuning.spawn_z;

        let kind = ObstacleKind::ALL[self.rng.random_range(0..ObstacleKind::ALL.len())];
        let lane = self.random_lane();
        let obstacle = registry.spawn(
            EntityKind::Obstacle(kind),
            Vec3::new(lane_x(lane, tuning.lane_width), kind.base_y(), z),
            Some(lane),
        );

        // Scenery sits off the road on a random side
        let side = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let offset = 7.0 + self.rng.random::<f32>() * 10.0;
        let decoration = registry.spawn(EntityKind::Decoration, Vec3::new(side * offset, 1.0, z), None);

        let collectible = if self.rng.random_bool(tuning.collectible_chance) {
            let kind = if self.rng.random_bool(tuning.gem_share) {
                CollectibleKind::Gem
            } else {
                CollectibleKind::Coin
            };
            let lane = self.random_lane();
            Some(registry.spawn(
                EntityKind::Collectible(kind),
                Vec3::new(lane_x(lane, tuning.lane_width), 0.5, z),
                Some(lane),
            ))
        } else {
            None
        };

        let power_up = if self.rng.random_bool(tuning.power_up_chance) {
            let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
            let lane = self.random_lane();
            Some(registry.spawn(
                EntityKind::PowerUp(kind),
                Vec3::new(lane_x(lane, tuning.lane_width), 0.75, z),
                Some(lane),
            ))
        } else {
            None
        };

        SpawnWave {
            obstacle,
            decoration,
            collectible,
            power_up,
        }
    }

    fn random_lane(&mut self) -> i8 {
        self.rng.random_range(MIN_LANE..=MAX_LANE)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_wave_always_has_obstacle_and_decoration() {
        let tuning = Tuning::default();
        let mut registry = EntityRegistry::new();
        let mut spawner = Spawner::new(7);
        for _ in 0..50 {
            let wave = spawner.spawn_wave(&mut registry, &tuning);
            let obstacle = registry.get(wave.obstacle).unwrap();
            assert!(matches!(obstacle.kind, EntityKind::Obstacle(_)));
            assert_eq!(obstacle.pos.z, tuning.spawn_z);
            let decoration = registry.get(wave.decoration).unwrap();
            assert_eq!(decoration.kind, EntityKind::Decoration);
            assert!(decoration.pos.x.abs() >= 7.0);
        }
    }

    #[test]
    fn test_lanes_and_kinds_cover_the_table() {
        let tuning = Tuning::default();
        let mut registry = EntityRegistry::new();
        let mut spawner = Spawner::new(42);
        let mut lanes = HashSet::new();
        let mut kinds = HashSet::new();
        for _ in 0..200 {
            let wave = spawner.spawn_wave(&mut registry, &tuning);
            let obstacle = registry.get(wave.obstacle).unwrap();
            let lane = obstacle.lane.unwrap();
            assert!((-1..=1).contains(&lane));
            lanes.insert(lane);
            kinds.insert(obstacle.obstacle().unwrap());
        }
        assert_eq!(lanes.len(), 3);
        assert_eq!(kinds.len(), ObstacleKind::ALL.len());
    }

    #[test]
    fn test_optional_spawns_follow_probabilities() {
        let never = Tuning {
            collectible_chance: 0.0,
            power_up_chance: 0.0,
            ..Default::default()
        };
        let always = Tuning {
            collectible_chance: 1.0,
            power_up_chance: 1.0,
            ..Default::default()
        };
        let mut registry = EntityRegistry::new();
        let mut spawner = Spawner::new(1);
        for _ in 0..20 {
            let wave = spawner.spawn_wave(&mut registry, &never);
            assert!(wave.collectible.is_none() && wave.power_up.is_none());
            let wave = spawner.spawn_wave(&mut registry, &always);
            assert!(wave.collectible.is_some() && wave.power_up.is_some());
            assert_eq!(wave.ids().count(), 4);
        }
    }

    #[test]
    fn test_same_seed_same_waves() {
        let tuning = Tuning::default();
        let mut a = (Spawner::new(99), EntityRegistry::new());
        let mut b = (Spawner::new(99), EntityRegistry::new());
        for _ in 0..30 {
            a.0.spawn_wave(&mut a.1, &tuning);
            b.0.spawn_wave(&mut b.1, &tuning);
        }
        let kinds_a: Vec<_> = a.1.iter().map(|e| (e.kind, e.lane)).collect();
        let kinds_b: Vec<_> = b.1.iter().map(|e| (e.kind, e.lane)).collect();
        assert_eq!(kinds_a, kinds_b);
    }
}
