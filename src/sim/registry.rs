//! World entity registry
//!
//! Sole owner of every spawned entity. Entities scroll toward the player
//! each tick and are culled once they pass behind it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityId, EntityKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRegistry {
    /// Active entities, sorted by id for deterministic iteration
    entities: Vec<Entity>,
    next_id: EntityId,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Insert a new entity and return its id
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec3, lane: Option<i8>) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        self.entities.push(Entity::new(id, kind, pos, lane));
        id
    }

    /// Move every entity `step` units toward (and past) the player
    pub fn advance(&mut self, step: f32) {
        for entity in &mut self.entities {
            entity.pos.z += step;
        }
    }

    /// Remove and return every entity whose z has passed `cull_z`
    pub fn cull(&mut self, cull_z: f32) -> Vec<Entity> {
        let mut culled = Vec::new();
        self.entities.retain(|e| {
            if e.pos.z > cull_z {
                culled.push(e.clone());
                false
            } else {
                true
            }
        });
        culled
    }

    /// Remove a consumed entity
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let idx = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(idx))
    }

    /// Drop every entity, returning their ids so handles can be released
    pub fn clear(&mut self) -> Vec<EntityId> {
        self.entities.drain(..).map(|e| e.id).collect()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::ObstacleKind;

    fn obstacle() -> EntityKind {
        EntityKind::Obstacle(ObstacleKind::Dodge)
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut registry = EntityRegistry::new();
        let a = registry.spawn(obstacle(), Vec3::ZERO, Some(0));
        let b = registry.spawn(EntityKind::Decoration, Vec3::ZERO, None);
        assert!(b > a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_advance_moves_toward_player() {
        let mut registry = EntityRegistry::new();
        let id = registry.spawn(obstacle(), Vec3::new(0.0, 0.0, -100.0), Some(0));
        registry.advance(0.4);
        let z = registry.get(id).unwrap().pos.z;
        assert!((z - -99.6).abs() < 1e-5);
    }

    #[test]
    fn test_cull_removes_only_passed_entities() {
        let mut registry = EntityRegistry::new();
        let far = registry.spawn(obstacle(), Vec3::new(0.0, 0.0, -50.0), Some(0));
        let passed = registry.spawn(obstacle(), Vec3::new(0.0, 0.0, 10.5), Some(1));

        let culled = registry.cull(10.0);
        assert_eq!(culled.len(), 1);
        assert_eq!(culled[0].id, passed);
        assert!(registry.get(far).is_some());
        assert!(registry.get(passed).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut registry = EntityRegistry::new();
        let a = registry.spawn(obstacle(), Vec3::ZERO, Some(0));
        let b = registry.spawn(obstacle(), Vec3::ZERO, Some(1));
        assert_eq!(registry.remove(a).map(|e| e.id), Some(a));
        assert!(registry.remove(a).is_none());
        assert_eq!(registry.clear(), vec![b]);
        assert!(registry.is_empty());
    }
}
