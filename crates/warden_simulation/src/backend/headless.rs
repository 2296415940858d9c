//! Headless backends: аналитическая геометрия вместо физического движка
//!
//! Используются headless binary и тестами. Коллайдеры: сферы со слоями,
//! навигация: движение по прямой к destination.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::{Navigator, RayHit, SpatialQuery};
use crate::collision_layers::layers_match;

/// Сферический коллайдер
#[derive(Debug, Clone)]
pub struct SphereCollider {
    pub entity: Entity,
    pub center: Vec3,
    pub radius: f32,
    pub layers: u32,
    pub enabled: bool,
}

/// SpatialQuery на сферах. Порядок overlap = порядок добавления.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSpatial {
    colliders: Vec<SphereCollider>,
}

impl HeadlessSpatial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collider(mut self, entity: Entity, center: Vec3, radius: f32, layers: u32) -> Self {
        self.add_collider(entity, center, radius, layers);
        self
    }

    pub fn add_collider(&mut self, entity: Entity, center: Vec3, radius: f32, layers: u32) {
        self.colliders.retain(|c| c.entity != entity);
        self.colliders.push(SphereCollider {
            entity,
            center,
            radius,
            layers,
            enabled: true,
        });
    }

    pub fn collider(&self, entity: Entity) -> Option<&SphereCollider> {
        self.colliders.iter().find(|c| c.entity == entity)
    }

    fn active(&self, mask: u32) -> impl Iterator<Item = &SphereCollider> {
        self.colliders
            .iter()
            .filter(move |c| c.enabled && layers_match(c.layers, mask))
    }
}

/// Расстояние вдоль луча до входа в сферу (0 если origin внутри)
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return Some(0.0);
    }

    let b = oc.dot(direction);
    if b > 0.0 {
        // Сфера позади origin
        return None;
    }

    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    Some(-b - discriminant.sqrt())
}

impl SpatialQuery for HeadlessSpatial {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: u32) -> Vec<Entity> {
        self.active(mask)
            .filter(|c| c.center.distance(center) <= radius + c.radius)
            .map(|c| c.entity)
            .collect()
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut nearest: Option<(&SphereCollider, f32)> = None;
        for collider in self.active(mask) {
            let Some(distance) = ray_sphere(origin, direction, collider.center, collider.radius) else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((collider, distance));
            }
        }

        nearest.map(|(collider, distance)| {
            let point = origin + direction * distance;
            RayHit {
                point,
                normal: (point - collider.center).normalize_or_zero(),
                collider: collider.entity,
                distance,
            }
        })
    }

    fn set_collider_enabled(&mut self, entity: Entity, enabled: bool) {
        for collider in self.colliders.iter_mut().filter(|c| c.entity == entity) {
            collider.enabled = enabled;
        }
    }

    fn update_collider(&mut self, entity: Entity, position: Vec3) {
        for collider in self.colliders.iter_mut().filter(|c| c.entity == entity) {
            collider.center = position;
        }
    }

    fn remove_collider(&mut self, entity: Entity) {
        self.colliders.retain(|c| c.entity != entity);
    }
}

/// Состояние одного headless агента
#[derive(Debug, Clone)]
pub struct NavAgent {
    pub position: Vec3,
    pub destination: Option<Vec3>,
    pub speed: f32,
    pub stopped: bool,
    pub enabled: bool,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            destination: None,
            speed: 3.0,
            stopped: false,
            enabled: true,
        }
    }
}

/// Navigator без NavMesh: прямая линия к destination с заданной скоростью
#[derive(Debug, Clone, Default)]
pub struct HeadlessNavigator {
    agents: BTreeMap<Entity, NavAgent>,
}

impl HeadlessNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(&self, entity: Entity) -> Option<&NavAgent> {
        self.agents.get(&entity)
    }
}

impl Navigator for HeadlessNavigator {
    fn set_destination(&mut self, agent: Entity, destination: Vec3) {
        let nav = self.agents.entry(agent).or_default();
        if nav.enabled {
            nav.destination = Some(destination);
        }
    }

    fn remaining_distance(&self, agent: Entity) -> f32 {
        self.agents
            .get(&agent)
            .and_then(|nav| nav.destination.map(|d| nav.position.distance(d)))
            .unwrap_or(0.0)
    }

    fn path_pending(&self, _agent: Entity) -> bool {
        false
    }

    fn set_stopped(&mut self, agent: Entity, stopped: bool) {
        self.agents.entry(agent).or_default().stopped = stopped;
    }

    fn set_speed(&mut self, agent: Entity, speed: f32) {
        self.agents.entry(agent).or_default().speed = speed;
    }

    fn warp(&mut self, agent: Entity, position: Vec3) {
        let nav = self.agents.entry(agent).or_default();
        nav.position = position;
        nav.destination = None;
    }

    fn set_enabled(&mut self, agent: Entity, enabled: bool) {
        let nav = self.agents.entry(agent).or_default();
        nav.enabled = enabled;
        if !enabled {
            nav.destination = None;
        }
    }

    fn step(&mut self, delta: f32) -> Vec<(Entity, Vec3)> {
        let mut moved = Vec::new();

        for (entity, nav) in self.agents.iter_mut() {
            if !nav.enabled || nav.stopped {
                continue;
            }
            let Some(destination) = nav.destination else {
                continue;
            };

            let to_destination = destination - nav.position;
            let distance = to_destination.length();
            if distance <= f32::EPSILON {
                continue;
            }

            let step = (nav.speed * delta).min(distance);
            nav.position += to_destination / distance * step;
            moved.push((*entity, nav.position));
        }

        moved
    }

    fn remove_agent(&mut self, agent: Entity) {
        self.agents.remove(&agent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision_layers::{COLLISION_LAYER_ENVIRONMENT, COLLISION_LAYER_PLAYER};

    #[test]
    fn test_overlap_respects_radius_and_mask() {
        let player = Entity::from_raw(1);
        let wall = Entity::from_raw(2);
        let spatial = HeadlessSpatial::new()
            .with_collider(player, Vec3::new(5.0, 0.0, 0.0), 0.5, COLLISION_LAYER_PLAYER)
            .with_collider(wall, Vec3::new(2.0, 0.0, 0.0), 0.5, COLLISION_LAYER_ENVIRONMENT);

        assert_eq!(spatial.overlap_sphere(Vec3::ZERO, 10.0, COLLISION_LAYER_PLAYER), vec![player]);
        assert!(spatial.overlap_sphere(Vec3::ZERO, 3.0, COLLISION_LAYER_PLAYER).is_empty());
    }

    #[test]
    fn test_raycast_returns_nearest_hit() {
        let near = Entity::from_raw(1);
        let far = Entity::from_raw(2);
        let spatial = HeadlessSpatial::new()
            .with_collider(far, Vec3::new(0.0, 0.0, -8.0), 1.0, COLLISION_LAYER_ENVIRONMENT)
            .with_collider(near, Vec3::new(0.0, 0.0, -4.0), 1.0, COLLISION_LAYER_ENVIRONMENT);

        let hit = spatial
            .raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0, COLLISION_LAYER_ENVIRONMENT)
            .expect("ray must hit");
        assert_eq!(hit.collider, near);
        assert!((hit.distance - 3.0).abs() < 1e-4);
        assert!((hit.normal - Vec3::Z).length() < 1e-4);

        // Луч короче дистанции до стены
        assert!(spatial.raycast(Vec3::ZERO, Vec3::NEG_Z, 2.5, COLLISION_LAYER_ENVIRONMENT).is_none());
        // Стена позади
        assert!(spatial.raycast(Vec3::ZERO, Vec3::Z, 20.0, COLLISION_LAYER_ENVIRONMENT).is_none());
    }

    #[test]
    fn test_disabled_collider_is_ignored() {
        let wall = Entity::from_raw(3);
        let mut spatial = HeadlessSpatial::new()
            .with_collider(wall, Vec3::new(0.0, 0.0, -4.0), 1.0, COLLISION_LAYER_ENVIRONMENT);

        spatial.set_collider_enabled(wall, false);
        assert!(spatial.raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0, COLLISION_LAYER_ENVIRONMENT).is_none());
    }

    #[test]
    fn test_navigator_moves_toward_destination() {
        let agent = Entity::from_raw(7);
        let mut nav = HeadlessNavigator::new();
        nav.warp(agent, Vec3::ZERO);
        nav.set_speed(agent, 2.0);
        nav.set_destination(agent, Vec3::new(10.0, 0.0, 0.0));

        let moved = nav.step(1.0);
        assert_eq!(moved.len(), 1);
        assert!((moved[0].1.x - 2.0).abs() < 1e-5);
        assert!((nav.remaining_distance(agent) - 8.0).abs() < 1e-5);

        nav.set_stopped(agent, true);
        assert!(nav.step(1.0).is_empty());
    }

    #[test]
    fn test_navigator_does_not_overshoot() {
        let agent = Entity::from_raw(8);
        let mut nav = HeadlessNavigator::new();
        nav.warp(agent, Vec3::ZERO);
        nav.set_speed(agent, 100.0);
        nav.set_destination(agent, Vec3::new(1.0, 0.0, 0.0));

        nav.step(1.0);
        assert_eq!(nav.agent(agent).map(|a| a.position), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(nav.remaining_distance(agent), 0.0);
    }
}
