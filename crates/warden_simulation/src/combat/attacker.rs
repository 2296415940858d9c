//! RangedAttacker component: параметры и cooldown hitscan атаки агента
//!
//! Архитектура:
//! - ECS хранит: damage, range, cooldown, время последнего выстрела
//! - FSM (Attack state) решает когда стрелять, hit-test через SpatialQuery
//! - Glue рисует луч по AttackRayShown / AttackRayCleared

use bevy::prelude::*;

use crate::backend::RayHit;
use crate::collision_layers::COLLISION_MASK_ATTACK_RAY;

/// RangedAttacker: hitscan атака агента
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct RangedAttacker {
    /// Урон за попадание
    pub damage: i32,

    /// Cooldown между началами атак (секунды)
    pub attack_cooldown: f32,

    /// Дистанция перехода Chase → Attack
    pub attack_range: f32,

    /// Hysteresis: Attack → Chase только за `attack_range × exit_range_factor`
    pub exit_range_factor: f32,

    /// Длительность замаха (секунды)
    pub animation_time: f32,

    /// Сколько держится визуал луча (секунды)
    pub ray_duration: f32,

    /// Длина луча без цели
    pub ray_distance: f32,

    pub ray_mask: u32,

    /// Время начала последней атаки (None = ещё не стрелял)
    pub last_attack_at: Option<f32>,
}

impl Default for RangedAttacker {
    fn default() -> Self {
        Self {
            damage: 10,
            attack_cooldown: 1.5,
            attack_range: 2.0,
            exit_range_factor: 1.2,
            animation_time: 0.5,
            ray_duration: 0.1,
            ray_distance: 15.0,
            ray_mask: COLLISION_MASK_ATTACK_RAY,
            last_attack_at: None,
        }
    }
}

impl RangedAttacker {
    /// Прошёл ли cooldown с начала последней атаки
    pub fn can_attack(&self, now: f32) -> bool {
        self.last_attack_at
            .map_or(true, |last| now - last >= self.attack_cooldown)
    }

    /// Начать атаку (запомнить время для cooldown)
    pub fn start_attack(&mut self, now: f32) {
        self.last_attack_at = Some(now);
    }

    pub fn exit_range(&self) -> f32 {
        self.attack_range * self.exit_range_factor
    }

    pub fn in_attack_range(&self, distance: f32) -> bool {
        distance <= self.attack_range
    }

    pub fn in_exit_range(&self, distance: f32) -> bool {
        distance <= self.exit_range()
    }

    /// Замах закончен (строго больше animation_time)
    pub fn swing_finished(&self, swing_started: f32, now: f32) -> bool {
        now - swing_started > self.animation_time
    }
}

/// Точка вылета луча относительно агента (дуло оружия)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct AttackOrigin {
    pub offset: Vec3,
}

impl Default for AttackOrigin {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 1.2, -0.5),
        }
    }
}

/// Конец визуального луча: цель, иначе forward × ray_distance
pub fn attack_ray_endpoint(origin: Vec3, forward: Vec3, ray_distance: f32, target: Option<Vec3>) -> Vec3 {
    target.unwrap_or(origin + forward * ray_distance)
}

/// Результат hit-test атаки
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// Луч ни во что не попал
    Miss,
    /// Попадание (стена или игрок). `damaged`: ушёл ли DamageRequest.
    Hit { hit: RayHit, damaged: bool },
}

/// Событие: агент выстрелил (для hit VFX / звука)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AttackFired {
    pub attacker: Entity,
    pub target: Option<Entity>,
    pub outcome: AttackOutcome,
}

/// Событие: показать луч выстрела
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AttackRayShown {
    pub attacker: Entity,
    pub from: Vec3,
    pub to: Vec3,
}

/// Событие: погасить луч (через `ray_duration`)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackRayCleared {
    pub attacker: Entity,
}
