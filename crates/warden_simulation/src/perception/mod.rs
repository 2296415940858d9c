//! Perception: поиск цели в конусе обзора с проверкой line-of-sight
//!
//! Scan ограничен по частоте (`scan_interval`). Между scan'ами
//! `PerceptionState::visible` хранит последний результат.
//!
//! Алгоритм scan:
//! 1. overlap_sphere(позиция агента, view_radius, target_mask)
//! 2. для каждого кандидата в порядке backend'а: пропустить себя,
//!    отбросить если угол к forward > view_angle / 2
//! 3. raycast к кандидату по obstacle_mask (длина = дистанция): любое
//!    попадание → цель закрыта
//! 4. первый прошедший кандидат: результат

use bevy::prelude::*;

use crate::ai::{BehaviorState, PerceptionEvent, TargetMemory};
use crate::backend::{SpatialBackend, SpatialQuery};
use crate::collision_layers::{COLLISION_MASK_OBSTACLES, COLLISION_MASK_TARGETS};


/// Параметры зрения агента
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PerceptionConfig {
    pub view_radius: f32,
    /// Полный угол конуса (градусы, 0–360)
    pub view_angle: f32,
    /// Минимальный интервал между scan'ами (секунды)
    pub scan_interval: f32,
    pub target_mask: u32,
    pub obstacle_mask: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            view_radius: 10.0,
            view_angle: 90.0,
            scan_interval: 0.3,
            target_mask: COLLISION_MASK_TARGETS,
            obstacle_mask: COLLISION_MASK_OBSTACLES,
        }
    }
}

impl PerceptionConfig {
    /// Починить конфиг дизайнера, вернуть предупреждения
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.view_radius <= 0.0 {
            warnings.push(format!("view radius {} is not positive, agent is blind", self.view_radius));
        }
        if !(0.0..=360.0).contains(&self.view_angle) {
            warnings.push(format!("view angle {} clamped to [0, 360]", self.view_angle));
            self.view_angle = self.view_angle.clamp(0.0, 360.0);
        }
        if self.scan_interval <= 0.0 {
            warnings.push(format!(
                "scan interval {} is not positive, scanning every tick",
                self.scan_interval
            ));
            self.scan_interval = 0.0;
        }

        warnings
    }
}

/// Результат последнего scan
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct PerceptionState {
    /// None: scan ещё не было (первый scan сразу после спавна)
    pub last_scan: Option<f32>,
    pub visible: Option<Entity>,
}

impl PerceptionState {
    pub fn is_scan_due(&self, now: f32, interval: f32) -> bool {
        self.last_scan.map_or(true, |last| now - last >= interval)
    }

    pub fn has_line_of_sight(&self) -> bool {
        self.visible.is_some()
    }
}

/// Попадает ли направление в конус (граница включительно)
pub fn in_view_cone(forward: Vec3, to_target: Vec3, view_angle: f32) -> bool {
    if to_target.length_squared() <= f32::EPSILON {
        // Цель в той же точке: видна
        return true;
    }
    forward.angle_between(to_target).to_degrees() <= view_angle * 0.5
}

/// Один scan: первый видимый кандидат
///
/// `position_of`: позиции кандидатов (None → кандидат пропускается).
pub fn find_visible_target(
    spatial: &dyn SpatialQuery,
    observer: Entity,
    origin: Vec3,
    forward: Vec3,
    config: &PerceptionConfig,
    position_of: impl Fn(Entity) -> Option<Vec3>,
) -> Option<Entity> {
    if config.view_radius <= 0.0 {
        return None;
    }

    for candidate in spatial.overlap_sphere(origin, config.view_radius, config.target_mask) {
        if candidate == observer {
            continue;
        }
        let Some(position) = position_of(candidate) else {
            continue;
        };

        let to_target = position - origin;
        if !in_view_cone(forward, to_target, config.view_angle) {
            continue;
        }

        let distance = to_target.length();
        if distance > f32::EPSILON
            && spatial
                .raycast(origin, to_target / distance, distance, config.obstacle_mask)
                .is_some()
        {
            // Стена между агентом и кандидатом
            continue;
        }

        return Some(candidate);
    }

    None
}

/// System: throttled perception scan + обновление TargetMemory
///
/// Смена результата → PerceptionEvent (при смене цели сначала Lost старой,
/// потом Detected новой). Видимая цель обновляет память каждый scan.
pub fn update_perception(
    mut observers: Query<(
        Entity,
        &Transform,
        &PerceptionConfig,
        &mut PerceptionState,
        &mut TargetMemory,
        &BehaviorState,
    )>,
    transforms: Query<&Transform>,
    spatial: Option<Res<SpatialBackend>>,
    time: Res<Time>,
    mut events: EventWriter<PerceptionEvent>,
    mut warned: Local<bool>,
) {
    let Some(spatial) = spatial else {
        if !*warned {
            crate::logger::log_warning("update_perception: SpatialBackend missing, perception disabled");
            *warned = true;
        }
        return;
    };

    let now = time.elapsed_secs();

    for (entity, transform, config, mut state, mut memory, behavior) in observers.iter_mut() {
        if behavior.is_dead() {
            continue;
        }
        if !state.is_scan_due(now, config.scan_interval) {
            continue;
        }

        let visible = find_visible_target(
            spatial.0.as_ref(),
            entity,
            transform.translation,
            transform.forward().as_vec3(),
            config,
            |candidate| transforms.get(candidate).ok().map(|t| t.translation),
        );

        state.last_scan = Some(now);
        let previous = state.visible;
        state.visible = visible;

        if let Some(target) = visible {
            memory.remember(target, now);
        }

        if previous == visible {
            continue;
        }

        if let Some(old) = previous {
            events.write(PerceptionEvent::TargetLost {
                observer: entity,
                target: old,
            });
            crate::logger::log(&format!("🙈 {:?} lost sight of {:?}", entity, old));
        }
        if let Some(new) = visible {
            events.write(PerceptionEvent::TargetDetected {
                observer: entity,
                target: new,
            });
            crate::logger::log(&format!("👁️ {:?} spotted {:?}", entity, new));
        }
    }
}
