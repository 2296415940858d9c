//! Health события и системы: урон, лечение, смерть, респаун игрока
//!
//! Урон между акторами идёт только через `DamageRequest` события,
//! мутирует Health одна система (`apply_damage_requests`).

use bevy::prelude::*;

use crate::components::{Dead, Health, HealthError, Incapacitated, Player, RespawnPoint};
use crate::scheduler::{Continuation, ContinuationDue, Scheduler};

/// Через сколько секунд после смерти удаляется труп врага
pub const DESPAWN_DELAY_SECS: f32 = 3.0;

/// Запрос урона (от attack ray, glue, скриптов)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    pub attacker: Option<Entity>,
}

/// Запрос лечения
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: i32,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Health.
/// Используется для UI, звуков, эффектов и AI реакции.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: здоровье изменилось (health bar)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChanged {
    pub entity: Entity,
    pub current: u32,
    pub max: u32,
}

/// Событие: entity умер (health == 0), ровно один раз до респауна
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Событие: игрок вернулся на respawn point
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct Respawned {
    pub entity: Entity,
    pub position: Vec3,
}

/// System: начальное HealthChanged для только что заспавненных (UI sync)
pub fn announce_initial_health(
    spawned: Query<(Entity, &Health), Added<Health>>,
    mut changed: EventWriter<HealthChanged>,
) {
    for (entity, health) in spawned.iter() {
        changed.write(HealthChanged {
            entity,
            current: health.current(),
            max: health.max(),
        });
    }
}

/// Система: apply damage от DamageRequest событий
///
/// 1. Читаем DamageRequest события
/// 2. Применяем damage к Health (ошибки логируем, state не меняется)
/// 3. Генерируем DamageDealt, HealthChanged и EntityDied события
pub fn apply_damage_requests(
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<&mut Health>,
    mut dealt: EventWriter<DamageDealt>,
    mut changed: EventWriter<HealthChanged>,
    mut died: EventWriter<EntityDied>,
) {
    for request in requests.read() {
        if request.attacker == Some(request.target) {
            crate::logger::log_warning(&format!("{:?} tried to damage itself, ignored", request.target));
            continue;
        }

        let Ok(mut health) = targets.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "DamageRequest: target {:?} has no Health component",
                request.target
            ));
            continue;
        };

        let change = match health.take_damage(request.amount) {
            Ok(change) => change,
            Err(HealthError::AlreadyDead) => {
                crate::logger::log(&format!("{:?} is already dead, damage ignored", request.target));
                continue;
            }
            Err(err) => {
                crate::logger::log_warning(&format!("Damage to {:?} rejected: {}", request.target, err));
                continue;
            }
        };

        crate::logger::log(&format!(
            "💥 {:?} → {:?}: {} damage (HP {}/{})",
            request.attacker, request.target, change.applied(), change.current, change.max
        ));

        dealt.write(DamageDealt {
            attacker: request.attacker,
            target: request.target,
            damage: change.applied(),
            target_died: change.died,
        });
        changed.write(HealthChanged {
            entity: request.target,
            current: change.current,
            max: change.max,
        });

        if change.died {
            crate::logger::log(&format!("💀 {:?} died", request.target));
            died.write(EntityDied {
                entity: request.target,
                killer: request.attacker,
            });
        }
    }
}

/// System: HealRequest → Health::heal
pub fn apply_heal_requests(
    mut requests: EventReader<HealRequest>,
    mut targets: Query<&mut Health>,
    mut changed: EventWriter<HealthChanged>,
) {
    for request in requests.read() {
        let Ok(mut health) = targets.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "HealRequest: target {:?} has no Health component",
                request.target
            ));
            continue;
        };

        match health.heal(request.amount) {
            Ok(change) => {
                changed.write(HealthChanged {
                    entity: request.target,
                    current: change.current,
                    max: change.max,
                });
            }
            Err(err) => {
                crate::logger::log_warning(&format!("Heal of {:?} rejected: {}", request.target, err));
            }
        }
    }
}

/// Система: маркер Dead для всех умерших
pub fn mark_dead(mut commands: Commands, mut deaths: EventReader<EntityDied>) {
    for event in deaths.read() {
        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Dead);
        }
    }
}

/// System: смерть игрока → Incapacitated + Respawn continuation
pub fn incapacitate_dead_players(
    mut commands: Commands,
    mut deaths: EventReader<EntityDied>,
    players: Query<&RespawnPoint, With<Player>>,
    mut scheduler: ResMut<Scheduler>,
    time: Res<Time>,
) {
    for event in deaths.read() {
        let Ok(respawn_point) = players.get(event.entity) else {
            continue;
        };

        if let Ok(mut entity_commands) = commands.get_entity(event.entity) {
            entity_commands.insert(Incapacitated);
        }
        scheduler.after(time.elapsed_secs(), respawn_point.delay, event.entity, Continuation::Respawn);

        crate::logger::log(&format!(
            "⏳ Player {:?} respawns in {:.1}s",
            event.entity, respawn_point.delay
        ));
    }
}

/// System: Respawn continuation → полное HP на respawn point
///
/// Порядок уведомлений: HealthChanged, затем Respawned.
pub fn respawn_players(
    mut commands: Commands,
    mut due: EventReader<ContinuationDue>,
    mut players: Query<(&mut Health, &mut Transform, &RespawnPoint)>,
    mut changed: EventWriter<HealthChanged>,
    mut respawned: EventWriter<Respawned>,
) {
    for task in due.read() {
        if task.continuation != Continuation::Respawn {
            continue;
        }
        let Ok((mut health, mut transform, respawn_point)) = players.get_mut(task.entity) else {
            crate::logger::log_warning(&format!("Respawn: {:?} has no RespawnPoint", task.entity));
            continue;
        };

        transform.translation = respawn_point.position;
        transform.rotation = respawn_point.rotation;

        let change = health.respawn();
        if let Ok(mut entity_commands) = commands.get_entity(task.entity) {
            entity_commands.remove::<(Dead, Incapacitated)>();
        }

        changed.write(HealthChanged {
            entity: task.entity,
            current: change.current,
            max: change.max,
        });
        respawned.write(Respawned {
            entity: task.entity,
            position: respawn_point.position,
        });

        crate::logger::log(&format!("✨ Player {:?} respawned at {:?}", task.entity, respawn_point.position));
    }
}
