//! FSM AI systems (инициализация агентов, Patrol/Chase/Attack transitions).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::{
    AnimationAction, AnimationCommand, AnimationParams, BehaviorChanged, BehaviorState, PatrolRoute, TargetMemory,
};
use crate::backend::{NavigationBackend, Navigator, SpatialBackend};
use crate::combat::{
    attack_ray_endpoint, AttackFired, AttackOrigin, AttackOutcome, AttackRayShown, DamageRequest, RangedAttacker,
};
use crate::components::{face_toward, Dead, Health, MotionProfile, Player};
use crate::perception::{PerceptionConfig, PerceptionState};
use crate::scheduler::{Continuation, Scheduler};
use crate::DeterministicRng;

/// Исходящие события FSM (одним SystemParam, чтобы не раздувать сигнатуры)
#[derive(SystemParam)]
pub struct CombatOutput<'w> {
    changes: EventWriter<'w, BehaviorChanged>,
    animation: EventWriter<'w, AnimationCommand>,
    fired: EventWriter<'w, AttackFired>,
    rays: EventWriter<'w, AttackRayShown>,
    damage: EventWriter<'w, DamageRequest>,
}

/// Смена state с exit/enter хуками navigator'а
///
/// Exit: Patrol отменяет паузу и снимает stop, Chase возвращает patrol speed,
/// Attack снимает stop. Enter: Patrol/Chase выставляют свою скорость,
/// Attack останавливает агента.
pub(crate) fn transition(
    entity: Entity,
    state: &mut BehaviorState,
    next: BehaviorState,
    motion: &MotionProfile,
    navigator: &mut dyn Navigator,
    scheduler: &mut Scheduler,
    changes: &mut EventWriter<BehaviorChanged>,
) {
    let from = state.kind();

    match *state {
        BehaviorState::Patrol { pause } => {
            if let Some(task) = pause {
                scheduler.cancel(task);
            }
            navigator.set_stopped(entity, false);
        }
        BehaviorState::Chase => navigator.set_speed(entity, motion.patrol_speed),
        BehaviorState::Attack { .. } => navigator.set_stopped(entity, false),
        BehaviorState::Idle | BehaviorState::Dead => {}
    }

    match next {
        BehaviorState::Patrol { .. } => navigator.set_speed(entity, motion.patrol_speed),
        BehaviorState::Chase => navigator.set_speed(entity, motion.chase_speed),
        BehaviorState::Attack { .. } => navigator.set_stopped(entity, true),
        BehaviorState::Idle | BehaviorState::Dead => {}
    }

    *state = next;

    let to = next.kind();
    if from != to {
        changes.write(BehaviorChanged { entity, from, to });
        crate::logger::log(&format!("🔄 {:?}: {} → {}", entity, from.as_str(), to.as_str()));
    }
}

/// Chase → Patrol: продолжить с текущего waypoint (дошли: следующий)
#[allow(clippy::too_many_arguments)]
fn return_to_patrol(
    entity: Entity,
    position: Vec3,
    state: &mut BehaviorState,
    route: &mut PatrolRoute,
    motion: &MotionProfile,
    navigator: &mut dyn Navigator,
    scheduler: &mut Scheduler,
    changes: &mut EventWriter<BehaviorChanged>,
) {
    if !route.has_waypoints() {
        transition(entity, state, BehaviorState::Idle, motion, navigator, scheduler, changes);
        return;
    }

    transition(entity, state, BehaviorState::patrol(), motion, navigator, scheduler, changes);

    let destination = if route.is_reached(position) {
        route.advance()
    } else {
        route.current_waypoint()
    };
    if let Some(destination) = destination {
        navigator.set_destination(entity, destination);
    }
}

/// System: one-shot инициализация заспавненных агентов
///
/// Чинит конфиг (warnings в лог), ставит агента на NavMesh и выбирает
/// стартовый state: Patrol к waypoints[0] или инертный Idle.
pub fn initialize_agents(
    mut agents: Query<
        (
            Entity,
            &Transform,
            &mut BehaviorState,
            &mut PatrolRoute,
            &mut PerceptionConfig,
            &MotionProfile,
            Option<&AttackOrigin>,
        ),
        Added<BehaviorState>,
    >,
    players: Query<(), (With<Player>, With<Health>)>,
    navigation: Option<ResMut<NavigationBackend>>,
    mut scheduler: ResMut<Scheduler>,
    mut changes: EventWriter<BehaviorChanged>,
) {
    if agents.is_empty() {
        return;
    }

    let Some(mut navigation) = navigation else {
        crate::logger::log_warning("initialize_agents: NavigationBackend missing, agents stay idle");
        return;
    };
    let navigator = navigation.0.as_mut();

    if players.is_empty() {
        crate::logger::log_warning("initialize_agents: no Player with Health in the world");
    }

    for (entity, transform, mut state, mut route, mut perception, motion, origin) in agents.iter_mut() {
        for warning in route.sanitize().into_iter().chain(perception.sanitize()) {
            crate::logger::log_warning(&format!("{:?}: {}", entity, warning));
        }
        if origin.is_none() {
            crate::logger::log_warning(&format!("{:?}: attack origin missing, attacks will not fire", entity));
        }

        navigator.warp(entity, transform.translation);
        navigator.set_speed(entity, motion.patrol_speed);

        let Some(first) = route.current_waypoint() else {
            crate::logger::log(&format!("🧍 {:?} has no patrol route → Idle", entity));
            continue;
        };

        transition(
            entity,
            &mut state,
            BehaviorState::patrol(),
            motion,
            navigator,
            &mut scheduler,
            &mut changes,
        );
        navigator.set_destination(entity, first);
    }
}

/// System: основная FSM (после perception scan и damage reactions)
///
/// Patrol: видим цель → Chase; дошли до waypoint → пауза или следующий.
/// Chase: память истекла → Patrol; в attack range и LOS → Attack.
/// Attack: поворот к цели, выстрел по cooldown, hysteresis на выход.
pub fn update_combat_state(
    mut agents: Query<
        (
            Entity,
            &mut Transform,
            &mut BehaviorState,
            &mut PatrolRoute,
            &mut TargetMemory,
            &PerceptionState,
            &MotionProfile,
            &mut RangedAttacker,
            Option<&AttackOrigin>,
            &AnimationParams,
        ),
        Without<Dead>,
    >,
    targets: Query<&Transform, Without<BehaviorState>>,
    players: Query<(), (With<Player>, With<Health>)>,
    navigation: Option<ResMut<NavigationBackend>>,
    spatial: Option<Res<SpatialBackend>>,
    mut scheduler: ResMut<Scheduler>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time>,
    mut out: CombatOutput,
    mut warned: Local<bool>,
) {
    let Some(mut navigation) = navigation else {
        if !*warned {
            crate::logger::log_warning("update_combat_state: NavigationBackend missing, FSM disabled");
            *warned = true;
        }
        return;
    };
    let navigator = navigation.0.as_mut();
    let scheduler = &mut *scheduler;

    let now = time.elapsed_secs();
    let delta = time.delta_secs();

    for (entity, mut transform, mut state, mut route, mut memory, perception, motion, mut attacker, origin, params) in
        agents.iter_mut()
    {
        let current = *state;
        match current {
            BehaviorState::Idle | BehaviorState::Dead => {}

            BehaviorState::Patrol { pause } => {
                if perception.has_line_of_sight() {
                    transition(entity, &mut state, BehaviorState::Chase, motion, navigator, scheduler, &mut out.changes);
                    continue;
                }
                if pause.is_some() || navigator.path_pending(entity) || !route.is_reached(transform.translation) {
                    continue;
                }

                match route.roll_pause(&mut rng.rng) {
                    Some(duration) => {
                        navigator.set_stopped(entity, true);
                        let task = scheduler.after(now, duration, entity, Continuation::ResumePatrol);
                        *state = BehaviorState::Patrol { pause: Some(task) };
                        crate::logger::log(&format!(
                            "⏸️ {:?} pauses at waypoint {} for {:.2}s",
                            entity, route.current, duration
                        ));
                    }
                    None => {
                        if let Some(next) = route.advance() {
                            navigator.set_destination(entity, next);
                        }
                    }
                }
            }

            BehaviorState::Chase => {
                let Some(target) = memory.recall(now) else {
                    memory.forget();
                    return_to_patrol(
                        entity,
                        transform.translation,
                        &mut state,
                        &mut route,
                        motion,
                        navigator,
                        scheduler,
                        &mut out.changes,
                    );
                    continue;
                };
                // Цель без Transform: ждём пока память истечёт
                let Ok(target_transform) = targets.get(target) else {
                    continue;
                };
                let target_position = target_transform.translation;

                navigator.set_destination(entity, target_position);

                let distance = transform.translation.distance(target_position);
                if attacker.in_attack_range(distance) && perception.has_line_of_sight() {
                    transition(entity, &mut state, BehaviorState::attack(), motion, navigator, scheduler, &mut out.changes);
                }
            }

            BehaviorState::Attack { swing_started } => {
                let target_position = memory
                    .target
                    .and_then(|target| targets.get(target).ok())
                    .map(|t| t.translation);

                // 1. Завершение замаха
                if let Some(started) = swing_started {
                    if attacker.swing_finished(started, now) {
                        *state = BehaviorState::attack();

                        // Цель исчезла к концу замаха: назад в патруль (вне замаха: Chase, шаг 2)
                        let Some(position) = target_position else {
                            return_to_patrol(
                                entity,
                                transform.translation,
                                &mut state,
                                &mut route,
                                motion,
                                navigator,
                                scheduler,
                                &mut out.changes,
                            );
                            continue;
                        };
                        let distance = transform.translation.distance(position);
                        if !(perception.has_line_of_sight() && attacker.in_exit_range(distance)) {
                            transition(entity, &mut state, BehaviorState::Chase, motion, navigator, scheduler, &mut out.changes);
                            continue;
                        }
                    }
                }

                // 2. Цель пропала или закрыта
                let Some(position) = target_position.filter(|_| perception.has_line_of_sight()) else {
                    transition(entity, &mut state, BehaviorState::Chase, motion, navigator, scheduler, &mut out.changes);
                    continue;
                };

                face_toward(&mut transform, position, motion.rotation_speed, delta);

                // 3. Hysteresis: уходим в Chase только за attack_range × 1.2
                if !attacker.in_exit_range(transform.translation.distance(position)) {
                    transition(entity, &mut state, BehaviorState::Chase, motion, navigator, scheduler, &mut out.changes);
                    continue;
                }

                // 4. Новый замах
                let swinging = matches!(*state, BehaviorState::Attack { swing_started: Some(_) });
                if swinging || !attacker.can_attack(now) {
                    continue;
                }

                attacker.start_attack(now);
                *state = BehaviorState::Attack {
                    swing_started: Some(now),
                };
                out.animation.write(AnimationCommand {
                    entity,
                    action: AnimationAction::Trigger(params.attack_trigger.clone()),
                });

                fire_attack_ray(
                    entity,
                    &transform,
                    origin,
                    memory.target,
                    position,
                    &attacker,
                    spatial.as_deref(),
                    &players,
                    scheduler,
                    now,
                    &mut out,
                );
            }
        }
    }
}

/// Hit-test выстрела + визуал луча
///
/// Луч от AttackOrigin к цели (длина = дистанция до цели). Урон только
/// если первым попали в коллайдер Player с Health, стена гасит выстрел.
#[allow(clippy::too_many_arguments)]
fn fire_attack_ray(
    entity: Entity,
    transform: &Transform,
    origin: Option<&AttackOrigin>,
    target: Option<Entity>,
    target_position: Vec3,
    attacker: &RangedAttacker,
    spatial: Option<&SpatialBackend>,
    players: &Query<(), (With<Player>, With<Health>)>,
    scheduler: &mut Scheduler,
    now: f32,
    out: &mut CombatOutput,
) {
    let Some(origin) = origin else {
        crate::logger::log_warning(&format!("{:?}: attack origin missing, shot skipped", entity));
        return;
    };
    let Some(spatial) = spatial else {
        crate::logger::log_warning(&format!("{:?}: SpatialBackend missing, shot skipped", entity));
        return;
    };

    let from = transform.transform_point(origin.offset);
    let to_target = target_position - from;
    let distance = to_target.length();

    let hit = if distance > f32::EPSILON {
        spatial.0.raycast(from, to_target / distance, distance, attacker.ray_mask)
    } else {
        None
    };

    let outcome = match hit {
        Some(hit) => {
            let damaged = players.contains(hit.collider);
            if damaged {
                out.damage.write(DamageRequest {
                    target: hit.collider,
                    amount: attacker.damage,
                    attacker: Some(entity),
                });
                crate::logger::log(&format!("🎯 {:?} hit player {:?} ({} damage)", entity, hit.collider, attacker.damage));
            } else {
                crate::logger::log(&format!("🧱 {:?} hit {:?}", entity, hit.collider));
            }
            AttackOutcome::Hit { hit, damaged }
        }
        None => {
            crate::logger::log(&format!("💨 {:?} attack missed", entity));
            AttackOutcome::Miss
        }
    };

    out.fired.write(AttackFired {
        attacker: entity,
        target,
        outcome,
    });

    out.rays.write(AttackRayShown {
        attacker: entity,
        from,
        to: attack_ray_endpoint(from, transform.forward().as_vec3(), attacker.ray_distance, Some(target_position)),
    });
    scheduler.after(now, attacker.ray_duration, entity, Continuation::ClearAttackRay);
}
