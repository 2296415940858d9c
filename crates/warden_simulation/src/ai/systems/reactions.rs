//! AI reaction systems (damage, death, despawn, attack ray clearing).

use bevy::prelude::*;

use crate::ai::{
    AnimationAction, AnimationCommand, AnimationParams, BehaviorChanged, BehaviorKind, BehaviorState, TargetMemory,
};
use crate::backend::{NavigationBackend, SpatialBackend};
use crate::combat::{AttackRayCleared, DamageDealt, EntityDied, DESPAWN_DELAY_SECS};
use crate::components::MotionProfile;
use crate::scheduler::{Continuation, ContinuationDue, Scheduler};

use super::fsm::transition;

/// System: AI реакция на полученный урон
///
/// Патрульного ударили → запоминает атакующего (или уже известную цель)
/// и переходит в Chase. В остальных состояниях урон на FSM не влияет.
pub fn react_to_damage(
    mut damage_events: EventReader<DamageDealt>,
    mut agents: Query<(&mut BehaviorState, &mut TargetMemory, &MotionProfile)>,
    navigation: Option<ResMut<NavigationBackend>>,
    mut scheduler: ResMut<Scheduler>,
    time: Res<Time>,
    mut changes: EventWriter<BehaviorChanged>,
) {
    let Some(mut navigation) = navigation else {
        return;
    };
    let now = time.elapsed_secs();

    for damage_event in damage_events.read() {
        if damage_event.target_died {
            continue;
        }
        let Ok((mut state, mut memory, motion)) = agents.get_mut(damage_event.target) else {
            continue;
        };
        if state.kind() != BehaviorKind::Patrol {
            continue;
        }

        let Some(target) = damage_event.attacker.or(memory.target) else {
            continue;
        };
        memory.remember(target, now);

        crate::logger::log(&format!(
            "🔥 {:?} hit while patrolling → chasing {:?}",
            damage_event.target, target
        ));
        transition(
            damage_event.target,
            &mut state,
            BehaviorState::Chase,
            motion,
            navigation.0.as_mut(),
            &mut scheduler,
            &mut changes,
        );
    }
}

/// System: смерть агента → Dead state (терминальный)
///
/// Navigator и коллайдер отключаются, патрульная пауза отменяется,
/// аниматор получает "Die", труп удаляется через DESPAWN_DELAY_SECS.
pub fn handle_agent_death(
    mut deaths: EventReader<EntityDied>,
    mut agents: Query<(&mut BehaviorState, &AnimationParams)>,
    mut navigation: Option<ResMut<NavigationBackend>>,
    mut spatial: Option<ResMut<SpatialBackend>>,
    mut scheduler: ResMut<Scheduler>,
    time: Res<Time>,
    mut changes: EventWriter<BehaviorChanged>,
    mut animation: EventWriter<AnimationCommand>,
) {
    for event in deaths.read() {
        let Ok((mut state, params)) = agents.get_mut(event.entity) else {
            continue;
        };
        if state.is_dead() {
            continue;
        }

        if let BehaviorState::Patrol { pause: Some(task) } = *state {
            scheduler.cancel(task);
        }
        let from = state.kind();
        *state = BehaviorState::Dead;

        if let Some(navigation) = navigation.as_mut() {
            navigation.0.set_stopped(event.entity, true);
            navigation.0.set_enabled(event.entity, false);
        }
        if let Some(spatial) = spatial.as_mut() {
            spatial.0.set_collider_enabled(event.entity, false);
        }

        animation.write(AnimationCommand {
            entity: event.entity,
            action: AnimationAction::Trigger(params.death_trigger.clone()),
        });
        changes.write(BehaviorChanged {
            entity: event.entity,
            from,
            to: BehaviorKind::Dead,
        });
        scheduler.after(time.elapsed_secs(), DESPAWN_DELAY_SECS, event.entity, Continuation::Despawn);

        crate::logger::log(&format!(
            "☠️ {:?} killed by {:?} → AI disabled, despawn in {}s",
            event.entity, event.killer, DESPAWN_DELAY_SECS
        ));
    }
}

/// Система: Despawn continuation → удалить труп из симуляции и backends
pub fn despawn_dead_agents(
    mut commands: Commands,
    mut due: EventReader<ContinuationDue>,
    mut navigation: Option<ResMut<NavigationBackend>>,
    mut spatial: Option<ResMut<SpatialBackend>>,
    mut scheduler: ResMut<Scheduler>,
) {
    for task in due.read() {
        if task.continuation != Continuation::Despawn {
            continue;
        }

        scheduler.cancel_entity(task.entity);
        if let Some(navigation) = navigation.as_mut() {
            navigation.0.remove_agent(task.entity);
        }
        if let Some(spatial) = spatial.as_mut() {
            spatial.0.remove_collider(task.entity);
        }
        if let Ok(mut entity_commands) = commands.get_entity(task.entity) {
            entity_commands.despawn();
            crate::logger::log(&format!("⚰️ Despawning entity {:?} (timeout)", task.entity));
        }
    }
}

/// System: ClearAttackRay continuation → AttackRayCleared
pub fn clear_attack_rays(mut due: EventReader<ContinuationDue>, mut cleared: EventWriter<AttackRayCleared>) {
    for task in due.read() {
        if task.continuation == Continuation::ClearAttackRay {
            cleared.write(AttackRayCleared { attacker: task.entity });
        }
    }
}
