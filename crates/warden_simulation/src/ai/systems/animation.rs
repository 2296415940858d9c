//! Animation sync: bool флаги аниматора из behavior state.

use bevy::prelude::*;

use crate::ai::{AnimationAction, AnimationCommand, AnimationFlags, AnimationParams, BehaviorState, PatrolRoute};
use crate::backend::NavigationBackend;

/// Агент "движется" если navigator'у осталось идти больше reach distance
pub fn is_moving(state: &BehaviorState, remaining_distance: f32, reach_distance: f32) -> bool {
    match state {
        BehaviorState::Patrol { pause: None } | BehaviorState::Chase => remaining_distance > reach_distance,
        _ => false,
    }
}

/// Значения флагов (IsMoving, IsIdle) для state
///
/// IsMoving: только в Chase и в движении, IsIdle: только в Patrol и стоя.
pub fn animation_flags(state: &BehaviorState, moving: bool) -> (bool, bool) {
    let chasing = matches!(state, BehaviorState::Chase);
    let patrolling = matches!(state, BehaviorState::Patrol { .. });
    (chasing && moving, patrolling && !moving)
}

/// System: отправить изменившиеся bool флаги аниматору
pub fn sync_animation_flags(
    mut agents: Query<(Entity, &BehaviorState, &PatrolRoute, &AnimationParams, &mut AnimationFlags)>,
    navigation: Option<Res<NavigationBackend>>,
    mut commands: EventWriter<AnimationCommand>,
) {
    let Some(navigation) = navigation else {
        return;
    };

    for (entity, state, route, params, mut flags) in agents.iter_mut() {
        if state.is_dead() {
            continue;
        }

        let moving = is_moving(state, navigation.0.remaining_distance(entity), route.reach_distance);
        let (move_flag, idle_flag) = animation_flags(state, moving);

        if flags.moving != Some(move_flag) {
            flags.moving = Some(move_flag);
            commands.write(AnimationCommand {
                entity,
                action: AnimationAction::SetBool(params.move_flag.clone(), move_flag),
            });
        }
        if flags.idle != Some(idle_flag) {
            flags.idle = Some(idle_flag);
            commands.write(AnimationCommand {
                entity,
                action: AnimationAction::SetBool(params.idle_flag.clone(), idle_flag),
            });
        }
    }
}
