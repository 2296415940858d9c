//! Movement systems: позиции от navigator'а и конец патрульной паузы.

use bevy::prelude::*;

use crate::ai::{AgentMoved, BehaviorState, PatrolRoute};
use crate::backend::NavigationBackend;
use crate::components::{face_toward, MotionProfile};
use crate::scheduler::{Continuation, ContinuationDue};

/// System: AgentMoved → Transform
///
/// Navigator authoritative для позиции агента, ECS только догоняет.
/// Heading следует за горизонтальным смещением (конус зрения смотрит по ходу),
/// кроме Attack: там поворотом владеет FSM (`face_toward` к цели).
pub fn apply_agent_moves(
    mut moved: EventReader<AgentMoved>,
    mut transforms: Query<(&mut Transform, Option<&BehaviorState>, Option<&MotionProfile>)>,
    time: Res<Time>,
) {
    let delta = time.delta_secs();

    for event in moved.read() {
        let Ok((mut transform, state, motion)) = transforms.get_mut(event.entity) else {
            continue;
        };

        let displacement = event.position - transform.translation;
        transform.translation = event.position;

        if state.is_some_and(|s| matches!(s, BehaviorState::Attack { .. } | BehaviorState::Dead)) {
            continue;
        }
        if let Some(motion) = motion {
            face_toward(&mut transform, event.position + displacement, motion.rotation_speed, delta);
        }
    }
}

/// System: ResumePatrol continuation → следующий waypoint
///
/// Устаревшие записи (пауза отменена выходом из Patrol) игнорируются:
/// срабатывает только task, совпадающий с текущей паузой.
pub fn resume_patrol_after_pause(
    mut due: EventReader<ContinuationDue>,
    mut agents: Query<(&mut BehaviorState, &mut PatrolRoute)>,
    navigation: Option<ResMut<NavigationBackend>>,
) {
    let Some(mut navigation) = navigation else {
        return;
    };

    for task in due.read() {
        if task.continuation != Continuation::ResumePatrol {
            continue;
        }
        let Ok((mut state, mut route)) = agents.get_mut(task.entity) else {
            continue;
        };
        if *state != (BehaviorState::Patrol { pause: Some(task.task) }) {
            continue;
        }

        *state = BehaviorState::patrol();
        navigation.0.set_stopped(task.entity, false);
        if let Some(next) = route.advance() {
            navigation.0.set_destination(task.entity, next);
        }

        crate::logger::log(&format!("▶️ {:?} resumes patrol → waypoint {}", task.entity, route.current));
    }
}
