//! AI decision-making module
//!
//! Patrol/Chase/Attack FSM для вражеских агентов. Perception
//! (`crate::perception`) даёт цель, FSM решает, navigator двигает.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use events::*;
pub use systems::*;

use crate::SimulationSet;

/// AI Plugin
///
/// Регистрирует AI системы в FixedUpdate для детерминизма.
/// Порядок выполнения (по SimulationSet):
/// 1. Continuations: конец паузы, деспавн трупов, гашение луча
/// 2. Init: one-shot инициализация новых агентов
/// 3. Perception: throttled scan + TargetMemory
/// 4. Reactions: урон в патруле → Chase, смерть → Dead
/// 5. Behavior: основная FSM
/// 6. Presentation: bool флаги аниматора
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PerceptionEvent>()
            .add_event::<BehaviorChanged>()
            .add_event::<AnimationCommand>()
            .add_event::<AgentMoved>()
            .register_type::<BehaviorState>()
            .register_type::<TargetMemory>()
            .register_type::<PatrolRoute>();

        app.add_systems(
            FixedUpdate,
            (
                (resume_patrol_after_pause, despawn_dead_agents, clear_attack_rays)
                    .chain()
                    .in_set(SimulationSet::Continuations),
                initialize_agents.in_set(SimulationSet::Init),
                crate::perception::update_perception.in_set(SimulationSet::Perception),
                (react_to_damage, handle_agent_death)
                    .chain()
                    .in_set(SimulationSet::Reactions),
                update_combat_state.in_set(SimulationSet::Behavior),
                sync_animation_flags.in_set(SimulationSet::Presentation),
            ),
        );
    }
}
