//! Combat system module
//!
//! ECS ответственность:
//! - Game state: Health, RangedAttacker (damage, range, cooldown)
//! - Combat rules: damage/heal requests, смерть, респаун игрока
//! - Events: DamageDealt, HealthChanged, EntityDied, Respawned, AttackFired
//!
//! Glue ответственность:
//! - Визуал луча (AttackRayShown / AttackRayCleared)
//! - Hit VFX по AttackFired
//! - Health bar по HealthChanged

use bevy::prelude::*;

pub mod attacker;
pub mod damage;


// Re-export основных типов
pub use attacker::{
    attack_ray_endpoint, AttackFired, AttackOrigin, AttackOutcome, AttackRayCleared, AttackRayShown, RangedAttacker,
};
pub use damage::{
    DamageDealt, DamageRequest, EntityDied, HealRequest, HealthChanged, Respawned, DESPAWN_DELAY_SECS,
};

use crate::SimulationSet;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate (60Hz).
///
/// Порядок выполнения:
/// 1. respawn_players: Respawn continuation (Continuations)
/// 2. announce_initial_health → apply_damage_requests → apply_heal_requests (Health)
/// 3. mark_dead → incapacitate_dead_players (Death)
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<DamageRequest>()
            .add_event::<HealRequest>()
            .add_event::<DamageDealt>()
            .add_event::<HealthChanged>()
            .add_event::<EntityDied>()
            .add_event::<Respawned>()
            .add_event::<AttackFired>()
            .add_event::<AttackRayShown>()
            .add_event::<AttackRayCleared>()
            .register_type::<crate::components::Health>()
            .register_type::<RangedAttacker>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            (
                damage::respawn_players.in_set(SimulationSet::Continuations),
                (
                    damage::announce_initial_health,
                    damage::apply_damage_requests,
                    damage::apply_heal_requests,
                )
                    .chain()
                    .in_set(SimulationSet::Health),
                (damage::mark_dead, damage::incapacitate_dead_players)
                    .chain()
                    .in_set(SimulationSet::Death),
            ),
        );
    }
}
