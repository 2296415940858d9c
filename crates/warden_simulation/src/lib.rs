//! WARDEN Simulation Core
//!
//! ECS-симуляция боевого AI врагов на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (perception, FSM, health, combat rules)
//! - Engine = tactical layer (physics queries, pathfinding, анимации)
//!
//! Engine glue реализует `backend::SpatialQuery` / `backend::Navigator`,
//! кладёт их в ресурсы и читает исходящие события.

use std::time::Duration;

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod backend;
pub mod collision_layers;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod perception;
pub mod scheduler;

// Re-export базовых компонентов для удобства
pub use ai::{AIPlugin, BehaviorChanged, BehaviorKind, BehaviorState, PatrolRoute, PerceptionEvent, TargetMemory};
pub use backend::{HeadlessNavigator, HeadlessSpatial, NavigationBackend, SpatialBackend};
pub use combat::{CombatPlugin, DamageDealt, DamageRequest, EntityDied, HealRequest, HealthChanged, RangedAttacker};
pub use components::*;
pub use config::{ConfigError, EnemyProfile, PlayerProfile};
pub use logger::init_logger;
pub use perception::{PerceptionConfig, PerceptionState};
pub use scheduler::{Continuation, ContinuationDue, Scheduler, TaskId};

/// Частота fixed tick симуляции
pub const FIXED_TICK_HZ: f64 = 60.0;

/// Порядок фаз одного тика (FixedUpdate, строго последовательно)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Созревшие continuations → ContinuationDue
    Scheduling,
    /// Обработчики continuations (пауза, деспавн, респаун, луч)
    Continuations,
    /// Navigator step → Transform → коллайдеры
    Movement,
    /// One-shot инициализация новых агентов
    Init,
    Perception,
    /// DamageRequest / HealRequest → Health
    Health,
    /// Маркеры смерти, респаун игрока
    Death,
    /// AI реакции на урон и смерть
    Reactions,
    /// Patrol / Chase / Attack
    Behavior,
    /// Анимационные флаги
    Presentation,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed мог задать create_headless_app: не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(FIXED_TICK_HZ))
            .init_resource::<Scheduler>()
            .add_event::<ContinuationDue>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Scheduling,
                    SimulationSet::Continuations,
                    SimulationSet::Movement,
                    SimulationSet::Init,
                    SimulationSet::Perception,
                    SimulationSet::Health,
                    SimulationSet::Death,
                    SimulationSet::Reactions,
                    SimulationSet::Behavior,
                    SimulationSet::Presentation,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            )
            .add_systems(
                FixedUpdate,
                (
                    scheduler::dispatch_due_continuations.in_set(SimulationSet::Scheduling),
                    (
                        backend::step_navigation,
                        ai::apply_agent_moves,
                        backend::sync_collider_positions,
                    )
                        .chain()
                        .in_set(SimulationSet::Movement),
                ),
            )
            // Подсистемы (ECS strategic layer)
            .add_plugins((CombatPlugin, AIPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт Bevy App для headless симуляции с ручным шагом времени
///
/// Без TimePlugin: время двигает `advance_simulation`, поэтому прогон
/// не зависит от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.init_resource::<Time>()
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Один fixed tick: сдвинуть время, прогнать FixedUpdate, обновить event буферы
pub fn advance_simulation(app: &mut App, delta: Duration) {
    let world = app.world_mut();
    world.resource_mut::<Time>().advance_by(delta);
    world.run_schedule(FixedUpdate);
    // event_update_system живёт в First
    world.run_schedule(First);
}

/// Длительность одного fixed tick
pub fn fixed_delta() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_TICK_HZ)
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
