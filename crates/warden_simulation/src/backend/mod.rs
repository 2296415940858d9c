//! Внешние коллабораторы симуляции (tactical layer)
//!
//! ECS не владеет физикой и pathfinding'ом. Engine glue реализует два trait'а
//! и кладёт их в ресурсы `SpatialBackend` / `NavigationBackend`:
//! - `SpatialQuery`: sphere overlap + raycast по слоям (`collision_layers`)
//! - `Navigator`: NavMesh агент: destination, stop/resume, speed
//!
//! Системы берут ресурсы через `Option<..>`: нет backend'а → no-op + warning.

use bevy::prelude::*;

pub mod headless;

pub use headless::{HeadlessNavigator, HeadlessSpatial};

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Entity, которой принадлежит коллайдер
    pub collider: Entity,
    pub distance: f32,
}

/// Физические запросы к миру (Godot PhysicsDirectSpaceState3D, rapier, headless)
pub trait SpatialQuery: Send + Sync {
    /// Все коллайдеры `mask`, пересекающие сферу. Порядок = порядок backend'а
    /// (perception берёт первого подходящего, порядок не сортируется).
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: u32) -> Vec<Entity>;

    /// Ближайшее попадание луча в коллайдер `mask` на отрезке `[0, max_distance]`
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> Option<RayHit>;

    /// Смерть отключает коллизию актора
    fn set_collider_enabled(&mut self, entity: Entity, enabled: bool);

    /// Для backends без собственной физики: ECS сообщает новую позицию.
    /// Engine backends двигают коллайдеры сами.
    fn update_collider(&mut self, _entity: Entity, _position: Vec3) {}

    /// Entity деспавнена: забыть коллайдер
    fn remove_collider(&mut self, _entity: Entity) {}
}

/// NavMesh агент (Godot NavigationAgent3D, Unity NavMeshAgent, headless)
pub trait Navigator: Send + Sync {
    fn set_destination(&mut self, agent: Entity, destination: Vec3);

    fn remaining_distance(&self, agent: Entity) -> f32;

    /// Путь ещё считается (destination reached проверять рано)
    fn path_pending(&self, agent: Entity) -> bool;

    fn set_stopped(&mut self, agent: Entity, stopped: bool);

    fn set_speed(&mut self, agent: Entity, speed: f32);

    /// Мгновенно переставить агента (spawn, respawn)
    fn warp(&mut self, agent: Entity, position: Vec3);

    /// Disabled агент не двигается и не принимает destination (Dead)
    fn set_enabled(&mut self, agent: Entity, enabled: bool);

    /// Продвинуть агентов на `delta` секунд, вернуть новые позиции.
    /// Engine backends двигают агентов сами и шлют `AgentMoved` из glue.
    fn step(&mut self, _delta: f32) -> Vec<(Entity, Vec3)> {
        Vec::new()
    }

    fn remove_agent(&mut self, _agent: Entity) {}
}

/// Resource: spatial backend
#[derive(Resource)]
pub struct SpatialBackend(pub Box<dyn SpatialQuery>);

impl SpatialBackend {
    pub fn new(query: impl SpatialQuery + 'static) -> Self {
        Self(Box::new(query))
    }
}

/// Resource: navigation backend
#[derive(Resource)]
pub struct NavigationBackend(pub Box<dyn Navigator>);

impl NavigationBackend {
    pub fn new(navigator: impl Navigator + 'static) -> Self {
        Self(Box::new(navigator))
    }
}

/// Horizontal distance (XZ): вертикаль игнорируется для waypoint reach
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    a.xz().distance(b.xz())
}

/// System: продвинуть navigation backend и отправить `AgentMoved`
///
/// Для engine backends `step` пустой: позиции приходят из glue.
pub fn step_navigation(
    backend: Option<ResMut<NavigationBackend>>,
    time: Res<Time>,
    mut moved: EventWriter<crate::ai::AgentMoved>,
) {
    let Some(mut backend) = backend else {
        return;
    };

    for (entity, position) in backend.0.step(time.delta_secs()) {
        moved.write(crate::ai::AgentMoved { entity, position });
    }
}

/// System: сообщить spatial backend'у позиции сдвинувшихся коллайдеров
pub fn sync_collider_positions(
    backend: Option<ResMut<SpatialBackend>>,
    moved: Query<(Entity, &Transform), Changed<Transform>>,
) {
    let Some(mut backend) = backend else {
        return;
    };

    for (entity, transform) in moved.iter() {
        backend.0.update_collider(entity, transform.translation);
    }
}
