//! Общий harness для integration тестов
//!
//! Headless App + общие (Arc<Mutex>) backends, чтобы тест видел состояние
//! navigator'а и коллайдеров, и recorder'ы событий со временем тика.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use warden_simulation::ai::{AnimationCommand, BehaviorChanged, BehaviorKind, BehaviorState, PerceptionEvent};
use warden_simulation::backend::headless::NavAgent;
use warden_simulation::backend::{Navigator, RayHit, SpatialQuery};
use warden_simulation::collision_layers::{COLLISION_LAYER_ACTORS, COLLISION_LAYER_ENVIRONMENT, COLLISION_LAYER_PLAYER};
use warden_simulation::combat::{
    AttackFired, AttackRayCleared, AttackRayShown, DamageDealt, EntityDied, HealthChanged, Respawned,
};
use warden_simulation::config::{EnemyProfile, PlayerProfile};
use warden_simulation::{
    advance_simulation, create_headless_app, fixed_delta, HeadlessNavigator, HeadlessSpatial, NavigationBackend,
    SimulationSet, SpatialBackend,
};

/// Navigator, который тест может читать во время прогона
#[derive(Clone, Default)]
pub struct SharedNavigator {
    inner: Arc<Mutex<HeadlessNavigator>>,
    destinations: Arc<Mutex<Vec<(Entity, Vec3)>>>,
}

impl SharedNavigator {
    pub fn agent(&self, entity: Entity) -> Option<NavAgent> {
        self.inner.lock().unwrap().agent(entity).cloned()
    }

    /// Все set_destination агента по порядку (повторы подряд схлопнуты)
    pub fn destinations(&self, entity: Entity) -> Vec<Vec3> {
        let mut result: Vec<Vec3> = Vec::new();
        for (agent, destination) in self.destinations.lock().unwrap().iter() {
            if *agent == entity && result.last() != Some(destination) {
                result.push(*destination);
            }
        }
        result
    }
}

impl Navigator for SharedNavigator {
    fn set_destination(&mut self, agent: Entity, destination: Vec3) {
        self.destinations.lock().unwrap().push((agent, destination));
        self.inner.lock().unwrap().set_destination(agent, destination);
    }

    fn remaining_distance(&self, agent: Entity) -> f32 {
        self.inner.lock().unwrap().remaining_distance(agent)
    }

    fn path_pending(&self, agent: Entity) -> bool {
        self.inner.lock().unwrap().path_pending(agent)
    }

    fn set_stopped(&mut self, agent: Entity, stopped: bool) {
        self.inner.lock().unwrap().set_stopped(agent, stopped);
    }

    fn set_speed(&mut self, agent: Entity, speed: f32) {
        self.inner.lock().unwrap().set_speed(agent, speed);
    }

    fn warp(&mut self, agent: Entity, position: Vec3) {
        self.inner.lock().unwrap().warp(agent, position);
    }

    fn set_enabled(&mut self, agent: Entity, enabled: bool) {
        self.inner.lock().unwrap().set_enabled(agent, enabled);
    }

    fn step(&mut self, delta: f32) -> Vec<(Entity, Vec3)> {
        self.inner.lock().unwrap().step(delta)
    }

    fn remove_agent(&mut self, agent: Entity) {
        self.inner.lock().unwrap().remove_agent(agent);
    }
}

/// Spatial backend, который тест может менять (убрать стену) и читать
#[derive(Clone, Default)]
pub struct SharedSpatial {
    inner: Arc<Mutex<HeadlessSpatial>>,
}

impl SharedSpatial {
    pub fn add_collider(&self, entity: Entity, center: Vec3, radius: f32, layers: u32) {
        self.inner.lock().unwrap().add_collider(entity, center, radius, layers);
    }

    pub fn remove(&self, entity: Entity) {
        self.inner.lock().unwrap().remove_collider(entity);
    }

    /// None: коллайдера нет, Some(enabled): есть
    pub fn collider_enabled(&self, entity: Entity) -> Option<bool> {
        self.inner.lock().unwrap().collider(entity).map(|c| c.enabled)
    }
}

impl SpatialQuery for SharedSpatial {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: u32) -> Vec<Entity> {
        self.inner.lock().unwrap().overlap_sphere(center, radius, mask)
    }

    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> Option<RayHit> {
        self.inner.lock().unwrap().raycast(origin, direction, max_distance, mask)
    }

    fn set_collider_enabled(&mut self, entity: Entity, enabled: bool) {
        self.inner.lock().unwrap().set_collider_enabled(entity, enabled);
    }

    fn update_collider(&mut self, entity: Entity, position: Vec3) {
        self.inner.lock().unwrap().update_collider(entity, position);
    }

    fn remove_collider(&mut self, entity: Entity) {
        self.inner.lock().unwrap().remove_collider(entity);
    }
}

/// Записанные события: (elapsed секунд на тике записи, событие)
#[derive(Resource)]
pub struct Recorded<E: Event>(pub Vec<(f32, E)>);

fn collect<E: Event + Clone>(mut reader: EventReader<E>, time: Res<Time>, mut log: ResMut<Recorded<E>>) {
    let now = time.elapsed_secs();
    log.0.extend(reader.read().cloned().map(|event| (now, event)));
}

/// Подписать recorder на событие (после всех фаз тика)
pub fn record<E: Event + Clone>(app: &mut App) {
    app.insert_resource(Recorded::<E>(Vec::new()));
    app.add_systems(FixedUpdate, collect::<E>.after(SimulationSet::Presentation));
}

/// Патрульный профиль: скорости, маршрут, без случайных пауз
pub fn patrol_profile(waypoints: &[[f32; 3]]) -> EnemyProfile {
    let mut profile = EnemyProfile::default();
    profile.patrol.waypoints = waypoints.to_vec();
    profile.patrol.stop_chance = 0.0;
    profile
}

/// Профиль "турели": стоит на месте, маршрут из одной точки
pub fn stationary_profile() -> EnemyProfile {
    let mut profile = patrol_profile(&[[0.0, 0.0, 0.0]]);
    profile.motion.patrol_speed = 0.0;
    profile.motion.chase_speed = 0.0;
    profile
}

/// Один враг, один игрок, стены
pub struct Arena {
    pub app: App,
    pub navigator: SharedNavigator,
    pub spatial: SharedSpatial,
    pub enemy: Entity,
    pub player: Entity,
}

impl Arena {
    pub fn new(seed: u64, enemy: &EnemyProfile, enemy_at: Vec3, player_at: Vec3) -> Self {
        Self::with_player(seed, enemy, enemy_at, &PlayerProfile::default(), player_at)
    }

    pub fn with_player(seed: u64, enemy: &EnemyProfile, enemy_at: Vec3, player: &PlayerProfile, player_at: Vec3) -> Self {
        let mut app = create_headless_app(seed);

        record::<BehaviorChanged>(&mut app);
        record::<PerceptionEvent>(&mut app);
        record::<AnimationCommand>(&mut app);
        record::<AttackFired>(&mut app);
        record::<AttackRayShown>(&mut app);
        record::<AttackRayCleared>(&mut app);
        record::<DamageDealt>(&mut app);
        record::<HealthChanged>(&mut app);
        record::<EntityDied>(&mut app);
        record::<Respawned>(&mut app);

        let world = app.world_mut();
        let player_entity = world.spawn(player.player_bundle(player_at)).id();
        let enemy_entity = enemy.spawn_enemy(world, enemy_at);

        let navigator = SharedNavigator::default();
        let spatial = SharedSpatial::default();
        spatial.add_collider(player_entity, player_at, 0.5, COLLISION_LAYER_PLAYER);
        spatial.add_collider(enemy_entity, enemy_at, 0.5, COLLISION_LAYER_ACTORS);

        world.insert_resource(SpatialBackend::new(spatial.clone()));
        world.insert_resource(NavigationBackend::new(navigator.clone()));

        Self {
            app,
            navigator,
            spatial,
            enemy: enemy_entity,
            player: player_entity,
        }
    }

    /// Стена (сфера) на слое environment
    pub fn add_wall(&mut self, center: Vec3, radius: f32) -> Entity {
        let wall = self.app.world_mut().spawn(Transform::from_translation(center)).id();
        self.spatial.add_collider(wall, center, radius, COLLISION_LAYER_ENVIRONMENT);
        wall
    }

    /// Игрок исчезает из мира и из spatial backend
    pub fn remove_player(&mut self) {
        self.app.world_mut().despawn(self.player);
        self.spatial.remove(self.player);
    }

    pub fn tick(&mut self) {
        advance_simulation(&mut self.app, fixed_delta());
    }

    pub fn run_ticks(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick();
        }
    }

    /// Тикать пока elapsed < `until`
    pub fn run_until(&mut self, until: f32) {
        while self.now() < until {
            self.tick();
        }
    }

    pub fn run_for(&mut self, seconds: f32) {
        let until = self.now() + seconds;
        self.run_until(until);
    }

    pub fn now(&self) -> f32 {
        self.app.world().resource::<Time>().elapsed_secs()
    }

    pub fn state(&self) -> BehaviorState {
        *self.app.world().get::<BehaviorState>(self.enemy).unwrap()
    }

    pub fn kind(&self) -> BehaviorKind {
        self.state().kind()
    }

    pub fn get<C: Component + Clone>(&self, entity: Entity) -> Option<C> {
        self.app.world().get::<C>(entity).cloned()
    }

    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.app.world().get::<C>(entity).is_some()
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec3) {
        self.app.world_mut().get_mut::<Transform>(entity).unwrap().translation = position;
    }

    pub fn send<E: Event>(&mut self, event: E) {
        self.app.world_mut().send_event(event);
    }

    pub fn recorded<E: Event + Clone>(&self) -> Vec<(f32, E)> {
        self.app.world().resource::<Recorded<E>>().0.clone()
    }

    /// Переходы FSM врага (from, to) по порядку
    pub fn transitions(&self) -> Vec<(BehaviorKind, BehaviorKind)> {
        self.recorded::<BehaviorChanged>()
            .into_iter()
            .filter(|(_, change)| change.entity == self.enemy)
            .map(|(_, change)| (change.from, change.to))
            .collect()
    }
}
