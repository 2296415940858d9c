//! Headless симуляция WARDEN
//!
//! Запускает Bevy App без рендера: один патрульный враг, игрок идёт
//! через его маршрут. Backends: HeadlessSpatial / HeadlessNavigator.

use std::path::PathBuf;

use bevy::ecs::event::Events;
use bevy::prelude::*;
use clap::Parser;
use warden_simulation::collision_layers::{COLLISION_LAYER_ACTORS, COLLISION_LAYER_ENVIRONMENT, COLLISION_LAYER_PLAYER};
use warden_simulation::config::ScenarioProfile;
use warden_simulation::logger::{self, LogLevel};
use warden_simulation::{
    advance_simulation, create_headless_app, fixed_delta, BehaviorChanged, BehaviorState, Health, HeadlessNavigator,
    HeadlessSpatial, NavigationBackend, SpatialBackend,
};

#[derive(Parser, Debug)]
#[command(name = "warden_simulation", about = "Headless enemy combat-AI simulation")]
struct Args {
    /// Seed детерминистичного RNG
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Количество fixed тиков (60 в секунду)
    #[arg(long, default_value_t = 1200)]
    ticks: u32,

    /// JSON сценарий (враг, игрок, стены)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Скорость игрока (м/с) вдоль -Z
    #[arg(long, default_value_t = 1.0)]
    player_speed: f32,

    /// Только warnings и ошибки
    #[arg(long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let scenario = match &args.profile {
        Some(path) => match ScenarioProfile::load(path) {
            Ok(scenario) => scenario,
            Err(err) => {
                eprintln!("Cannot load {}: {}", path.display(), err);
                std::process::exit(1);
            }
        },
        None => ScenarioProfile::default(),
    };

    println!("Starting WARDEN headless simulation (seed: {})", args.seed);

    let mut app = create_headless_app(args.seed);
    if args.quiet {
        logger::set_log_level(LogLevel::Warning);
    }
    for warning in scenario.enemy.validate() {
        logger::log_warning(&format!("enemy profile: {}", warning));
    }

    let world = app.world_mut();
    let player_position = Vec3::from_array(scenario.player_position);
    let enemy_position = Vec3::from_array(scenario.enemy_position);

    let player = world.spawn(scenario.player.player_bundle(player_position)).id();
    let enemy = scenario.enemy.spawn_enemy(world, enemy_position);

    let mut spatial = HeadlessSpatial::new()
        .with_collider(player, player_position, 0.5, COLLISION_LAYER_PLAYER)
        .with_collider(enemy, enemy_position, 0.5, COLLISION_LAYER_ACTORS);
    for (index, (center, radius)) in scenario.obstacles.iter().enumerate() {
        let wall = world.spawn(Transform::from_translation(Vec3::from_array(*center))).id();
        spatial.add_collider(wall, Vec3::from_array(*center), *radius, COLLISION_LAYER_ENVIRONMENT);
        logger::log(&format!("🧱 obstacle #{} → {:?}", index, wall));
    }

    world.insert_resource(SpatialBackend::new(spatial));
    world.insert_resource(NavigationBackend::new(HeadlessNavigator::new()));

    let mut changes_cursor = world.resource::<Events<BehaviorChanged>>().get_cursor();
    let mut transitions = 0usize;
    let delta = fixed_delta();

    for tick in 0..args.ticks {
        // Игрок идёт по прямой, пока жив
        {
            let world = app.world_mut();
            let alive = world.get::<Health>(player).is_some_and(|h| h.is_alive());
            if alive {
                if let Some(mut transform) = world.get_mut::<Transform>(player) {
                    transform.translation.z -= args.player_speed * delta.as_secs_f32();
                }
            }
        }

        advance_simulation(&mut app, delta);

        let world = app.world();
        for change in changes_cursor.read(world.resource::<Events<BehaviorChanged>>()) {
            transitions += 1;
            println!(
                "Tick {}: {:?} {} → {}",
                tick,
                change.entity,
                change.from.as_str(),
                change.to.as_str()
            );
        }

        if tick % 60 == 0 {
            let state = world.get::<BehaviorState>(enemy).map(|s| s.kind().as_str()).unwrap_or("despawned");
            let health = world.get::<Health>(player).map(|h| h.current()).unwrap_or(0);
            println!("Tick {}: enemy {}, player HP {}", tick, state, health);
        }
    }

    println!("Simulation complete! {} state transitions", transitions);
}
