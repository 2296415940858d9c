//! Designer profiles: параметры врагов и игрока (JSON)
//!
//! Все поля опциональны (`#[serde(default)]`), дефолты = дефолты дизайнера.
//! Кривые значения не ломают загрузку: `validate()` возвращает список
//! предупреждений, компоненты чинят себя при инициализации агента.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::{AnimationFlags, AnimationParams, BehaviorState, PatrolRoute, TargetMemory};
use crate::collision_layers::{COLLISION_MASK_ATTACK_RAY, COLLISION_MASK_OBSTACLES, COLLISION_MASK_TARGETS};
use crate::combat::{AttackOrigin, RangedAttacker};
use crate::components::{Enemy, Health, MotionProfile, Player, RespawnPoint};
use crate::perception::{PerceptionConfig, PerceptionState};

/// Ошибки загрузки профиля
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read profile: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse profile: {0}")]
    Parse(#[from] serde_json::Error),
}

fn vec3(value: [f32; 3]) -> Vec3 {
    Vec3::from_array(value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatrolSettings {
    pub waypoints: Vec<[f32; 3]>,
    pub reach_distance: f32,
    pub stop_chance: f32,
    pub min_pause: f32,
    pub max_pause: f32,
}

impl Default for PatrolSettings {
    fn default() -> Self {
        Self {
            waypoints: Vec::new(),
            reach_distance: 0.5,
            stop_chance: 0.5,
            min_pause: 1.0,
            max_pause: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionSettings {
    pub view_radius: f32,
    pub view_angle: f32,
    pub scan_interval: f32,
    pub target_mask: u32,
    pub obstacle_mask: u32,
    pub memory_duration: f32,
}

impl Default for PerceptionSettings {
    fn default() -> Self {
        Self {
            view_radius: 10.0,
            view_angle: 90.0,
            scan_interval: 0.3,
            target_mask: COLLISION_MASK_TARGETS,
            obstacle_mask: COLLISION_MASK_OBSTACLES,
            memory_duration: 4.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub rotation_speed: f32,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            patrol_speed: 3.0,
            chase_speed: 5.0,
            rotation_speed: 120.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackSettings {
    pub range: f32,
    pub cooldown: f32,
    pub damage: i32,
    pub animation_time: f32,
    pub ray_duration: f32,
    pub ray_distance: f32,
    pub ray_mask: u32,
    /// None: агент без дула, атаки не стреляют (warning при инициализации)
    pub origin_offset: Option<[f32; 3]>,
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            range: 2.0,
            cooldown: 1.5,
            damage: 10,
            animation_time: 0.5,
            ray_duration: 0.1,
            ray_distance: 15.0,
            ray_mask: COLLISION_MASK_ATTACK_RAY,
            origin_offset: Some(AttackOrigin::default().offset.to_array()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    pub move_flag: String,
    pub idle_flag: String,
    pub attack_trigger: String,
    pub death_trigger: String,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        let params = AnimationParams::default();
        Self {
            move_flag: params.move_flag,
            idle_flag: params.idle_flag,
            attack_trigger: params.attack_trigger,
            death_trigger: params.death_trigger,
        }
    }
}

/// Профиль вражеского агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyProfile {
    pub max_health: u32,
    pub patrol: PatrolSettings,
    pub perception: PerceptionSettings,
    pub motion: MotionSettings,
    pub attack: AttackSettings,
    pub animation: AnimationSettings,
}

impl Default for EnemyProfile {
    fn default() -> Self {
        Self {
            max_health: 100,
            patrol: PatrolSettings::default(),
            perception: PerceptionSettings::default(),
            motion: MotionSettings::default(),
            attack: AttackSettings::default(),
            animation: AnimationSettings::default(),
        }
    }
}

impl EnemyProfile {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Предупреждения о кривом конфиге (загрузку не прерывают)
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        // Маршрут/perception проверяем той же логикой, что и при спавне
        warnings.extend(self.patrol_route().sanitize());
        warnings.extend(self.perception_config().sanitize());

        if self.max_health == 0 {
            warnings.push("max health 0 raised to 1".to_string());
        }
        if self.perception.memory_duration <= 0.0 {
            warnings.push(format!(
                "memory duration {} is not positive, targets are forgotten immediately",
                self.perception.memory_duration
            ));
        }
        if self.attack.range <= 0.0 {
            warnings.push(format!("attack range {} is not positive, agent never attacks", self.attack.range));
        }
        if self.attack.damage <= 0 {
            warnings.push(format!("attack damage {} is not positive, hits are ignored", self.attack.damage));
        }
        if self.attack.cooldown < 0.0 {
            warnings.push(format!("attack cooldown {} is negative", self.attack.cooldown));
        }
        if self.attack.origin_offset.is_none() {
            warnings.push("attack origin missing, attacks will not fire".to_string());
        }

        warnings
    }

    pub fn patrol_route(&self) -> PatrolRoute {
        PatrolRoute {
            waypoints: self.patrol.waypoints.iter().copied().map(vec3).collect(),
            current: 0,
            reach_distance: self.patrol.reach_distance,
            stop_chance: self.patrol.stop_chance,
            min_pause: self.patrol.min_pause,
            max_pause: self.patrol.max_pause,
        }
    }

    pub fn perception_config(&self) -> PerceptionConfig {
        PerceptionConfig {
            view_radius: self.perception.view_radius,
            view_angle: self.perception.view_angle,
            scan_interval: self.perception.scan_interval,
            target_mask: self.perception.target_mask,
            obstacle_mask: self.perception.obstacle_mask,
        }
    }

    pub fn ranged_attacker(&self) -> RangedAttacker {
        RangedAttacker {
            damage: self.attack.damage,
            attack_cooldown: self.attack.cooldown,
            attack_range: self.attack.range,
            animation_time: self.attack.animation_time,
            ray_duration: self.attack.ray_duration,
            ray_distance: self.attack.ray_distance,
            ray_mask: self.attack.ray_mask,
            ..default()
        }
    }

    pub fn attack_origin(&self) -> Option<AttackOrigin> {
        self.attack.origin_offset.map(|offset| AttackOrigin { offset: vec3(offset) })
    }

    /// Компоненты агента (без AttackOrigin: он опционален)
    pub fn enemy_bundle(&self, position: Vec3) -> impl Bundle {
        (
            Enemy,
            Transform::from_translation(position),
            Health::new(self.max_health),
            MotionProfile {
                patrol_speed: self.motion.patrol_speed,
                chase_speed: self.motion.chase_speed,
                rotation_speed: self.motion.rotation_speed,
            },
            self.perception_config(),
            PerceptionState::default(),
            self.patrol_route(),
            TargetMemory::new(self.perception.memory_duration),
            self.ranged_attacker(),
            AnimationParams {
                move_flag: self.animation.move_flag.clone(),
                idle_flag: self.animation.idle_flag.clone(),
                attack_trigger: self.animation.attack_trigger.clone(),
                death_trigger: self.animation.death_trigger.clone(),
            },
            AnimationFlags::default(),
            BehaviorState::default(),
        )
    }

    /// Заспавнить агента (AttackOrigin добавляется если задан)
    pub fn spawn_enemy(&self, world: &mut World, position: Vec3) -> Entity {
        let mut entity = world.spawn(self.enemy_bundle(position));
        if let Some(origin) = self.attack_origin() {
            entity.insert(origin);
        }
        entity.id()
    }
}

/// Профиль игрока (цель для агентов)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProfile {
    pub max_health: u32,
    pub respawn_delay: f32,
    /// None: респаун в точке спавна
    pub respawn_position: Option<[f32; 3]>,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            max_health: 100,
            respawn_delay: 3.0,
            respawn_position: None,
        }
    }
}

impl PlayerProfile {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn player_bundle(&self, position: Vec3) -> impl Bundle {
        (
            Player,
            Transform::from_translation(position),
            Health::new(self.max_health),
            RespawnPoint {
                position: self.respawn_position.map(vec3).unwrap_or(position),
                rotation: Quat::IDENTITY,
                delay: self.respawn_delay.max(0.0),
            },
        )
    }
}

/// Сценарий headless прогона: враг, игрок, препятствия
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioProfile {
    pub enemy: EnemyProfile,
    pub enemy_position: [f32; 3],
    pub player: PlayerProfile,
    pub player_position: [f32; 3],
    /// Стены: (центр, радиус)
    pub obstacles: Vec<([f32; 3], f32)>,
}

impl Default for ScenarioProfile {
    fn default() -> Self {
        Self {
            enemy: EnemyProfile {
                patrol: PatrolSettings {
                    waypoints: vec![[0.0, 0.0, 0.0], [12.0, 0.0, 0.0], [12.0, 0.0, 12.0], [0.0, 0.0, 12.0]],
                    ..default()
                },
                ..default()
            },
            enemy_position: [0.0, 0.0, 0.0],
            player: PlayerProfile::default(),
            player_position: [6.0, 0.0, 16.0],
            obstacles: vec![([6.0, 0.0, 6.0], 1.5)],
        }
    }
}

impl ScenarioProfile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_designer_values() {
        let profile = EnemyProfile::default();
        assert_eq!(profile.perception.view_radius, 10.0);
        assert_eq!(profile.perception.view_angle, 90.0);
        assert_eq!(profile.perception.scan_interval, 0.3);
        assert_eq!(profile.perception.memory_duration, 4.0);
        assert_eq!(profile.attack.cooldown, 1.5);
        assert_eq!(profile.attack.damage, 10);
        assert_eq!(profile.max_health, 100);
        assert_eq!(profile.patrol.stop_chance, 0.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let profile = EnemyProfile::from_json_str(
            r#"{ "patrol": { "waypoints": [[0, 0, 0], [5, 0, 0]], "stop_chance": 0.0 }, "attack": { "damage": 25 } }"#,
        )
        .unwrap();

        assert_eq!(profile.patrol.waypoints.len(), 2);
        assert_eq!(profile.patrol.stop_chance, 0.0);
        assert_eq!(profile.patrol.reach_distance, 0.5);
        assert_eq!(profile.attack.damage, 25);
        assert_eq!(profile.attack.range, 2.0);
        assert!(profile.validate().is_empty());
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = EnemyProfile::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EnemyProfile::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validate_reports_misconfiguration() {
        let profile = EnemyProfile::from_json_str(
            r#"{ "patrol": { "min_pause": 4.0, "max_pause": 1.0 }, "attack": { "origin_offset": null } }"#,
        )
        .unwrap();

        let warnings = profile.validate();
        assert!(warnings.iter().any(|w| w.contains("no waypoints")));
        assert!(warnings.iter().any(|w| w.contains("swapped")));
        assert!(warnings.iter().any(|w| w.contains("attack origin")));
    }

    #[test]
    fn test_player_respawn_defaults_to_spawn_point() {
        let mut world = World::new();
        let spawn = Vec3::new(1.0, 0.0, 2.0);
        let player = world.spawn(PlayerProfile::default().player_bundle(spawn)).id();

        let point = world.get::<RespawnPoint>(player).unwrap();
        assert_eq!(point.position, spawn);
        assert_eq!(point.delay, 3.0);
    }

    #[test]
    fn test_spawn_enemy_adds_attack_origin() {
        let mut world = World::new();
        let enemy = EnemyProfile::default().spawn_enemy(&mut world, Vec3::ZERO);
        assert!(world.get::<AttackOrigin>(enemy).is_some());
        assert_eq!(world.get::<BehaviorState>(enemy), Some(&BehaviorState::Idle));
    }
}
