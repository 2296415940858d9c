//! Animation hook components (имена параметров аниматора + последние отправленные флаги).

use bevy::prelude::*;

/// Имена параметров аниматора (настраиваются дизайнером)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AnimationParams {
    pub move_flag: String,
    pub idle_flag: String,
    pub attack_trigger: String,
    pub death_trigger: String,
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            move_flag: "IsMoving".to_string(),
            idle_flag: "IsIdle".to_string(),
            attack_trigger: "Attack".to_string(),
            death_trigger: "Die".to_string(),
        }
    }
}

/// Последние отправленные bool флаги (None = ещё не отправляли)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct AnimationFlags {
    pub moving: Option<bool>,
    pub idle: Option<bool>,
}
