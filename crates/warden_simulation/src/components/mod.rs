//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: здоровье, теги Player/Enemy, смерть, респаун
//! - movement: скорости агента

pub mod actor;
pub mod movement;

// Re-exports для удобного импорта
pub use actor::*;
pub use movement::*;
