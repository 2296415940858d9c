//! AI Events: исходящие уведомления FSM/perception и входящие позиции агентов
//!
//! Engine glue подписывается на эти события (UI, анимации, debug overlay),
//! ECS остаётся authoritative для решений.

use bevy::prelude::*;

use super::components::BehaviorKind;

/// Perception события (результат scan изменился)
///
/// - TargetDetected: "нет цели" → цель (или смена цели)
/// - TargetLost: цель → "нет цели" (или смена цели, старая теряется первой)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum PerceptionEvent {
    /// Цель обнаружена (FOV + LOS)
    TargetDetected {
        /// Entity наблюдателя
        observer: Entity,
        /// Entity цели
        target: Entity,
    },

    /// Цель потеряна (вне конуса, за стеной или вне радиуса)
    TargetLost {
        observer: Entity,
        target: Entity,
    },
}

/// Смена behavior state агента
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorChanged {
    pub entity: Entity,
    pub from: BehaviorKind,
    pub to: BehaviorKind,
}

/// Что сделать с аниматором
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationAction {
    /// One-shot trigger ("Attack", "Die")
    Trigger(String),
    /// Bool параметр ("IsMoving", "IsIdle")
    SetBool(String, bool),
}

/// Семантическая команда аниматору (проигрывание: забота glue)
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AnimationCommand {
    pub entity: Entity,
    pub action: AnimationAction,
}

/// Navigator сдвинул агента (headless step или engine glue после move_and_slide)
///
/// Navigator authoritative для позиции, ECS Transform догоняет.
/// Heading выводится из смещения (см. `apply_agent_moves`).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AgentMoved {
    pub entity: Entity,
    pub position: Vec3,
}
