//! FSM AI components (behavior state, patrol route, target memory).

use bevy::prelude::*;
use rand::Rng;

use crate::backend::planar_distance;
use crate::scheduler::TaskId;

/// Behavior state агента (данные состояния живут в варианте)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum BehaviorState {
    /// Idle: до инициализации и при пустом маршруте (инертный агент)
    #[default]
    Idle,

    /// Patrol: обход waypoints по кругу
    Patrol {
        /// Pending continuation паузы на waypoint (Some = стоим)
        pause: Option<TaskId>,
    },

    /// Chase: преследование запомненной цели
    Chase,

    /// Attack: стоим, поворачиваемся к цели, стреляем по cooldown
    Attack {
        /// Время начала текущего замаха (None = замаха нет)
        swing_started: Option<f32>,
    },

    /// Dead: терминальное состояние, AI отключен
    Dead,
}

impl BehaviorState {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Self::Idle => BehaviorKind::Idle,
            Self::Patrol { .. } => BehaviorKind::Patrol,
            Self::Chase => BehaviorKind::Chase,
            Self::Attack { .. } => BehaviorKind::Attack,
            Self::Dead => BehaviorKind::Dead,
        }
    }

    pub fn patrol() -> Self {
        Self::Patrol { pause: None }
    }

    pub fn attack() -> Self {
        Self::Attack { swing_started: None }
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Patrol { pause: Some(_) })
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Dead)
    }
}

/// Тип состояния без данных (для событий и логов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum BehaviorKind {
    Idle,
    Patrol,
    Chase,
    Attack,
    Dead,
}

impl BehaviorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Patrol => "Patrol",
            Self::Chase => "Chase",
            Self::Attack => "Attack",
            Self::Dead => "Dead",
        }
    }
}

/// Component: память о цели
///
/// Обновляется perception при каждом успешном scan. Цель старше
/// `duration` считается отсутствующей.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct TargetMemory {
    pub target: Option<Entity>,
    /// Время последнего наблюдения (секунды симуляции)
    pub last_seen: f32,
    /// Сколько помним цель без LOS (секунды)
    pub duration: f32,
}

impl Default for TargetMemory {
    fn default() -> Self {
        Self::new(4.0)
    }
}

impl TargetMemory {
    pub fn new(duration: f32) -> Self {
        Self {
            target: None,
            last_seen: 0.0,
            duration,
        }
    }

    pub fn remember(&mut self, target: Entity, now: f32) {
        self.target = Some(target);
        self.last_seen = now;
    }

    /// Цель, если она ещё не забыта (граница включительно)
    pub fn recall(&self, now: f32) -> Option<Entity> {
        self.target.filter(|_| now - self.last_seen <= self.duration)
    }

    pub fn is_expired(&self, now: f32) -> bool {
        self.recall(now).is_none()
    }

    pub fn forget(&mut self) {
        self.target = None;
    }
}

/// Component: патрульный маршрут
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct PatrolRoute {
    pub waypoints: Vec<Vec3>,
    pub current: usize,
    /// Waypoint достигнут если planar distance ≤ reach_distance
    pub reach_distance: f32,
    /// Шанс остановиться на waypoint [0, 1]
    pub stop_chance: f32,
    pub min_pause: f32,
    pub max_pause: f32,
}

impl Default for PatrolRoute {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PatrolRoute {
    pub fn new(waypoints: Vec<Vec3>) -> Self {
        Self {
            waypoints,
            current: 0,
            reach_distance: 0.5,
            stop_chance: 0.5,
            min_pause: 1.0,
            max_pause: 3.0,
        }
    }

    pub fn has_waypoints(&self) -> bool {
        !self.waypoints.is_empty()
    }

    pub fn current_waypoint(&self) -> Option<Vec3> {
        self.waypoints.get(self.current).copied()
    }

    /// Следующий waypoint по кругу
    pub fn advance(&mut self) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.waypoints.len();
        self.current_waypoint()
    }

    pub fn is_reached(&self, position: Vec3) -> bool {
        self.current_waypoint()
            .is_some_and(|waypoint| planar_distance(position, waypoint) <= self.reach_distance)
    }

    /// Бросок на паузу: Some(длительность) если останавливаемся
    pub fn roll_pause(&self, rng: &mut impl Rng) -> Option<f32> {
        let roll: f32 = rng.gen();
        if roll >= self.stop_chance {
            return None;
        }

        if self.min_pause < self.max_pause {
            Some(rng.gen_range(self.min_pause..=self.max_pause))
        } else {
            Some(self.min_pause)
        }
    }

    /// Починить конфиг дизайнера, вернуть предупреждения
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.waypoints.is_empty() {
            warnings.push("patrol route has no waypoints, agent stays idle".to_string());
        }
        if self.current >= self.waypoints.len() {
            self.current = 0;
        }
        if !(0.0..=1.0).contains(&self.stop_chance) {
            warnings.push(format!("stop chance {} clamped to [0, 1]", self.stop_chance));
            self.stop_chance = self.stop_chance.clamp(0.0, 1.0);
        }
        if self.reach_distance < 0.0 {
            warnings.push(format!("reach distance {} clamped to 0", self.reach_distance));
            self.reach_distance = 0.0;
        }
        if self.min_pause < 0.0 || self.max_pause < 0.0 {
            warnings.push("negative pause duration clamped to 0".to_string());
            self.min_pause = self.min_pause.max(0.0);
            self.max_pause = self.max_pause.max(0.0);
        }
        if self.min_pause > self.max_pause {
            warnings.push(format!(
                "min pause {} > max pause {}, swapped",
                self.min_pause, self.max_pause
            ));
            std::mem::swap(&mut self.min_pause, &mut self.max_pause);
        }

        warnings
    }
}
