//! Базовые компоненты акторов: Health, теги Player/Enemy, смерть и респаун

use bevy::prelude::*;

/// Ошибки мутаций здоровья (вызывающий логирует, состояние не меняется)
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HealthError {
    #[error("target is already dead")]
    AlreadyDead,
    #[error("non-positive amount: {0}")]
    NonPositiveAmount(i32),
}

/// Результат успешной мутации (для HealthChanged / EntityDied)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    pub previous: u32,
    pub current: u32,
    pub max: u32,
    /// Здоровье только что дошло до 0
    pub died: bool,
}

impl HealthChange {
    pub fn applied(&self) -> u32 {
        self.previous.abs_diff(self.current)
    }
}

/// Здоровье актора (общее для игрока и врагов)
///
/// Инвариант: 0 ≤ current ≤ max, max ≥ 1.
/// `dead` снимается только через `respawn()`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    current: u32,
    max: u32,
    dead: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100) // Default 100 HP
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_alive(&self) -> bool {
        !self.dead
    }

    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    pub fn take_damage(&mut self, amount: i32) -> Result<HealthChange, HealthError> {
        if self.dead {
            return Err(HealthError::AlreadyDead);
        }
        if amount <= 0 {
            return Err(HealthError::NonPositiveAmount(amount));
        }

        let previous = self.current;
        self.current = self.current.saturating_sub(amount.unsigned_abs());
        let died = self.current == 0;
        if died {
            self.dead = true;
        }

        Ok(HealthChange {
            previous,
            current: self.current,
            max: self.max,
            died,
        })
    }

    /// Мёртвых не лечим: сначала respawn
    pub fn heal(&mut self, amount: i32) -> Result<HealthChange, HealthError> {
        if self.dead {
            return Err(HealthError::AlreadyDead);
        }
        if amount <= 0 {
            return Err(HealthError::NonPositiveAmount(amount));
        }

        let previous = self.current;
        self.current = self.current.saturating_add(amount.unsigned_abs()).min(self.max);

        Ok(HealthChange {
            previous,
            current: self.current,
            max: self.max,
            died: false,
        })
    }

    /// Полное здоровье + снятие dead флага
    pub fn respawn(&mut self) -> HealthChange {
        let previous = self.current;
        self.current = self.max;
        self.dead = false;

        HealthChange {
            previous,
            current: self.current,
            max: self.max,
            died: false,
        }
    }
}

/// Тег игрока (цель perception и attack ray: "Player" tag)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Transform)]
pub struct Player;

/// Тег вражеского агента
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, Transform)]
pub struct Enemy;

/// Точка респауна игрока
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct RespawnPoint {
    pub position: Vec3,
    pub rotation: Quat,
    /// Задержка перед респауном (секунды)
    pub delay: f32,
}

impl Default for RespawnPoint {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            delay: 3.0,
        }
    }
}

/// Компонент-маркер: entity мертв (Health == 0)
///
/// Враги удаляются через DESPAWN_DELAY_SECS, игрок ждёт респауна.
#[derive(Component, Debug)]
pub struct Dead;

/// Компонент-маркер: движение и атака игрока отключены (пока мёртв)
///
/// Engine glue читает маркер и блокирует input.
#[derive(Component, Debug)]
pub struct Incapacitated;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert_eq!(health.current(), 100);

        let change = health.take_damage(30).unwrap();
        assert_eq!(change.current, 70);
        assert_eq!(change.applied(), 30);
        assert!(health.is_alive());

        let change = health.take_damage(100).unwrap(); // Saturating sub
        assert_eq!(change.current, 0);
        assert!(change.died);
        assert!(health.is_dead());
    }

    #[test]
    fn test_health_rejects_non_positive_damage() {
        let mut health = Health::new(50);

        assert_eq!(health.take_damage(0), Err(HealthError::NonPositiveAmount(0)));
        assert_eq!(health.take_damage(-5), Err(HealthError::NonPositiveAmount(-5)));
        assert_eq!(health.current(), 50);
    }

    #[test]
    fn test_dead_absorbs_damage_and_heal_until_respawn() {
        let mut health = Health::new(10);
        health.take_damage(10).unwrap();

        assert_eq!(health.take_damage(5), Err(HealthError::AlreadyDead));
        assert_eq!(health.heal(5), Err(HealthError::AlreadyDead));
        assert_eq!(health.current(), 0);

        let change = health.respawn();
        assert_eq!(change.current, 10);
        assert!(health.is_alive());
        assert!(health.take_damage(3).is_ok());
    }

    #[test]
    fn test_health_heal() {
        let mut health = Health::new(100);
        health.take_damage(50).unwrap();

        assert_eq!(health.heal(30).unwrap().current, 80);
        assert_eq!(health.heal(100).unwrap().current, 100); // Clamped to max
        assert!(health.heal(0).is_err());
    }

    #[test]
    fn test_zero_max_clamped_to_one() {
        let health = Health::new(0);
        assert_eq!(health.max(), 1);
        assert_eq!(health.current(), 1);
    }
}
