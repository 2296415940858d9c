//! Property-based тесты Health
//!
//! Любая последовательность урона/лечения/респауна держит инварианты:
//! 0 ≤ current ≤ max, dead ⇔ current == 0, смерть фиксируется один раз.

use proptest::prelude::*;
use warden_simulation::{Health, HealthError};

#[derive(Debug, Clone)]
enum Op {
    Damage(i32),
    Heal(i32),
    Respawn,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (-20i32..200).prop_map(Op::Damage),
        2 => (-20i32..200).prop_map(Op::Heal),
        1 => Just(Op::Respawn),
    ]
}

proptest! {
    #[test]
    fn health_stays_in_bounds(max in 1u32..500, ops in prop::collection::vec(op(), 0..64)) {
        let mut health = Health::new(max);

        for op in ops {
            let was_dead = health.is_dead();
            let before = health.current();

            match op {
                Op::Damage(amount) => match health.take_damage(amount) {
                    Ok(change) => {
                        prop_assert!(!was_dead);
                        prop_assert!(amount > 0);
                        // died только на переходе живой → мёртвый
                        prop_assert_eq!(change.died, change.current == 0);
                        prop_assert_eq!(change.applied(), before - change.current);
                    }
                    Err(HealthError::AlreadyDead) => prop_assert!(was_dead),
                    Err(HealthError::NonPositiveAmount(rejected)) => {
                        prop_assert!(rejected <= 0);
                        prop_assert_eq!(health.current(), before);
                    }
                },
                Op::Heal(amount) => {
                    if health.heal(amount).is_err() {
                        prop_assert!(was_dead || amount <= 0);
                        prop_assert_eq!(health.current(), before);
                    } else {
                        prop_assert!(health.current() >= before);
                    }
                }
                Op::Respawn => {
                    health.respawn();
                    prop_assert_eq!(health.current(), max);
                }
            }

            prop_assert!(health.current() <= health.max());
            prop_assert_eq!(health.max(), max);
            prop_assert_eq!(health.is_dead(), health.current() == 0);
        }
    }
}
