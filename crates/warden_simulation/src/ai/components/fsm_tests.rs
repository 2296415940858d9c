//! Tests for FSM AI components.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::fsm::{BehaviorKind, BehaviorState, PatrolRoute, TargetMemory};

    fn triangle() -> PatrolRoute {
        PatrolRoute::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
        ])
    }

    #[test]
    fn test_behavior_state_default() {
        let state = BehaviorState::default();
        assert!(matches!(state, BehaviorState::Idle));
        assert_eq!(state.kind(), BehaviorKind::Idle);
    }

    #[test]
    fn test_paused_only_in_patrol_with_pending_task() {
        assert!(!BehaviorState::patrol().is_paused());
        assert!(!BehaviorState::Chase.is_paused());
        assert_eq!(BehaviorState::attack().kind().as_str(), "Attack");
    }

    #[test]
    fn test_patrol_route_cycles() {
        let mut route = triangle();
        assert_eq!(route.current_waypoint(), Some(Vec3::ZERO));

        let visited: Vec<usize> = (0..4)
            .map(|_| {
                route.advance();
                route.current
            })
            .collect();
        assert_eq!(visited, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_empty_route_never_advances() {
        let mut route = PatrolRoute::default();
        assert!(!route.has_waypoints());
        assert_eq!(route.advance(), None);
        assert!(!route.is_reached(Vec3::ZERO));
    }

    #[test]
    fn test_reach_uses_planar_distance() {
        let route = triangle();
        // Высота не влияет, 0.4 по X: внутри reach 0.5
        assert!(route.is_reached(Vec3::new(0.4, 5.0, 0.0)));
        assert!(!route.is_reached(Vec3::new(0.6, 0.0, 0.0)));
    }

    #[test]
    fn test_roll_pause_respects_chance_and_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let mut never = triangle();
        never.stop_chance = 0.0;
        assert!((0..100).all(|_| never.roll_pause(&mut rng).is_none()));

        let mut always = triangle();
        always.stop_chance = 1.0;
        for _ in 0..100 {
            let pause = always.roll_pause(&mut rng).unwrap();
            assert!((1.0..=3.0).contains(&pause), "pause = {pause}");
        }
    }

    #[test]
    fn test_sanitize_swaps_pause_range() {
        let mut route = triangle();
        route.min_pause = 5.0;
        route.max_pause = 2.0;
        route.stop_chance = 1.5;

        let warnings = route.sanitize();
        assert_eq!(warnings.len(), 2);
        assert_eq!((route.min_pause, route.max_pause), (2.0, 5.0));
        assert_eq!(route.stop_chance, 1.0);
    }

    #[test]
    fn test_target_memory_expiry_boundary() {
        let target = Entity::from_raw(9);
        let mut memory = TargetMemory::default();
        assert_eq!(memory.recall(0.0), None);

        memory.remember(target, 10.0);
        assert_eq!(memory.recall(13.9), Some(target));
        assert_eq!(memory.recall(14.0), Some(target));
        assert!(memory.is_expired(14.1));

        memory.forget();
        assert_eq!(memory.recall(10.0), None);
    }
}
