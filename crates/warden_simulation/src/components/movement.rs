//! Movement компоненты: скорости агента (применяет Navigator)

use bevy::prelude::*;

/// Скорости агента
///
/// patrol/chase speed уходят в `Navigator::set_speed` при смене state,
/// rotation_speed: множитель slerp при повороте (по ходу движения, в Attack к цели).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MotionProfile {
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub rotation_speed: f32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            patrol_speed: 3.0,
            chase_speed: 5.0,
            rotation_speed: 120.0,
        }
    }
}

/// Повернуть агента к точке по горизонтали (Y компонента обнуляется)
///
/// Slerp с коэффициентом `delta × rotation_speed` (clamp в [0, 1]).
pub fn face_toward(transform: &mut Transform, target: Vec3, rotation_speed: f32, delta: f32) {
    let mut direction = target - transform.translation;
    direction.y = 0.0;
    if direction.length_squared() <= 1e-6 {
        return;
    }

    // forward = -Z, поворот вокруг Y
    let look = Quat::from_rotation_y(f32::atan2(-direction.x, -direction.z));
    let t = (delta * rotation_speed).clamp(0.0, 1.0);
    transform.rotation = transform.rotation.slerp(look, t);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_toward_full_step_looks_at_target() {
        let mut transform = Transform::default();
        face_toward(&mut transform, Vec3::new(5.0, 3.0, 0.0), 120.0, 1.0 / 60.0);

        let forward = transform.forward().as_vec3();
        assert!((forward - Vec3::X).length() < 1e-4, "forward = {forward:?}");
    }

    #[test]
    fn test_face_toward_partial_step() {
        let mut transform = Transform::default();
        face_toward(&mut transform, Vec3::new(5.0, 0.0, 0.0), 1.0, 0.5);

        // Половина пути от -Z к +X → 45°
        let forward = transform.forward().as_vec3();
        let angle = forward.angle_between(Vec3::NEG_Z).to_degrees();
        assert!((angle - 45.0).abs() < 0.5, "angle = {angle}");
    }

    #[test]
    fn test_face_toward_ignores_target_at_same_spot() {
        let mut transform = Transform::default();
        face_toward(&mut transform, Vec3::new(0.0, 2.0, 0.0), 120.0, 1.0);
        assert_eq!(transform.rotation, Quat::IDENTITY);
    }
}
