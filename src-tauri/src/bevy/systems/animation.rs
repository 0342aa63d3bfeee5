//! Animation systems
//!
//! This module contains systems that animate entities in the scene.

use bevy::prelude::*;

use crate::bevy::components::{Moon, Spin};
use crate::bevy::resources::RotationSpeed;

/// Advance the moon's spin by the current speed once per frame
pub fn spin_moon(
    speed: Res<RotationSpeed>,
    mut query: Query<(&mut Spin, &mut Transform), With<Moon>>,
) {
    for (mut spin, mut transform) in query.iter_mut() {
        spin.advance(speed.0);
        transform.rotation = Quat::from_rotation_y(spin.angle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spin_advances_by_speed_each_frame() {
        let mut app = App::new();
        app.insert_resource(RotationSpeed(0.02));
        app.add_systems(Update, spin_moon);
        let moon = app
            .world_mut()
            .spawn((Transform::from_xyz(1.0, 2.0, 0.0), Spin::default(), Moon))
            .id();

        for _ in 0..3 {
            app.update();
        }

        let spin = app.world().get::<Spin>(moon).unwrap();
        assert!((spin.angle - 0.06).abs() < 1e-6);

        let transform = app.world().get::<Transform>(moon).unwrap();
        let (axis, angle) = transform.rotation.to_axis_angle();
        assert!((angle - 0.06).abs() < 1e-5);
        assert!(axis.y > 0.99);
        // Spinning never moves the moon
        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn zero_speed_holds_rotation() {
        let mut app = App::new();
        app.insert_resource(RotationSpeed(0.0));
        app.add_systems(Update, spin_moon);
        let moon = app
            .world_mut()
            .spawn((Transform::default(), Spin { angle: 1.0 }, Moon))
            .id();

        app.update();

        assert_eq!(app.world().get::<Spin>(moon).unwrap().angle, 1.0);
    }
}
