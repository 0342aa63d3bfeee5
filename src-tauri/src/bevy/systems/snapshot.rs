//! Scene snapshot system
//!
//! Publishes the moon's position, spin and the viewport so the frontend can
//! query them without touching the ECS.

use bevy::prelude::*;
use tracing::warn;

use crate::bevy::components::{Moon, Spin};
use crate::bevy::resources::{FrameCount, RotationSpeed, SceneStateRes, ViewportSize};
use crate::tauri_bridge::shared_state::SceneSnapshot;

pub fn publish_scene_state(
    scene_state: Option<Res<SceneStateRes>>,
    speed: Res<RotationSpeed>,
    viewport: Res<ViewportSize>,
    count: Res<FrameCount>,
    moon_query: Query<(&Transform, &Spin), With<Moon>>,
) {
    let Some(scene_state) = scene_state else {
        return;
    };
    let Ok((transform, spin)) = moon_query.single() else {
        return;
    };

    let snapshot = SceneSnapshot {
        position: transform.translation.to_array(),
        rotation_y: spin.angle,
        rotation_speed: speed.0,
        viewport: (viewport.width, viewport.height),
        frame_count: count.0,
    };
    if let Err(err) = scene_state.0.publish(snapshot) {
        warn!(%err, "failed to publish scene state");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::SharedSceneState;

    #[test]
    fn snapshot_reflects_moon() {
        let shared = SharedSceneState::default();
        let mut app = App::new();
        app.insert_resource(SceneStateRes(shared.clone()));
        app.insert_resource(RotationSpeed(0.03));
        app.insert_resource(ViewportSize::default());
        app.insert_resource(FrameCount(5));
        app.add_systems(Update, publish_scene_state);
        app.world_mut().spawn((
            Transform::from_xyz(0.3, -0.1, 0.0),
            Spin { angle: 0.5 },
            Moon,
        ));

        app.update();

        let snapshot = shared.snapshot().unwrap();
        assert_eq!(snapshot.position, [0.3, -0.1, 0.0]);
        assert_eq!(snapshot.rotation_y, 0.5);
        assert_eq!(snapshot.rotation_speed, 0.03);
        assert_eq!(snapshot.viewport, (800, 600));
        assert_eq!(snapshot.frame_count, 5);
    }
}
