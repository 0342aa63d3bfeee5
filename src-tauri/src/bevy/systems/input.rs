//! Input systems
//!
//! Apply the arrow-key moves and slider value forwarded by the frontend.
//! Input arrives between frames and is consumed once per frame.

use bevy::prelude::*;
use tracing::{debug, warn};

use crate::bevy::components::Moon;
use crate::bevy::resources::{ControlsRes, RotationSpeed};
use crate::config::controls::MOVE_STEP;

/// Move the moon by one step per queued arrow key press
pub fn apply_key_moves(
    controls: Option<Res<ControlsRes>>,
    mut moon_query: Query<&mut Transform, With<Moon>>,
) {
    let Some(controls) = controls else {
        return;
    };

    let moves = match controls.0.with(|c| c.take_moves()) {
        Ok(moves) => moves,
        Err(err) => {
            warn!(%err, "dropping key input");
            return;
        }
    };
    if moves.is_empty() {
        return;
    }

    for mut transform in moon_query.iter_mut() {
        for key in &moves {
            let [dx, dy] = key.offset(MOVE_STEP);
            transform.translation.x += dx;
            transform.translation.y += dy;
        }
        debug!(position = ?transform.translation, "moon moved");
    }
}

/// Copy the slider value into the renderer
pub fn sync_rotation_speed(controls: Option<Res<ControlsRes>>, mut speed: ResMut<RotationSpeed>) {
    let Some(controls) = controls else {
        return;
    };

    if let Ok(value) = controls.0.with(|c| c.rotation_speed()) {
        if speed.0 != value {
            speed.0 = value;
        }
    }
}
