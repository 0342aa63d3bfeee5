//! Viewport resize system
//!
//! When the window is resized the frontend requests a new output size. The
//! camera gets a fresh offscreen target of that size, which also refreshes
//! its aspect ratio, and the old readback copier is replaced.

use bevy::{camera::RenderTarget, prelude::*, render::renderer::RenderDevice};
use tracing::{info, warn};

use crate::bevy::components::OffscreenCamera;
use crate::bevy::plugins::ImageCopier;
use crate::bevy::resources::{ControlsRes, ViewportSize};
use crate::bevy::systems::scene::{moon_projection, spawn_render_target};

/// Pending viewport size taken from the shared controls, if it differs
pub fn take_viewport_change(controls: &ControlsRes, current: ViewportSize) -> Option<ViewportSize> {
    let requested = match controls.0.with(|c| c.take_viewport_request()) {
        Ok(requested) => requested?,
        Err(err) => {
            warn!(%err, "dropping resize request");
            return None;
        }
    };
    let (width, height) = requested;
    let next = ViewportSize { width, height };
    (next != current).then_some(next)
}

/// Rebuild the render target when the frontend reports a new window size
pub fn resize_render_target(
    mut commands: Commands,
    controls: Option<Res<ControlsRes>>,
    mut viewport: ResMut<ViewportSize>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    copiers: Query<(Entity, &ImageCopier)>,
    mut camera_query: Query<(&mut Camera, &mut Projection), With<OffscreenCamera>>,
) {
    let Some(controls) = controls else {
        return;
    };
    let Some(next) = take_viewport_change(&controls, *viewport) else {
        return;
    };

    for (entity, copier) in copiers.iter() {
        copier.disable();
        commands.entity(entity).despawn();
    }

    let target = spawn_render_target(&mut commands, &mut images, &render_device, next);
    for (mut camera, mut projection) in camera_query.iter_mut() {
        camera.target = RenderTarget::Image(target.clone().into());
        *projection = moon_projection(next);
    }

    info!(
        width = next.width,
        height = next.height,
        aspect = next.aspect_ratio(),
        "viewport resized"
    );
    *viewport = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::SharedControls;

    #[test]
    fn no_request_means_no_change() {
        let controls = ControlsRes(SharedControls::default());
        assert_eq!(take_viewport_change(&controls, ViewportSize::default()), None);
    }

    #[test]
    fn same_size_is_not_a_change() {
        let shared = SharedControls::default();
        let current = ViewportSize::default();
        shared
            .with(|c| c.request_viewport(current.width, current.height))
            .unwrap()
            .unwrap();
        assert_eq!(take_viewport_change(&ControlsRes(shared), current), None);
    }

    #[test]
    fn new_size_is_taken_once() {
        let shared = SharedControls::default();
        shared.with(|c| c.request_viewport(1280, 720)).unwrap().unwrap();
        let controls = ControlsRes(shared);

        let next = take_viewport_change(&controls, ViewportSize::default()).unwrap();
        assert_eq!(next, ViewportSize { width: 1280, height: 720 });
        assert!((next.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(take_viewport_change(&controls, next), None);
    }
}
