//! Scene setup system
//!
//! This module handles the initial setup of the 3D scene: the offscreen
//! camera, the textured moon and its two lights.

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    core_pipeline::tonemapping::Tonemapping,
    image::Image,
    math::{primitives::Sphere, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{Extent3d, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};
use tracing::info;

use crate::bevy::components::{Moon, OffscreenCamera, Spin};
use crate::bevy::plugins::ImageCopier;
use crate::bevy::resources::{AssetDir, ViewportSize};
use crate::bevy::texture::load_moon_texture;
use crate::config::scene::*;

/// Create an offscreen render target plus the copier that reads it back
pub fn spawn_render_target(
    commands: &mut Commands,
    images: &mut Assets<Image>,
    render_device: &RenderDevice,
    viewport: ViewportSize,
) -> Handle<Image> {
    let size = Extent3d {
        width: viewport.width,
        height: viewport.height,
        depth_or_array_layers: 1,
    };

    let mut render_target_image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let handle = images.add(render_target_image);

    commands.spawn(ImageCopier::new(handle.clone(), size, render_device));

    handle
}

/// Perspective projection matching the viewer's camera settings
pub fn moon_projection(viewport: ViewportSize) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov: CAMERA_FOV_DEGREES.to_radians(),
        near: CAMERA_NEAR,
        far: CAMERA_FAR,
        aspect_ratio: viewport.aspect_ratio(),
        ..default()
    })
}

/// Camera placement: on the Z axis, looking at the origin
pub fn camera_transform() -> Transform {
    Transform::from_xyz(0.0, 0.0, CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y)
}

/// Ambient fill light, attached to the camera that sees it
pub fn ambient_light() -> AmbientLight {
    AmbientLight {
        color: Color::WHITE,
        brightness: AMBIENT_BRIGHTNESS,
        ..default()
    }
}

pub fn moon_mesh() -> Mesh {
    Sphere::new(MOON_RADIUS)
        .mesh()
        .uv(MOON_SECTORS, MOON_STACKS)
}

/// Textured, double-sided surface so the inside never renders black
pub fn moon_material(texture: Handle<Image>) -> StandardMaterial {
    StandardMaterial {
        base_color_texture: Some(texture),
        perceptual_roughness: 1.0,
        double_sided: true,
        cull_mode: None,
        ..default()
    }
}

pub fn point_light() -> (PointLight, Transform) {
    let [x, y, z] = POINT_LIGHT_POSITION;
    (
        PointLight {
            intensity: POINT_LIGHT_INTENSITY,
            range: POINT_LIGHT_RANGE,
            color: Color::WHITE,
            ..default()
        },
        Transform::from_xyz(x, y, z),
    )
}

/// Setup the 3D scene with camera, moon and lights
#[allow(clippy::too_many_arguments)]
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    asset_server: Res<AssetServer>,
    asset_dir: Res<AssetDir>,
    render_device: Res<RenderDevice>,
    viewport: Res<ViewportSize>,
) {
    info!(
        width = viewport.width,
        height = viewport.height,
        "setting up moon scene"
    );

    let target = spawn_render_target(&mut commands, &mut images, &render_device, *viewport);

    commands.spawn((
        Camera3d::default(),
        Camera {
            target: RenderTarget::Image(target.into()),
            clear_color: ClearColorConfig::Custom(Color::srgb(
                CLEAR_COLOR[0],
                CLEAR_COLOR[1],
                CLEAR_COLOR[2],
            )),
            ..default()
        },
        moon_projection(*viewport),
        Tonemapping::None,
        ambient_light(),
        camera_transform(),
        OffscreenCamera,
    ));

    let moon_texture = load_moon_texture(&asset_server, &mut images, &asset_dir.0);

    commands.spawn((
        Mesh3d(meshes.add(moon_mesh())),
        MeshMaterial3d(materials.add(moon_material(moon_texture))),
        Transform::default(),
        Moon,
        Spin::default(),
    ));

    commands.spawn(point_light());

    info!("moon scene ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_matches_camera_settings() {
        let projection = moon_projection(ViewportSize {
            width: 1280,
            height: 720,
        });
        let Projection::Perspective(perspective) = projection else {
            panic!("expected a perspective projection");
        };
        assert_eq!(perspective.fov, 75f32.to_radians());
        assert_eq!(perspective.near, 0.1);
        assert_eq!(perspective.far, 500.0);
        assert!((perspective.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn camera_sits_on_z_axis_facing_origin() {
        let transform = camera_transform();
        assert_eq!(transform.translation, Vec3::new(0.0, 0.0, 10.0));
        assert!((*transform.forward()).abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn moon_mesh_is_a_radius_two_uv_sphere() {
        let mesh = moon_mesh();
        assert_eq!(mesh.count_vertices(), 65 * 65);

        let positions = mesh
            .attribute(Mesh::ATTRIBUTE_POSITION)
            .and_then(|values| values.as_float3())
            .expect("sphere has positions");
        for p in positions {
            assert!((Vec3::from_array(*p).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn moon_material_is_textured_and_double_sided() {
        let material = moon_material(Handle::default());
        assert!(material.base_color_texture.is_some());
        assert!(material.double_sided);
        assert_eq!(material.cull_mode, None);
    }

    #[test]
    fn lights_match_scene_layout() {
        let (light, transform) = point_light();
        assert_eq!(transform.translation, Vec3::new(10.0, 10.0, 10.0));
        assert_eq!(light.intensity, POINT_LIGHT_INTENSITY);
        assert_eq!(light.color, Color::WHITE);

        let ambient = ambient_light();
        assert_eq!(ambient.color, Color::WHITE);
        assert_eq!(ambient.brightness, AMBIENT_BRIGHTNESS);
        assert!(ambient.brightness < light.intensity);
    }
}
