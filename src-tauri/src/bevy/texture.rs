//! Moon texture loading
//!
//! The texture comes from `textures/moon.png` in the asset directory. The
//! directory is resolved at start-up: the bundle's resource directory first,
//! then next to the executable, then the source tree. When no candidate
//! holds the file a grey equirectangular texture is generated from fractal
//! noise so the sphere still reads as a moon.

use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::render_resource::{Extent3d, TextureDimension, TextureFormat},
};
use noise::{Fbm, MultiFractal, NoiseFn, Perlin, RidgedMulti};
use std::f64::consts::{PI, TAU};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::texture::*;

/// Where the asset directory may live, most specific first
pub fn asset_dir_candidates(resource_dir: Option<PathBuf>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = resource_dir {
        candidates.push(dir.join(ASSET_DIR_NAME));
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(ASSET_DIR_NAME));
    }
    candidates.push(PathBuf::from(DEV_ASSET_DIR));
    candidates
}

/// First candidate that holds the moon texture, else the first candidate
pub fn resolve_asset_dir(candidates: &[PathBuf]) -> PathBuf {
    candidates
        .iter()
        .find(|dir| dir.join(MOON_TEXTURE_PATH).is_file())
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEV_ASSET_DIR))
}

/// Load the moon texture from disk, or generate one if it is missing
pub fn load_moon_texture(
    asset_server: &AssetServer,
    images: &mut Assets<Image>,
    asset_dir: &Path,
) -> Handle<Image> {
    let path = asset_dir.join(MOON_TEXTURE_PATH);
    if path.is_file() {
        info!(path = %path.display(), "loading moon texture");
        return asset_server.load(MOON_TEXTURE_PATH);
    }

    warn!(
        path = %path.display(),
        "moon texture not found, generating a procedural one"
    );
    images.add(procedural_moon_image(
        PROCEDURAL_WIDTH,
        PROCEDURAL_HEIGHT,
        PROCEDURAL_SEED,
    ))
}

/// Wrap generated pixels in a GPU-only sRGB image
pub fn procedural_moon_image(width: u32, height: u32, seed: u32) -> Image {
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        procedural_moon_rgba(width, height, seed),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

/// Grey equirectangular moon surface as tightly packed RGBA8
///
/// Noise is sampled on the unit sphere rather than the flat image, so the
/// seam at `u = 0` and the poles line up when the texture is wrapped.
pub fn procedural_moon_rgba(width: u32, height: u32, seed: u32) -> Vec<u8> {
    // Large dark basins
    let maria = Fbm::<Perlin>::new(seed)
        .set_octaves(3)
        .set_frequency(1.2);
    // Fine highland roughness
    let highlands = RidgedMulti::<Perlin>::new(seed.wrapping_add(1))
        .set_octaves(5)
        .set_frequency(6.0);

    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        let lat = (y as f64 + 0.5) / height as f64 * PI;
        for x in 0..width {
            let lon = (x as f64 + 0.5) / width as f64 * TAU;
            let point = [lat.sin() * lon.cos(), lat.cos(), lat.sin() * lon.sin()];

            let basin = maria.get(point);
            let mut shade = 0.6 + 0.08 * highlands.get(point);
            if basin < 0.0 {
                shade += 0.35 * basin;
            }

            let v = (shade.clamp(0.0, 1.0) * 255.0).round() as u8;
            rgba.extend_from_slice(&[v, v, v, 255]);
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn procedural_texture_is_deterministic() {
        let a = procedural_moon_rgba(64, 32, 7);
        let b = procedural_moon_rgba(64, 32, 7);
        assert_eq!(a.len(), 64 * 32 * 4);
        assert_eq!(a, b);
        assert_ne!(a, procedural_moon_rgba(64, 32, 8));
    }

    #[test]
    fn procedural_texture_is_opaque_grey_with_detail() {
        let rgba = procedural_moon_rgba(128, 64, PROCEDURAL_SEED);
        for px in rgba.chunks_exact(4) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], 255);
        }
        let min = rgba.chunks_exact(4).map(|p| p[0]).min().unwrap();
        let max = rgba.chunks_exact(4).map(|p| p[0]).max().unwrap();
        assert!(max - min > 20, "surface should not be flat: {min}..{max}");
    }

    #[test]
    fn procedural_image_has_requested_size() {
        let image = procedural_moon_image(32, 16, 1);
        assert_eq!(image.width(), 32);
        assert_eq!(image.height(), 16);
    }

    #[test]
    fn resource_dir_is_tried_first() {
        let candidates = asset_dir_candidates(Some(PathBuf::from("/opt/moonview")));
        assert_eq!(candidates[0], PathBuf::from("/opt/moonview/assets"));
        assert_eq!(candidates.last(), Some(&PathBuf::from(DEV_ASSET_DIR)));
    }

    #[test]
    fn directory_holding_the_texture_wins() {
        let empty = tempfile::tempdir().unwrap();
        let bundled = tempfile::tempdir().unwrap();
        let texture = bundled.path().join(MOON_TEXTURE_PATH);
        std::fs::create_dir_all(texture.parent().unwrap()).unwrap();
        std::fs::write(&texture, b"png").unwrap();

        let candidates = vec![empty.path().to_path_buf(), bundled.path().to_path_buf()];
        assert_eq!(resolve_asset_dir(&candidates), bundled.path());
    }

    #[test]
    fn missing_texture_falls_back_to_first_candidate() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        let candidates = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(resolve_asset_dir(&candidates), first.path());
        assert_eq!(resolve_asset_dir(&[]), PathBuf::from(DEV_ASSET_DIR));
    }
}
