//! Configuration constants and settings for the moon viewer
//!
//! This module contains all configurable parameters such as the initial render
//! resolution, scene layout, control ranges and performance tuning settings.

/// Initial width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Initial height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Scene layout: camera, moon mesh and lights
pub mod scene {
    /// Vertical field of view of the camera (degrees)
    pub const CAMERA_FOV_DEGREES: f32 = 75.0;

    /// Near clipping plane
    pub const CAMERA_NEAR: f32 = 0.1;

    /// Far clipping plane
    pub const CAMERA_FAR: f32 = 500.0;

    /// Camera position on the Z axis, looking at the origin
    pub const CAMERA_DISTANCE: f32 = 10.0;

    /// Moon sphere radius
    pub const MOON_RADIUS: f32 = 2.0;

    /// Longitudinal segments of the moon sphere
    pub const MOON_SECTORS: u32 = 64;

    /// Latitudinal segments of the moon sphere
    pub const MOON_STACKS: u32 = 64;

    /// Point light position
    pub const POINT_LIGHT_POSITION: [f32; 3] = [10.0, 10.0, 10.0];

    /// Point light intensity (lumens)
    pub const POINT_LIGHT_INTENSITY: f32 = 4_000_000.0;

    /// Point light range; must reach the moon from its corner position
    pub const POINT_LIGHT_RANGE: f32 = 100.0;

    /// Ambient light brightness (half of the point light's visual strength)
    pub const AMBIENT_BRIGHTNESS: f32 = 400.0;

    /// Background colour (sRGB)
    pub const CLEAR_COLOR: [f32; 3] = [0.0, 0.0, 0.0];
}

/// User controls: arrow keys and rotation speed slider
pub mod controls {
    /// Distance the moon moves per arrow key press (world units)
    pub const MOVE_STEP: f32 = 0.1;

    /// Slider minimum (radians per frame)
    pub const MIN_ROTATION_SPEED: f32 = 0.0;

    /// Slider maximum (radians per frame)
    pub const MAX_ROTATION_SPEED: f32 = 0.1;

    /// Slider step
    pub const ROTATION_SPEED_STEP: f32 = 0.001;

    /// Initial slider value
    pub const DEFAULT_ROTATION_SPEED: f32 = 0.01;

    /// Decimals shown in the speed label
    pub const SPEED_LABEL_DECIMALS: usize = 3;
}

/// Viewport limits applied to resize requests
pub mod viewport {
    /// Smallest accepted render target dimension (pixels)
    pub const MIN_DIMENSION: u32 = 16;

    /// Largest accepted render target dimension (pixels)
    pub const MAX_DIMENSION: u32 = 4096;
}

/// Moon texture settings
pub mod texture {
    /// Name of the asset directory inside the bundle's resource directory
    pub const ASSET_DIR_NAME: &str = "assets";

    /// Source-tree asset directory, last resort for `cargo run` builds
    pub const DEV_ASSET_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

    /// Moon texture, relative to the asset directory
    pub const MOON_TEXTURE_PATH: &str = "textures/moon.png";

    /// Width of the generated fallback texture
    pub const PROCEDURAL_WIDTH: u32 = 512;

    /// Height of the generated fallback texture
    pub const PROCEDURAL_HEIGHT: u32 = 256;

    /// Seed of the generated fallback texture
    pub const PROCEDURAL_SEED: u32 = 0x6d6f_6f6e;
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for printing performance stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}
