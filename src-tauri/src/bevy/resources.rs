//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use bevy::prelude::*;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{controls::DEFAULT_ROTATION_SPEED, RENDER_HEIGHT, RENDER_WIDTH};
use crate::tauri_bridge::shared_state::{
    SharedControls, SharedFrameBuffer, SharedPerfStats, SharedSceneState,
};

// =============================================================================
// User Controls
// =============================================================================

/// Resource to hold shared controls in Bevy
#[derive(Resource)]
pub struct ControlsRes(pub SharedControls);

/// Spin rate applied each frame (radians per frame)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct RotationSpeed(pub f32);

impl Default for RotationSpeed {
    fn default() -> Self {
        Self(DEFAULT_ROTATION_SPEED)
    }
}

/// Resource to publish the moon state for the frontend
#[derive(Resource)]
pub struct SceneStateRes(pub SharedSceneState);

// =============================================================================
// Rendering
// =============================================================================

/// Directory the asset server reads from, resolved at start-up
#[derive(Resource, Debug, Clone)]
pub struct AssetDir(pub PathBuf);

/// Current size of the offscreen render target
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: RENDER_WIDTH,
            height: RENDER_HEIGHT,
        }
    }
}

impl ViewportSize {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Shared frame buffer resource for Bevy
#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames rendered
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: std::time::Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: std::time::Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }
}

impl Default for FrameRateLimiter {
    fn default() -> Self {
        Self::new(60.0) // Default to 60 FPS
    }
}

// =============================================================================
// Performance Monitoring
// =============================================================================

/// Performance timing tracker for frame processing
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_print_time: f64,
    pub frame_times: Vec<f64>,
}

/// Shared performance statistics resource
#[derive(Resource)]
pub struct PerfStatsRes(pub SharedPerfStats);

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

use crossbeam_channel::{Receiver, Sender};

/// A frame read back from the GPU, rows still padded to the copy alignment
pub struct RenderedFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Receives data from render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<RenderedFrame>);

/// Sends data to main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<RenderedFrame>);
