//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration and system scheduling.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    asset::AssetPlugin,
    prelude::*,
    window::ExitCondition,
};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{error, info};

use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::systems::*;
use crate::config::{PRE_ROLL_FRAMES, TARGET_FPS};
use crate::tauri_bridge::shared_state::{
    SharedControls, SharedFrameBuffer, SharedPerfStats, SharedSceneState,
};

/// Handles shared between the Bevy thread and the Tauri side
#[derive(Clone, Default)]
pub struct BridgeHandles {
    pub frame_buffer: SharedFrameBuffer,
    pub perf_stats: SharedPerfStats,
    pub controls: SharedControls,
    pub scene_state: SharedSceneState,
}

/// Create and configure the Bevy application
///
/// `asset_dir` is where the moon texture is looked up; see
/// [`crate::bevy::texture::resolve_asset_dir`].
pub fn create_app(handles: BridgeHandles, asset_dir: PathBuf) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_dir.to_string_lossy().into_owned(),
                ..default()
            })
            .set(ImagePlugin::default_linear()),
    );

    // Add schedule runner for controlled frame rate
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    )));

    // Add custom plugins
    app.add_plugins(ImageCopyPlugin);

    // Register systems
    app.add_systems(Startup, setup_scene);
    app.add_systems(
        Update,
        (
            apply_key_moves,
            sync_rotation_speed,
            resize_render_target,
            spin_moon.after(sync_rotation_speed),
            publish_scene_state.after(spin_moon).after(apply_key_moves),
        ),
    );
    app.add_systems(Last, extract_and_process_frame);

    // Insert resources
    app.insert_resource(FrameBufferRes(handles.frame_buffer));
    app.insert_resource(PerfStatsRes(handles.perf_stats));
    app.insert_resource(ControlsRes(handles.controls));
    app.insert_resource(SceneStateRes(handles.scene_state));
    app.insert_resource(AssetDir(asset_dir));
    app.insert_resource(RotationSpeed::default());
    app.insert_resource(ViewportSize::default());
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(PRE_ROLL_FRAMES));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FrameRateLimiter::new(TARGET_FPS));

    info!("bevy app configured (headless, offscreen moon renderer)");
    app
}

/// Start Bevy in a background thread
pub fn start_bevy(handles: BridgeHandles, asset_dir: PathBuf) {
    let spawned = thread::Builder::new()
        .name("bevy-render".into())
        .spawn(move || {
            info!(asset_dir = %asset_dir.display(), "bevy thread started");
            let mut app = create_app(handles, asset_dir);
            info!("running render loop");
            app.run();
        });
    if let Err(err) = spawned {
        error!(%err, "failed to spawn bevy thread");
    }
}
