//! Tauri command handlers
//!
//! This module contains all the Tauri command functions that can be invoked
//! from the frontend JavaScript code.

use base64::{engine::general_purpose::STANDARD, Engine};
use tauri::State;
use tracing::debug;

use super::shared_state::{
    FrameResponse, PerformanceStats, SceneSnapshot, SharedControls, SharedFrameBuffer,
    SharedPerfStats, SharedSceneState,
};
use crate::controls::{format_speed_label, ControlSettings};
use crate::error::BridgeResult;

/// Queue an arrow key press from the page's `keydown` listener
///
/// Returns whether the key moves the moon; other keys are ignored.
#[tauri::command]
pub fn send_key_input(state: State<SharedControls>, key: String) -> BridgeResult<bool> {
    let handled = state.with(|controls| controls.push_key(&key))?;
    if handled {
        debug!(%key, "queued move");
    }
    Ok(handled)
}

/// Store the slider value and return the label text to display
#[tauri::command]
pub fn set_rotation_speed(state: State<SharedControls>, speed: f32) -> BridgeResult<String> {
    let speed = state.with(|controls| controls.set_rotation_speed(speed))??;
    debug!(speed, "rotation speed changed");
    Ok(format_speed_label(speed))
}

/// Request a new render target size after the window was resized
#[tauri::command]
pub fn resize_viewport(
    state: State<SharedControls>,
    width: u32,
    height: u32,
) -> BridgeResult<(u32, u32)> {
    state.with(|controls| controls.request_viewport(width, height))?
}

/// Slider range and key step, so the page is configured from one place
#[tauri::command]
pub fn get_control_settings() -> ControlSettings {
    ControlSettings::default()
}

/// Latest moon position, spin and viewport as published by the renderer
#[tauri::command]
pub fn get_scene_state(state: State<SharedSceneState>) -> BridgeResult<SceneSnapshot> {
    state.snapshot()
}

/// Get the current rendered frame as Base64-encoded RGBA data
#[tauri::command]
pub fn get_frame(
    state: State<SharedFrameBuffer>,
    perf_state: State<SharedPerfStats>,
) -> BridgeResult<FrameResponse> {
    let cmd_start = std::time::Instant::now();

    let frame = state.latest()?;
    let data_fetch_time = cmd_start.elapsed().as_secs_f64() * 1000.0;

    // Measure Base64 encoding time
    let encode_start = std::time::Instant::now();
    let base64_data = STANDARD.encode(&frame.rgba);
    let encode_time = encode_start.elapsed().as_secs_f64() * 1000.0;

    perf_state.with(|stats| {
        stats.tauri_get_frame_ms = data_fetch_time;
        stats.tauri_serialize_ms = encode_time;
    })?;

    Ok(FrameResponse {
        data: base64_data,
        width: frame.width,
        height: frame.height,
    })
}

/// Get the size of the latest frame
#[tauri::command]
pub fn get_render_size(state: State<SharedFrameBuffer>) -> BridgeResult<(u32, u32)> {
    state.latest_size()
}

/// Get performance statistics
#[tauri::command]
pub fn get_performance_stats(state: State<SharedPerfStats>) -> BridgeResult<PerformanceStats> {
    state.with(|stats| stats.clone())
}
