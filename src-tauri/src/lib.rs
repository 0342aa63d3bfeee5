//! Moonview: a textured moon rendered headless by Bevy inside a Tauri window
//!
//! The page hosts the controls (a rotation speed slider with its label) and
//! an output container. Arrow keys nudge the moon, the slider sets how far it
//! spins each frame, and resizing the window resizes the render target.
//!
//! Architecture:
//! - Bevy runs in a background thread with NO window (headless mode)
//! - The camera renders into an offscreen image; an `ImageCopyDriver` node
//!   copies it to a buffer that is read back on the CPU every frame
//! - Frames reach the page through the `frame://` custom protocol (JPEG)
//!   or, as a fallback, a Base64 RGBA command
//! - Input flows the other way through Tauri commands into shared state
//!   that Bevy drains once per frame
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `controls`: Key, slider and resize semantics
//! - `error`: Bridge error type
//! - `tauri_bridge`: Bridge layer between Tauri and Bevy
//!   - `shared_state`: Thread-safe data structures
//!   - `commands`: Tauri command handlers
//!   - `protocol`: Custom protocol handlers
//! - `bevy`: Bevy engine integration
//!   - `components`: ECS components
//!   - `resources`: Global resources
//!   - `plugins`: Custom plugins
//!   - `systems`: Scene, input, resize, animation and frame systems
//!   - `texture`: Moon texture loading
//!   - `app`: Application setup

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Module declarations
mod bevy;
mod config;
mod controls;
mod error;
mod tauri_bridge;

use tauri::Manager;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "info,wgpu=warn,naga=warn";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A second call (tests, re-entry) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Main entry point for the Tauri application
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();
    info!("starting moonview");

    // Shared state; Bevy starts in `setup` once the resource dir is known
    let handles = bevy::BridgeHandles::default();
    let bevy_handles = handles.clone();

    // Clone for the custom protocol handler
    let protocol_buffer = handles.frame_buffer.clone();
    let protocol_perf_stats = handles.perf_stats.clone();

    // Build and run Tauri application
    let result = tauri::Builder::default()
        .setup(move |app| {
            let resource_dir = app.path().resource_dir().ok();
            let candidates = bevy::texture::asset_dir_candidates(resource_dir);
            let asset_dir = bevy::texture::resolve_asset_dir(&candidates);
            bevy::start_bevy(bevy_handles, asset_dir);
            Ok(())
        })
        .manage(handles.frame_buffer)
        .manage(handles.perf_stats)
        .manage(handles.controls)
        .manage(handles.scene_state)
        // Register custom protocol "frame://" for direct binary transfer
        .register_asynchronous_uri_scheme_protocol("frame", move |_ctx, request, responder| {
            let buffer = protocol_buffer.clone();
            let perf_stats = protocol_perf_stats.clone();

            // Handle the request in a separate thread to avoid blocking
            std::thread::spawn(move || {
                // For Tauri v2, URL format is: http://frame.localhost/path
                let response = tauri_bridge::protocol::handle_frame_protocol(
                    request.uri().path(),
                    &buffer,
                    &perf_stats,
                );
                responder.respond(response);
            });
        })
        .invoke_handler(tauri::generate_handler![
            tauri_bridge::commands::send_key_input,
            tauri_bridge::commands::set_rotation_speed,
            tauri_bridge::commands::resize_viewport,
            tauri_bridge::commands::get_control_settings,
            tauri_bridge::commands::get_scene_state,
            tauri_bridge::commands::get_frame,
            tauri_bridge::commands::get_render_size,
            tauri_bridge::commands::get_performance_stats
        ])
        .run(tauri::generate_context!());

    if let Err(err) = result {
        error!(%err, "tauri application failed");
        std::process::exit(1);
    }
}
