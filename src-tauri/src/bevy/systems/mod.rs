//! Bevy systems
//!
//! This module contains all the systems that operate on entities
//! and resources in the Bevy ECS.

pub mod scene;
pub mod input;
pub mod camera;
pub mod animation;
pub mod snapshot;
pub mod frame_extraction;

pub use scene::setup_scene;
pub use input::{apply_key_moves, sync_rotation_speed};
pub use camera::resize_render_target;
pub use animation::spin_moon;
pub use snapshot::publish_scene_state;
pub use frame_extraction::extract_and_process_frame;
