//! Shared state structures for communication between Tauri and Bevy
//!
//! This module defines thread-safe data structures that allow bidirectional
//! communication between the Tauri frontend and the Bevy render backend.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::controls::ControlState;
use crate::error::{BridgeError, BridgeResult};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &'static str) -> BridgeResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| BridgeError::LockPoisoned(what))
}

// =============================================================================
// Frame Buffer
// =============================================================================

/// One rendered frame of tightly packed RGBA8 pixels
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Frame {
    /// Wrap pixel data, checking it matches the declared size
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> BridgeResult<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(BridgeError::FrameSize {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

/// Thread-safe frame buffer shared between Bevy and Tauri
#[derive(Clone, Default)]
pub struct SharedFrameBuffer(pub Arc<Mutex<Option<Frame>>>);

impl SharedFrameBuffer {
    pub fn publish(&self, frame: Frame) -> BridgeResult<()> {
        *lock(&self.0, "frame buffer")? = Some(frame);
        Ok(())
    }

    /// Clone of the latest frame
    pub fn latest(&self) -> BridgeResult<Frame> {
        lock(&self.0, "frame buffer")?
            .clone()
            .ok_or(BridgeError::FrameNotReady)
    }

    /// Size of the latest frame, without copying its pixels
    pub fn latest_size(&self) -> BridgeResult<(u32, u32)> {
        lock(&self.0, "frame buffer")?
            .as_ref()
            .map(|frame| (frame.width, frame.height))
            .ok_or(BridgeError::FrameNotReady)
    }
}

/// Frame response containing Base64-encoded RGBA pixel data
#[derive(Serialize, Deserialize)]
pub struct FrameResponse {
    /// Base64-encoded RGBA pixel data (avoids slow JSON array serialization)
    pub data: String,
    pub width: u32,
    pub height: u32,
}

// =============================================================================
// User Controls
// =============================================================================

/// Thread-safe controls written by commands and drained by Bevy each frame
#[derive(Clone, Default)]
pub struct SharedControls(pub Arc<Mutex<ControlState>>);

impl SharedControls {
    pub fn with<R>(&self, f: impl FnOnce(&mut ControlState) -> R) -> BridgeResult<R> {
        let mut guard = lock(&self.0, "controls")?;
        Ok(f(&mut guard))
    }
}

// =============================================================================
// Scene Snapshot
// =============================================================================

/// Latest moon state as seen by the renderer
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SceneSnapshot {
    pub position: [f32; 3],
    pub rotation_y: f32,
    pub rotation_speed: f32,
    pub viewport: (u32, u32),
    pub frame_count: u32,
}

/// Thread-safe scene snapshot published by Bevy
#[derive(Clone, Default)]
pub struct SharedSceneState(pub Arc<Mutex<SceneSnapshot>>);

impl SharedSceneState {
    pub fn publish(&self, snapshot: SceneSnapshot) -> BridgeResult<()> {
        *lock(&self.0, "scene state")? = snapshot;
        Ok(())
    }

    pub fn snapshot(&self) -> BridgeResult<SceneSnapshot> {
        Ok(lock(&self.0, "scene state")?.clone())
    }
}

// =============================================================================
// Performance Statistics
// =============================================================================

/// Performance statistics for debugging and monitoring
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct PerformanceStats {
    // Backend (Bevy/Rust) timings
    pub gpu_transfer_ms: f64,
    pub data_processing_ms: f64,
    pub frame_encoding_ms: f64,
    pub bevy_fps: f64,
    pub frame_count: u32,
    pub data_size_kb: f64,
    // Tauri command timings
    pub tauri_get_frame_ms: f64,
    pub tauri_serialize_ms: f64,
}

/// Thread-safe performance statistics
#[derive(Clone, Default)]
pub struct SharedPerfStats(pub Arc<Mutex<PerformanceStats>>);

impl SharedPerfStats {
    pub fn with<R>(&self, f: impl FnOnce(&mut PerformanceStats) -> R) -> BridgeResult<R> {
        let mut guard = lock(&self.0, "performance stats")?;
        Ok(f(&mut guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_rejects_wrong_length() {
        assert!(Frame::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            Frame::new(2, 2, vec![0; 12]),
            Err(BridgeError::FrameSize {
                expected: 16,
                actual: 12
            })
        ));
    }

    #[test]
    fn empty_buffer_reports_not_ready() {
        let buffer = SharedFrameBuffer::default();
        assert!(matches!(buffer.latest(), Err(BridgeError::FrameNotReady)));

        buffer.publish(Frame::new(1, 1, vec![1, 2, 3, 4]).unwrap()).unwrap();
        assert_eq!(buffer.latest().unwrap().rgba, vec![1, 2, 3, 4]);
    }

    #[test]
    fn render_size_follows_latest_frame() {
        let buffer = SharedFrameBuffer::default();
        assert!(matches!(
            buffer.latest_size(),
            Err(BridgeError::FrameNotReady)
        ));

        buffer.publish(Frame::new(4, 2, vec![0; 32]).unwrap()).unwrap();
        assert_eq!(buffer.latest_size().unwrap(), (4, 2));

        // A resize only shows once a frame of the new size lands
        buffer.publish(Frame::new(2, 3, vec![0; 24]).unwrap()).unwrap();
        assert_eq!(buffer.latest_size().unwrap(), (2, 3));
    }

    #[test]
    fn controls_are_shared_between_clones() {
        let controls = SharedControls::default();
        let other = controls.clone();
        controls.with(|c| c.push_key("ArrowUp")).unwrap();
        assert_eq!(other.with(|c| c.take_moves().len()).unwrap(), 1);
    }

    #[test]
    fn poisoned_lock_is_an_error() {
        let state = SharedSceneState::default();
        let poisoned = state.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoned.0.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(matches!(
            state.snapshot(),
            Err(BridgeError::LockPoisoned("scene state"))
        ));
    }
}
