//! Input semantics shared by the Tauri commands and the Bevy systems
//!
//! Arrow keys nudge the moon in the camera plane by a fixed step, the slider
//! sets the spin rate, and resize events request a new render target size.
//! Nothing here touches Bevy or Tauri so the rules can be tested directly.

use std::collections::VecDeque;

use serde::Serialize;

use crate::config::{controls::*, viewport, RENDER_HEIGHT, RENDER_WIDTH};
use crate::error::{BridgeError, BridgeResult};

/// One of the four arrow keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

impl ArrowKey {
    /// Map a DOM `KeyboardEvent.key` name; anything else is ignored
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => None,
        }
    }

    /// Offset in the (x, y) plane for one press of `step` units
    pub fn offset(self, step: f32) -> [f32; 2] {
        match self {
            Self::Up => [0.0, step],
            Self::Down => [0.0, -step],
            Self::Left => [-step, 0.0],
            Self::Right => [step, 0.0],
        }
    }
}

/// Validate a slider value and clamp it to the slider range
pub fn clamp_rotation_speed(value: f32) -> BridgeResult<f32> {
    if !value.is_finite() {
        return Err(BridgeError::InvalidSpeed(value));
    }
    Ok(value.clamp(MIN_ROTATION_SPEED, MAX_ROTATION_SPEED))
}

/// Text shown next to the slider
pub fn format_speed_label(speed: f32) -> String {
    format!("{:.*}", SPEED_LABEL_DECIMALS, speed)
}

/// Validate a requested viewport and clamp it to the supported range
pub fn clamp_viewport(width: u32, height: u32) -> BridgeResult<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(BridgeError::InvalidViewport { width, height });
    }
    Ok((
        width.clamp(viewport::MIN_DIMENSION, viewport::MAX_DIMENSION),
        height.clamp(viewport::MIN_DIMENSION, viewport::MAX_DIMENSION),
    ))
}

/// Pending user input, written by the frontend and consumed once per frame
#[derive(Debug, Clone)]
pub struct ControlState {
    pending_moves: VecDeque<ArrowKey>,
    rotation_speed: f32,
    viewport_request: Option<(u32, u32)>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            pending_moves: VecDeque::new(),
            rotation_speed: DEFAULT_ROTATION_SPEED,
            viewport_request: None,
        }
    }
}

impl ControlState {
    /// Queue a key press; returns false for keys that are not arrows
    pub fn push_key(&mut self, name: &str) -> bool {
        match ArrowKey::from_key_name(name) {
            Some(key) => {
                self.pending_moves.push_back(key);
                true
            }
            None => false,
        }
    }

    /// Drain queued key presses in the order they arrived
    pub fn take_moves(&mut self) -> Vec<ArrowKey> {
        self.pending_moves.drain(..).collect()
    }

    /// Store a slider value, returning the value actually used
    pub fn set_rotation_speed(&mut self, value: f32) -> BridgeResult<f32> {
        self.rotation_speed = clamp_rotation_speed(value)?;
        Ok(self.rotation_speed)
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    /// Record a resize; only the latest request survives until the next frame
    pub fn request_viewport(&mut self, width: u32, height: u32) -> BridgeResult<(u32, u32)> {
        let size = clamp_viewport(width, height)?;
        self.viewport_request = Some(size);
        Ok(size)
    }

    pub fn take_viewport_request(&mut self) -> Option<(u32, u32)> {
        self.viewport_request.take()
    }
}

/// Slider and key settings handed to the frontend at start-up
#[derive(Serialize, Clone, Debug)]
pub struct ControlSettings {
    pub min_rotation_speed: f32,
    pub max_rotation_speed: f32,
    pub rotation_speed_step: f32,
    pub default_rotation_speed: f32,
    pub move_step: f32,
    pub initial_width: u32,
    pub initial_height: u32,
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            min_rotation_speed: MIN_ROTATION_SPEED,
            max_rotation_speed: MAX_ROTATION_SPEED,
            rotation_speed_step: ROTATION_SPEED_STEP,
            default_rotation_speed: DEFAULT_ROTATION_SPEED,
            move_step: MOVE_STEP,
            initial_width: RENDER_WIDTH,
            initial_height: RENDER_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_map_to_axes() {
        assert_eq!(ArrowKey::from_key_name("ArrowUp").unwrap().offset(0.1), [0.0, 0.1]);
        assert_eq!(ArrowKey::from_key_name("ArrowDown").unwrap().offset(0.1), [0.0, -0.1]);
        assert_eq!(ArrowKey::from_key_name("ArrowLeft").unwrap().offset(0.1), [-0.1, 0.0]);
        assert_eq!(ArrowKey::from_key_name("ArrowRight").unwrap().offset(0.1), [0.1, 0.0]);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut state = ControlState::default();
        assert!(!state.push_key("a"));
        assert!(!state.push_key("Up"));
        assert!(!state.push_key("arrowup"));
        assert!(state.take_moves().is_empty());
    }

    #[test]
    fn moves_drain_in_order() {
        let mut state = ControlState::default();
        assert!(state.push_key("ArrowLeft"));
        assert!(state.push_key("ArrowUp"));
        assert!(state.push_key("ArrowUp"));
        assert_eq!(
            state.take_moves(),
            vec![ArrowKey::Left, ArrowKey::Up, ArrowKey::Up]
        );
        assert!(state.take_moves().is_empty());
    }

    #[test]
    fn rotation_speed_defaults_to_slider_value() {
        assert_eq!(ControlState::default().rotation_speed(), DEFAULT_ROTATION_SPEED);
    }

    #[test]
    fn rotation_speed_is_clamped_to_slider_range() {
        let mut state = ControlState::default();
        assert_eq!(state.set_rotation_speed(0.05).unwrap(), 0.05);
        assert_eq!(state.set_rotation_speed(5.0).unwrap(), MAX_ROTATION_SPEED);
        assert_eq!(state.set_rotation_speed(-1.0).unwrap(), MIN_ROTATION_SPEED);
        assert_eq!(state.rotation_speed(), MIN_ROTATION_SPEED);
    }

    #[test]
    fn non_finite_speed_is_rejected_and_previous_kept() {
        let mut state = ControlState::default();
        state.set_rotation_speed(0.02).unwrap();
        assert!(matches!(
            state.set_rotation_speed(f32::NAN),
            Err(BridgeError::InvalidSpeed(_))
        ));
        assert!(state.set_rotation_speed(f32::INFINITY).is_err());
        assert_eq!(state.rotation_speed(), 0.02);
    }

    #[test]
    fn speed_label_has_three_decimals() {
        assert_eq!(format_speed_label(0.01), "0.010");
        assert_eq!(format_speed_label(0.0), "0.000");
        assert_eq!(format_speed_label(0.1), "0.100");
        assert_eq!(format_speed_label(0.0456), "0.046");
    }

    #[test]
    fn viewport_requests_keep_latest() {
        let mut state = ControlState::default();
        state.request_viewport(1024, 768).unwrap();
        state.request_viewport(1280, 720).unwrap();
        assert_eq!(state.take_viewport_request(), Some((1280, 720)));
        assert_eq!(state.take_viewport_request(), None);
    }

    #[test]
    fn viewport_is_validated_and_clamped() {
        assert!(clamp_viewport(0, 600).is_err());
        assert!(clamp_viewport(800, 0).is_err());
        assert_eq!(clamp_viewport(4, 10_000).unwrap(), (16, 4096));
        assert_eq!(clamp_viewport(800, 600).unwrap(), (800, 600));
    }
}
