//! Bevy component definitions
//!
//! This module contains all component markers and data structures used
//! to tag and identify entities in the Bevy ECS (Entity Component System).

use bevy::prelude::*;

/// Marker component for the offscreen rendering camera
///
/// Entities with this component are cameras that render to an offscreen
/// texture instead of a window.
#[derive(Component)]
pub struct OffscreenCamera;

/// Marker component for the moon mesh moved by the arrow keys
#[derive(Component)]
pub struct Moon;

/// Accumulated rotation about the Y axis (radians, kept in `[0, 2π)`)
#[derive(Component, Default, Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub angle: f32,
}

impl Spin {
    /// Advance by `delta` radians, wrapping around a full turn
    pub fn advance(&mut self, delta: f32) {
        self.angle = (self.angle + delta).rem_euclid(std::f32::consts::TAU);
    }
}
