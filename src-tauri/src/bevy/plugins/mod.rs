//! Bevy plugins
//!
//! Render-world extensions; currently only the offscreen frame readback.

pub mod image_copy;

pub use image_copy::{ImageCopier, ImageCopyPlugin};
