//! Error types for the Tauri bridge

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors reported to the frontend or the `frame://` protocol
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("shared state lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("rotation speed must be a finite number, got {0}")]
    InvalidSpeed(f32),

    #[error("viewport must be non-empty, got {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("no frame yet (scene still loading)")]
    FrameNotReady,

    #[error("frame buffer has {actual} bytes, expected {expected}")]
    FrameSize { expected: usize, actual: usize },

    #[error("image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("http response error: {0}")]
    Http(#[from] tauri::http::Error),
}

// Tauri commands need a serializable error; the frontend only shows the message.
impl Serialize for BridgeError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
