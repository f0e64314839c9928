//! Error types for the scene crate.

use thiserror::Error;

/// Errors raised by the camera and the scene manager.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// `unguard` was called without a matching `guard`.
    #[error("Scene manager is not guarded")]
    NotGuarded,

    /// A viewport dimension was zero.
    #[error("Invalid viewport size {width}x{height}")]
    InvalidViewport { width: u32, height: u32 },

    /// A zoom value outside the configured range or not finite.
    #[error("Invalid zoom {0} metres per pixel")]
    InvalidZoom(f64),

    /// Minimum and maximum zoom are not ordered.
    #[error("Invalid zoom range [{min}, {max}]")]
    InvalidZoomRange { min: f64, max: f64 },
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
