//! Sketch-layer errors.

use thiserror::Error;

/// Errors produced by the sketch layer.
#[derive(Debug, Error)]
pub enum SketchError {
    /// The axes supplied for a custom plane frame are not orthonormal.
    #[error("invalid plane frame: {0}")]
    InvalidFrame(String),
}

/// Convenience alias for sketch results.
pub type Result<T> = std::result::Result<T, SketchError>;
