//! Engine-level errors.

use thiserror::Error;

use crate::BodyId;

/// Errors surfaced by [`crate::GeometryEngine`] operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The sketch produced no closed profile to build from.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// A referenced body is not in the cache.
    #[error("no solid cached for body {0:?}")]
    MissingGeometry(BodyId),

    /// The extrusion builder failed.
    #[error(transparent)]
    Extrude(#[from] loft_extrude::ExtrudeError),

    /// The boolean engine failed (non-manifold input, empty result).
    #[error(transparent)]
    Csg(#[from] loft_csg::CsgError),

    /// Solid (de)serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias for engine results.
pub type Result<T> = std::result::Result<T, EngineError>;
