//! Extrusion errors.

use thiserror::Error;

/// Errors produced by the extrusion and revolve builders.
#[derive(Debug, Error)]
pub enum ExtrudeError {
    /// The sketch yields no usable closed profile, or the parameters
    /// describe a degenerate solid.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),

    /// The cross-section builder rejected the profiles.
    #[error(transparent)]
    Csg(#[from] loft_csg::CsgError),
}

/// Convenience alias for extrusion results.
pub type Result<T> = std::result::Result<T, ExtrudeError>;
