//! Boolean engine errors.

use thiserror::Error;

/// Errors produced by boolean operations and the cross-section extruder.
#[derive(Debug, Error)]
pub enum CsgError {
    /// An operand is not a closed 2-manifold surface after welding.
    #[error("{operand} operand is not a closed manifold mesh")]
    NonManifoldInput {
        /// Which operand failed the check ("first" or "second").
        operand: &'static str,
    },

    /// The operation produced no geometry.
    #[error("boolean operation produced an empty result")]
    EmptyResult,

    /// A cross-section loop cannot be triangulated or extruded.
    #[error("invalid profile: {0}")]
    InvalidProfile(String),
}

/// Convenience alias for boolean-engine results.
pub type Result<T> = std::result::Result<T, CsgError>;
