#![warn(missing_docs)]

//! Boolean solid modeling for the loft pipeline.
//!
//! Solids arrive as welded [`loft_mesh::SolidMesh`]es, get lifted into
//! BSP trees of convex polygons, and are combined with the classic
//! clip-and-merge recipes. Results come back as welded triangle meshes
//! with normals left to the mesh layer to recompute.
//!
//! The crate also hosts the native cross-section extruder used by the
//! robust extrusion path, since it shares the polygon plumbing and the
//! cap triangulator.

mod api;
mod bsp;
mod convert;
mod cross_section;
mod error;
mod ops;
mod triangulate;

pub use api::{BooleanOp, CsgBackend};
pub use cross_section::extrude_cross_section;
pub use error::{CsgError, Result};
pub use triangulate::triangulate_with_holes;
