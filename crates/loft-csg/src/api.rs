//! Public boolean API.

use loft_math::Tolerance;
use loft_mesh::{weld_mesh, SolidMesh};
use tracing::debug;

use crate::convert::{mesh_to_polygons, polygons_to_mesh};
use crate::error::{CsgError, Result};
use crate::ops;

/// A boolean operation between two solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    /// Material of either operand.
    Union,
    /// Material of the first operand minus the second.
    Difference,
    /// Material common to both operands.
    Intersection,
}

/// Handle to the boolean engine.
///
/// Construction is cheap; the engine layer keeps one instance alive for
/// the life of the service and hands out shared references.
#[derive(Debug, Clone)]
pub struct CsgBackend {
    weld_tolerance: f64,
}

impl CsgBackend {
    /// Backend with the default weld tolerance.
    pub fn new() -> Self {
        Self {
            weld_tolerance: Tolerance::DEFAULT.linear,
        }
    }

    /// Apply `op` to two solids.
    ///
    /// Both operands are welded and must be closed manifolds. Solids
    /// whose bounding boxes are disjoint short-circuit: a union is a
    /// plain merge, while a difference or intersection that cannot
    /// remove or share material is reported as [`CsgError::EmptyResult`].
    pub fn boolean(&self, op: BooleanOp, a: &SolidMesh, b: &SolidMesh) -> Result<SolidMesh> {
        let a = weld_mesh(a, self.weld_tolerance);
        let b = weld_mesh(b, self.weld_tolerance);
        if !a.is_manifold() {
            return Err(CsgError::NonManifoldInput { operand: "first" });
        }
        if !b.is_manifold() {
            return Err(CsgError::NonManifoldInput { operand: "second" });
        }

        if !a.aabb().expand(self.weld_tolerance).overlaps(&b.aabb()) {
            debug!(?op, "operands disjoint, short-circuiting");
            return match op {
                BooleanOp::Union => {
                    let mut merged = a.clone();
                    merged.merge(&b);
                    Ok(merged)
                }
                BooleanOp::Difference | BooleanOp::Intersection => Err(CsgError::EmptyResult),
            };
        }

        let pa = mesh_to_polygons(&a);
        let pb = mesh_to_polygons(&b);
        debug!(?op, a_polys = pa.len(), b_polys = pb.len(), "running boolean");
        let result = match op {
            BooleanOp::Union => ops::union(pa, pb),
            BooleanOp::Difference => ops::difference(pa, pb),
            BooleanOp::Intersection => ops::intersection(pa, pb),
        };

        let mesh = polygons_to_mesh(&result, self.weld_tolerance);
        if mesh.is_empty() {
            return Err(CsgError::EmptyResult);
        }
        debug!(
            vertices = mesh.num_vertices(),
            triangles = mesh.num_triangles(),
            "boolean complete"
        );
        Ok(mesh)
    }
}

impl Default for CsgBackend {
    fn default() -> Self {
        Self::new()
    }
}
