//! Explicit preview extrusion.
//!
//! The fast path for interactive feedback: caps are fanned from the
//! profile centroid, so concave profiles over-cover and holes are not
//! cut. Good enough on screen, never fed to booleans.

use loft_math::{Point2, Point3, Tolerance, Transform};
use loft_mesh::{weld_mesh, SolidMesh};
use loft_sketch::{Profile, Winding};

use crate::error::Result;

/// Fan-capped prism for each profile, swept from `w = 0` to
/// `w = height` in the local frame. Negative heights sweep backward
/// with the winding flipped so normals stay outward.
pub fn extrude_explicit(
    profiles: &[Profile],
    frame: &Transform,
    height: f64,
) -> Result<SolidMesh> {
    let mut mesh = SolidMesh::new();
    let lift = |p: &Point2, w: f64| frame.apply_point(&Point3::new(p.x, p.y, w));

    for profile in profiles {
        let mut profile = profile.clone();
        if profile.winding() == Winding::Cw {
            profile.reverse();
        }
        let centroid = profile.vertex_centroid();
        let n = profile.points.len();

        for i in 0..n {
            let j = (i + 1) % n;
            let (pi, pj) = (profile.points[i], profile.points[j]);
            let c0 = lift(&centroid, 0.0);
            let c1 = lift(&centroid, height);
            let b_i = lift(&pi, 0.0);
            let b_j = lift(&pj, 0.0);
            let t_i = lift(&pi, height);
            let t_j = lift(&pj, height);
            // Bottom cap faces -w, top cap +w
            mesh.push_triangle(c0, b_j, b_i);
            mesh.push_triangle(c1, t_i, t_j);
            // Walls
            mesh.push_triangle(b_i, b_j, t_j);
            mesh.push_triangle(b_i, t_j, t_i);
        }
    }

    if (height < 0.0) != (frame.linear_determinant() < 0.0) {
        mesh.flip_orientation();
    }
    Ok(weld_mesh(&mesh, Tolerance::DEFAULT.linear))
}
