//! Native cross-section extrusion.
//!
//! The robust extrusion path: profile loops are sorted into outer
//! boundaries and holes, caps are ear clipped (holes bridged in), and
//! side walls are swept between the bottom and a possibly scaled top
//! ring. Output is watertight and safe to feed straight into booleans.

use loft_math::{Point2, Point3, Transform};
use loft_mesh::{weld_mesh, SolidMesh};
use loft_sketch::{Profile, Winding};
use tracing::debug;

use crate::error::{CsgError, Result};
use crate::triangulate::triangulate_with_holes;

/// Extrude profile loops along the local w axis of `frame`.
///
/// `frame` maps local `(u, v, w)` to world space; the sweep runs from
/// `w = 0` to `w = height`. `top_scale` scales the top ring about each
/// outer loop's centroid (1.0 for straight walls, used for draft).
/// Loops wound either way are accepted; holes are detected by
/// containment.
pub fn extrude_cross_section(
    profiles: &[Profile],
    frame: &Transform,
    height: f64,
    top_scale: f64,
) -> Result<SolidMesh> {
    if profiles.is_empty() {
        return Err(CsgError::InvalidProfile("no closed profiles".to_string()));
    }
    if height <= 0.0 {
        return Err(CsgError::InvalidProfile(
            "extrusion height must be positive".to_string(),
        ));
    }
    if top_scale <= 0.0 {
        return Err(CsgError::InvalidProfile(
            "top scale must be positive".to_string(),
        ));
    }

    let regions = classify_regions(profiles);
    debug!(
        profiles = profiles.len(),
        regions = regions.len(),
        height,
        top_scale,
        "extruding cross section"
    );

    let mut mesh = SolidMesh::new();
    for region in &regions {
        build_region(&mut mesh, region, frame, height, top_scale)?;
    }
    // Mirroring frames (the canonical XZ plane is one) flip orientation
    if frame.linear_determinant() < 0.0 {
        mesh.flip_orientation();
    }
    Ok(weld_mesh(&mesh, loft_math::Tolerance::DEFAULT.linear))
}

/// One solid region: an outer boundary plus the holes it contains.
struct Region {
    outer: Profile,
    holes: Vec<Profile>,
}

/// Sort loops into outers and holes by containment depth.
///
/// A loop inside an odd number of other loops is a hole; it belongs to
/// the smallest outer that contains it. Windings are normalized here:
/// outers CCW, holes CW.
fn classify_regions(profiles: &[Profile]) -> Vec<Region> {
    let depth: Vec<usize> = profiles
        .iter()
        .enumerate()
        .map(|(i, p)| {
            profiles
                .iter()
                .enumerate()
                .filter(|&(j, other)| j != i && other.contains(&p.points[0]))
                .count()
        })
        .collect();

    let mut regions: Vec<(usize, Region)> = Vec::new();
    for (i, profile) in profiles.iter().enumerate() {
        if depth[i] % 2 == 0 {
            let mut outer = profile.clone();
            if outer.winding() == Winding::Cw {
                outer.reverse();
            }
            regions.push((
                i,
                Region {
                    outer,
                    holes: Vec::new(),
                },
            ));
        }
    }
    for (i, profile) in profiles.iter().enumerate() {
        if depth[i] % 2 == 1 {
            // Smallest containing outer is the immediate parent
            let parent = regions
                .iter_mut()
                .filter(|(j, _)| profiles[*j].contains(&profile.points[0]))
                .min_by(|(a, _), (b, _)| {
                    let area_a = profiles[*a].signed_area().abs();
                    let area_b = profiles[*b].signed_area().abs();
                    area_a.partial_cmp(&area_b).unwrap()
                });
            if let Some((_, region)) = parent {
                let mut hole = profile.clone();
                if hole.winding() == Winding::Ccw {
                    hole.reverse();
                }
                region.holes.push(hole);
            }
        }
    }
    regions.into_iter().map(|(_, r)| r).collect()
}

fn build_region(
    mesh: &mut SolidMesh,
    region: &Region,
    frame: &Transform,
    height: f64,
    top_scale: f64,
) -> Result<()> {
    let centroid = region.outer.vertex_centroid();
    let scale_top = |p: &Point2| {
        Point2::new(
            centroid.x + top_scale * (p.x - centroid.x),
            centroid.y + top_scale * (p.y - centroid.y),
        )
    };
    let lift = |p: &Point2, w: f64| frame.apply_point(&Point3::new(p.x, p.y, w));

    // Caps
    let hole_slices: Vec<&[Point2]> = region.holes.iter().map(|h| h.points.as_slice()).collect();
    let cap = triangulate_with_holes(&region.outer.points, &hole_slices)?;
    for [a, b, c] in &cap {
        // Bottom cap faces -w
        mesh.push_triangle(lift(a, 0.0), lift(c, 0.0), lift(b, 0.0));
        // Top cap faces +w
        mesh.push_triangle(
            lift(&scale_top(a), height),
            lift(&scale_top(b), height),
            lift(&scale_top(c), height),
        );
    }

    // Side walls; outer CCW and holes CW both face outward this way
    for loop_points in std::iter::once(&region.outer.points)
        .chain(region.holes.iter().map(|h| &h.points))
    {
        let n = loop_points.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let b_i = lift(&loop_points[i], 0.0);
            let b_j = lift(&loop_points[j], 0.0);
            let t_i = lift(&scale_top(&loop_points[i]), height);
            let t_j = lift(&scale_top(&loop_points[j]), height);
            mesh.push_triangle(b_i, b_j, t_j);
            mesh.push_triangle(b_i, t_j, t_i);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square_profile(cx: f64, cy: f64, half: f64) -> Profile {
        Profile {
            points: vec![
                Point2::new(cx - half, cy - half),
                Point2::new(cx + half, cy - half),
                Point2::new(cx + half, cy + half),
                Point2::new(cx - half, cy + half),
            ],
        }
    }

    #[test]
    fn test_square_prism() {
        let mesh = extrude_cross_section(
            &[square_profile(0.0, 0.0, 1.0)],
            &Transform::identity(),
            3.0,
            1.0,
        )
        .unwrap();
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.signed_volume(), 12.0, epsilon = 1e-9);
        let aabb = mesh.aabb();
        assert_relative_eq!(aabb.min.z, 0.0);
        assert_relative_eq!(aabb.max.z, 3.0);
    }

    #[test]
    fn test_hole_makes_a_tube() {
        let outer = square_profile(0.0, 0.0, 2.0);
        let hole = square_profile(0.0, 0.0, 1.0);
        let mesh = extrude_cross_section(
            &[outer, hole],
            &Transform::identity(),
            1.0,
            1.0,
        )
        .unwrap();
        assert!(mesh.is_manifold());
        // Cross-section area 16 - 4 = 12
        assert_relative_eq!(mesh.signed_volume(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_winding_is_normalized() {
        let mut cw = square_profile(0.0, 0.0, 1.0);
        cw.reverse();
        let mesh =
            extrude_cross_section(&[cw], &Transform::identity(), 2.0, 1.0).unwrap();
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.signed_volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_top_scale_tapers() {
        let mesh = extrude_cross_section(
            &[square_profile(0.0, 0.0, 1.0)],
            &Transform::identity(),
            1.0,
            1.5,
        )
        .unwrap();
        assert!(mesh.is_manifold());
        let aabb = mesh.aabb();
        assert_relative_eq!(aabb.max.x, 1.5, epsilon = 1e-9);
        assert_relative_eq!(aabb.min.x, -1.5, epsilon = 1e-9);
        // Frustum volume between a 2x2 and a 3x3 square cap
        let expected = (4.0 + 9.0 + (4.0f64 * 9.0).sqrt()) / 3.0;
        assert_relative_eq!(mesh.signed_volume(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_frame_places_solid() {
        use loft_math::Vec3;
        // Sketch on the XZ plane: u = X, v = Z, w = Y
        let frame = Transform::from_frame(
            &Point3::new(0.0, 5.0, 0.0),
            &Vec3::x(),
            &Vec3::z(),
            &Vec3::y(),
        );
        let mesh =
            extrude_cross_section(&[square_profile(0.0, 0.0, 1.0)], &frame, 2.0, 1.0)
                .unwrap();
        let aabb = mesh.aabb();
        assert_relative_eq!(aabb.min.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(aabb.max.y, 7.0, epsilon = 1e-9);
        assert_relative_eq!(aabb.min.z, -1.0, epsilon = 1e-9);
        // The frame mirrors (u x v = -w); orientation must still be outward
        assert!(mesh.is_manifold());
        assert_relative_eq!(mesh.signed_volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(extrude_cross_section(&[], &Transform::identity(), 1.0, 1.0).is_err());
        assert!(extrude_cross_section(
            &[square_profile(0.0, 0.0, 1.0)],
            &Transform::identity(),
            0.0,
            1.0
        )
        .is_err());
    }
}
