//! Revolve (lathe) builder.

use loft_math::{Point2, Point3, Tolerance};
use loft_mesh::{weld_mesh, SolidMesh};
use loft_sketch::{PlaneCoordSystem, Profile, Winding};
use tracing::debug;

use crate::error::{ExtrudeError, Result};

/// Revolve profiles around the sketch v axis.
///
/// Profile u coordinates are radii and must be non-negative. A full
/// 360 degree revolve produces a closed ring of wall quads; partial
/// revolves get flat end caps. Nested hole loops are revolved as
/// independent solids, not subtracted.
pub fn revolve_profiles(
    profiles: &[Profile],
    cs: &PlaneCoordSystem,
    angle_deg: f64,
    segments: usize,
) -> Result<SolidMesh> {
    if profiles.is_empty() {
        return Err(ExtrudeError::InvalidProfile(
            "no closed profiles to revolve".to_string(),
        ));
    }
    if !(angle_deg > 0.0 && angle_deg <= 360.0) {
        return Err(ExtrudeError::InvalidProfile(
            "revolve angle must be in (0, 360] degrees".to_string(),
        ));
    }
    if segments < 3 {
        return Err(ExtrudeError::InvalidProfile(
            "revolve needs at least three segments".to_string(),
        ));
    }
    let tol = Tolerance::DEFAULT;
    for profile in profiles {
        if profile.points.iter().any(|p| p.x < -tol.linear) {
            return Err(ExtrudeError::InvalidProfile(
                "profile crosses the revolve axis".to_string(),
            ));
        }
    }

    let full = (angle_deg - 360.0).abs() < 1e-9;
    let angle = angle_deg.to_radians();
    debug!(angle_deg, segments, full, "revolving profiles");

    let frame = cs.to_transform();
    // Local position of sketch point (u, v) rotated by theta about v
    let place = |p: &Point2, theta: f64| {
        frame.apply_point(&Point3::new(
            p.x * theta.cos(),
            p.y,
            p.x * theta.sin(),
        ))
    };

    let mut mesh = SolidMesh::new();
    for profile in profiles {
        let mut profile = profile.clone();
        if profile.winding() == Winding::Cw {
            profile.reverse();
        }
        let n = profile.points.len();
        let theta_at = |k: usize| angle * k as f64 / segments as f64;

        for k in 0..segments {
            let t0 = theta_at(k);
            // Close the seam exactly on a full revolve
            let t1 = if full && k + 1 == segments {
                0.0
            } else {
                theta_at(k + 1)
            };
            for i in 0..n {
                let j = (i + 1) % n;
                let a = place(&profile.points[i], t0);
                let b = place(&profile.points[j], t0);
                let c = place(&profile.points[j], t1);
                let d = place(&profile.points[i], t1);
                mesh.push_triangle(a, b, c);
                mesh.push_triangle(a, c, d);
            }
        }

        if !full {
            let cap = loft_csg::triangulate_with_holes(&profile.points, &[])?;
            for [a, b, c] in &cap {
                // Start cap faces against the sweep, end cap with it
                mesh.push_triangle(place(a, 0.0), place(c, 0.0), place(b, 0.0));
                mesh.push_triangle(place(a, angle), place(b, angle), place(c, angle));
            }
        }
    }

    if frame.linear_determinant() < 0.0 {
        mesh.flip_orientation();
    }
    Ok(weld_mesh(&mesh, tol.linear))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use loft_sketch::SketchPlane;

    /// Washer cross section: u in [1, 2], v in [0, 1].
    fn washer_profile() -> Profile {
        Profile {
            points: vec![
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(2.0, 1.0),
                Point2::new(1.0, 1.0),
            ],
        }
    }

    #[test]
    fn test_full_revolve_washer() {
        let cs = PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0);
        let segments = 64;
        let mesh = revolve_profiles(&[washer_profile()], &cs, 360.0, segments).unwrap();
        assert!(mesh.is_manifold());
        // Inscribed-polygon washer: (outer - inner polygon area) * height
        let n = segments as f64;
        let expected = (n / 2.0) * (2.0 * std::f64::consts::PI / n).sin() * (4.0 - 1.0);
        assert_relative_eq!(mesh.signed_volume(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_quarter_revolve_with_caps() {
        let cs = PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0);
        let segments = 32;
        let mesh = revolve_profiles(&[washer_profile()], &cs, 90.0, segments).unwrap();
        assert!(mesh.is_manifold());
        let delta = 90.0_f64.to_radians() / segments as f64;
        let expected = segments as f64 * 1.5 * delta.sin();
        assert_relative_eq!(mesh.signed_volume(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_bad_parameters_rejected() {
        let cs = PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0);
        assert!(revolve_profiles(&[washer_profile()], &cs, 0.0, 16).is_err());
        assert!(revolve_profiles(&[washer_profile()], &cs, 361.0, 16).is_err());
        assert!(revolve_profiles(&[washer_profile()], &cs, 90.0, 2).is_err());
        assert!(revolve_profiles(&[], &cs, 90.0, 16).is_err());
    }

    #[test]
    fn test_axis_crossing_profile_rejected() {
        let cs = PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0);
        let crossing = Profile {
            points: vec![
                Point2::new(-1.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
            ],
        };
        assert!(revolve_profiles(&[crossing], &cs, 360.0, 16).is_err());
    }
}
