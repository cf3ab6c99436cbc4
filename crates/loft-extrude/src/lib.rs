#![warn(missing_docs)]

//! Solid extrusion builder.
//!
//! Turns chained sketch [`Profile`]s into solids. Two strategies sit
//! behind one entry point: a fast explicit mesh for interactive preview
//! and the native cross-section path for geometry that feeds booleans.
//! A revolve builder rounds out the sweep operations.

mod error;
mod preview;
mod revolve;

pub use error::{ExtrudeError, Result};
pub use revolve::revolve_profiles;

use loft_math::{Tolerance, Transform, Vec3};
use loft_mesh::SolidMesh;
use loft_sketch::{PlaneCoordSystem, Profile, SketchPlane};
use tracing::debug;

/// Extrusion extents and draft.
///
/// The solid spans from `backward` units behind the sketch plane to
/// `forward` units in front of it, along the plane normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudeParams {
    /// Extent along the plane normal, in front of the sketch.
    pub forward: f64,
    /// Extent against the plane normal, behind the sketch.
    pub backward: f64,
    /// Draft angle in radians; side walls lean outward by this much.
    pub draft_angle: f64,
}

impl ExtrudeParams {
    /// Straight extrusion of `height` in front of the sketch plane.
    pub fn forward(height: f64) -> Self {
        Self {
            forward: height,
            backward: 0.0,
            draft_angle: 0.0,
        }
    }

    /// Net height, forward plus backward extent.
    pub fn height(&self) -> f64 {
        self.forward + self.backward
    }
}

/// Which extrusion strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtrudeMode {
    /// Fast explicit mesh with fan caps. Assumes star-convex profiles
    /// and ignores draft; fine for on-screen feedback, not for booleans.
    Preview,
    /// Watertight cross-section extrusion with ear-clipped caps, hole
    /// support and draft. Use for anything that feeds the CSG engine.
    Robust,
}

/// Extrude profiles along the normal of their sketch plane.
pub fn extrude_profiles(
    profiles: &[Profile],
    cs: &PlaneCoordSystem,
    params: &ExtrudeParams,
    mode: ExtrudeMode,
) -> Result<SolidMesh> {
    if profiles.is_empty() {
        return Err(ExtrudeError::InvalidProfile(
            "no closed profiles to extrude".to_string(),
        ));
    }
    let height = params.height();
    if Tolerance::DEFAULT.is_zero(height) {
        return Err(ExtrudeError::InvalidProfile(
            "extrusion height is zero".to_string(),
        ));
    }
    debug!(?mode, height, draft = params.draft_angle, "extruding profiles");

    // Sweep starts `backward` behind the sketch plane
    let base = cs.origin - cs.normal.as_ref() * params.backward;
    let frame = Transform::from_frame(
        &base,
        cs.u_axis.as_ref(),
        cs.v_axis.as_ref(),
        cs.normal.as_ref(),
    );

    match mode {
        ExtrudeMode::Preview => preview::extrude_explicit(profiles, &frame, height),
        ExtrudeMode::Robust => {
            if height <= 0.0 {
                return Err(ExtrudeError::InvalidProfile(
                    "net extrusion height must be positive".to_string(),
                ));
            }
            let scale = draft_scale(profiles, height, params.draft_angle);
            Ok(loft_csg::extrude_cross_section(
                profiles, &frame, height, scale,
            )?)
        }
    }
}

/// Top-ring scale realizing a draft angle over the sweep height.
///
/// The walls lean so that a profile of average radius `r` ends at
/// radius `r + h·tan(draft)`; holes shrink accordingly since the whole
/// section scales about the profile centroid.
fn draft_scale(profiles: &[Profile], height: f64, draft_angle: f64) -> f64 {
    if draft_angle == 0.0 {
        return 1.0;
    }
    // Reference loop is the largest by area
    let reference = profiles
        .iter()
        .max_by(|a, b| {
            a.signed_area()
                .abs()
                .partial_cmp(&b.signed_area().abs())
                .unwrap()
        })
        .unwrap();
    let centroid = reference.vertex_centroid();
    let avg_radius = reference
        .points
        .iter()
        .map(|p| (p - centroid).norm())
        .sum::<f64>()
        / reference.points.len() as f64;
    if avg_radius < Tolerance::DEFAULT.linear {
        return 1.0;
    }
    (avg_radius + draft_angle.tan() * height) / avg_radius
}

/// Resolve cut extents against the face being cut.
///
/// A cut driven from a picked face must advance into the body: when the
/// face normal agrees with the canonical plane axis the forward and
/// backward extents trade places. Only canonical planes have a defined
/// policy; face cuts on custom frames keep their extents.
pub fn resolve_cut_extents(
    params: &ExtrudeParams,
    face_normal: Option<Vec3>,
    plane: Option<SketchPlane>,
) -> ExtrudeParams {
    if let (Some(normal), Some(plane)) = (face_normal, plane) {
        if normal.dot(&plane.normal()) > 0.0 {
            return ExtrudeParams {
                forward: params.backward,
                backward: params.forward,
                draft_angle: params.draft_angle,
            };
        }
    }
    *params
}
