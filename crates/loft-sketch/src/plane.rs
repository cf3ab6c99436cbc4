//! Sketch plane coordinate systems.

use loft_math::{Dir3, Point2, Point3, Tolerance, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SketchError};

/// One of the three canonical sketch planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SketchPlane {
    /// The world XY plane, normal +Z.
    Xy,
    /// The world XZ plane, normal +Y.
    Xz,
    /// The world YZ plane, normal +X.
    Yz,
}

impl SketchPlane {
    /// World normal of this plane.
    pub fn normal(&self) -> Vec3 {
        match self {
            SketchPlane::Xy => Vec3::z(),
            SketchPlane::Xz => Vec3::y(),
            SketchPlane::Yz => Vec3::x(),
        }
    }
}

/// An orthonormal frame mapping 2D sketch coordinates into world space.
///
/// A sketch point `(u, v)` maps to `origin + u·u_axis + v·v_axis`; the
/// normal points out of the sketch and gives the default extrusion
/// direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneCoordSystem {
    /// World-space origin of the sketch.
    pub origin: Point3,
    /// In-plane u direction.
    pub u_axis: Dir3,
    /// In-plane v direction.
    pub v_axis: Dir3,
    /// Plane normal, `u × v` up to sign. The canonical XZ frame is
    /// left-handed (`u × v = -n`); builders detect that through the
    /// frame determinant and flip mesh orientation.
    pub normal: Dir3,
}

impl PlaneCoordSystem {
    /// Frame for a canonical plane offset along its normal.
    ///
    /// Axis assignments keep sketch u/v aligned with ascending world
    /// axes: XY maps u to X and v to Y, XZ maps u to X and v to Z, and
    /// YZ maps u to Y and v to Z.
    pub fn axis_aligned(plane: SketchPlane, offset: f64) -> Self {
        let (u, v, n) = match plane {
            SketchPlane::Xy => (Vec3::x(), Vec3::y(), Vec3::z()),
            SketchPlane::Xz => (Vec3::x(), Vec3::z(), Vec3::y()),
            SketchPlane::Yz => (Vec3::y(), Vec3::z(), Vec3::x()),
        };
        Self {
            origin: Point3::origin() + n * offset,
            u_axis: Dir3::new_unchecked(u),
            v_axis: Dir3::new_unchecked(v),
            normal: Dir3::new_unchecked(n),
        }
    }

    /// Frame from explicit axes, which must be unit-length and mutually
    /// perpendicular with `normal = ±(u × v)`. Both handednesses are
    /// accepted; the caller's axes are kept as given.
    pub fn custom(origin: Point3, u_axis: Vec3, v_axis: Vec3, normal: Vec3) -> Result<Self> {
        let tol = Tolerance::DEFAULT;
        if !tol.is_zero(u_axis.norm() - 1.0)
            || !tol.is_zero(v_axis.norm() - 1.0)
            || !tol.is_zero(normal.norm() - 1.0)
        {
            return Err(SketchError::InvalidFrame(
                "axes must be unit length".to_string(),
            ));
        }
        if !tol.is_zero(u_axis.dot(&v_axis)) {
            return Err(SketchError::InvalidFrame(
                "axes must be perpendicular".to_string(),
            ));
        }
        let cross = u_axis.cross(&v_axis);
        if (cross - normal).norm() > tol.linear && (cross + normal).norm() > tol.linear {
            return Err(SketchError::InvalidFrame(
                "normal must be perpendicular to the plane".to_string(),
            ));
        }
        Ok(Self {
            origin,
            u_axis: Dir3::new_unchecked(u_axis),
            v_axis: Dir3::new_unchecked(v_axis),
            normal: Dir3::new_unchecked(normal),
        })
    }

    /// Map a sketch point to world space.
    pub fn to_world(&self, p: &Point2) -> Point3 {
        self.origin + self.u_axis.as_ref() * p.x + self.v_axis.as_ref() * p.y
    }

    /// Project a world point into sketch coordinates, discarding any
    /// out-of-plane component.
    pub fn to_sketch(&self, p: &Point3) -> Point2 {
        let d = p - self.origin;
        Point2::new(d.dot(&self.u_axis), d.dot(&self.v_axis))
    }

    /// World transform whose columns are `(u, v, n, origin)`.
    pub fn to_transform(&self) -> Transform {
        Transform::from_frame(
            &self.origin,
            self.u_axis.as_ref(),
            self.v_axis.as_ref(),
            self.normal.as_ref(),
        )
    }
}
