#![warn(missing_docs)]

//! Math types for the loft sketch-to-solid pipeline.
//!
//! Thin wrappers around nalgebra providing domain-specific types
//! for sketch and solid geometry: 2D/3D points, vectors, unit
//! directions, affine transforms, and tolerance constants.

use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in 2D sketch space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D sketch space.
pub type Vec2 = Vector2<f64>;

/// A 4x4 affine transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Map a local orthonormal frame into world space.
    ///
    /// Columns are `(u, v, n, origin)`: a local point `(x, y, w)` maps to
    /// `origin + x·u + y·v + w·n`.
    pub fn from_frame(origin: &Point3, u: &Vec3, v: &Vec3, n: &Vec3) -> Self {
        let mut m = Matrix4::identity();
        for i in 0..3 {
            m[(i, 0)] = u[i];
            m[(i, 1)] = v[i];
            m[(i, 2)] = n[i];
            m[(i, 3)] = origin[i];
        }
        Self { matrix: m }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Determinant of the linear part. Negative for frames that mirror,
    /// which flips the orientation of geometry mapped through them.
    pub fn linear_determinant(&self) -> f64 {
        let u = self.apply_vec(&Vec3::x());
        let v = self.apply_vec(&Vec3::y());
        let n = self.apply_vec(&Vec3::z());
        u.cross(&v).dot(&n)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
}

impl Tolerance {
    /// Default pipeline tolerance (1e-5 linear).
    ///
    /// The linear value is also the vertex weld grid used before
    /// boolean operations.
    pub const DEFAULT: Self = Self { linear: 1e-5 };

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
