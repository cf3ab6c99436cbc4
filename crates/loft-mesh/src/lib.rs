#![warn(missing_docs)]

//! Triangle boundary meshes for the loft pipeline.
//!
//! A [`SolidMesh`] is the flattened solid representation exchanged with
//! the surrounding application and fed to the boolean engine: packed
//! vertex positions plus packed triangle indices. Normals are never
//! stored; they are recomputed on demand, so serialization is exactly
//! `{vertices, indices}` and is lossless.

mod aabb;
mod weld;

pub use aabb::Aabb3;
pub use weld::weld_mesh;

use std::collections::HashMap;

use loft_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

/// A triangulated boundary mesh: packed `(x, y, z)` vertex triples and
/// packed triangle-index triples.
///
/// This is also the persisted feature-cache shape; loading one back
/// recovers the solid exactly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolidMesh {
    /// Flat vertex positions: `[x0, y0, z0, x1, y1, z1, ...]`.
    pub vertices: Vec<f64>,
    /// Flat triangle indices: `[i0, i1, i2, ...]`.
    pub indices: Vec<u32>,
}

impl SolidMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if the mesh carries no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`.
    pub fn position(&self, i: usize) -> Point3 {
        Point3::new(
            self.vertices[i * 3],
            self.vertices[i * 3 + 1],
            self.vertices[i * 3 + 2],
        )
    }

    /// Append a vertex, returning its index.
    pub fn push_vertex(&mut self, p: Point3) -> u32 {
        let idx = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&[p.x, p.y, p.z]);
        idx
    }

    /// Append a triangle as three fresh vertices.
    ///
    /// Duplicates are expected; call [`weld_mesh`] afterwards to restore
    /// shared topology.
    pub fn push_triangle(&mut self, a: Point3, b: Point3, c: Point3) {
        let i = self.push_vertex(a);
        let j = self.push_vertex(b);
        let k = self.push_vertex(c);
        self.indices.extend_from_slice(&[i, j, k]);
    }

    /// Merge another mesh into this one (plain append, no welding).
    pub fn merge(&mut self, other: &SolidMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|&i| i + offset));
    }

    /// Reverse the orientation of every triangle.
    pub fn flip_orientation(&mut self) {
        for tri in self.indices.chunks_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Axis-aligned bounding box of all vertices.
    pub fn aabb(&self) -> Aabb3 {
        let mut aabb = Aabb3::empty();
        for i in 0..self.num_vertices() {
            aabb.include_point(&self.position(i));
        }
        aabb
    }

    /// Signed volume via the divergence theorem (positive for outward
    /// oriented closed meshes).
    pub fn signed_volume(&self) -> f64 {
        let mut vol = 0.0;
        for tri in self.indices.chunks(3) {
            let a = self.position(tri[0] as usize);
            let b = self.position(tri[1] as usize);
            let c = self.position(tri[2] as usize);
            vol += a.coords.dot(&b.coords.cross(&c.coords));
        }
        vol / 6.0
    }

    /// Recompute area-weighted per-vertex normals.
    ///
    /// Returned flat array has the same layout as [`SolidMesh::vertices`].
    /// This is the only source of normals in the pipeline; boolean results
    /// and loaded solids go through here.
    pub fn vertex_normals(&self) -> Vec<f64> {
        let mut normals = vec![Vec3::zeros(); self.num_vertices()];
        for tri in self.indices.chunks(3) {
            let a = self.position(tri[0] as usize);
            let b = self.position(tri[1] as usize);
            let c = self.position(tri[2] as usize);
            // Cross product magnitude carries the area weighting
            let n = (b - a).cross(&(c - a));
            for &i in tri {
                normals[i as usize] += n;
            }
        }
        let mut out = Vec::with_capacity(self.vertices.len());
        for n in normals {
            let len = n.norm();
            let n = if len > 1e-12 { n / len } else { Vec3::zeros() };
            out.extend_from_slice(&[n.x, n.y, n.z]);
        }
        out
    }

    /// Axis-aligned box from its minimum corner and per-axis extents,
    /// outward oriented, with 8 shared vertices and 12 triangles.
    pub fn axis_box(corner: Point3, extent: Vec3) -> SolidMesh {
        let (x, y, z) = (corner.x, corner.y, corner.z);
        let (w, d, h) = (extent.x, extent.y, extent.z);
        let mut mesh = SolidMesh::new();
        for &(dx, dy, dz) in &[
            (0.0, 0.0, 0.0),
            (w, 0.0, 0.0),
            (w, d, 0.0),
            (0.0, d, 0.0),
            (0.0, 0.0, h),
            (w, 0.0, h),
            (w, d, h),
            (0.0, d, h),
        ] {
            mesh.push_vertex(Point3::new(x + dx, y + dy, z + dz));
        }
        mesh.indices.extend_from_slice(&[
            0, 2, 1, 0, 3, 2, // bottom (-z)
            4, 5, 6, 4, 6, 7, // top (+z)
            0, 1, 5, 0, 5, 4, // front (-y)
            2, 3, 7, 2, 7, 6, // back (+y)
            0, 4, 7, 0, 7, 3, // left (-x)
            1, 2, 6, 1, 6, 5, // right (+x)
        ]);
        mesh
    }

    /// Check that the mesh is a closed 2-manifold surface.
    ///
    /// Every undirected edge must be shared by exactly two triangles.
    /// The mesh must already be welded; positions are not compared here,
    /// only indices.
    pub fn is_manifold(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in self.indices.chunks(3) {
            for &(i, j) in &[(0, 1), (1, 2), (2, 0)] {
                let a = tri[i];
                let b = tri[j];
                if a == b {
                    return false;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_counts.entry(key).or_insert(0) += 1;
            }
        }
        edge_counts.values().all(|&count| count == 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cube(corner: Point3, size: f64) -> SolidMesh {
        SolidMesh::axis_box(corner, Vec3::new(size, size, size))
    }

    #[test]
    fn test_cube_is_manifold() {
        let mesh = cube(Point3::origin(), 1.0);
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_triangles(), 12);
        assert!(mesh.is_manifold());
    }

    #[test]
    fn test_cube_volume() {
        let mesh = cube(Point3::origin(), 2.0);
        assert_relative_eq!(mesh.signed_volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_mesh_not_manifold() {
        let mut mesh = cube(Point3::origin(), 1.0);
        // Drop one triangle: three edges become boundary edges
        mesh.indices.truncate(mesh.indices.len() - 3);
        assert!(!mesh.is_manifold());
    }

    #[test]
    fn test_empty_mesh_not_manifold() {
        assert!(!SolidMesh::new().is_manifold());
    }

    #[test]
    fn test_aabb() {
        let mesh = cube(Point3::new(-1.0, 0.0, 2.0), 3.0);
        let aabb = mesh.aabb();
        assert_eq!(aabb.min, Point3::new(-1.0, 0.0, 2.0));
        assert_eq!(aabb.max, Point3::new(2.0, 3.0, 5.0));
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut a = cube(Point3::origin(), 1.0);
        let b = cube(Point3::new(5.0, 0.0, 0.0), 1.0);
        a.merge(&b);
        assert_eq!(a.num_vertices(), 16);
        assert_eq!(a.num_triangles(), 24);
        assert!(a.indices[36..].iter().all(|&i| i >= 8));
    }

    #[test]
    fn test_vertex_normals_unit_length() {
        let mesh = cube(Point3::origin(), 1.0);
        let normals = mesh.vertex_normals();
        assert_eq!(normals.len(), mesh.vertices.len());
        for n in normals.chunks(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert_relative_eq!(len, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_serde_round_trip_positions_and_indices_only() {
        let mesh = cube(Point3::origin(), 1.0);
        let json = serde_json::to_string(&mesh).unwrap();
        assert!(json.contains("\"vertices\""));
        assert!(json.contains("\"indices\""));
        assert!(!json.contains("normal"));
        let back: SolidMesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back, mesh);
        // Normals come back by recomputation
        assert_eq!(back.vertex_normals().len(), mesh.vertices.len());
    }
}
