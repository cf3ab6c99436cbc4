//! Vertex welding on a quantized grid.

use std::collections::HashMap;

use loft_math::Point3;

use crate::SolidMesh;

/// Weld coincident vertices within `tolerance` and drop triangles that
/// collapse in the process.
///
/// Positions are quantized to a grid of cell size `tolerance`; vertices
/// falling in the same cell are unified, keeping the first occurrence as
/// the representative. Triangles left with a repeated index are removed.
pub fn weld_mesh(mesh: &SolidMesh, tolerance: f64) -> SolidMesh {
    let inv = 1.0 / tolerance;
    let mut cells: HashMap<[i64; 3], u32> = HashMap::new();
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.num_vertices());
    let mut out = SolidMesh::new();

    for i in 0..mesh.num_vertices() {
        let p = mesh.position(i);
        let key = quantize(&p, inv);
        let idx = *cells.entry(key).or_insert_with(|| out.push_vertex(p));
        remap.push(idx);
    }

    for tri in mesh.indices.chunks(3) {
        let a = remap[tri[0] as usize];
        let b = remap[tri[1] as usize];
        let c = remap[tri[2] as usize];
        if a == b || b == c || c == a {
            continue;
        }
        out.indices.extend_from_slice(&[a, b, c]);
    }
    out
}

fn quantize(p: &Point3, inv: f64) -> [i64; 3] {
    [
        (p.x * inv).round() as i64,
        (p.y * inv).round() as i64,
        (p.z * inv).round() as i64,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weld_unifies_duplicate_triangle_soup() {
        // Two triangles sharing an edge, written as six unshared vertices
        let mut mesh = SolidMesh::new();
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        mesh.push_triangle(
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let welded = weld_mesh(&mesh, 1e-5);
        assert_eq!(welded.num_vertices(), 4);
        assert_eq!(welded.num_triangles(), 2);
    }

    #[test]
    fn test_weld_merges_within_tolerance() {
        let mut mesh = SolidMesh::new();
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        mesh.push_triangle(
            Point3::new(1.0 + 1e-7, 1e-7, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1e-7, 1.0 - 1e-7, 0.0),
        );
        let welded = weld_mesh(&mesh, 1e-5);
        assert_eq!(welded.num_vertices(), 4);
    }

    #[test]
    fn test_weld_drops_degenerate_triangles() {
        let mut mesh = SolidMesh::new();
        // A sliver whose endpoints all land in one cell collapses away
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1e-8, 0.0, 0.0),
            Point3::new(0.0, 1e-8, 0.0),
        );
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let welded = weld_mesh(&mesh, 1e-5);
        assert_eq!(welded.num_triangles(), 1);
    }

    #[test]
    fn test_weld_preserves_distinct_vertices() {
        let mut mesh = SolidMesh::new();
        mesh.push_triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        );
        let welded = weld_mesh(&mesh, 1e-5);
        assert_eq!(welded.num_vertices(), 3);
        assert_eq!(welded.num_triangles(), 1);
    }
}
