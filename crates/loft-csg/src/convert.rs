//! Mesh / polygon soup conversion.

use loft_mesh::{weld_mesh, SolidMesh};

use crate::bsp::Polygon;

/// Lift a triangle mesh into BSP polygons, skipping degenerate triangles.
pub fn mesh_to_polygons(mesh: &SolidMesh) -> Vec<Polygon> {
    mesh.indices
        .chunks(3)
        .filter_map(|tri| {
            Polygon::new(vec![
                mesh.position(tri[0] as usize),
                mesh.position(tri[1] as usize),
                mesh.position(tri[2] as usize),
            ])
        })
        .collect()
}

/// Flatten BSP polygons back to a welded triangle mesh.
///
/// Clipping leaves convex n-gons; each is fan triangulated from its
/// first vertex.
pub fn polygons_to_mesh(polygons: &[Polygon], weld_tolerance: f64) -> SolidMesh {
    let mut mesh = SolidMesh::new();
    for polygon in polygons {
        let v = &polygon.vertices;
        for i in 1..v.len() - 1 {
            mesh.push_triangle(v[0], v[i], v[i + 1]);
        }
    }
    weld_mesh(&mesh, weld_tolerance)
}
