//! BSP tree clipping of polygon soups.
//!
//! Straight port of the classic csg.js structure: polygons are convex,
//! carry their supporting plane, and get split against node planes as
//! they descend the tree. Vertices are bare positions; normals are
//! recomputed from the final mesh.

use loft_math::{Point3, Vec3};

/// Planarity / classification tolerance for BSP splitting.
pub const EPSILON: f64 = 1e-5;

/// Recurse into both children in parallel once this many polygons are
/// in flight.
const PAR_THRESHOLD: usize = 256;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitPlane {
    /// Unit plane normal.
    pub normal: Vec3,
    /// Signed distance of the plane from the origin.
    pub w: f64,
}

impl SplitPlane {
    /// Plane through three points, or `None` if they are collinear.
    pub fn from_points(a: &Point3, b: &Point3, c: &Point3) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        let len = n.norm();
        if len < EPSILON * EPSILON {
            return None;
        }
        let normal = n / len;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    /// Reverse orientation in place.
    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn classify(&self, p: &Point3) -> u8 {
        let t = self.normal.dot(&p.coords) - self.w;
        if t < -EPSILON {
            BACK
        } else if t > EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Split `polygon` by this plane into the four output buckets.
    pub fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = 0;
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| {
                let t = self.classify(v);
                polygon_type |= t;
                t
            })
            .collect();

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let mut f = Vec::new();
                let mut b = Vec::new();
                let n = polygon.vertices.len();
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.coords))
                            / self.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    front.push(Polygon {
                        vertices: f,
                        plane: polygon.plane.clone(),
                    });
                }
                if b.len() >= 3 {
                    back.push(Polygon {
                        vertices: b,
                        plane: polygon.plane.clone(),
                    });
                }
            }
        }
    }
}

/// A convex planar polygon with its supporting plane.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Vertices in winding order.
    pub vertices: Vec<Point3>,
    /// Supporting plane, oriented with the winding.
    pub plane: SplitPlane,
}

impl Polygon {
    /// Polygon from vertices, or `None` when they span no plane.
    pub fn new(vertices: Vec<Point3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = SplitPlane::from_points(&vertices[0], &vertices[1], &vertices[2])?;
        Some(Self { vertices, plane })
    }

    /// Reverse orientation in place.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
    }
}

/// A BSP tree node holding the polygons coplanar with its plane.
#[derive(Debug, Default)]
pub struct Node {
    plane: Option<SplitPlane>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
    polygons: Vec<Polygon>,
}

impl Node {
    /// Build a tree from a polygon soup.
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Node::default();
        if !polygons.is_empty() {
            node.build(polygons);
        }
        node
    }

    /// Flip solid and empty space throughout the subtree.
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Return the subset of `polygons` outside this tree's solid.
    pub fn clip_polygons(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons.to_vec();
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for polygon in polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
        }
        front.append(&mut coplanar_front);
        back.append(&mut coplanar_back);

        let (mut front, back) = match (&self.front, &self.back) {
            (Some(f), Some(b)) if front.len() + back.len() >= PAR_THRESHOLD => {
                rayon::join(|| f.clip_polygons(&front), || b.clip_polygons(&back))
            }
            _ => {
                let f = match &self.front {
                    Some(node) => node.clip_polygons(&front),
                    None => front,
                };
                // No back subtree means the back halfspace is solid
                let b = match &self.back {
                    Some(node) => node.clip_polygons(&back),
                    None => Vec::new(),
                };
                (f, b)
            }
        };
        front.extend(back);
        front
    }

    /// Remove from this tree everything inside `other`'s solid.
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(&self.polygons);
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    /// Collect every polygon in the subtree.
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut out = self.polygons.clone();
        if let Some(front) = &self.front {
            out.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            out.extend(back.all_polygons());
        }
        out
    }

    /// Insert more polygons, extending the tree as needed.
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = match &self.plane {
            Some(plane) => plane.clone(),
            None => {
                let plane = polygons[0].plane.clone();
                self.plane = Some(plane.clone());
                plane
            }
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in &polygons {
            let mut coplanar_back = Vec::new();
            plane.split_polygon(
                polygon,
                &mut self.polygons,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
            self.polygons.append(&mut coplanar_back);
        }
        if !front.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(Node::default()))
                .build(front);
        }
        if !back.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(Node::default()))
                .build(back);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tri(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Polygon {
        Polygon::new(vec![
            Point3::new(a[0], a[1], a[2]),
            Point3::new(b[0], b[1], b[2]),
            Point3::new(c[0], c[1], c[2]),
        ])
        .unwrap()
    }

    #[test]
    fn test_plane_from_points() {
        let p = SplitPlane::from_points(
            &Point3::new(0.0, 0.0, 2.0),
            &Point3::new(1.0, 0.0, 2.0),
            &Point3::new(0.0, 1.0, 2.0),
        )
        .unwrap();
        assert_relative_eq!(p.normal.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.w, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_plane_rejected() {
        let p = SplitPlane::from_points(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(p.is_none());
    }

    #[test]
    fn test_split_spanning_triangle() {
        // z = 0 plane splits a triangle reaching from z=-1 to z=1
        let plane = SplitPlane {
            normal: Vec3::z(),
            w: 0.0,
        };
        let poly = tri([0.0, 0.0, -1.0], [2.0, 0.0, 1.0], [0.0, 2.0, 1.0]);
        let (mut cf, mut cb, mut front, mut back) = (vec![], vec![], vec![], vec![]);
        plane.split_polygon(&poly, &mut cf, &mut cb, &mut front, &mut back);
        assert_eq!(front.len(), 1);
        assert_eq!(back.len(), 1);
        // Front piece is a quad, back piece the clipped corner triangle
        assert_eq!(front[0].vertices.len(), 4);
        assert_eq!(back[0].vertices.len(), 3);
        for v in &back[0].vertices {
            assert!(v.z <= EPSILON);
        }
    }

    #[test]
    fn test_clip_keeps_outside_drops_inside() {
        // Tree of a unit square column's left face (solid behind it)
        let face = tri([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]);
        let node = Node::new(vec![face]);
        // Normal points toward -x, so solid space is x > 0
        let outside = tri([-1.0, 0.0, 0.0], [-1.0, 1.0, 0.0], [-1.0, 0.0, 1.0]);
        let inside = tri([1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 1.0]);
        assert_eq!(node.clip_polygons(&[outside]).len(), 1);
        assert_eq!(node.clip_polygons(&[inside]).len(), 0);
    }

    #[test]
    fn test_invert_swaps_sides() {
        let face = tri([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]);
        let mut node = Node::new(vec![face]);
        node.invert();
        let inside = tri([1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 1.0]);
        assert_eq!(node.clip_polygons(&[inside]).len(), 1);
    }

    #[test]
    fn test_all_polygons_round_trip() {
        let polys = vec![
            tri([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            tri([0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [0.0, 1.0, 1.0]),
        ];
        let node = Node::new(polys);
        assert_eq!(node.all_polygons().len(), 2);
    }
}
