//! Ear-clipping triangulation of profile loops with holes.

use loft_math::Point2;

use crate::error::{CsgError, Result};

const EPS: f64 = 1e-10;

/// Triangulate a CCW outer loop with CW hole loops.
///
/// Each hole is first bridged into the outer boundary at the closest
/// vertex pair, producing one simple (if self-touching) polygon, which
/// is then ear clipped. Triangles come back CCW.
pub fn triangulate_with_holes(
    outer: &[Point2],
    holes: &[&[Point2]],
) -> Result<Vec<[Point2; 3]>> {
    if outer.len() < 3 {
        return Err(CsgError::InvalidProfile(
            "loop has fewer than three vertices".to_string(),
        ));
    }
    let mut boundary = outer.to_vec();
    for hole in holes {
        if hole.len() < 3 {
            return Err(CsgError::InvalidProfile(
                "hole has fewer than three vertices".to_string(),
            ));
        }
        boundary = bridge_hole(boundary, hole);
    }
    ear_clip(boundary)
}

/// Splice a hole loop into the boundary via a bridge at the closest
/// vertex pair. Both bridge endpoints are duplicated so the result
/// remains a single cycle.
fn bridge_hole(boundary: Vec<Point2>, hole: &[Point2]) -> Vec<Point2> {
    let (mut bi, mut hj) = (0, 0);
    let mut best = f64::INFINITY;
    for (i, b) in boundary.iter().enumerate() {
        for (j, h) in hole.iter().enumerate() {
            let d = (b - h).norm_squared();
            if d < best {
                best = d;
                bi = i;
                hj = j;
            }
        }
    }

    let mut out = Vec::with_capacity(boundary.len() + hole.len() + 2);
    out.extend_from_slice(&boundary[..=bi]);
    out.extend_from_slice(&hole[hj..]);
    out.extend_from_slice(&hole[..=hj]);
    out.push(boundary[bi]);
    out.extend_from_slice(&boundary[bi + 1..]);
    out
}

fn ear_clip(mut poly: Vec<Point2>) -> Result<Vec<[Point2; 3]>> {
    let mut triangles = Vec::with_capacity(poly.len().saturating_sub(2));
    while poly.len() > 3 {
        let n = poly.len();
        let mut clipped = false;
        for i in 0..n {
            let prev = poly[(i + n - 1) % n];
            let curr = poly[i];
            let next = poly[(i + 1) % n];
            if cross2(&prev, &curr, &next) <= EPS {
                continue;
            }
            let blocked = poly.iter().enumerate().any(|(k, p)| {
                k != (i + n - 1) % n
                    && k != i
                    && k != (i + 1) % n
                    && !coincident(p, &prev)
                    && !coincident(p, &curr)
                    && !coincident(p, &next)
                    && point_in_triangle(p, &prev, &curr, &next)
            });
            if blocked {
                continue;
            }
            triangles.push([prev, curr, next]);
            poly.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            return Err(CsgError::InvalidProfile(
                "loop is degenerate or self-intersecting".to_string(),
            ));
        }
    }
    if cross2(&poly[0], &poly[1], &poly[2]).abs() > EPS {
        triangles.push([poly[0], poly[1], poly[2]]);
    }
    Ok(triangles)
}

/// 2D cross product of `(b - a)` and `(c - b)`; positive for left turns.
fn cross2(a: &Point2, b: &Point2, c: &Point2) -> f64 {
    (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x)
}

fn coincident(a: &Point2, b: &Point2) -> bool {
    (a - b).norm_squared() < EPS
}

/// Inside-or-on-boundary test; boundary points block an ear.
fn point_in_triangle(p: &Point2, a: &Point2, b: &Point2, c: &Point2) -> bool {
    let d1 = cross2(a, b, p);
    let d2 = cross2(b, c, p);
    let d3 = cross2(c, a, p);
    d1 >= -EPS && d2 >= -EPS && d3 >= -EPS
}
