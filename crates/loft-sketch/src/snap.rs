//! Endpoint snapping.
//!
//! Interactive sketching leaves tiny gaps between elements that were
//! meant to connect. Snapping merges endpoint clusters before profile
//! chaining so near-touching elements chain exactly.

use crate::element::{Point2D, SketchElement};

/// Maximum endpoint gap closed by snapping, in sketch units.
pub const SNAP_TOLERANCE: f64 = 1e-2;

/// Merge endpoints that lie within [`SNAP_TOLERANCE`] of each other.
///
/// Clustering is greedy in element order: the first endpoint seen in a
/// neighborhood becomes its representative and later endpoints within
/// tolerance move onto it. Representatives are pairwise farther apart
/// than the tolerance, so running the pass again changes nothing.
///
/// Lines, polylines and splines get their endpoints rewritten in place.
/// Arcs keep their center and radius and re-derive their angles from the
/// snapped endpoints. Closed elements and dimensions pass through
/// untouched.
pub fn merge_nearby_endpoints(elements: &[SketchElement]) -> Vec<SketchElement> {
    let mut reps: Vec<Point2D> = Vec::new();
    let mut snap = |p: Point2D| -> Point2D {
        for rep in &reps {
            if rep.distance_squared(&p) <= SNAP_TOLERANCE * SNAP_TOLERANCE {
                return *rep;
            }
        }
        reps.push(p);
        p
    };

    elements
        .iter()
        .map(|element| match element {
            SketchElement::Line { start, end } => SketchElement::Line {
                start: snap(*start),
                end: snap(*end),
            },
            SketchElement::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let at = |angle: f64| {
                    Point2D::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    )
                };
                let start = snap(at(*start_angle));
                let end = snap(at(*end_angle));
                SketchElement::Arc {
                    center: *center,
                    radius: *radius,
                    start_angle: (start.y - center.y).atan2(start.x - center.x),
                    end_angle: (end.y - center.y).atan2(end.x - center.x),
                }
            }
            SketchElement::Polyline { points } => SketchElement::Polyline {
                points: snap_ends(points, &mut snap),
            },
            SketchElement::Spline { points } => SketchElement::Spline {
                points: snap_ends(points, &mut snap),
            },
            SketchElement::Circle { .. }
            | SketchElement::Rectangle { .. }
            | SketchElement::Dimension { .. } => element.clone(),
        })
        .collect()
}

fn snap_ends(points: &[Point2D], snap: &mut impl FnMut(Point2D) -> Point2D) -> Vec<Point2D> {
    let mut out = points.to_vec();
    if let Some(first) = out.first().copied() {
        out[0] = snap(first);
    }
    if out.len() > 1 {
        let last = *out.last().unwrap();
        let idx = out.len() - 1;
        out[idx] = snap(last);
    }
    out
}
