//! Profile extraction: tessellation and endpoint chaining.

use std::collections::VecDeque;

use loft_math::Point2;
use tracing::debug;

use crate::element::{Point2D, SketchElement};

/// Squared endpoint gap below which two tessellated segments chain.
const CHAIN_TOLERANCE_SQ: f64 = 1e-4;

/// Tessellation density for curved elements.
#[derive(Debug, Clone, Copy)]
pub struct CurveResolution {
    /// Segments used for a full circle.
    pub circle_segments: usize,
    /// Segments used for an arc.
    pub arc_segments: usize,
}

impl Default for CurveResolution {
    fn default() -> Self {
        Self {
            circle_segments: 32,
            arc_segments: 24,
        }
    }
}

/// Orientation of a closed profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Counterclockwise, positive signed area.
    Ccw,
    /// Clockwise, negative signed area.
    Cw,
}

/// A closed polygonal loop in sketch coordinates.
///
/// The closing edge from the last point back to the first is implicit;
/// the first point is not repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// Loop vertices in order, at least three.
    pub points: Vec<Point2>,
}

impl Profile {
    /// Signed area by the shoelace formula. Positive for CCW loops.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        let mut area = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            area += a.x * b.y - b.x * a.y;
        }
        area / 2.0
    }

    /// Loop orientation.
    pub fn winding(&self) -> Winding {
        if self.signed_area() >= 0.0 {
            Winding::Ccw
        } else {
            Winding::Cw
        }
    }

    /// Reverse the loop in place, flipping its winding.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Centroid of the loop vertices.
    pub fn vertex_centroid(&self) -> Point2 {
        let n = self.points.len() as f64;
        let sum = self
            .points
            .iter()
            .fold((0.0, 0.0), |acc, p| (acc.0 + p.x, acc.1 + p.y));
        Point2::new(sum.0 / n, sum.1 / n)
    }

    /// Point-in-polygon test by ray casting.
    pub fn contains(&self, p: &Point2) -> bool {
        let n = self.points.len();
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y)
                && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// A tessellated element: a point run and whether it closes on itself.
struct Strand {
    points: Vec<Point2>,
    closed: bool,
}

/// Extract closed profiles from a set of sketch elements.
///
/// Every element is lowered to a point run first. Runs that close on
/// themselves (circles, rectangles, polylines whose first and last
/// points coincide) become profiles directly; open runs are chained
/// end-to-end by endpoint proximity and kept only if the chain returns
/// to its start. Elements that chain into nothing closed are dropped.
pub fn extract_profiles(elements: &[SketchElement], resolution: CurveResolution) -> Vec<Profile> {
    let mut closed = Vec::new();
    let mut open = Vec::new();
    for element in elements {
        if let Some(strand) = tessellate(element, resolution) {
            if strand.closed {
                closed.push(strand.points);
            } else {
                open.push(strand.points);
            }
        }
    }

    let mut profiles: Vec<Profile> = closed
        .into_iter()
        .filter(|points| points.len() >= 3)
        .map(|points| Profile { points })
        .collect();
    profiles.extend(chain_open_strands(open));
    debug!(
        elements = elements.len(),
        profiles = profiles.len(),
        "extracted profiles"
    );
    profiles
}

fn tessellate(element: &SketchElement, resolution: CurveResolution) -> Option<Strand> {
    match element {
        SketchElement::Line { start, end } => Some(Strand {
            points: vec![to_p2(start), to_p2(end)],
            closed: false,
        }),
        SketchElement::Circle { center, radius } => {
            let n = resolution.circle_segments.max(3);
            let points = (0..n)
                .map(|i| {
                    let angle = 2.0 * std::f64::consts::PI * i as f64 / n as f64;
                    Point2::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    )
                })
                .collect();
            Some(Strand {
                points,
                closed: true,
            })
        }
        SketchElement::Arc {
            center,
            radius,
            start_angle,
            end_angle,
        } => {
            let mut span = end_angle - start_angle;
            if span <= 0.0 {
                span += 2.0 * std::f64::consts::PI;
            }
            let n = resolution.arc_segments.max(1);
            let points = (0..=n)
                .map(|i| {
                    let angle = start_angle + span * i as f64 / n as f64;
                    Point2::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    )
                })
                .collect();
            Some(Strand {
                points,
                closed: false,
            })
        }
        SketchElement::Rectangle {
            corner,
            width,
            height,
        } => Some(Strand {
            points: vec![
                Point2::new(corner.x, corner.y),
                Point2::new(corner.x + width, corner.y),
                Point2::new(corner.x + width, corner.y + height),
                Point2::new(corner.x, corner.y + height),
            ],
            closed: true,
        }),
        SketchElement::Polyline { points } | SketchElement::Spline { points } => {
            if points.len() < 2 {
                return None;
            }
            let mut pts: Vec<Point2> = points.iter().map(to_p2).collect();
            let closes = pts.len() > 3
                && dist_sq(&pts[0], pts.last().unwrap()) <= CHAIN_TOLERANCE_SQ;
            if closes {
                pts.pop();
            }
            Some(Strand {
                points: pts,
                closed: closes,
            })
        }
        SketchElement::Dimension { .. } => None,
    }
}

/// How an unused run attaches to the growing chain.
struct Link {
    index: usize,
    at_tail: bool,
    use_start: bool,
    dist_sq: f64,
}

/// Chain open point runs into closed loops by endpoint proximity.
///
/// Worklist over the strand arena with a used bitset: seed a chain with
/// the first unused run, then repeatedly attach the unused run whose
/// endpoint lies nearest to either free end of the chain (both
/// orientations tried). A finished chain is kept only when its two ends
/// coincide.
fn chain_open_strands(strands: Vec<Vec<Point2>>) -> Vec<Profile> {
    let mut used = vec![false; strands.len()];
    let mut profiles = Vec::new();

    for seed in 0..strands.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        let mut chain: VecDeque<Point2> = strands[seed].iter().copied().collect();

        while let Some(link) = nearest_link(&chain, &strands, &used) {
            used[link.index] = true;
            let strand = &strands[link.index];
            let n = strand.len();
            match (link.at_tail, link.use_start) {
                // Strand start touches the tail: append forward
                (true, true) => chain.extend(strand[1..].iter().copied()),
                // Strand end touches the tail: append reversed
                (true, false) => chain.extend(strand.iter().rev().skip(1).copied()),
                // Strand end touches the head: prepend forward
                (false, false) => {
                    for p in strand[..n - 1].iter().rev() {
                        chain.push_front(*p);
                    }
                }
                // Strand start touches the head: prepend reversed
                (false, true) => {
                    for p in &strand[1..] {
                        chain.push_front(*p);
                    }
                }
            }
        }

        let head = chain[0];
        let tail = *chain.back().unwrap();
        if chain.len() >= 4 && dist_sq(&head, &tail) <= CHAIN_TOLERANCE_SQ {
            chain.pop_back();
            profiles.push(Profile {
                points: chain.into_iter().collect(),
            });
        } else {
            debug!(points = chain.len(), "dropping open chain");
        }
    }
    profiles
}

/// Closest attachable strand endpoint across both chain ends, within
/// the chain tolerance.
fn nearest_link(chain: &VecDeque<Point2>, strands: &[Vec<Point2>], used: &[bool]) -> Option<Link> {
    let head = chain[0];
    let tail = *chain.back().unwrap();
    let mut best: Option<Link> = None;

    for (index, strand) in strands.iter().enumerate() {
        if used[index] {
            continue;
        }
        let start = strand[0];
        let end = *strand.last().unwrap();
        let candidates = [
            (true, true, dist_sq(&tail, &start)),
            (true, false, dist_sq(&tail, &end)),
            (false, false, dist_sq(&head, &end)),
            (false, true, dist_sq(&head, &start)),
        ];
        for (at_tail, use_start, d) in candidates {
            if d <= CHAIN_TOLERANCE_SQ && best.as_ref().map_or(true, |b| d < b.dist_sq) {
                best = Some(Link {
                    index,
                    at_tail,
                    use_start,
                    dist_sq: d,
                });
            }
        }
    }
    best
}

fn to_p2(p: &Point2D) -> Point2 {
    Point2::new(p.x, p.y)
}

fn dist_sq(a: &Point2, b: &Point2) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}
