//! Sketch element types.

use serde::{Deserialize, Serialize};

/// A point in sketch-local 2D coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// Coordinate along the plane's u axis.
    pub x: f64,
    /// Coordinate along the plane's v axis.
    pub y: f64,
}

impl Point2D {
    /// Construct a point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2D) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance to another point.
    pub fn distance_squared(&self, other: &Point2D) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// A single drawable element of a 2D sketch.
///
/// Angles are in radians, measured counterclockwise from the positive
/// u axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SketchElement {
    /// Straight segment between two endpoints.
    Line {
        /// Start endpoint.
        start: Point2D,
        /// End endpoint.
        end: Point2D,
    },
    /// Full circle.
    Circle {
        /// Center point.
        center: Point2D,
        /// Radius, positive.
        radius: f64,
    },
    /// Circular arc from `start_angle` to `end_angle`, counterclockwise.
    Arc {
        /// Center point.
        center: Point2D,
        /// Radius, positive.
        radius: f64,
        /// Angle of the arc start, radians.
        start_angle: f64,
        /// Angle of the arc end, radians.
        end_angle: f64,
    },
    /// Axis-aligned rectangle.
    Rectangle {
        /// Lower-left corner.
        corner: Point2D,
        /// Extent along u, positive.
        width: f64,
        /// Extent along v, positive.
        height: f64,
    },
    /// Connected sequence of straight segments.
    Polyline {
        /// Vertices in order.
        points: Vec<Point2D>,
    },
    /// Freeform curve, stored pre-sampled as a point sequence.
    Spline {
        /// Sampled points in order.
        points: Vec<Point2D>,
    },
    /// Annotation measuring between two points. Carries no geometry.
    Dimension {
        /// Measured-from point.
        from: Point2D,
        /// Measured-to point.
        to: Point2D,
        /// Displayed value.
        value: f64,
    },
}

impl SketchElement {
    /// The free endpoints of this element, if it has any.
    ///
    /// Closed elements (circles, rectangles) and annotations have none.
    /// Arcs report the points at their start and end angles.
    pub fn endpoints(&self) -> Option<(Point2D, Point2D)> {
        match self {
            SketchElement::Line { start, end } => Some((*start, *end)),
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
                Some((at(*start_angle), at(*end_angle)))
            }
            SketchElement::Polyline { points } | SketchElement::Spline { points } => {
                match (points.first(), points.last()) {
                    (Some(first), Some(last)) if points.len() >= 2 => Some((*first, *last)),
                    _ => None,
                }
            }
            SketchElement::Circle { .. }
            | SketchElement::Rectangle { .. }
            | SketchElement::Dimension { .. } => None,
        }
    }
}
