#![warn(missing_docs)]

//! 2D sketch layer of the loft pipeline.
//!
//! Sketches are flat collections of [`SketchElement`]s drawn in the
//! local `(u, v)` coordinates of a [`PlaneCoordSystem`]. This crate
//! turns raw elements into closed [`Profile`]s ready for extrusion:
//! endpoints are snapped together ([`merge_nearby_endpoints`]), curved
//! elements are tessellated, and open segments are chained into loops
//! ([`extract_profiles`]).

mod chain;
mod element;
mod error;
mod plane;
mod snap;

pub use chain::{extract_profiles, CurveResolution, Profile, Winding};
pub use element::{Point2D, SketchElement};
pub use error::{Result, SketchError};
pub use plane::{PlaneCoordSystem, SketchPlane};
pub use snap::{merge_nearby_endpoints, SNAP_TOLERANCE};
