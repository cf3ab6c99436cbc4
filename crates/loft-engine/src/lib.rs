#![warn(missing_docs)]

//! The constructed geometry service tying the pipeline together.
//!
//! A [`GeometryEngine`] owns the boolean backend (initialized lazily,
//! exactly once) and a bounded body cache. High-level feature
//! operations run the full sketch-to-solid pipeline: snap endpoints,
//! chain profiles, extrude, combine, cache. Every operation either
//! succeeds and caches a fresh solid or fails without touching stored
//! state.

mod cache;
mod error;

pub use error::{EngineError, Result};

use std::sync::OnceLock;

use loft_csg::{BooleanOp, CsgBackend};
use loft_extrude::{
    extrude_profiles, resolve_cut_extents, ExtrudeMode, ExtrudeParams,
};
use loft_math::Vec3;
use loft_mesh::SolidMesh;
use loft_sketch::{
    extract_profiles, merge_nearby_endpoints, CurveResolution, PlaneCoordSystem, Profile,
    SketchElement, SketchPlane,
};
use tracing::{debug, info};

use crate::cache::BodyCache;

/// Identifier of a cached body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyId(pub u64);

/// Engine construction parameters.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum number of cached body solids before LRU eviction.
    pub cache_capacity: usize,
    /// Tessellation density for curved sketch elements.
    pub curve_resolution: CurveResolution,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            curve_resolution: CurveResolution::default(),
        }
    }
}

/// The geometry service.
///
/// Created once and torn down once; tests construct a fresh instance
/// per run instead of sharing process-wide state.
#[derive(Debug)]
pub struct GeometryEngine {
    config: EngineConfig,
    backend: OnceLock<CsgBackend>,
    cache: BodyCache,
}

impl GeometryEngine {
    /// Engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            backend: OnceLock::new(),
            cache: BodyCache::new(config.cache_capacity),
        }
    }

    /// The boolean backend, initialized on first use. Concurrent
    /// callers all get the same instance.
    pub fn backend(&self) -> &CsgBackend {
        self.backend.get_or_init(|| {
            info!("initializing boolean backend");
            CsgBackend::new()
        })
    }

    /// Store a solid under `id`, possibly evicting the least recently
    /// used body.
    pub fn insert_body(&mut self, id: BodyId, solid: SolidMesh) {
        self.cache.insert(id, solid);
    }

    /// Fetch a cached solid, marking it recently used.
    pub fn solid(&mut self, id: &BodyId) -> Result<&SolidMesh> {
        // Split borrow dance: check first so the error path owns the id
        if !self.cache.contains(id) {
            return Err(EngineError::MissingGeometry(*id));
        }
        Ok(self.cache.get(id).expect("presence checked above"))
    }

    /// Run the sketch front of the pipeline: snap endpoints, then chain
    /// elements into closed profiles.
    pub fn profiles_from(&self, elements: &[SketchElement]) -> Result<Vec<Profile>> {
        let snapped = merge_nearby_endpoints(elements);
        let profiles = extract_profiles(&snapped, self.config.curve_resolution);
        if profiles.is_empty() {
            return Err(EngineError::InvalidProfile(
                "sketch contains no closed loop".to_string(),
            ));
        }
        Ok(profiles)
    }

    /// Extrude a sketch into a new body.
    pub fn extrude_feature(
        &mut self,
        id: BodyId,
        elements: &[SketchElement],
        cs: &PlaneCoordSystem,
        params: &ExtrudeParams,
        mode: ExtrudeMode,
    ) -> Result<&SolidMesh> {
        debug!(?id, elements = elements.len(), ?mode, "extrude feature");
        let profiles = self.profiles_from(elements)?;
        let solid = extrude_profiles(&profiles, cs, params, mode)?;
        self.cache.insert(id, solid);
        Ok(self.cache.get(&id).expect("just inserted, capacity is at least 1"))
    }

    /// Combine two cached bodies into a new one.
    pub fn boolean_feature(
        &mut self,
        id: BodyId,
        a: &BodyId,
        b: &BodyId,
        op: BooleanOp,
    ) -> Result<&SolidMesh> {
        debug!(?id, ?a, ?b, ?op, "boolean feature");
        let lhs = self.solid(a)?.clone();
        let rhs = self.solid(b)?.clone();
        let result = self.backend().boolean(op, &lhs, &rhs)?;
        self.cache.insert(id, result);
        Ok(self.cache.get(&id).expect("just inserted, capacity is at least 1"))
    }

    /// Cut a sketch through a cached body, storing the result as a new
    /// body.
    ///
    /// The sketch sits on a canonical plane at `offset`; when the cut
    /// comes from a picked face, `face_normal` orients the extents so
    /// positive depth advances into the body.
    #[allow(clippy::too_many_arguments)]
    pub fn cut_feature(
        &mut self,
        id: BodyId,
        target: &BodyId,
        elements: &[SketchElement],
        plane: SketchPlane,
        offset: f64,
        face_normal: Option<Vec3>,
        params: &ExtrudeParams,
    ) -> Result<&SolidMesh> {
        debug!(?id, ?target, ?plane, offset, "cut feature");
        let body = self.solid(target)?.clone();
        let profiles = self.profiles_from(elements)?;
        let cs = PlaneCoordSystem::axis_aligned(plane, offset);
        let resolved = resolve_cut_extents(params, face_normal, Some(plane));
        let tool = extrude_profiles(&profiles, &cs, &resolved, ExtrudeMode::Robust)?;
        let result = self.backend().boolean(BooleanOp::Difference, &body, &tool)?;
        self.cache.insert(id, result);
        Ok(self.cache.get(&id).expect("just inserted, capacity is at least 1"))
    }

    /// Serialize a cached solid as `{"vertices": [...], "indices": [...]}`.
    pub fn export_body(&mut self, id: &BodyId) -> Result<String> {
        let solid = self.solid(id)?;
        Ok(serde_json::to_string(solid)?)
    }

    /// Load a solid from its serialized shape. Normals are not part of
    /// the format; they are recomputed on demand.
    pub fn import_body(&mut self, id: BodyId, json: &str) -> Result<()> {
        let solid: SolidMesh = serde_json::from_str(json)?;
        self.cache.insert(id, solid);
        Ok(())
    }
}

impl Default for GeometryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use loft_math::Point3;
    use loft_sketch::Point2D;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Vec<SketchElement> {
        vec![SketchElement::Rectangle {
            corner: Point2D::new(x, y),
            width: w,
            height: h,
        }]
    }

    #[test]
    fn test_extrude_feature_pipeline() {
        let mut engine = GeometryEngine::default();
        let solid = engine
            .extrude_feature(
                BodyId(1),
                &rect(0.0, 0.0, 2.0, 3.0),
                &PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0),
                &ExtrudeParams::forward(4.0),
                ExtrudeMode::Robust,
            )
            .unwrap();
        assert!(solid.is_manifold());
        assert_relative_eq!(solid.signed_volume(), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_open_sketch_yields_invalid_profile() {
        let mut engine = GeometryEngine::default();
        let open = vec![SketchElement::Line {
            start: Point2D::new(0.0, 0.0),
            end: Point2D::new(1.0, 0.0),
        }];
        let err = engine
            .extrude_feature(
                BodyId(1),
                &open,
                &PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0),
                &ExtrudeParams::forward(1.0),
                ExtrudeMode::Robust,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidProfile(_)));
        // Nothing cached on failure
        assert!(matches!(
            engine.solid(&BodyId(1)),
            Err(EngineError::MissingGeometry(_))
        ));
    }

    #[test]
    fn test_snapped_sketch_extrudes() {
        // Triangle with sub-tolerance gaps between the segments
        let mut engine = GeometryEngine::default();
        let elements = vec![
            SketchElement::Line {
                start: Point2D::new(0.0, 0.0),
                end: Point2D::new(2.0, 0.004),
            },
            SketchElement::Line {
                start: Point2D::new(2.002, 0.0),
                end: Point2D::new(1.0, 2.0),
            },
            SketchElement::Line {
                start: Point2D::new(1.003, 1.998),
                end: Point2D::new(0.001, 0.002),
            },
        ];
        let solid = engine
            .extrude_feature(
                BodyId(7),
                &elements,
                &PlaneCoordSystem::axis_aligned(SketchPlane::Xy, 0.0),
                &ExtrudeParams::forward(1.0),
                ExtrudeMode::Robust,
            )
            .unwrap();
        assert!(solid.is_manifold());
        assert_relative_eq!(solid.signed_volume(), 2.0, epsilon = 0.05);
    }

    #[test]
    fn test_boolean_feature_union() {
        let mut engine = GeometryEngine::default();
        engine.insert_body(
            BodyId(1),
            SolidMesh::axis_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)),
        );
        engine.insert_body(
            BodyId(2),
            SolidMesh::axis_box(Point3::new(0.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
        );
        let result = engine
            .boolean_feature(BodyId(3), &BodyId(1), &BodyId(2), BooleanOp::Union)
            .unwrap();
        assert_relative_eq!(result.signed_volume(), 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_cut_feature_removes_material() {
        let mut engine = GeometryEngine::default();
        engine.insert_body(
            BodyId(1),
            SolidMesh::axis_box(Point3::origin(), Vec3::new(4.0, 4.0, 2.0)),
        );
        // Square hole through the middle, cut downward from the top face
        let solid = engine
            .cut_feature(
                BodyId(2),
                &BodyId(1),
                &rect(1.0, 1.0, 2.0, 2.0),
                SketchPlane::Xy,
                2.0,
                Some(Vec3::z()),
                // Depth 2 forward; the face policy flips it into the body
                &ExtrudeParams::forward(2.0),
            )
            .unwrap();
        assert_relative_eq!(solid.signed_volume(), 32.0 - 8.0, epsilon = 1e-6);
    }

    #[test]
    fn test_cut_missing_body() {
        let mut engine = GeometryEngine::default();
        let err = engine
            .cut_feature(
                BodyId(2),
                &BodyId(99),
                &rect(0.0, 0.0, 1.0, 1.0),
                SketchPlane::Xy,
                0.0,
                None,
                &ExtrudeParams::forward(1.0),
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingGeometry(BodyId(99))));
    }

    #[test]
    fn test_disjoint_cut_is_empty_result() {
        let mut engine = GeometryEngine::default();
        engine.insert_body(
            BodyId(1),
            SolidMesh::axis_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)),
        );
        let err = engine
            .cut_feature(
                BodyId(2),
                &BodyId(1),
                &rect(10.0, 10.0, 1.0, 1.0),
                SketchPlane::Xy,
                0.0,
                None,
                &ExtrudeParams::forward(1.0),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Csg(loft_csg::CsgError::EmptyResult)
        ));
        // Failed cut leaves the target untouched and caches nothing
        assert!(engine.solid(&BodyId(1)).is_ok());
        assert!(engine.solid(&BodyId(2)).is_err());
    }

    #[test]
    fn test_cache_eviction_by_capacity() {
        let mut engine = GeometryEngine::new(EngineConfig {
            cache_capacity: 2,
            curve_resolution: CurveResolution::default(),
        });
        for i in 1..=3 {
            engine.insert_body(
                BodyId(i),
                SolidMesh::axis_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0)),
            );
        }
        assert!(engine.solid(&BodyId(1)).is_err());
        assert!(engine.solid(&BodyId(2)).is_ok());
        assert!(engine.solid(&BodyId(3)).is_ok());
    }

    #[test]
    fn test_backend_initialized_once() {
        let engine = GeometryEngine::default();
        let first = engine.backend() as *const CsgBackend;
        let second = engine.backend() as *const CsgBackend;
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut engine = GeometryEngine::default();
        let cube = SolidMesh::axis_box(Point3::origin(), Vec3::new(1.0, 1.0, 1.0));
        engine.insert_body(BodyId(1), cube.clone());
        let json = engine.export_body(&BodyId(1)).unwrap();
        assert!(json.contains("\"vertices\""));
        assert!(!json.contains("normal"));

        engine.import_body(BodyId(2), &json).unwrap();
        let restored = engine.solid(&BodyId(2)).unwrap();
        assert_eq!(restored, &cube);
        assert_eq!(restored.vertex_normals().len(), cube.vertices.len());
    }
}
