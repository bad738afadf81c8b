//! # Occlusion Tester
//!
//! Decides whether a highlighted group is hidden behind occluder geometry
//! so the see-through layer only shows when something is in the way.
//!
//! Two modes:
//!
//! - **Bounds**: rays from the camera to the center and corners of each
//!   bounds (shrunk by the occluder threshold). A hit on a foreign node
//!   closer than the sampled point means occluded.
//! - **Accurate**: collects the occluder renderers crossing the
//!   camera-to-object segment. The compositor draws them into the stencil
//!   and the see-through pass only shows where they cover the object.
//!
//! Results are cached per camera and re-tested at most once per
//! `check_interval` seconds.

use std::collections::{BTreeSet, HashMap};

use halo_shared::{Bounds, CameraId, NodeId, Ray, RendererId, Vec3};

use crate::config::SeeThroughSettings;
use crate::scene::{layer_in_mask, Camera, RendererKind, SceneGraph};

/// Cached state for one camera.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CameraOcclusion {
    /// Host time of the last test
    pub last_test: f32,
    /// Last test ran in accurate mode
    pub accurate: bool,
    /// Result of the last bounds test
    pub occluded: bool,
    /// Occluders found by the last accurate test
    pub occluders: Vec<RendererId>,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OcclusionStats {
    /// Tests actually run
    pub tests: u64,
    /// Answers served from the per-camera cache
    pub cached: u64,
    /// Rays cast
    pub rays: u64,
}

/// Per-effect occlusion tester.
#[derive(Debug, Default)]
pub struct OcclusionTester {
    cameras: HashMap<CameraId, CameraOcclusion>,
    stats: OcclusionStats,
}

/// What the tester needs to know about the highlighted group.
#[derive(Clone, Copy, Debug)]
pub struct OcclusionQuery<'a> {
    /// Nodes belonging to the effect; their hits never count
    pub owned: &'a BTreeSet<NodeId>,
    /// World bounds of every object
    pub objects: &'a [Bounds],
    /// Host time
    pub now: f32,
}

impl OcclusionTester {
    /// Creates an empty tester.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(&mut self, camera: CameraId, settings: &SeeThroughSettings, now: f32) -> Option<&CameraOcclusion> {
        let hit = self.cameras.get(&camera).is_some_and(|c| {
            c.accurate == settings.occluder_mask_accurate && now - c.last_test < settings.check_interval && now >= c.last_test
        });
        if hit {
            self.stats.cached += 1;
            self.cameras.get(&camera)
        } else {
            None
        }
    }

    /// Bounds-mode test, cached per camera.
    pub fn is_occluded(
        &mut self,
        scene: &dyn SceneGraph,
        camera: &Camera,
        settings: &SeeThroughSettings,
        query: OcclusionQuery<'_>,
    ) -> bool {
        if let Some(cached) = self.fresh(camera.id, settings, query.now) {
            return cached.occluded;
        }
        self.stats.tests += 1;
        let shrink = (1.0 - settings.occluder_threshold).clamp(0.0, 1.0);
        let occluded = if settings.check_individual_objects {
            query.objects.iter().any(|b| self.bounds_occluded(scene, camera.position, &b.scaled(shrink), settings, query.owned))
        } else {
            combined_bounds(query.objects)
                .is_some_and(|b| self.bounds_occluded(scene, camera.position, &b.scaled(shrink), settings, query.owned))
        };
        let entry = self.cameras.entry(camera.id).or_default();
        entry.last_test = query.now;
        entry.accurate = settings.occluder_mask_accurate;
        entry.occluded = occluded;
        tracing::trace!(camera = ?camera.id, occluded, "occlusion tested");
        occluded
    }

    fn bounds_occluded(
        &mut self,
        scene: &dyn SceneGraph,
        eye: Vec3,
        bounds: &Bounds,
        settings: &SeeThroughSettings,
        owned: &BTreeSet<NodeId>,
    ) -> bool {
        let mut points = Vec::with_capacity(9);
        points.push(bounds.center);
        points.extend(bounds.corners());
        for point in points {
            let to_point = point - eye;
            let distance = to_point.length();
            if distance <= f32::EPSILON {
                continue;
            }
            self.stats.rays += 1;
            let ray = Ray::new(eye, to_point);
            let blocked = scene
                .raycast_all(&ray, distance, settings.occluder_mask)
                .iter()
                .any(|hit| hit.distance < distance && !owned.contains(&hit.node));
            if blocked {
                return true;
            }
        }
        false
    }

    /// Accurate-mode occluder list, cached per camera.
    pub fn occluders(
        &mut self,
        scene: &dyn SceneGraph,
        camera: &Camera,
        settings: &SeeThroughSettings,
        query: OcclusionQuery<'_>,
    ) -> Vec<RendererId> {
        if let Some(cached) = self.fresh(camera.id, settings, query.now) {
            return cached.occluders.clone();
        }
        self.stats.tests += 1;
        let mut found = Vec::new();
        for node in scene.all_nodes() {
            if query.owned.contains(&node)
                || !layer_in_mask(scene.layer(node), settings.occluder_mask)
                || !scene.is_active(node)
            {
                continue;
            }
            let Some(info) = scene.renderer(node) else { continue };
            if !info.enabled || info.kind == RendererKind::Other {
                continue;
            }
            let crosses = query.objects.iter().any(|b| {
                let to_object = b.center - camera.position;
                let distance = to_object.length();
                let ray = Ray::new(camera.position, to_object);
                info.bounds.intersect_ray(&ray).is_some_and(|t| t < distance)
            });
            if crosses {
                found.push(info.id);
            }
        }
        let entry = self.cameras.entry(camera.id).or_default();
        entry.last_test = query.now;
        entry.accurate = settings.occluder_mask_accurate;
        entry.occluders.clone_from(&found);
        tracing::trace!(camera = ?camera.id, occluders = found.len(), "occluders collected");
        found
    }

    /// Cached state of a camera.
    #[must_use]
    pub fn camera(&self, camera: CameraId) -> Option<&CameraOcclusion> {
        self.cameras.get(&camera)
    }

    /// Forgets every camera.
    pub fn clear(&mut self) {
        self.cameras.clear();
    }

    /// Lifetime counters
    #[must_use]
    pub const fn stats(&self) -> OcclusionStats {
        self.stats
    }
}

/// Union of all bounds, `None` for an empty slice.
#[must_use]
pub fn combined_bounds(objects: &[Bounds]) -> Option<Bounds> {
    let (first, rest) = objects.split_first()?;
    let mut out = *first;
    for b in rest {
        out.encapsulate(b);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffectConfiguration;
    use crate::testing::MockScene;
    use halo_shared::{MeshData, MeshId};
    use std::sync::Arc;

    fn cube() -> Arc<MeshData> {
        Arc::new(MeshData::new(
            MeshId(1),
            vec![Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, 0.5, 0.5), Vec3::new(0.5, -0.5, 0.5)],
            vec![Vec3::Y; 3],
            vec![0, 1, 2],
        ))
    }

    fn setup() -> (MockScene, NodeId, NodeId, Camera) {
        let mut scene = MockScene::new();
        let target = scene.add_mesh_object("Target", None, cube(), Vec3::new(0.0, 0.0, -10.0));
        let wall = scene.add_mesh_object("Wall", None, cube(), Vec3::new(0.0, 0.0, -5.0));
        let camera = Camera::perspective(CameraId(1), Vec3::ZERO, -Vec3::Z, 60.0, 800, 600);
        (scene, target, wall, camera)
    }

    fn settings() -> SeeThroughSettings {
        let mut s = EffectConfiguration::default().see_through;
        s.occluder_mask = 1;
        s
    }

    #[test]
    fn test_wall_occludes() {
        let (scene, target, _, camera) = setup();
        let owned: BTreeSet<NodeId> = [target].into_iter().collect();
        let objects = [scene.renderer(target).unwrap().bounds];
        let mut tester = OcclusionTester::new();
        let q = OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 };
        assert!(tester.is_occluded(&scene, &camera, &settings(), q));
    }

    #[test]
    fn test_own_collider_does_not_occlude() {
        let (mut scene, target, wall, camera) = setup();
        scene.remove_node(wall);
        let owned: BTreeSet<NodeId> = [target].into_iter().collect();
        let objects = [scene.renderer(target).unwrap().bounds];
        let mut tester = OcclusionTester::new();
        let q = OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 };
        assert!(!tester.is_occluded(&scene, &camera, &settings(), q));
    }

    #[test]
    fn test_result_cached_within_interval() {
        let (mut scene, target, wall, camera) = setup();
        let owned: BTreeSet<NodeId> = [target].into_iter().collect();
        let objects = [scene.renderer(target).unwrap().bounds];
        let mut tester = OcclusionTester::new();
        let s = settings();
        assert!(tester.is_occluded(&scene, &camera, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 }));

        scene.remove_node(wall);
        assert!(tester.is_occluded(&scene, &camera, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 0.5 }));
        assert_eq!(tester.stats().cached, 1);
        assert!(!tester.is_occluded(&scene, &camera, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 1.0 }));
        assert_eq!(tester.stats().tests, 2);
    }

    #[test]
    fn test_cache_is_per_camera() {
        let (scene, target, _, camera) = setup();
        let other = Camera::perspective(CameraId(2), Vec3::new(0.0, 0.0, -20.0), Vec3::Z, 60.0, 800, 600);
        let owned: BTreeSet<NodeId> = [target].into_iter().collect();
        let objects = [scene.renderer(target).unwrap().bounds];
        let mut tester = OcclusionTester::new();
        let s = settings();
        assert!(tester.is_occluded(&scene, &camera, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 }));
        assert!(!tester.is_occluded(&scene, &other, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 }));
        assert!(tester.camera(CameraId(1)).is_some_and(|c| c.occluded));
    }

    #[test]
    fn test_accurate_collects_crossing_occluders() {
        let (mut scene, target, wall, camera) = setup();
        let aside = scene.add_mesh_object("Aside", None, cube(), Vec3::new(10.0, 0.0, -5.0));
        let owned: BTreeSet<NodeId> = [target].into_iter().collect();
        let objects = [scene.renderer(target).unwrap().bounds];
        let mut tester = OcclusionTester::new();
        let found =
            tester.occluders(&scene, &camera, &settings(), OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 });
        assert_eq!(found, vec![scene.renderer(wall).unwrap().id]);
        assert!(!found.contains(&scene.renderer(aside).unwrap().id));
    }

    #[test]
    fn test_mode_switch_retests() {
        let (scene, target, wall, camera) = setup();
        let owned: BTreeSet<NodeId> = [target].into_iter().collect();
        let objects = [scene.renderer(target).unwrap().bounds];
        let mut tester = OcclusionTester::new();
        let mut s = settings();
        assert!(tester.is_occluded(&scene, &camera, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 0.0 }));

        s.occluder_mask_accurate = true;
        let found = tester.occluders(&scene, &camera, &s, OcclusionQuery { owned: &owned, objects: &objects, now: 0.1 });
        assert_eq!(found, vec![scene.renderer(wall).unwrap().id]);
        assert_eq!(tester.stats().tests, 2);
        assert_eq!(tester.stats().cached, 0);
        assert!(tester.camera(CameraId(1)).is_some_and(|c| c.accurate));
    }

    #[test]
    fn test_combined_bounds() {
        let a = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let b = Bounds::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ONE);
        let c = combined_bounds(&[a, b]).unwrap();
        assert!(c.min().abs_diff_eq(Vec3::new(-0.5, -0.5, -0.5), 1e-6));
        assert!(c.max().abs_diff_eq(Vec3::new(2.5, 0.5, 0.5), 1e-6));
        assert!(combined_bounds(&[]).is_none());
    }
}
