//! # Effect Registry
//!
//! Ordered collection of every live effect plus the process-wide
//! [`HighlightContext`] they share.
//!
//! ```text
//! EffectRegistry
//! ├── HighlightContext
//! │   ├── GeometryCache      (derived meshes, ref-counted per effect)
//! │   └── sweep guard        (frame, camera) of the last ordered sweep
//! └── effects: EffectId ─► HighlightEffect   (creation order)
//! ```
//!
//! Effects render in creation order. Effects with `custom_sorting` set
//! trigger one sweep over the whole registry per (frame, camera); the
//! per-effect duplicate guard then skips their own callbacks.

use std::collections::BTreeMap;

use halo_shared::{CameraId, EffectId, HighlightEvent, NodeId};

use crate::config::EffectConfiguration;
use crate::effect::{HighlightEffect, RenderServices};
use crate::error::{HighlightError, HighlightResult};
use crate::geometry::GeometryCache;
use crate::ral::RenderBackend;
use crate::scene::{Camera, SceneGraph};
use crate::stats::FrameStats;

/// Shared state of all effects, torn down explicitly.
#[derive(Debug, Default)]
pub struct HighlightContext {
    /// Derived and combined meshes
    pub cache: GeometryCache,
    sweep: Option<(u64, CameraId)>,
}

impl HighlightContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the ordered sweep for `(frame, camera)`.
    fn claim_sweep(&mut self, frame: u64, camera: CameraId) -> bool {
        if self.sweep == Some((frame, camera)) {
            return false;
        }
        self.sweep = Some((frame, camera));
        true
    }
}

/// Every live effect, keyed by id.
#[derive(Debug)]
pub struct EffectRegistry {
    context: HighlightContext,
    effects: BTreeMap<EffectId, HighlightEffect>,
    next_id: u64,
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectRegistry {
    /// Empty registry with a fresh context.
    #[must_use]
    pub fn new() -> Self {
        Self { context: HighlightContext::new(), effects: BTreeMap::new(), next_id: 1 }
    }

    /// Shared context
    #[must_use]
    pub const fn context(&self) -> &HighlightContext {
        &self.context
    }

    /// Shared geometry cache
    #[must_use]
    pub const fn cache(&self) -> &GeometryCache {
        &self.context.cache
    }

    /// Number of live effects
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// True when no effect is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Ids in render order.
    pub fn ids(&self) -> impl Iterator<Item = EffectId> + '_ {
        self.effects.keys().copied()
    }

    /// Registers a new effect on `target`.
    pub fn create(&mut self, target: NodeId, config: EffectConfiguration) -> EffectId {
        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.effects.insert(id, HighlightEffect::new(id, target, config));
        tracing::debug!(effect = ?id, ?target, "effect created");
        id
    }

    /// Effect by id.
    ///
    /// # Errors
    /// [`HighlightError::UnknownEffect`] for ids not registered.
    pub fn get(&self, id: EffectId) -> HighlightResult<&HighlightEffect> {
        self.effects.get(&id).ok_or(HighlightError::UnknownEffect(id))
    }

    /// Mutable effect by id.
    ///
    /// # Errors
    /// [`HighlightError::UnknownEffect`] for ids not registered.
    pub fn get_mut(&mut self, id: EffectId) -> HighlightResult<&mut HighlightEffect> {
        self.effects.get_mut(&id).ok_or(HighlightError::UnknownEffect(id))
    }

    /// Destroys an effect, releasing its materials and its share of every
    /// cached mesh.
    ///
    /// # Errors
    /// [`HighlightError::UnknownEffect`] for ids not registered.
    pub fn destroy(&mut self, id: EffectId, backend: &mut dyn RenderBackend) -> HighlightResult<()> {
        let mut effect = self.effects.remove(&id).ok_or(HighlightError::UnknownEffect(id))?;
        effect.destroy(backend, &mut self.context.cache);
        Ok(())
    }

    /// Renders one effect for `camera`, as the host's per-object callback.
    ///
    /// With custom sorting the first callback of a (frame, camera) pair
    /// renders every effect in registry order and later callbacks are
    /// skipped by the per-effect guard.
    ///
    /// # Errors
    /// [`HighlightError::UnknownEffect`] for ids not registered.
    pub fn render_effect(
        &mut self,
        id: EffectId,
        backend: &mut dyn RenderBackend,
        scene: &dyn SceneGraph,
        camera: &Camera,
        frame: u64,
        now: f32,
    ) -> HighlightResult<FrameStats> {
        let custom = self.get(id)?.config().general.custom_sorting;
        if custom {
            if self.context.claim_sweep(frame, camera.id) {
                self.render_camera(backend, scene, camera, frame, now);
            }
            return Ok(self.get(id)?.last_stats());
        }
        let mut svc = RenderServices { backend, cache: &mut self.context.cache, scene };
        let effect = self.effects.get_mut(&id).ok_or(HighlightError::UnknownEffect(id))?;
        Ok(effect.render_camera(&mut svc, camera, frame, now))
    }

    /// Renders every effect for `camera` in registry order.
    pub fn render_camera(
        &mut self,
        backend: &mut dyn RenderBackend,
        scene: &dyn SceneGraph,
        camera: &Camera,
        frame: u64,
        now: f32,
    ) -> FrameStats {
        let mut svc = RenderServices { backend, cache: &mut self.context.cache, scene };
        let mut total = FrameStats::default();
        for effect in self.effects.values_mut() {
            let stats = effect.render_camera(&mut svc, camera, frame, now);
            total.accumulate(&stats);
        }
        tracing::trace!(camera = ?camera.id, frame, draws = total.draw_calls, "camera rendered");
        total
    }

    /// Events of every effect, in registry order.
    pub fn drain_events(&mut self) -> Vec<HighlightEvent> {
        self.effects.values_mut().flat_map(HighlightEffect::drain_events).collect()
    }

    /// Drops every cached mesh; effects rebuild on their next frame.
    pub fn clear_caches(&mut self, backend: &mut dyn RenderBackend) {
        for effect in self.effects.values_mut() {
            effect.refresh(true);
        }
        self.context.cache.clear(backend);
        self.context.sweep = None;
        tracing::debug!(effects = self.effects.len(), "caches cleared");
    }

    /// Destroys every effect and clears the context.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for (_, mut effect) in std::mem::take(&mut self.effects) {
            effect.destroy(backend, &mut self.context.cache);
        }
        self.context.cache.clear(backend);
        self.context.sweep = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{MockScene, RecordingBackend};
    use halo_shared::{MeshData, MeshId, Vec3};

    fn scene() -> (MockScene, NodeId, NodeId) {
        let mut scene = MockScene::new();
        let a = scene.add_mesh_object("A", None, Arc::new(MeshData::cube(MeshId(1))), Vec3::ZERO);
        let b = scene.add_mesh_object("B", None, Arc::new(MeshData::cube(MeshId(2))), Vec3::X);
        (scene, a, b)
    }

    fn camera() -> Camera {
        Camera::perspective(CameraId(1), Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 60.0, 640, 480)
    }

    #[test]
    fn test_unknown_effect() {
        let mut registry = EffectRegistry::new();
        let mut backend = RecordingBackend::new();
        assert_eq!(registry.destroy(EffectId(42), &mut backend), Err(HighlightError::UnknownEffect(EffectId(42))));
        assert!(registry.get(EffectId(1)).is_err());
    }

    #[test]
    fn test_ids_in_creation_order() {
        let mut registry = EffectRegistry::new();
        let a = registry.create(NodeId(1), EffectConfiguration::default());
        let b = registry.create(NodeId(2), EffectConfiguration::default());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_custom_sorting_sweeps_once() {
        let (scene, a, b) = scene();
        let mut backend = RecordingBackend::new();
        let mut registry = EffectRegistry::new();
        let mut cfg = EffectConfiguration::default();
        cfg.general.custom_sorting = true;
        let ea = registry.create(a, cfg.clone());
        let eb = registry.create(b, cfg);
        for id in [ea, eb] {
            registry.get_mut(id).unwrap().set_highlighted(true, 0.0);
        }
        let cam = camera();
        registry.render_effect(eb, &mut backend, &scene, &cam, 1, 0.0).unwrap();
        assert_eq!(backend.submitted.len(), 2);
        let stats = registry.render_effect(ea, &mut backend, &scene, &cam, 1, 0.0).unwrap();
        assert_eq!(backend.submitted.len(), 2);
        assert_eq!(stats.objects, 1);
    }

    #[test]
    fn test_render_camera_accumulates() {
        let (scene, a, b) = scene();
        let mut backend = RecordingBackend::new();
        let mut registry = EffectRegistry::new();
        for node in [a, b] {
            let id = registry.create(node, EffectConfiguration::default());
            registry.get_mut(id).unwrap().set_highlighted(true, 0.0);
        }
        let total = registry.render_camera(&mut backend, &scene, &camera(), 1, 0.0);
        assert_eq!(total.objects, 2);
        assert_eq!(total.mask_draws, 2);
        assert_eq!(registry.drain_events().len(), 4);
    }

    #[test]
    fn test_clear_caches_forces_rebuild() {
        let (scene, a, _) = scene();
        let mut backend = RecordingBackend::new();
        let mut registry = EffectRegistry::new();
        let id = registry.create(a, EffectConfiguration::default());
        registry.get_mut(id).unwrap().set_highlighted(true, 0.0);
        registry.render_camera(&mut backend, &scene, &camera(), 1, 0.0);
        assert!(!registry.cache().is_empty());
        registry.clear_caches(&mut backend);
        assert!(registry.cache().is_empty());
        registry.render_camera(&mut backend, &scene, &camera(), 2, 0.0);
        assert!(!registry.cache().is_empty());
    }
}
