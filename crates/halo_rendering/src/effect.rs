//! # Highlight Effect
//!
//! One highlight instance: configuration, runtime state and the bindings of
//! every renderer it applies to.
//!
//! ```text
//!   host calls                      per camera, per frame
//! ┌──────────────────┐        ┌──────────────────────────────────┐
//! │ set_highlighted  │        │ duplicate guard ─► camera cull   │
//! │ hit_fx/target_fx │──────► │ profile sync ─► lazy rebuild     │
//! │ set_target(s)    │ dirty  │ occlusion ─► tint ─► compositor  │
//! │ profile_*        │ flags  │ fade advance ─► events ─► label  │
//! └──────────────────┘        └──────────────────────────────────┘
//! ```
//!
//! Structural changes (targets, profiles, `refresh`) only mark the effect;
//! the bindings are rebuilt at the start of the next rendered frame.

use std::collections::BTreeSet;

use halo_shared::{Bounds, Color, EffectId, HighlightEvent, HighlightEventKind, NodeId, RendererId, Vec3};

use crate::compositor::{
    camera_distance_fade, update_label, Decorations, FadeDurations, FadeRequest, FadeTracker, FrameCompositor,
    FrameInputs, FrameJob, HitFlash,
};
use crate::config::{
    EffectConfiguration, EffectProfile, HitFxTriggerMode, IconAssetType, OverlayMode, SeeThroughMode, TargetOptions,
};
use crate::error::HighlightError;
use crate::geometry::GeometryCache;
use crate::group::{MeshGroupBuilder, ObjectBinding};
use crate::material::{EffectKind, MaterialBinder};
use crate::occlusion::{combined_bounds, OcclusionQuery, OcclusionTester};
use crate::ral::RenderBackend;
use crate::scene::{layer_in_mask, Camera, CameraKind, LabelOverlay, SceneGraph};
use crate::stats::FrameStats;

/// Host collaborators needed to render or rebuild an effect.
pub struct RenderServices<'a> {
    /// Rendering backend
    pub backend: &'a mut dyn RenderBackend,
    /// Shared derived geometry
    pub cache: &'a mut GeometryCache,
    /// Scene being rendered
    pub scene: &'a dyn SceneGraph,
}

/// A highlight effect attached to a target node.
pub struct HighlightEffect {
    id: EffectId,
    target: NodeId,
    explicit: Vec<NodeId>,
    config: EffectConfiguration,
    profile: Option<EffectProfile>,
    applied_revision: u64,
    bindings: Vec<ObjectBinding>,
    binder: MaterialBinder,
    fade: FadeTracker,
    hit: HitFlash,
    decorations: Decorations,
    compositor: FrameCompositor,
    occlusion: OcclusionTester,
    events: Vec<HighlightEvent>,
    last_error: Option<HighlightError>,
    label: Option<Box<dyn LabelOverlay>>,
    hit_position: Option<Vec3>,
    sprite_mode: bool,
    needs_rebuild: bool,
    discard_meshes: bool,
    needs_apply: bool,
    built: bool,
}

impl std::fmt::Debug for HighlightEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightEffect")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("bindings", &self.bindings.len())
            .field("highlighted", &self.fade.is_highlighted())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl HighlightEffect {
    /// Effect on `target`; bindings are built on the first rendered frame.
    #[must_use]
    pub fn new(id: EffectId, target: NodeId, config: EffectConfiguration) -> Self {
        Self {
            id,
            target,
            explicit: Vec::new(),
            config,
            profile: None,
            applied_revision: 0,
            bindings: Vec::new(),
            binder: MaterialBinder::new(),
            fade: FadeTracker::new(),
            hit: HitFlash::new(),
            decorations: Decorations::new(),
            compositor: FrameCompositor::new(),
            occlusion: OcclusionTester::new(),
            events: Vec::new(),
            last_error: None,
            label: None,
            hit_position: None,
            sprite_mode: false,
            needs_rebuild: true,
            discard_meshes: false,
            needs_apply: true,
            built: false,
        }
    }

    /// Identity
    #[must_use]
    pub const fn id(&self) -> EffectId {
        self.id
    }

    /// Target node
    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    /// Current configuration
    #[must_use]
    pub const fn config(&self) -> &EffectConfiguration {
        &self.config
    }

    /// Mutable configuration; materials are re-applied before the next frame.
    ///
    /// Target discovery settings take effect after [`refresh`](Self::refresh).
    pub fn config_mut(&mut self) -> &mut EffectConfiguration {
        self.needs_apply = true;
        &mut self.config
    }

    /// Bindings of the last rebuild
    #[must_use]
    pub fn bindings(&self) -> &[ObjectBinding] {
        &self.bindings
    }

    /// Effect-level materials
    #[must_use]
    pub const fn binder(&self) -> &MaterialBinder {
        &self.binder
    }

    /// True while highlighted, including the fade-out.
    #[must_use]
    pub const fn is_highlighted(&self) -> bool {
        self.fade.is_highlighted()
    }

    /// Fade intensity at `now`.
    #[must_use]
    pub fn fade_value(&self, now: f32) -> f32 {
        self.fade.value(now, FadeDurations::from_settings(&self.config.general))
    }

    /// The group contains sprite renderers.
    #[must_use]
    pub const fn sprite_mode(&self) -> bool {
        self.sprite_mode
    }

    /// Last configuration error
    #[must_use]
    pub const fn last_error(&self) -> Option<&HighlightError> {
        self.last_error.as_ref()
    }

    /// Stats of the last rendered frame
    #[must_use]
    pub const fn last_stats(&self) -> FrameStats {
        self.compositor.last_stats()
    }

    /// Occlusion tester and its per-camera cache
    #[must_use]
    pub const fn occlusion(&self) -> &OcclusionTester {
        &self.occlusion
    }

    /// Decoration timers and the last icon placement
    #[must_use]
    pub const fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// Compositor holding the last recorded commands
    #[must_use]
    pub const fn compositor(&self) -> &FrameCompositor {
        &self.compositor
    }

    /// Attaches the label overlay driven by the label settings.
    pub fn set_label(&mut self, label: Box<dyn LabelOverlay>) {
        self.label = Some(label);
    }

    /// Removes and hides the label overlay.
    pub fn take_label(&mut self) -> Option<Box<dyn LabelOverlay>> {
        let mut label = self.label.take();
        if let Some(l) = label.as_deref_mut() {
            l.hide();
        }
        label
    }

    fn push_event(&mut self, kind: HighlightEventKind, now: f32) {
        self.events.push(HighlightEvent { effect: self.id, kind, time: now });
    }

    /// Events raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<HighlightEvent> {
        std::mem::take(&mut self.events)
    }

    /// Turns the highlight on or off, starting a fade when configured.
    pub fn set_highlighted(&mut self, on: bool, now: f32) {
        let was = self.fade.is_highlighted();
        let request = self.fade.request(on, now, FadeDurations::from_settings(&self.config.general));
        if request == FadeRequest::Ignored {
            return;
        }
        if on && !was {
            self.push_event(HighlightEventKind::HighlightStart, now);
        }
        self.push_event(HighlightEventKind::StateChanged(on), now);
        if request == FadeRequest::Ended {
            self.push_event(HighlightEventKind::HighlightEnd, now);
        }
        if on {
            if self.config.target_fx.enabled {
                self.decorations.start_target(now);
            }
            if self.config.icon_fx.enabled {
                self.decorations.start_icon(now);
            }
            if self.config.hit_fx.trigger_mode == HitFxTriggerMode::WhenHighlighted && !was {
                let h = &self.config.hit_fx;
                let (color, duration) = (h.color, h.fade_out_duration);
                self.hit_fx(color, duration, 1.0, now);
            }
        }
        self.needs_apply = true;
        tracing::debug!(effect = ?self.id, on, ?request, "highlight requested");
    }

    /// Starts a hit flash.
    pub fn hit_fx(&mut self, color: Color, duration: f32, intensity: f32, now: f32) {
        self.hit.trigger(color, duration, intensity, now);
        self.push_event(HighlightEventKind::HitFx, now);
    }

    /// Starts a hit flash localized at a world position.
    pub fn hit_fx_at(&mut self, position: Vec3, color: Color, duration: f32, intensity: f32, now: f32) {
        self.hit.trigger_at(position, color, duration, intensity, now);
        self.hit_position = Some(position);
        self.push_event(HighlightEventKind::HitFx, now);
    }

    /// Restarts the target reticle animation.
    pub fn target_fx(&mut self, now: f32) {
        self.decorations.start_target(now);
    }

    /// Restarts the icon animation.
    pub fn icon_fx(&mut self, now: f32) {
        self.decorations.start_icon(now);
    }

    /// Records the last hit position, used to center the reticle.
    pub fn set_hit_position(&mut self, position: Vec3) {
        self.hit_position = Some(position);
    }

    /// Moves the effect to another target node.
    pub fn set_target(&mut self, target: NodeId) {
        if target != self.target {
            self.target = target;
            self.needs_rebuild = true;
        }
    }

    /// Highlights exactly `renderers` (nodes carrying them).
    pub fn set_targets(&mut self, target: NodeId, renderers: &[NodeId]) {
        self.target = target;
        self.explicit = renderers.to_vec();
        self.config.target.mode = TargetOptions::Scripting;
        self.needs_rebuild = true;
    }

    /// Rebuilds the bindings on the next frame, optionally re-deriving
    /// every cached mesh this effect uses.
    pub fn refresh(&mut self, discard_cached_meshes: bool) {
        self.needs_rebuild = true;
        self.discard_meshes |= discard_cached_meshes;
    }

    /// True when `node` carries one of the bound renderers.
    #[must_use]
    pub fn includes(&self, node: NodeId) -> bool {
        self.bindings.iter().any(|b| b.node == node)
    }

    /// Sets every glow pass color and the smooth glow color.
    pub fn set_glow_color(&mut self, color: Color) {
        for pass in &mut self.config.glow.passes {
            pass.color = color;
        }
        self.config.glow.hq_color = color;
        self.needs_apply = true;
    }

    /// Attaches `profile` and applies it.
    pub fn profile_load(&mut self, profile: EffectProfile) {
        self.profile = Some(profile);
        self.profile_reload();
    }

    /// Re-applies the attached profile.
    pub fn profile_reload(&mut self) {
        let Some(profile) = &self.profile else { return };
        profile.load(&mut self.config);
        self.applied_revision = profile.revision;
        self.needs_rebuild = true;
        tracing::debug!(effect = ?self.id, profile = %profile.name, revision = profile.revision, "profile applied");
    }

    /// Stores the current configuration in the attached profile.
    pub fn profile_save_changes(&mut self) {
        if let Some(profile) = &mut self.profile {
            profile.save(&self.config);
            self.applied_revision = profile.revision;
        }
    }

    /// Attached profile
    #[must_use]
    pub const fn profile(&self) -> Option<&EffectProfile> {
        self.profile.as_ref()
    }

    /// Notification that a shared profile changed.
    ///
    /// Replaces the attached copy when it is the same profile and re-applies
    /// it in sync mode.
    pub fn profile_changed(&mut self, updated: &EffectProfile) {
        let Some(profile) = &mut self.profile else { return };
        if profile.name != updated.name {
            return;
        }
        profile.clone_from(updated);
        self.sync_profile();
    }

    /// Re-applies a sync-mode profile whose revision moved.
    pub fn sync_profile(&mut self) {
        let stale = self.profile.as_ref().is_some_and(|p| p.sync && p.revision != self.applied_revision);
        if stale {
            self.profile_reload();
        }
    }

    fn rebuild(&mut self, svc: &mut RenderServices<'_>) {
        if self.discard_meshes {
            svc.cache.release_user(svc.backend, self.id);
            self.discard_meshes = false;
        }
        let previous = std::mem::take(&mut self.bindings);
        let build = MeshGroupBuilder::new(svc.backend, svc.cache, svc.scene, self.id).rebuild(
            &mut self.config,
            self.target,
            &self.explicit,
            previous,
            &mut self.binder,
        );
        self.bindings = build.bindings;
        self.sprite_mode = build.sprite_mode;
        self.last_error = build.error.or_else(|| self.missing_asset());
        self.occlusion.clear();
        self.needs_rebuild = false;
        self.needs_apply = true;
        self.built = true;
    }

    fn missing_asset(&self) -> Option<HighlightError> {
        let icon = &self.config.icon_fx;
        if icon.enabled && icon.asset_type == IconAssetType::Mesh && icon.mesh.is_none() {
            tracing::warn!(effect = ?self.id, "icon enabled without a mesh");
            return Some(HighlightError::MissingAsset { asset: "icon mesh".to_owned() });
        }
        None
    }

    /// True when bindings no longer match the scene or lack a required kind.
    fn bindings_stale(&self, scene: &dyn SceneGraph) -> bool {
        if !self.config.general.ignore_object_visibility {
            let changed = self.bindings.iter().any(|b| match scene.renderer(b.node) {
                Some(info) => info.id != b.renderer || info.visible != b.visible_at_setup,
                None => {
                    tracing::debug!(error = %HighlightError::StaleRenderer(b.renderer), "binding invalidated");
                    true
                }
            });
            if changed {
                return true;
            }
        }
        EffectKind::required_kinds(&self.config).any(|kind| {
            !self.binder.reported(kind.program()) && self.bindings.iter().any(|b| !b.materials.has(kind))
        })
    }

    /// Renders this effect for `camera`.
    ///
    /// `frame` and the camera id form the duplicate guard: a second call
    /// for the same pair is skipped.
    pub fn render_camera(&mut self, svc: &mut RenderServices<'_>, camera: &Camera, frame: u64, now: f32) -> FrameStats {
        if !self.compositor.claim(frame, camera.id) {
            return FrameStats::skipped();
        }
        if camera.kind == CameraKind::Reflection && !self.config.general.reflection_probes {
            return FrameStats::default();
        }
        if !layer_in_mask(camera.layer, self.config.general.cameras_layer_mask) {
            return FrameStats::default();
        }
        self.sync_profile();
        if self.needs_rebuild || !self.built || self.bindings_stale(svc.scene) {
            self.rebuild(svc);
        }
        if self.needs_apply {
            self.binder.apply(svc.backend, &self.config, &self.bindings, self.fade.is_highlighted());
            self.decorations.prepare(svc.backend, svc.cache, &self.config);
            self.needs_apply = false;
        }

        let durations = FadeDurations::from_settings(&self.config.general);
        let highlighted = self.fade.is_highlighted();
        let fade = self.fade.value(now, durations);
        let placements = self.object_bounds(svc.scene);

        let mut occluders = Vec::new();
        let uses_see_through = self.config.see_through.intensity > 0.0
            && match self.config.see_through.mode {
                SeeThroughMode::Never => false,
                SeeThroughMode::WhenHighlighted => highlighted,
                SeeThroughMode::AlwaysWhenOccluded => true,
            };
        let see_through = uses_see_through
            && (self.config.see_through.occluder_mask == u32::MAX
                || self.occlusion_test(svc.scene, camera, &placements, now, &mut occluders));

        let overlay_always = self.config.overlay.mode == OverlayMode::Always;
        let surface_fade = if overlay_always && !highlighted { 1.0 } else { fade };
        let hit_was_active = self.hit.is_active();
        let tint = self.hit.resolve(&self.config, highlighted, surface_fade, now);
        let show_surface = hit_was_active || overlay_always;

        let mut stats = FrameStats::default();
        if highlighted || see_through || show_surface {
            let inputs = FrameInputs {
                scene: svc.scene,
                camera,
                now,
                highlighted,
                fade,
                tint,
                show_surface,
                see_through,
                occluders: &occluders,
                hit_position: self.hit_position,
            };
            let job = FrameJob {
                cfg: &self.config,
                bindings: &mut self.bindings,
                binder: &self.binder,
                decorations: &mut self.decorations,
            };
            stats = self.compositor.render(svc.backend, svc.cache, job, &inputs);
        }

        if self.fade.advance(now, durations) {
            self.push_event(HighlightEventKind::HighlightEnd, now);
            self.needs_apply = true;
            tracing::debug!(effect = ?self.id, "highlight ended");
        }
        self.refresh_label(camera, fade, &placements);
        stats
    }

    fn object_bounds(&self, scene: &dyn SceneGraph) -> Vec<(Bounds, Vec3)> {
        self.bindings
            .iter()
            .filter_map(|b| {
                let info = scene.renderer(b.node)?;
                let position = scene.transform(b.node).map_or(info.bounds.center, |t| t.position);
                Some((info.bounds, position))
            })
            .collect()
    }

    fn occlusion_test(
        &mut self,
        scene: &dyn SceneGraph,
        camera: &Camera,
        placements: &[(Bounds, Vec3)],
        now: f32,
        occluders: &mut Vec<RendererId>,
    ) -> bool {
        let owned: BTreeSet<NodeId> = self.bindings.iter().map(|b| b.node).collect();
        let objects: Vec<Bounds> = placements.iter().map(|(b, _)| *b).collect();
        let query = OcclusionQuery { owned: &owned, objects: &objects, now };
        let settings = &self.config.see_through;
        if settings.occluder_mask_accurate {
            *occluders = self.occlusion.occluders(scene, camera, settings, query);
            !occluders.is_empty()
        } else {
            self.occlusion.is_occluded(scene, camera, settings, query)
        }
    }

    fn refresh_label(&mut self, camera: &Camera, fade: f32, placements: &[(Bounds, Vec3)]) {
        let Some(label) = self.label.as_deref_mut() else { return };
        let bounds: Vec<Bounds> = placements.iter().map(|(b, _)| *b).collect();
        let Some(anchor) = combined_bounds(&bounds) else {
            label.hide();
            return;
        };
        let distance_fade = placements
            .first()
            .map_or(1.0, |(_, position)| camera_distance_fade(&self.config.general, camera, *position));
        update_label(label, &self.config, self.fade.is_highlighted(), fade, distance_fade, &anchor);
    }

    /// Frees every resource the effect holds.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend, cache: &mut GeometryCache) {
        for mut binding in self.bindings.drain(..) {
            binding.release(backend);
        }
        self.binder.destroy(backend);
        self.decorations.release(backend);
        cache.release_user(backend, self.id);
        if let Some(label) = self.label.as_deref_mut() {
            label.hide();
        }
        self.compositor.reset();
        self.built = false;
        self.needs_rebuild = true;
        self.needs_apply = true;
        tracing::debug!(effect = ?self.id, "effect destroyed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::HitFxMode;
    use crate::ral::ShaderProgram;
    use crate::testing::{MockScene, RecordingBackend};
    use halo_shared::{CameraId, MeshData, MeshId};

    struct World {
        scene: MockScene,
        backend: RecordingBackend,
        cache: GeometryCache,
        camera: Camera,
        root: NodeId,
    }

    impl World {
        fn new() -> Self {
            let mut scene = MockScene::new();
            let root = scene.add_node("Crate", None);
            scene.add_mesh_object("Body", Some(root), Arc::new(MeshData::cube(MeshId(1))), Vec3::ZERO);
            let camera = Camera::perspective(CameraId(1), Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 60.0, 640, 480);
            Self { scene, backend: RecordingBackend::new(), cache: GeometryCache::new(), camera, root }
        }

        fn render(&mut self, effect: &mut HighlightEffect, frame: u64, now: f32) -> FrameStats {
            let mut svc = RenderServices { backend: &mut self.backend, cache: &mut self.cache, scene: &self.scene };
            effect.render_camera(&mut svc, &self.camera, frame, now)
        }
    }

    #[test]
    fn test_events_follow_fade() {
        let mut world = World::new();
        let mut cfg = EffectConfiguration::default();
        cfg.general.fade_in_duration = 0.5;
        cfg.general.fade_out_duration = 0.5;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, cfg);
        effect.set_highlighted(true, 0.0);
        let kinds: Vec<_> = effect.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![HighlightEventKind::HighlightStart, HighlightEventKind::StateChanged(true)]);

        world.render(&mut effect, 1, 1.0);
        effect.set_highlighted(false, 1.0);
        world.render(&mut effect, 2, 1.2);
        assert!(effect.is_highlighted());
        world.render(&mut effect, 3, 2.0);
        assert!(!effect.is_highlighted());
        let kinds: Vec<_> = effect.drain_events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![HighlightEventKind::StateChanged(false), HighlightEventKind::HighlightEnd]);
        assert!(effect.drain_events().is_empty());
    }

    #[test]
    fn test_not_highlighted_draws_nothing() {
        let mut world = World::new();
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        let stats = world.render(&mut effect, 1, 0.0);
        assert!(stats.is_empty());
        assert!(world.backend.submitted.is_empty());
        assert_eq!(effect.bindings().len(), 1);
    }

    #[test]
    fn test_duplicate_frame_is_skipped() {
        let mut world = World::new();
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        effect.set_highlighted(true, 0.0);
        assert!(!world.render(&mut effect, 5, 0.0).skipped);
        assert!(world.render(&mut effect, 5, 0.0).skipped);
        assert_eq!(world.backend.submitted.len(), 1);
    }

    #[test]
    fn test_reflection_camera_culled() {
        let mut world = World::new();
        world.camera.kind = CameraKind::Reflection;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        effect.set_highlighted(true, 0.0);
        world.render(&mut effect, 1, 0.0);
        assert!(world.backend.submitted.is_empty());
        effect.config_mut().general.reflection_probes = true;
        world.render(&mut effect, 2, 0.0);
        assert_eq!(world.backend.submitted.len(), 1);
    }

    #[test]
    fn test_camera_layer_outside_mask_culled() {
        let mut world = World::new();
        world.camera.layer = 3;
        let mut cfg = EffectConfiguration::default();
        cfg.general.cameras_layer_mask = 1;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, cfg);
        effect.set_highlighted(true, 0.0);
        assert!(world.render(&mut effect, 1, 0.0).is_empty());
        assert!(world.backend.submitted.is_empty());
        effect.config_mut().general.cameras_layer_mask = 1 << 3;
        world.render(&mut effect, 2, 0.0);
        assert_eq!(world.backend.submitted.len(), 1);
    }

    #[test]
    fn test_see_through_when_highlighted_needs_occluder() {
        let mut world = World::new();
        let mut cfg = EffectConfiguration::default();
        cfg.see_through.mode = SeeThroughMode::WhenHighlighted;
        cfg.see_through.occluder_mask = 1;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, cfg.clone());
        effect.set_highlighted(true, 0.0);
        world.render(&mut effect, 1, 0.0);
        assert_eq!(world.backend.draws_with(ShaderProgram::SeeThrough), 0);
        assert_eq!(world.backend.draws_with(ShaderProgram::Mask), 1);

        let mut world = World::new();
        world.scene.add_mesh_object("Wall", None, Arc::new(MeshData::cube(MeshId(2))), Vec3::new(0.0, 0.0, 5.0));
        let mut effect = HighlightEffect::new(EffectId(2), world.root, cfg);
        effect.set_highlighted(true, 0.0);
        world.render(&mut effect, 1, 0.0);
        assert_eq!(world.backend.draws_with(ShaderProgram::SeeThrough), 1);
    }

    #[test]
    fn test_see_through_off_without_intensity() {
        let mut world = World::new();
        let mut cfg = EffectConfiguration::default();
        cfg.see_through.mode = SeeThroughMode::AlwaysWhenOccluded;
        cfg.see_through.intensity = 0.0;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, cfg);
        let stats = world.render(&mut effect, 1, 0.0);
        assert!(stats.is_empty());
        assert_eq!(world.backend.draws_with(ShaderProgram::SeeThrough), 0);
    }

    #[test]
    fn test_hit_flash_shows_overlay_without_highlight() {
        let mut world = World::new();
        let mut cfg = EffectConfiguration::default();
        cfg.hit_fx.mode = HitFxMode::Overlay;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, cfg);
        effect.hit_fx(Color::RED, 0.25, 1.0, 0.0);
        world.render(&mut effect, 1, 0.1);
        assert_eq!(world.backend.draws_with(ShaderProgram::Overlay), 1);
        assert_eq!(world.backend.draws_with(ShaderProgram::Outline), 0);
        world.backend.clear_submissions();
        world.render(&mut effect, 2, 0.3);
        world.render(&mut effect, 3, 0.4);
        assert_eq!(world.backend.draws_with(ShaderProgram::Overlay), 0);
    }

    #[test]
    fn test_visibility_change_rebuilds() {
        let mut world = World::new();
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        effect.set_highlighted(true, 0.0);
        world.render(&mut effect, 1, 0.0);
        let applies = effect.binder().applies();
        let body = effect.bindings()[0].node;
        if let Some(info) = world.scene.renderer_mut(body) {
            info.visible = false;
        }
        world.render(&mut effect, 2, 0.0);
        assert!(effect.binder().applies() > applies);
        assert!(!effect.bindings()[0].visible_at_setup);
    }

    #[test]
    fn test_scripting_targets() {
        let mut world = World::new();
        let other = world.scene.add_mesh_object("Other", None, Arc::new(MeshData::cube(MeshId(9))), Vec3::X);
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        effect.set_targets(world.root, &[other]);
        world.render(&mut effect, 1, 0.0);
        assert!(effect.includes(other));
        assert_eq!(effect.bindings().len(), 1);
        assert_eq!(effect.config().target.mode, TargetOptions::Scripting);
    }

    #[test]
    fn test_glow_color_applies_to_passes() {
        let mut effect = HighlightEffect::new(EffectId(1), NodeId(1), EffectConfiguration::default());
        effect.set_glow_color(Color::RED);
        assert!(effect.config().glow.passes.iter().all(|p| p.color == Color::RED));
        assert_eq!(effect.config().glow.hq_color, Color::RED);
    }

    #[test]
    fn test_profile_sync() {
        let mut world = World::new();
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        let mut shared = EffectProfile::new("selection", EffectConfiguration::default());
        shared.sync = true;
        effect.profile_load(shared.clone());

        let mut changed = EffectConfiguration::default();
        changed.outline.width = 1.25;
        shared.save(&changed);
        effect.profile_changed(&shared);
        assert!((effect.config().outline.width - 1.25).abs() < 1e-6);

        effect.config_mut().outline.width = 2.0;
        effect.profile_save_changes();
        world.render(&mut effect, 1, 0.0);
        assert!((effect.config().outline.width - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_icon_mesh_records_error() {
        let mut world = World::new();
        let mut cfg = EffectConfiguration::default();
        cfg.icon_fx.enabled = true;
        cfg.icon_fx.asset_type = IconAssetType::Mesh;
        cfg.icon_fx.mesh = None;
        let mut effect = HighlightEffect::new(EffectId(1), world.root, cfg);
        world.render(&mut effect, 1, 0.0);
        assert!(matches!(effect.last_error(), Some(HighlightError::MissingAsset { .. })));
    }

    #[test]
    fn test_destroy_releases_materials() {
        let mut world = World::new();
        let mut effect = HighlightEffect::new(EffectId(1), world.root, EffectConfiguration::default());
        effect.set_highlighted(true, 0.0);
        world.render(&mut effect, 1, 0.0);
        assert!(world.backend.live_materials() > 0);
        effect.destroy(&mut world.backend, &mut world.cache);
        assert_eq!(world.backend.live_materials(), 0);
        assert!(world.cache.is_empty());
    }
}
