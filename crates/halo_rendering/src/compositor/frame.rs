//! # Frame Compositor
//!
//! Records every pass of one effect for one camera into a single
//! [`CommandBuffer`] and submits it.
//!
//! ```text
//! prepare bindings (skinned bake, cull, render matrix)
//!        │
//!  independent outline ─► mask ─► see-through stencil ─► per object:
//!                                   fade ─► see-through ─► overlay/inner glow
//!                                        ─► silhouette ─► glow ─► outline ─► target
//!        │
//!  icon ─► smooth compose ─► ordered see-through clear ─► submit
//! ```
//!
//! The smooth silhouettes go to their own stream, appended after the
//! per-object passes so the blur reads a complete silhouette buffer.

use halo_shared::{Bounds, CameraId, MaterialHandle, RendererId, Vec3, Vec4};

use crate::config::{ColorStyle, EffectConfiguration, NormalsOption, QualityLevel, SeeThroughSortingMode};
use crate::geometry::GeometryCache;
use crate::group::ObjectBinding;
use crate::material::{params as p, EffectKind, MaterialBinder};
use crate::occlusion::combined_bounds;
use crate::ral::{CommandBuffer, CompareFunction, InstanceParams, ParamValue, PixelRect, RenderBackend, ShaderProgram};
use crate::scene::{layer_in_mask, Camera, RendererKind, SceneGraph};
use crate::stats::FrameStats;

use super::decorations::{camera_distance_fade, DecorationFrame, Decorations};
use super::hit::SurfaceTint;
use super::quality::{glow_intensity_scale, offset_directions};
use super::smooth::{SmoothPass, SmoothVisibility};

/// Per-frame state computed by the owning effect.
#[derive(Clone, Copy)]
pub struct FrameInputs<'a> {
    /// Scene queried for visibility and transforms
    pub scene: &'a dyn SceneGraph,
    /// Camera being rendered
    pub camera: &'a Camera,
    /// Host time
    pub now: f32,
    /// The highlight passes run
    pub highlighted: bool,
    /// Fade factor in [0, 1]
    pub fade: f32,
    /// Overlay and inner glow colors
    pub tint: SurfaceTint,
    /// Overlay and inner glow run while not highlighted (hit flash)
    pub show_surface: bool,
    /// See-through passes run
    pub see_through: bool,
    /// Renderers that occlude the group, accurate mode only
    pub occluders: &'a [RendererId],
    /// Last hit position, for the reticle
    pub hit_position: Option<Vec3>,
}

/// Effect-owned state the compositor draws from.
pub struct FrameJob<'a> {
    /// Effect configuration
    pub cfg: &'a EffectConfiguration,
    /// Objects of the group
    pub bindings: &'a mut [ObjectBinding],
    /// Effect-level materials
    pub binder: &'a MaterialBinder,
    /// Reticle and icon
    pub decorations: &'a mut Decorations,
}

/// World placement of one drawn binding.
#[derive(Debug, Clone, Copy)]
struct Placement {
    bounds: Bounds,
    position: Vec3,
}

/// Records and submits the passes of one effect.
#[derive(Debug, Default)]
pub struct FrameCompositor {
    cmd: CommandBuffer,
    smooth_cmd: CommandBuffer,
    last: Option<(u64, CameraId)>,
    stats: FrameStats,
}

impl FrameCompositor {
    /// Creates a compositor with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `(frame, camera)` as rendered.
    ///
    /// Returns false when the pair was already rendered; the caller skips
    /// the frame in that case.
    pub fn claim(&mut self, frame: u64, camera: CameraId) -> bool {
        if self.last == Some((frame, camera)) {
            return false;
        }
        self.last = Some((frame, camera));
        true
    }

    /// Forgets the last rendered pair.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Commands of the last recorded frame
    #[must_use]
    pub fn last_commands(&self) -> &CommandBuffer {
        &self.cmd
    }

    /// Stats of the last recorded frame
    #[must_use]
    pub const fn last_stats(&self) -> FrameStats {
        self.stats
    }

    /// Records every pass and submits the buffer.
    ///
    /// Nothing is submitted when no object survives culling.
    pub fn render(
        &mut self,
        backend: &mut dyn RenderBackend,
        cache: &mut GeometryCache,
        job: FrameJob<'_>,
        inputs: &FrameInputs<'_>,
    ) -> FrameStats {
        let FrameJob { cfg, bindings, binder, decorations } = job;
        let camera = inputs.camera;
        self.cmd.clear();
        self.smooth_cmd.clear();
        decorations.begin_frame();
        let mut stats = FrameStats::default();

        let placements = prepare(backend, cache, cfg, bindings, inputs, &mut stats);
        if stats.objects == 0 {
            self.stats = stats;
            tracing::trace!(culled = stats.culled, "nothing visible, frame skipped");
            return stats;
        }
        let order = draw_order(cfg, bindings);
        let enclosing = {
            let all: Vec<Bounds> = placements.iter().flatten().map(|pl| pl.bounds).collect();
            combined_bounds(&all)
        };
        let aspect = camera.aspect();
        let smooth_on = inputs.highlighted && cfg.uses_smooth_blend();

        if inputs.highlighted && cfg.outline.independent {
            self.independent_outline(cfg, bindings, &order, binder, camera, aspect);
        }

        let smooth_on_top = smooth_on && SmoothVisibility::resolve(cfg, camera).any_on_top(cfg);
        let mask_on_top = cfg.mask_on_top(inputs.highlighted) || smooth_on_top;
        if cfg.mask_required(inputs.highlighted) {
            let z_test = if mask_on_top { CompareFunction::Always } else { CompareFunction::LessEqual };
            for &i in &order {
                let b = &bindings[i];
                if !b.render {
                    continue;
                }
                for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
                    if let Some(mask) = b.materials.get(EffectKind::Mask, l) {
                        self.cmd.set_param(mask, p::Z_TEST, ParamValue::Int(z_test.as_int()));
                        draw(&mut self.cmd, b, mask, l, 0);
                        stats.mask_draws += 1;
                    }
                }
            }
        }

        let smooth = smooth_on.then(|| SmoothPass::begin(&mut self.smooth_cmd, cfg, camera));

        if inputs.see_through {
            if let Some(occluder) = binder.shared(ShaderProgram::SeeThroughOccluder) {
                for &r in inputs.occluders {
                    self.cmd.draw_renderer(r, occluder, 0, 0);
                }
            }
            if mask_on_top {
                self.stencil_see_through(cfg, bindings, &order, binder);
            }
        }

        let glow_real = cfg.glow.intensity * glow_intensity_scale(cfg.glow.quality);
        for &i in &order {
            let b = &bindings[i];
            let Some(placement) = placements[i] else { continue };
            let fade = inputs.fade * camera_distance_fade(&cfg.general, camera, placement.position);
            self.cmd.set_global_float(p::FADE_FACTOR, fade);

            if inputs.see_through {
                self.see_through(cfg, b);
            }
            if inputs.highlighted || inputs.show_surface {
                self.surface(cfg, b, &inputs.tint);
            }
            if !inputs.highlighted {
                continue;
            }
            if smooth_on {
                for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
                    if let Some(solid) = b.materials.get(EffectKind::SolidColor, l) {
                        draw(&mut self.smooth_cmd, b, solid, l, 0);
                    }
                }
            }
            if cfg.glow.intensity > 0.0 && cfg.glow.quality != QualityLevel::Highest {
                stats.glow_draws += self.glow(cfg, b, fade, glow_real, aspect);
            }
            if cfg.outline.intensity > 0.0 && cfg.outline.quality != QualityLevel::Highest {
                stats.outline_draws += self.outline(cfg, b, fade, aspect, &placement.bounds);
            }
            let frame = DecorationFrame {
                camera,
                scene: inputs.scene,
                now: inputs.now,
                fade,
                enclosing: enclosing.unwrap_or(placement.bounds),
                hit_position: inputs.hit_position,
            };
            decorations.draw_target(&mut self.cmd, cfg, binder.shared(ShaderProgram::Target), &frame, &placement.bounds);
        }

        if inputs.highlighted {
            if let Some(enclosing) = enclosing {
                let frame = DecorationFrame {
                    camera,
                    scene: inputs.scene,
                    now: inputs.now,
                    fade: inputs.fade,
                    enclosing,
                    hit_position: inputs.hit_position,
                };
                decorations.draw_icon(&mut self.cmd, cfg, binder.shared(ShaderProgram::Icon), &frame);
            }
        }

        if let Some(pass) = smooth {
            let outcome = pass.finish(&mut self.smooth_cmd, cfg, camera, binder, enclosing, inputs.fade);
            stats.targets_acquired = outcome.acquired;
            stats.smooth_composed = outcome.glow || outcome.outline;
            self.cmd.append(&self.smooth_cmd);
        }

        if inputs.see_through && cfg.see_through.ordered {
            self.clear_ordered_stencil(cfg, bindings, &order, binder);
        }

        stats.draw_calls = count(self.cmd.draw_count());
        stats.instances = count(self.cmd.instance_count());
        backend.submit(&self.cmd);
        self.stats = stats;
        tracing::trace!(
            camera = ?camera.id,
            objects = stats.objects,
            draws = stats.draw_calls,
            instances = stats.instances,
            "frame composed"
        );
        stats
    }

    fn independent_outline(
        &mut self,
        cfg: &EffectConfiguration,
        bindings: &[ObjectBinding],
        order: &[usize],
        binder: &MaterialBinder,
        camera: &Camera,
        aspect: f32,
    ) {
        if cfg.uses_smooth_blend() {
            if let Some(clear) = binder.shared(ShaderProgram::ClearStencil) {
                self.cmd.draw_screen_quad(full_screen(camera), clear, 1);
            }
            return;
        }
        let width = cfg.real_outline_width().max(cfg.glow.width);
        let spread = offset_directions(cfg.outline.quality, width, aspect);
        let single = [Vec4::ZERO];
        for &i in order {
            let b = &bindings[i];
            if !b.render {
                continue;
            }
            let multi = b.normals != NormalsOption::Planar && cfg.outline.quality.uses_multiple_offsets();
            let directions: &[Vec4] = if multi { &spread } else { &single };
            for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
                let Some(outline) = b.materials.get(EffectKind::Outline, l) else { continue };
                for &direction in directions {
                    self.cmd.set_param(outline, p::OUTLINE_DIRECTION, ParamValue::Vector(direction));
                    draw(&mut self.cmd, b, outline, l, 1);
                }
            }
        }
    }

    fn stencil_see_through(
        &mut self,
        cfg: &EffectConfiguration,
        bindings: &[ObjectBinding],
        order: &[usize],
        binder: &MaterialBinder,
    ) {
        let clear = binder.shared(ShaderProgram::ClearStencil);
        for pass_kind in [None, Some(EffectKind::Mask)] {
            for &i in order {
                let b = &bindings[i];
                if !b.render {
                    continue;
                }
                for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
                    let material = match pass_kind {
                        None => clear,
                        Some(kind) => b.materials.get(kind, l),
                    };
                    if let Some(material) = material {
                        draw(&mut self.cmd, b, material, l, 1);
                    }
                }
            }
        }
    }

    fn see_through(&mut self, cfg: &EffectConfiguration, b: &ObjectBinding) {
        let border = cfg.see_through.border * cfg.see_through.border_width > 0.0;
        for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
            if let Some(fill) = b.materials.get(EffectKind::SeeThrough, l) {
                draw(&mut self.cmd, b, fill, l, 0);
            }
            if border {
                if let Some(edge) = b.materials.get(EffectKind::SeeThroughBorder, l) {
                    draw(&mut self.cmd, b, edge, l, 0);
                }
            }
        }
    }

    fn surface(&mut self, cfg: &EffectConfiguration, b: &ObjectBinding, tint: &SurfaceTint) {
        let o = &cfg.overlay;
        for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
            if tint.overlay.a > 0.0 {
                if let Some(overlay) = b.materials.get(EffectKind::Overlay, l) {
                    let data = Vec4::new(o.animation_speed, tint.overlay_min_intensity, tint.overlay_blending, o.texture_scale);
                    self.cmd.set_param(overlay, p::OVERLAY_COLOR, ParamValue::Color(tint.overlay));
                    self.cmd.set_param(overlay, p::OVERLAY_DATA, ParamValue::Vector(data));
                    let hit = tint.hit_position.unwrap_or(Vec4::ZERO);
                    self.cmd.set_param(overlay, p::OVERLAY_HIT_POS_DATA, ParamValue::Vector(hit));
                    self.cmd.set_param(overlay, p::OVERLAY_HIT_START_TIME, ParamValue::Float(tint.hit_start));
                    draw(&mut self.cmd, b, overlay, l, 0);
                }
            }
            if tint.inner_glow.a > 0.0 {
                if let Some(inner) = b.materials.get(EffectKind::InnerGlow, l) {
                    self.cmd.set_param(inner, p::INNER_GLOW_COLOR, ParamValue::Color(tint.inner_glow));
                    draw(&mut self.cmd, b, inner, l, 0);
                }
            }
        }
    }

    /// Returns the number of glow draws or instances.
    fn glow(&mut self, cfg: &EffectConfiguration, b: &ObjectBinding, fade: f32, glow_real: f32, aspect: f32) -> u32 {
        let g = &cfg.glow;
        let planar = b.normals == NormalsOption::Planar;
        let multi = !planar && g.quality.uses_multiple_offsets();
        let base = if planar { Vec4::new(0.0, 0.0, g.width / 100.0, 0.0) } else { Vec4::ZERO };
        let directions = if multi { offset_directions(g.quality, 100.0, aspect) } else { vec![base] };
        let instanced = cfg.general.gpu_instancing && !b.preserve_original();
        let mut drawn = 0;
        for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
            let Some(glow) = b.materials.get(EffectKind::Glow, l) else { continue };
            let mut instances = Vec::new();
            for pass in &g.passes {
                let offset = if planar { 0.0 } else { pass.offset * g.width / 100.0 };
                let data = Vec4::new(fade * glow_real * pass.alpha, offset, g.magic_number1, g.magic_number2);
                if instanced {
                    let color = pass.color.to_vec4();
                    instances.extend(directions.iter().map(|&direction| InstanceParams { direction, color, glow: data }));
                    continue;
                }
                self.cmd.set_param(glow, p::GLOW_COLOR, ParamValue::Color(pass.color));
                self.cmd.set_param(glow, p::GLOW, ParamValue::Vector(data));
                for &direction in &directions {
                    self.cmd.set_param(glow, p::GLOW_DIRECTION, ParamValue::Vector(direction));
                    draw(&mut self.cmd, b, glow, l, 0);
                    drawn += 1;
                }
            }
            drawn += count(instances.len());
            self.cmd.draw_mesh_instanced(b.mesh.id, b.render_matrix, glow, submesh_index(l), instances);
        }
        drawn
    }

    /// Returns the number of outline draws or instances.
    fn outline(&mut self, cfg: &EffectConfiguration, b: &ObjectBinding, fade: f32, aspect: f32, bounds: &Bounds) -> u32 {
        let o = &cfg.outline;
        let color = o.color.with_alpha(o.color.a * o.intensity * fade);
        let vertex_data = if o.color_style == ColorStyle::Gradient {
            let extent = if o.gradient_in_local_space { b.mesh.bounds() } else { *bounds };
            Vec4::new(extent.min().y, extent.size().y + 0.0001, 0.0, 0.0)
        } else {
            Vec4::new(-1e6, 1.0, 1.0, 0.0)
        };
        let multi = b.normals != NormalsOption::Planar && o.quality.uses_multiple_offsets();
        let directions =
            if multi { offset_directions(o.quality, cfg.real_outline_width(), aspect) } else { vec![Vec4::ZERO] };
        let instanced = multi && cfg.general.gpu_instancing && !b.preserve_original();
        let mut drawn = 0;
        for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
            let Some(outline) = b.materials.get(EffectKind::Outline, l) else { continue };
            self.cmd.set_param(outline, p::OUTLINE_COLOR, ParamValue::Color(color));
            self.cmd.set_param(outline, p::OUTLINE_VERTEX_DATA, ParamValue::Vector(vertex_data));
            if instanced {
                let instances: Vec<_> = directions
                    .iter()
                    .map(|&direction| InstanceParams { direction, color: color.to_vec4(), glow: Vec4::ZERO })
                    .collect();
                drawn += count(instances.len());
                self.cmd.draw_mesh_instanced(b.mesh.id, b.render_matrix, outline, submesh_index(l), instances);
                continue;
            }
            for &direction in &directions {
                self.cmd.set_param(outline, p::OUTLINE_DIRECTION, ParamValue::Vector(direction));
                draw(&mut self.cmd, b, outline, l, 0);
                drawn += 1;
            }
        }
        drawn
    }

    fn clear_ordered_stencil(
        &mut self,
        cfg: &EffectConfiguration,
        bindings: &[ObjectBinding],
        order: &[usize],
        binder: &MaterialBinder,
    ) {
        let Some(clear) = binder.shared(ShaderProgram::ClearStencil) else { return };
        for &i in order {
            let b = &bindings[i];
            if !b.render {
                continue;
            }
            for l in (0..b.submesh_count()).filter(|&l| cfg.submesh_enabled(l)) {
                if b.is_combined {
                    self.cmd.draw_mesh(b.mesh.id, b.render_matrix, clear, submesh_index(l), 1);
                } else {
                    self.cmd.draw_renderer(b.renderer, clear, submesh_index(l), 1);
                }
            }
        }
    }
}

/// Bakes skinned poses, culls and refreshes render matrices.
///
/// Returns the placement of every binding that draws this frame.
fn prepare(
    backend: &mut dyn RenderBackend,
    cache: &mut GeometryCache,
    cfg: &EffectConfiguration,
    bindings: &mut [ObjectBinding],
    inputs: &FrameInputs<'_>,
    stats: &mut FrameStats,
) -> Vec<Option<Placement>> {
    let scene = inputs.scene;
    let bake_skinned = cfg.bakes_skinned_mesh();
    let mut placements = Vec::with_capacity(bindings.len());
    for b in bindings.iter_mut() {
        b.render = false;
        let (Some(transform), Some(info)) = (scene.transform(b.node), scene.renderer(b.node)) else {
            stats.culled += 1;
            placements.push(None);
            continue;
        };
        if !cfg.general.ignore_object_visibility {
            let visible = info.enabled
                && info.visible
                && scene.is_active(b.node)
                && layer_in_mask(scene.layer(b.node), inputs.camera.culling_mask);
            if !visible {
                stats.culled += 1;
                placements.push(None);
                continue;
            }
        }
        if bake_skinned && b.kind == RendererKind::SkinnedMesh {
            if let Some(pose) = scene.bake_skinned_mesh(b.renderer) {
                let id = match b.skinned_pose {
                    Some(id) => id,
                    None => cache.allocate_id(),
                };
                b.set_skinned_pose(backend, id, pose);
            }
        }
        b.update_render_matrix(backend, &transform);
        b.render = true;
        stats.objects += 1;
        placements.push(Some(Placement { bounds: info.bounds, position: transform.position }));
    }
    placements
}

/// Binding indices in draw order.
fn draw_order(cfg: &EffectConfiguration, bindings: &[ObjectBinding]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..bindings.len()).collect();
    let queue = |i: usize| bindings[i].surfaces.first().map_or(0, |s| s.render_queue);
    match cfg.see_through.sorting_mode {
        SeeThroughSortingMode::Default => {}
        SeeThroughSortingMode::SortByMaterialsRenderQueue => order.sort_by_key(|&i| queue(i)),
        SeeThroughSortingMode::SortByMaterialsRenderQueueInverted => {
            order.sort_by_key(|&i| std::cmp::Reverse(queue(i)));
        }
    }
    order
}

/// Draws through the scene renderer or the binding's explicit mesh.
fn draw(cmd: &mut CommandBuffer, b: &ObjectBinding, material: MaterialHandle, submesh: usize, pass: u32) {
    if b.preserve_original() {
        cmd.draw_renderer(b.renderer, material, submesh_index(submesh), pass);
    } else {
        cmd.draw_mesh(b.mesh.id, b.render_matrix, material, submesh_index(submesh), pass);
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn submesh_index(submesh: usize) -> u32 {
    submesh as u32
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[allow(clippy::cast_precision_loss)]
fn full_screen(camera: &Camera) -> PixelRect {
    PixelRect { x: 0.0, y: 0.0, width: camera.pixel_width as f32, height: camera.pixel_height as f32 }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::{SeeThroughMode, Visibility};
    use crate::group::MeshGroupBuilder;
    use crate::testing::{MockScene, RecordingBackend};
    use halo_shared::{EffectId, MeshData, MeshId, NodeId};

    fn cube(id: u64) -> Arc<MeshData> {
        Arc::new(MeshData::cube(MeshId(id)))
    }

    struct Rig {
        scene: MockScene,
        backend: RecordingBackend,
        cache: GeometryCache,
        binder: MaterialBinder,
        decorations: Decorations,
        bindings: Vec<ObjectBinding>,
        camera: Camera,
        nodes: Vec<NodeId>,
    }

    impl Rig {
        fn new(cfg: &mut EffectConfiguration, objects: usize) -> Self {
            let mut scene = MockScene::new();
            let root = scene.add_node("Root", None);
            let nodes: Vec<_> = (0..objects)
                .map(|k| {
                    #[allow(clippy::cast_precision_loss)]
                    let x = k as f32 * 2.0;
                    scene.add_mesh_object(&format!("Obj{k}"), Some(root), cube(k as u64 + 1), Vec3::new(x, 0.0, 0.0))
                })
                .collect();
            let mut backend = RecordingBackend::new();
            let mut cache = GeometryCache::new();
            let mut binder = MaterialBinder::new();
            let bindings = MeshGroupBuilder::new(&mut backend, &mut cache, &scene, EffectId(1))
                .rebuild(cfg, root, &[], Vec::new(), &mut binder)
                .bindings;
            binder.apply(&mut backend, cfg, &bindings, true);
            backend.clear_submissions();
            let camera = Camera::perspective(CameraId(1), Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 60.0, 800, 600);
            Self { scene, backend, cache, binder, decorations: Decorations::new(), bindings, camera, nodes }
        }

        fn render(&mut self, cfg: &EffectConfiguration, compositor: &mut FrameCompositor, highlighted: bool) -> FrameStats {
            let inputs = FrameInputs {
                scene: &self.scene,
                camera: &self.camera,
                now: 1.0,
                highlighted,
                fade: 1.0,
                tint: SurfaceTint::none(),
                show_surface: false,
                see_through: false,
                occluders: &[],
                hit_position: None,
            };
            let job = FrameJob {
                cfg,
                bindings: &mut self.bindings,
                binder: &self.binder,
                decorations: &mut self.decorations,
            };
            compositor.render(&mut self.backend, &mut self.cache, job, &inputs)
        }
    }

    #[test]
    fn test_medium_outline_is_one_instanced_draw() {
        let mut cfg = EffectConfiguration::default();
        let mut rig = Rig::new(&mut cfg, 1);
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Mask), 1);
        assert_eq!(rig.backend.instanced_draws_with(ShaderProgram::Outline), 1);
        assert_eq!(rig.backend.instance_draws_with(ShaderProgram::Outline), 4);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Overlay), 0);
        assert_eq!(stats.objects, 1);
        assert_eq!(stats.mask_draws, 1);
        assert_eq!(stats.outline_draws, 4);
        assert_eq!(stats.instances, 4);
    }

    #[test]
    fn test_without_instancing_draws_per_offset() {
        let mut cfg = EffectConfiguration::default();
        cfg.general.gpu_instancing = false;
        let mut rig = Rig::new(&mut cfg, 1);
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Outline), 4);
        assert_eq!(rig.backend.instanced_draws_with(ShaderProgram::Outline), 0);
        assert_eq!(stats.draw_calls, 5);
    }

    #[test]
    fn test_planar_outline_single_offset() {
        let mut cfg = EffectConfiguration::default();
        cfg.general.gpu_instancing = false;
        cfg.general.normals_option = NormalsOption::Planar;
        let mut rig = Rig::new(&mut cfg, 1);
        assert_eq!(rig.bindings[0].normals, NormalsOption::Planar);
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Outline), 1);
        assert_eq!(stats.outline_draws, 1);

        cfg.outline.independent = true;
        rig.backend.clear_submissions();
        rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Outline), 2);
    }

    #[test]
    fn test_claim_skips_repeated_camera() {
        let mut compositor = FrameCompositor::new();
        assert!(compositor.claim(7, CameraId(1)));
        assert!(!compositor.claim(7, CameraId(1)));
        assert!(compositor.claim(7, CameraId(2)));
        assert!(compositor.claim(8, CameraId(2)));
        compositor.reset();
        assert!(compositor.claim(8, CameraId(2)));
    }

    #[test]
    fn test_culled_layer_submits_nothing() {
        let mut cfg = EffectConfiguration::default();
        let mut rig = Rig::new(&mut cfg, 2);
        for &n in &rig.nodes.clone() {
            rig.scene.set_layer(n, 5);
        }
        rig.camera.culling_mask = 1;
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert_eq!(stats.objects, 0);
        assert_eq!(stats.culled, 2);
        assert!(rig.backend.submitted.is_empty());

        cfg.general.ignore_object_visibility = true;
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert_eq!(stats.objects, 2);
        assert_eq!(rig.backend.submitted.len(), 1);
    }

    #[test]
    fn test_unhighlighted_draws_no_outline() {
        let mut cfg = EffectConfiguration::default();
        cfg.see_through.mode = SeeThroughMode::AlwaysWhenOccluded;
        let mut rig = Rig::new(&mut cfg, 1);
        rig.render(&cfg, &mut FrameCompositor::new(), false);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Outline), 0);
        assert_eq!(rig.backend.instance_draws_with(ShaderProgram::Outline), 0);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Mask), 1);
    }

    #[test]
    fn test_glow_passes_times_offsets() {
        let mut cfg = EffectConfiguration::default();
        cfg.outline.intensity = 0.0;
        cfg.glow.intensity = 1.0;
        let mut rig = Rig::new(&mut cfg, 1);
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        let expected = cfg.glow.passes.len() * 4;
        assert_eq!(rig.backend.instance_draws_with(ShaderProgram::Glow), expected);
        assert_eq!(rig.backend.instanced_draws_with(ShaderProgram::Glow), 1);
        assert_eq!(stats.glow_draws as usize, expected);
    }

    #[test]
    fn test_smooth_outline_balances_targets() {
        let mut cfg = EffectConfiguration::default();
        cfg.outline.quality = QualityLevel::Highest;
        cfg.outline.visibility = Visibility::AlwaysOnTop;
        let mut rig = Rig::new(&mut cfg, 2);
        let stats = rig.render(&cfg, &mut FrameCompositor::new(), true);
        assert!(stats.smooth_composed);
        assert_eq!(rig.backend.acquired_targets(), rig.backend.released_targets());
        assert_eq!(rig.backend.draws_with(ShaderProgram::SolidColor), 2);
        assert_eq!(rig.backend.draws_with(ShaderProgram::Outline), 0);
    }

    #[test]
    fn test_render_queue_sorting() {
        let mut cfg = EffectConfiguration::default();
        cfg.see_through.sorting_mode = SeeThroughSortingMode::SortByMaterialsRenderQueueInverted;
        let mut rig = Rig::new(&mut cfg, 2);
        rig.bindings[1].surfaces[0].render_queue = 3000;
        assert_eq!(draw_order(&cfg, &rig.bindings), vec![1, 0]);
        cfg.see_through.sorting_mode = SeeThroughSortingMode::SortByMaterialsRenderQueue;
        assert_eq!(draw_order(&cfg, &rig.bindings), vec![0, 1]);
    }
}
