//! Target reticle, status icon and label.
//!
//! Both decorations run on the same clock: a scale transition from their
//! start time, a stay period, then a one-second linear fade-out.

use std::f32::consts::FRAC_PI_2;

use halo_shared::{Bounds, Mat4, MaterialHandle, MeshData, MeshId, Quaternion, Ray, Vec3};

use crate::config::{
    EffectConfiguration, GeneralSettings, IconAnimationOption, IconAssetType, LabelMode, TargetFxSettings,
};
use crate::geometry::GeometryCache;
use crate::material::params as p;
use crate::ral::{CommandBuffer, ParamValue, RenderBackend};
use crate::scene::{Camera, LabelOverlay, SceneGraph};

/// Lift applied before the ground raycast and above the ground hit.
const GROUND_PROBE_LIFT: f32 = 0.5;
const GROUND_CLEARANCE: f32 = 0.01;

/// Stay factor: ramps up over the first second, holds at 1 until `stay`,
/// then fades out over one second. A zero `stay` never fades.
#[must_use]
pub fn stay_fade(now: f32, start: f32, stay: f32) -> f32 {
    if stay <= 0.0 {
        return 1.0;
    }
    let elapsed = now - start;
    let fade = if elapsed >= stay { 1.0 - (elapsed - stay) } else { elapsed };
    fade.min(1.0)
}

/// Transition progress in [0, 1].
#[must_use]
pub fn transition_progress(now: f32, start: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }
    ((now - start) / duration).min(1.0)
}

/// Camera distance fade of an object at `position`.
#[must_use]
pub fn camera_distance_fade(general: &GeneralSettings, camera: &Camera, position: Vec3) -> f32 {
    if !general.camera_distance_fade {
        return 1.0;
    }
    let d = (position - camera.position).dot(camera.forward());
    if d < general.camera_distance_fade_near {
        1.0 - (general.camera_distance_fade_near - d).min(1.0)
    } else if d > general.camera_distance_fade_far {
        1.0 - (d - general.camera_distance_fade_far).min(1.0)
    } else {
        1.0
    }
}

/// Where an icon goes this frame, for hosts instantiating a prefab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPlacement {
    /// Object-to-world matrix
    pub matrix: Mat4,
    /// Stay/fade factor to apply to the prefab's materials
    pub fade_out: f32,
}

/// Frame inputs shared by the decorations.
#[derive(Clone, Copy)]
pub struct DecorationFrame<'a> {
    /// Rendering camera
    pub camera: &'a Camera,
    /// Scene for center nodes and ground raycasts
    pub scene: &'a dyn SceneGraph,
    /// Host time
    pub now: f32,
    /// Highlight fade of the object
    pub fade: f32,
    /// Union of every bound renderer's bounds
    pub enclosing: Bounds,
    /// Last reported hit position
    pub hit_position: Option<Vec3>,
}

/// Per-effect decoration state.
#[derive(Debug, Default)]
pub struct Decorations {
    quad: Option<MeshId>,
    cube: Option<MeshId>,
    target_start: f32,
    icon_start: f32,
    target_rendered: bool,
    icon_rendered: bool,
    icon_placement: Option<IconPlacement>,
}

impl Decorations {
    /// No meshes, timers at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads the reticle meshes the configuration needs.
    pub fn prepare(&mut self, backend: &mut dyn RenderBackend, cache: &mut GeometryCache, cfg: &EffectConfiguration) {
        if !cfg.target_fx.enabled {
            return;
        }
        if self.quad.is_none() {
            let id = cache.allocate_id();
            backend.upload_mesh(&MeshData::quad(id));
            self.quad = Some(id);
        }
        if cfg.target_fx.align_to_ground && self.cube.is_none() {
            let id = cache.allocate_id();
            backend.upload_mesh(&MeshData::cube(id));
            self.cube = Some(id);
        }
    }

    /// Frees the reticle meshes.
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        for id in [self.quad.take(), self.cube.take()].into_iter().flatten() {
            backend.release_mesh(id);
        }
    }

    /// Restarts the target timer.
    pub fn start_target(&mut self, now: f32) {
        self.target_start = now;
    }

    /// Restarts the icon timer.
    pub fn start_icon(&mut self, now: f32) {
        self.icon_start = now;
    }

    /// Target timer start
    #[must_use]
    pub const fn target_start(&self) -> f32 {
        self.target_start
    }

    /// Icon timer start
    #[must_use]
    pub const fn icon_start(&self) -> f32 {
        self.icon_start
    }

    /// Placement computed by the last icon draw
    #[must_use]
    pub const fn icon_placement(&self) -> Option<IconPlacement> {
        self.icon_placement
    }

    /// Clears the once-per-frame flags.
    pub fn begin_frame(&mut self) {
        self.target_rendered = false;
        self.icon_rendered = false;
        self.icon_placement = None;
    }

    /// Records the reticle for one object. Returns true when drawn.
    ///
    /// With a center node the reticle is drawn once per frame, otherwise
    /// once per object.
    pub fn draw_target(
        &mut self,
        cmd: &mut CommandBuffer,
        cfg: &EffectConfiguration,
        material: Option<MaterialHandle>,
        frame: &DecorationFrame<'_>,
        object: &Bounds,
    ) -> bool {
        let t = &cfg.target_fx;
        if !t.enabled {
            return false;
        }
        let Some(material) = material else { return false };
        let fade_out = stay_fade(frame.now, self.target_start, t.stay_duration);
        let center_node = t.center.filter(|&n| frame.scene.contains(n));
        if fade_out <= 0.0 || (self.target_rendered && center_node.is_some()) {
            return false;
        }
        self.target_rendered = true;

        let nt = transition_progress(frame.now, self.target_start, t.transition_duration);
        let bounds = if t.use_enclosing_bounds { frame.enclosing } else { *object };
        let scale = target_scale(t, &bounds, (nt * FRAC_PI_2).sin());
        let mut center = center_node
            .and_then(|n| frame.scene.transform(n))
            .map(|tr| tr.position)
            .or(if t.use_hit_position { frame.hit_position } else { None })
            .unwrap_or(bounds.center);
        center += t.offset;

        let spin = frame.now * t.rotation_speed;
        let color = t.color.with_alpha(t.color.a * frame.fade * fade_out * nt);

        if t.align_to_ground {
            let Some(cube) = self.cube else { return false };
            let probe = Vec3::new(center.x, center.y + GROUND_PROBE_LIFT, center.z);
            let ray = Ray::new(probe, -Vec3::Y);
            let Some(hit) = frame.scene.raycast(&ray, t.ground_max_distance, t.ground_layer_mask) else {
                return false;
            };
            if hit.point.y < t.ground_min_altitude {
                return false;
            }
            center = Vec3::new(hit.point.x, hit.point.y + GROUND_CLEARANCE, hit.point.z);
            let data = hit.normal.extend(t.fade_power);
            cmd.set_param(material, p::TARGET_RENDER_DATA, ParamValue::Vector(data));
            cmd.set_param(material, p::COLOR, ParamValue::Color(color));
            let m = Mat4::from_trs(center, Quaternion::from_rotation_y_degrees(spin), scale);
            cmd.draw_mesh(cube, m, material, 0, 0);
        } else {
            let Some(quad) = self.quad else { return false };
            let rotation = frame.camera.rotation * Quaternion::from_axis_angle(Vec3::Z, spin.to_radians());
            cmd.set_param(material, p::COLOR, ParamValue::Color(color));
            cmd.draw_mesh(quad, Mat4::from_trs(center, rotation, scale), material, 0, 1);
        }
        tracing::trace!(?center, alpha = color.a, "target drawn");
        true
    }

    /// Records the icon once per frame. Returns true when placed.
    pub fn draw_icon(
        &mut self,
        cmd: &mut CommandBuffer,
        cfg: &EffectConfiguration,
        material: Option<MaterialHandle>,
        frame: &DecorationFrame<'_>,
    ) -> bool {
        let icon = &cfg.icon_fx;
        if !icon.enabled {
            return false;
        }
        let fade_out = stay_fade(frame.now, self.icon_start, icon.stay_duration);
        let center_node = icon.center.filter(|&n| frame.scene.contains(n));
        if fade_out <= 0.0 || (self.icon_rendered && center_node.is_some()) {
            return false;
        }
        self.icon_rendered = true;

        let size = if icon.scale_to_render_bounds { frame.enclosing.size() } else { Vec3::ONE };
        let scale = size * icon.scale;
        let mut center = center_node
            .and_then(|n| frame.scene.transform(n))
            .map_or(frame.enclosing.center, |tr| tr.position);
        center += icon.offset;
        if icon.animation_option == IconAnimationOption::VerticalBounce {
            center.y += icon.animation_amount * ((frame.now - self.icon_start) * icon.animation_speed).sin().abs();
        }
        let rotation = Quaternion::from_rotation_y_degrees(frame.now * icon.rotation_speed);
        let matrix = Mat4::from_trs(center, rotation, scale);
        self.icon_placement = Some(IconPlacement { matrix, fade_out });

        if icon.asset_type == IconAssetType::Prefab {
            return true;
        }
        let (Some(mesh), Some(material)) = (icon.mesh, material) else { return false };
        let k = frame.fade * fade_out;
        cmd.set_param(material, p::COLOR, ParamValue::Color(icon.light_color.with_alpha(icon.light_color.a * k)));
        cmd.set_param(material, p::SECOND_COLOR, ParamValue::Color(icon.dark_color.with_alpha(icon.dark_color.a * k)));
        cmd.draw_mesh(mesh, matrix, material, 0, 0);
        true
    }
}

fn target_scale(t: &TargetFxSettings, bounds: &Bounds, scale_t: f32) -> Vec3 {
    let mut size = if t.scale_to_render_bounds { bounds.size() } else { Vec3::ONE };
    if t.square {
        let m = size.max_element();
        size = Vec3::new(m, m, m);
    }
    (size * t.initial_scale).lerp(size * t.end_scale, scale_t)
}

/// Shows, hides and positions the label.
pub fn update_label(
    label: &mut dyn LabelOverlay,
    cfg: &EffectConfiguration,
    highlighted: bool,
    fade: f32,
    distance_fade: f32,
    anchor: &Bounds,
) {
    let l = &cfg.label;
    let visible = l.enabled && (l.mode == LabelMode::Always || highlighted);
    if !visible {
        label.hide();
        return;
    }
    label.show();
    label.set_alpha(if l.mode == LabelMode::Always { distance_fade } else { fade * distance_fade });
    let top = Vec3::new(anchor.center.x, anchor.max().y, anchor.center.z);
    label.set_position(top + l.offset);
}
