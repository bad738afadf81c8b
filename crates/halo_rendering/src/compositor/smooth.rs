//! Screen-space blur path of the Highest tier.
//!
//! ```text
//!  silhouettes ─► source ─┬─► glow chain ────► glow_rt ────┐
//!  (SolidColor)  (R8/ARGB)│   (gaussian/kawase)             ├─► compose onto camera
//!                         └─► outline chain ─► outline_rt ─┘
//! ```
//!
//! Every temporary acquired here is released before [`SmoothPass::finish`]
//! returns, whatever path the frame took.

use halo_shared::{Bounds, Color, MaterialHandle, RenderTargetHandle};

use crate::config::{BlurMethod, EffectConfiguration, OutlineEdgeMode, Visibility};
use crate::material::params as p;
use crate::material::{glow_downsampling, outline_downsampling, MaterialBinder};
use crate::ral::{CommandBuffer, ParamValue, PixelRect, RenderTargetDesc, ShaderProgram, TargetBinding, TargetFormat};
use crate::scene::{Camera, CameraKind};

/// Slot of the silhouette buffer.
pub const SOURCE_TARGET: RenderTargetHandle = RenderTargetHandle(0);
const GLOW_BASE: u32 = 1;
const OUTLINE_BASE: u32 = 64;

const GAUSSIAN_BUFFERS: u32 = 8;
const KAWASE_BUFFERS: u32 = 5;

/// Depth policies of the two smooth layers for one camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmoothVisibility {
    /// Glow layer
    pub glow: Visibility,
    /// Outline layer
    pub outline: Visibility,
}

impl SmoothVisibility {
    /// Configured policies, forced on top where the camera cannot depth
    /// test a temporary (multisampled targets and scene views).
    #[must_use]
    pub fn resolve(cfg: &EffectConfiguration, camera: &Camera) -> Self {
        let mut vis = Self { glow: cfg.glow.visibility, outline: cfg.outline.visibility };
        if cfg.uses_smooth_glow() && cfg.uses_smooth_outline() {
            vis.outline = vis.glow;
        }
        if camera.msaa || camera.kind == CameraKind::SceneView {
            if vis.glow == Visibility::Normal {
                vis.glow = Visibility::AlwaysOnTop;
            }
            if vis.outline == Visibility::Normal {
                vis.outline = Visibility::AlwaysOnTop;
            }
        }
        vis
    }

    /// Either active smooth layer ignores depth.
    #[must_use]
    pub fn any_on_top(&self, cfg: &EffectConfiguration) -> bool {
        (cfg.uses_smooth_glow() && self.glow == Visibility::AlwaysOnTop)
            || (cfg.uses_smooth_outline() && self.outline == Visibility::AlwaysOnTop)
    }
}

/// Pixel rectangles the compose quads cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComposeRects {
    /// Outline quad
    pub outline: PixelRect,
    /// Glow quad
    pub glow: PixelRect,
}

/// What the compose step produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothOutcome {
    /// Glow composed onto the camera
    pub glow: bool,
    /// Outline composed onto the camera
    pub outline: bool,
    /// Temporaries acquired
    pub acquired: u32,
}

/// One frame of the smooth path, from silhouette buffer to composition.
#[derive(Debug)]
pub struct SmoothPass {
    desc: RenderTargetDesc,
    visibility: SmoothVisibility,
    acquired: Vec<RenderTargetHandle>,
}

impl SmoothPass {
    /// Acquires and binds the silhouette buffer, cleared to transparent.
    pub fn begin(cmd: &mut CommandBuffer, cfg: &EffectConfiguration, camera: &Camera) -> Self {
        let format = if cfg.uses_smooth_outline() && cfg.outline.edge_mode == OutlineEdgeMode::Any {
            TargetFormat::Argb32
        } else {
            TargetFormat::R8
        };
        let desc = RenderTargetDesc::color(camera.pixel_width, camera.pixel_height, format);
        let visibility = SmoothVisibility::resolve(cfg, camera);
        cmd.acquire_temporary(SOURCE_TARGET, desc);
        let source = TargetBinding::Temporary(SOURCE_TARGET);
        if visibility.any_on_top(cfg) {
            cmd.set_render_target(source, None);
        } else {
            cmd.set_render_target(source, Some(TargetBinding::Camera));
        }
        cmd.clear_color(Color::CLEAR);
        Self { desc, visibility, acquired: vec![SOURCE_TARGET] }
    }

    /// Resolved depth policies
    #[must_use]
    pub const fn visibility(&self) -> SmoothVisibility {
        self.visibility
    }

    fn acquire(&mut self, cmd: &mut CommandBuffer, slot: u32, desc: RenderTargetDesc) -> RenderTargetHandle {
        let handle = RenderTargetHandle(slot);
        cmd.acquire_temporary(handle, desc);
        self.acquired.push(handle);
        handle
    }

    /// Blurs, composes and releases everything.
    ///
    /// `bounds` is the union of the highlighted renderers' bounds; without
    /// it, or when it collapses on screen, nothing is composed.
    pub fn finish(
        mut self,
        cmd: &mut CommandBuffer,
        cfg: &EffectConfiguration,
        camera: &Camera,
        binder: &MaterialBinder,
        bounds: Option<Bounds>,
        fade: f32,
    ) -> SmoothOutcome {
        let mut outcome = SmoothOutcome::default();
        let rects = bounds.and_then(|b| compose_rects(cfg, camera, &b));
        if let Some(rects) = rects {
            if cfg.uses_smooth_glow() {
                if let (Some(blur), Some(compose)) =
                    (binder.shared(ShaderProgram::BlurGlow), binder.shared(ShaderProgram::ComposeGlow))
                {
                    let rt = self.blur_glow(cmd, cfg, blur);
                    let color = cfg.glow.hq_color.scaled(cfg.glow.intensity * fade);
                    cmd.set_param(compose, p::COLOR, ParamValue::Color(color));
                    let z_test = self.visibility.glow.z_test();
                    compose_layer(cmd, compose, p::GLOW_RT, rt, rects.glow, cfg.glow.optimal_blit, z_test.as_int());
                    outcome.glow = true;
                }
            }
            if cfg.uses_smooth_outline() {
                if let (Some(blur), Some(compose)) =
                    (binder.shared(ShaderProgram::BlurOutline), binder.shared(ShaderProgram::ComposeOutline))
                {
                    let rt = self.blur_outline(cmd, cfg, blur);
                    let o = &cfg.outline;
                    let color = o.color.with_alpha(5.0 * o.color.a * o.intensity * fade);
                    cmd.set_param(compose, p::COLOR, ParamValue::Color(color));
                    let z_test = self.visibility.outline.z_test();
                    compose_layer(cmd, compose, p::OUTLINE_RT, rt, rects.outline, o.optimal_blit, z_test.as_int());
                    outcome.outline = true;
                }
            }
        }
        #[allow(clippy::cast_possible_truncation)]
        {
            outcome.acquired = self.acquired.len() as u32;
        }
        // glow chain, then outline chain, then the source
        let mut releases = std::mem::take(&mut self.acquired);
        releases.rotate_left(1);
        for handle in releases {
            cmd.release_temporary(handle);
        }
        tracing::trace!(glow = outcome.glow, outline = outcome.outline, "smooth pass finished");
        outcome
    }

    /// Gaussian or Kawase chain; returns the buffer holding the result.
    fn blur_glow(&mut self, cmd: &mut CommandBuffer, cfg: &EffectConfiguration, blur: MaterialHandle) -> RenderTargetHandle {
        let format = if cfg.glow.high_precision { TargetFormat::RHalf } else { TargetFormat::R8 };
        let ds = glow_downsampling(cfg);
        let base = RenderTargetDesc::color(self.desc.width / ds, self.desc.height / ds, format);
        let source = TargetBinding::Temporary(SOURCE_TARGET);
        match cfg.glow.blur_method {
            BlurMethod::Gaussian => {
                let buffers: Vec<_> = (0..GAUSSIAN_BUFFERS)
                    .map(|k| self.acquire(cmd, GLOW_BASE + k, base.reduced(f32_of(k / 2 + 2))))
                    .collect();
                gaussian_chain(cmd, source, &buffers, blur, 0)
            }
            BlurMethod::Kawase => {
                let buffers: Vec<_> =
                    (0..KAWASE_BUFFERS).map(|k| self.acquire(cmd, GLOW_BASE + k, base.reduced(f32_of(k + 2)))).collect();
                let count = buffers.len();
                cmd.blit(source, TargetBinding::Temporary(buffers[0]), blur, 3);
                for k in 0..count - 2 {
                    cmd.set_global_float(p::RESAMPLE_SCALE, f32_of_usize(k) + 0.5);
                    cmd.blit(TargetBinding::Temporary(buffers[k]), TargetBinding::Temporary(buffers[k + 1]), blur, 3);
                }
                buffers[count - 2]
            }
        }
    }

    fn blur_outline(
        &mut self,
        cmd: &mut CommandBuffer,
        cfg: &EffectConfiguration,
        blur: MaterialHandle,
    ) -> RenderTargetHandle {
        let ds = outline_downsampling(cfg);
        let base = RenderTargetDesc::color(self.desc.width / ds, self.desc.height / ds, self.desc.format);
        let count = cfg.outline.blur_passes.max(1) * 2;
        let buffers: Vec<_> =
            (0..count).map(|k| self.acquire(cmd, OUTLINE_BASE + k, base.reduced(f32_of(k / 2 + 2)))).collect();
        gaussian_chain(cmd, TargetBinding::Temporary(SOURCE_TARGET), &buffers, blur, 3)
    }
}

/// Horizontal/vertical ping-pong with a downsample between levels.
///
/// `first_pass` is the shader pass of the very first horizontal blit.
fn gaussian_chain(
    cmd: &mut CommandBuffer,
    source: TargetBinding,
    buffers: &[RenderTargetHandle],
    blur: MaterialHandle,
    first_pass: u32,
) -> RenderTargetHandle {
    let count = buffers.len();
    let t = |k: usize| TargetBinding::Temporary(buffers[k]);
    let mut k = 0;
    while k + 1 < count {
        if k == 0 {
            cmd.blit(source, t(1), blur, first_pass);
        } else {
            cmd.blit(t(k), t(k + 1), blur, 0);
        }
        cmd.blit(t(k + 1), t(k), blur, 1);
        if k + 2 < count {
            cmd.blit(t(k), t(k + 2), blur, 2);
        }
        k += 2;
    }
    buffers[count - 2]
}

fn compose_layer(
    cmd: &mut CommandBuffer,
    compose: MaterialHandle,
    texture: &'static str,
    rt: RenderTargetHandle,
    rect: PixelRect,
    optimal_blit: bool,
    z_test: i32,
) {
    cmd.set_param(compose, texture, ParamValue::Target(rt));
    if optimal_blit {
        cmd.set_render_target(TargetBinding::Camera, None);
        cmd.set_param(compose, p::Z_TEST, ParamValue::Int(z_test));
        cmd.draw_screen_quad(rect, compose, 0);
    } else {
        cmd.blit(TargetBinding::Temporary(rt), TargetBinding::Camera, compose, 1);
    }
}

/// Screen rectangles of `bounds` grown by the blur reach.
///
/// Bounds crossing the near plane cover the whole screen. Returns `None`
/// when the projection has no height.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn compose_rects(cfg: &EffectConfiguration, camera: &Camera, bounds: &Bounds) -> Option<ComposeRects> {
    let mut min = (f32::MAX, f32::MAX);
    let mut max = (f32::MIN, f32::MIN);
    let mut behind = false;
    for corner in bounds.corners() {
        let v = camera.world_to_viewport(corner);
        if v.z < camera.near {
            behind = true;
            break;
        }
        min = (min.0.min(v.x), min.1.min(v.y));
        max = (max.0.max(v.x), max.1.max(v.y));
    }
    if behind {
        min = (0.0, 0.0);
        max = (1.0, 1.0);
    }
    if (max.1 - min.1).abs() <= f32::EPSILON {
        return None;
    }
    let (w, h) = (camera.pixel_width as f32, camera.pixel_height as f32);
    let core = PixelRect { x: min.0 * w, y: min.1 * h, width: (max.0 - min.0) * w, height: (max.1 - min.1) * h };

    let extra = cfg.general.extra_coverage_pixels as f32;
    let outline_border =
        (10.0 + 20.0 * cfg.real_outline_width() + 5.0 * cfg.outline.downsampling as f32).trunc() + extra;
    let glow_border = (20.0 + 30.0 * cfg.glow.width + 10.0 * cfg.glow.downsampling as f32).trunc() + extra;
    Some(ComposeRects { outline: grow(core, outline_border), glow: grow(core, glow_border) })
}

fn grow(rect: PixelRect, border: f32) -> PixelRect {
    PixelRect {
        x: rect.x - border,
        y: rect.y - border,
        width: rect.width + 2.0 * border,
        height: rect.height + 2.0 * border,
    }
}

#[allow(clippy::cast_precision_loss)]
const fn f32_of(v: u32) -> f32 {
    v as f32
}

#[allow(clippy::cast_precision_loss)]
const fn f32_of_usize(v: usize) -> f32 {
    v as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityLevel;
    use crate::ral::RenderCommand;
    use crate::testing::RecordingBackend;
    use halo_shared::{CameraId, Vec3};

    fn camera() -> Camera {
        Camera::perspective(CameraId(1), Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 60.0, 800, 600)
    }

    fn smooth_cfg() -> EffectConfiguration {
        let mut cfg = EffectConfiguration::default();
        cfg.outline.quality = QualityLevel::Highest;
        cfg.glow.intensity = 1.0;
        cfg.glow.quality = QualityLevel::Highest;
        cfg
    }

    fn binder(cfg: &EffectConfiguration) -> (RecordingBackend, MaterialBinder) {
        let mut backend = RecordingBackend::new();
        let mut binder = MaterialBinder::new();
        binder.apply(&mut backend, cfg, &[], true);
        (backend, binder)
    }

    fn count(cmd: &CommandBuffer, f: impl Fn(&RenderCommand) -> bool) -> usize {
        cmd.commands().iter().filter(|c| f(c)).count()
    }

    #[test]
    fn test_acquired_targets_are_all_released() {
        let cfg = smooth_cfg();
        let (_, binder) = binder(&cfg);
        let mut cmd = CommandBuffer::new();
        let pass = SmoothPass::begin(&mut cmd, &cfg, &camera());
        let out = pass.finish(&mut cmd, &cfg, &camera(), &binder, Some(Bounds::new(Vec3::ZERO, Vec3::ONE)), 1.0);
        assert!(out.glow && out.outline);
        let acquired = count(&cmd, |c| matches!(c, RenderCommand::AcquireTemporary { .. }));
        let released = count(&cmd, |c| matches!(c, RenderCommand::ReleaseTemporary { .. }));
        assert_eq!(acquired, released);
        assert_eq!(acquired, 1 + 8 + 4);
        assert_eq!(out.acquired, 13);
        assert!(matches!(cmd.commands().last(), Some(RenderCommand::ReleaseTemporary { target }) if *target == SOURCE_TARGET));
    }

    #[test]
    fn test_degenerate_rect_releases_source() {
        let cfg = smooth_cfg();
        let (_, binder) = binder(&cfg);
        let mut cmd = CommandBuffer::new();
        let pass = SmoothPass::begin(&mut cmd, &cfg, &camera());
        let flat = Bounds::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let out = pass.finish(&mut cmd, &cfg, &camera(), &binder, Some(flat), 1.0);
        assert!(!out.glow && !out.outline);
        assert_eq!(count(&cmd, |c| matches!(c, RenderCommand::AcquireTemporary { .. })), 1);
        assert_eq!(count(&cmd, |c| matches!(c, RenderCommand::ReleaseTemporary { .. })), 1);
    }

    #[test]
    fn test_kawase_chain_uses_five_buffers() {
        let mut cfg = smooth_cfg();
        cfg.outline.intensity = 0.0;
        cfg.glow.blur_method = BlurMethod::Kawase;
        let (_, binder) = binder(&cfg);
        let mut cmd = CommandBuffer::new();
        let pass = SmoothPass::begin(&mut cmd, &cfg, &camera());
        pass.finish(&mut cmd, &cfg, &camera(), &binder, Some(Bounds::new(Vec3::ZERO, Vec3::ONE)), 1.0);
        assert_eq!(count(&cmd, |c| matches!(c, RenderCommand::AcquireTemporary { .. })), 6);
        assert_eq!(count(&cmd, |c| matches!(c, RenderCommand::SetGlobalFloat { .. })), 3);
        // one downsample, three resamples; the compose is a quad
        assert_eq!(count(&cmd, |c| matches!(c, RenderCommand::Blit { .. })), 4);
        assert_eq!(count(&cmd, |c| matches!(c, RenderCommand::DrawScreenQuad { .. })), 1);
    }

    #[test]
    fn test_gaussian_chain_blits() {
        let mut cmd = CommandBuffer::new();
        let buffers: Vec<_> = (0..4).map(RenderTargetHandle).collect();
        let out = gaussian_chain(&mut cmd, TargetBinding::Camera, &buffers, MaterialHandle(1), 3);
        assert_eq!(out, RenderTargetHandle(2));
        let passes: Vec<u32> = cmd
            .commands()
            .iter()
            .filter_map(|c| match c {
                RenderCommand::Blit { pass, .. } => Some(*pass),
                _ => None,
            })
            .collect();
        assert_eq!(passes, vec![3, 1, 2, 0, 1]);
    }

    #[test]
    fn test_on_top_binds_no_depth() {
        let mut cfg = smooth_cfg();
        cfg.glow.visibility = Visibility::AlwaysOnTop;
        let mut cmd = CommandBuffer::new();
        let pass = SmoothPass::begin(&mut cmd, &cfg, &camera());
        assert_eq!(pass.visibility().outline, Visibility::AlwaysOnTop);
        assert!(cmd.commands().iter().any(|c| matches!(c, RenderCommand::SetRenderTarget { depth: None, .. })));
    }

    #[test]
    fn test_msaa_forces_on_top() {
        let cfg = smooth_cfg();
        let mut cam = camera();
        cam.msaa = true;
        let vis = SmoothVisibility::resolve(&cfg, &cam);
        assert_eq!(vis.glow, Visibility::AlwaysOnTop);
        assert_eq!(vis.outline, Visibility::AlwaysOnTop);
    }

    #[test]
    fn test_rect_behind_camera_is_full_screen() {
        let cfg = EffectConfiguration::default();
        let cam = camera();
        let around = Bounds::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(4.0, 4.0, 4.0));
        let rects = compose_rects(&cfg, &cam, &around).unwrap();
        let border = (10.0 + 20.0 * cfg.real_outline_width() + 5.0_f32).trunc();
        assert!((rects.outline.x + border).abs() < 1e-3);
        assert!((rects.outline.width - (800.0 + 2.0 * border)).abs() < 1e-3);
    }
}
