//! Applies an effect configuration to its forked materials.

use std::collections::{BTreeMap, BTreeSet};

use halo_shared::{MaterialHandle, TextureHandle, Vec4};

use super::kind::EffectKind;
use super::params::{self as p, keywords as kw};
use super::ramp::GradientRamp;
use super::state::{kind_state, EffectInputs, MaterialState};
use crate::config::{
    ColorStyle, EffectConfiguration, GlowBlendMode, IconAssetType, OutlineEdgeMode, SeeThroughMode, TargetFxStyle,
};
use crate::group::ObjectBinding;
use crate::ral::{BlendFactor, CompareFunction, CullMode, RenderBackend, ShaderProgram};
use crate::scene::{RendererKind, SurfaceMaterial};

/// Effect-level programs, one material each.
pub const SHARED_PROGRAMS: [ShaderProgram; 8] = [
    ShaderProgram::ClearStencil,
    ShaderProgram::SeeThroughOccluder,
    ShaderProgram::BlurGlow,
    ShaderProgram::ComposeGlow,
    ShaderProgram::BlurOutline,
    ShaderProgram::ComposeOutline,
    ShaderProgram::Target,
    ShaderProgram::Icon,
];

/// Downsampling of the smooth outline; edge detection needs full resolution.
#[must_use]
pub fn outline_downsampling(cfg: &EffectConfiguration) -> u32 {
    if cfg.outline.edge_mode == OutlineEdgeMode::Any {
        1
    } else {
        cfg.outline.downsampling.max(1)
    }
}

/// Downsampling of the smooth glow.
#[must_use]
pub fn glow_downsampling(cfg: &EffectConfiguration) -> u32 {
    cfg.glow.downsampling.max(1)
}

/// Blur radius of the smooth outline.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn outline_edge_width(cfg: &EffectConfiguration) -> f32 {
    let width = cfg.outline.width;
    if cfg.outline.edge_mode == OutlineEdgeMode::Any {
        let passes = cfg.outline.blur_passes as f32;
        width.clamp(passes / 5.0, passes.max(passes / 5.0))
    } else {
        width
    }
}

/// True when the configuration needs the effect-level `program`.
#[must_use]
pub fn shared_required(program: ShaderProgram, cfg: &EffectConfiguration) -> bool {
    match program {
        ShaderProgram::ClearStencil => {
            cfg.see_through.mode != SeeThroughMode::Never || (cfg.outline.independent && cfg.uses_smooth_blend())
        }
        ShaderProgram::SeeThroughOccluder => {
            cfg.see_through.mode != SeeThroughMode::Never && cfg.see_through.occluder_mask_accurate
        }
        ShaderProgram::BlurGlow | ShaderProgram::ComposeGlow => cfg.uses_smooth_glow(),
        ShaderProgram::BlurOutline | ShaderProgram::ComposeOutline => cfg.uses_smooth_outline(),
        ShaderProgram::Target => cfg.target_fx.enabled,
        ShaderProgram::Icon => cfg.icon_fx.enabled && cfg.icon_fx.asset_type == IconAssetType::Mesh,
        _ => false,
    }
}

/// Configuration-driven state of an effect-level material.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shared_state(program: ShaderProgram, cfg: &EffectConfiguration, outline_ramp: Option<TextureHandle>) -> MaterialState {
    let mut st = MaterialState::default();
    let cull = if cfg.general.cull_back_faces { CullMode::Back } else { CullMode::Off };
    let compose_padding = (1.0 - cfg.outline.padding).max(0.001);
    let all_edges = cfg.outline.edge_mode == OutlineEdgeMode::Any;
    match program {
        ShaderProgram::ComposeOutline => {
            let o = &cfg.outline;
            st.int(p::CULL, cull.as_int());
            st.float(p::OUTLINE_SHARPNESS, o.sharpness);
            st.float(p::PADDING, compose_padding);
            if o.stylized {
                if let Some(pattern) = o.pattern {
                    st.texture(p::PATTERN_TEX, pattern);
                }
                st.vector(
                    p::PATTERN_DATA,
                    Vec4::new(
                        o.pattern_scale,
                        o.pattern_threshold,
                        o.pattern_distortion_amount * 0.01,
                        o.pattern_stop_motion_scale,
                    ),
                );
                st.enable(kw::OUTLINE_STYLIZED);
            }
            if o.dashed {
                st.vector(p::DASH_DATA, Vec4::new(1.001 - o.dash_width, 1.0 - o.dash_gap * 2.0, o.dash_speed, 0.0));
                st.enable(kw::OUTLINE_DASHED);
            }
            let comp = if all_edges { CompareFunction::Always } else { CompareFunction::NotEqual };
            st.int(p::OUTLINE_STENCIL_COMP, comp.as_int());
            if all_edges {
                st.enable(kw::ALL_EDGES);
            }
            if o.color_style == ColorStyle::Gradient {
                if let Some(ramp) = outline_ramp {
                    st.texture(p::OUTLINE_GRADIENT_TEX, ramp);
                }
                st.vector(p::OUTLINE_GRADIENT_DATA, Vec4::new(o.gradient_knee, o.gradient_power, 0.0, 0.0));
                st.enable(kw::OUTLINE_GRADIENT_WS);
            }
        }
        ShaderProgram::BlurOutline => {
            let edge_width = outline_edge_width(cfg);
            st.float(p::BLUR_SCALE, edge_width / outline_downsampling(cfg) as f32);
            st.float(p::BLUR_SCALE_FIRST_HORIZ, edge_width * 2.0);
        }
        ShaderProgram::ComposeGlow => {
            st.int(p::CULL, cull.as_int());
            st.float(p::PADDING, compose_padding);
            let comp = if cfg.glow.ignore_mask { CompareFunction::Always } else { CompareFunction::NotEqual };
            st.int(p::GLOW_STENCIL_COMP, comp.as_int());
            let (src, dst) = match cfg.glow.blend_mode {
                GlowBlendMode::Additive => (BlendFactor::One, BlendFactor::One),
                GlowBlendMode::AlphaBlending => (BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha),
            };
            st.int(p::BLEND_SRC, src.as_int());
            st.int(p::BLEND_DST, dst.as_int());
            if all_edges {
                st.enable(kw::ALL_EDGES);
            }
        }
        ShaderProgram::BlurGlow => {
            st.float(p::BLUR_SCALE, cfg.glow.width / glow_downsampling(cfg) as f32);
            st.float(p::SPEED, cfg.glow.animation_speed);
        }
        ShaderProgram::Target => {
            let t = &cfg.target_fx;
            if let Some(texture) = t.texture {
                st.texture(p::MAIN_TEX, texture);
            }
            st.int(p::Z_TEST, t.visibility.z_test().as_int());
            match t.style {
                TargetFxStyle::Texture => {}
                TargetFxStyle::Frame => st.enable(kw::TARGET_FRAME),
                TargetFxStyle::InwardCorners => st.enable(kw::TARGET_INWARD_CORNERS),
                TargetFxStyle::Cross => st.enable(kw::TARGET_CROSS),
            }
            st.vector(
                p::TARGET_FRAME_DATA,
                Vec4::new(t.frame_width, t.corner_length, t.frame_min_opacity, t.ground_min_altitude),
            );
        }
        ShaderProgram::Icon => {
            st.int(p::CULL, CullMode::Back.as_int());
        }
        _ => {}
    }
    st
}

/// Keywords each effect-level program manages.
#[must_use]
pub const fn shared_keywords(program: ShaderProgram) -> &'static [&'static str] {
    match program {
        ShaderProgram::ComposeOutline => {
            &[kw::OUTLINE_STYLIZED, kw::OUTLINE_DASHED, kw::ALL_EDGES, kw::OUTLINE_GRADIENT_WS]
        }
        ShaderProgram::ComposeGlow => &[kw::ALL_EDGES],
        ShaderProgram::Target => &[kw::TARGET_FRAME, kw::TARGET_INWARD_CORNERS, kw::TARGET_CROSS],
        _ => &[],
    }
}

/// Owns the effect-level materials and pushes configuration into every
/// material of an effect.
///
/// Work happens on configuration or highlight changes, never per frame.
#[derive(Debug, Default)]
pub struct MaterialBinder {
    shared: BTreeMap<ShaderProgram, MaterialHandle>,
    outline_ramp: GradientRamp,
    reported: BTreeSet<ShaderProgram>,
    applies: u64,
}

impl MaterialBinder {
    /// Creates a binder with no materials.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Effect-level material for `program`.
    #[must_use]
    pub fn shared(&self, program: ShaderProgram) -> Option<MaterialHandle> {
        self.shared.get(&program).copied()
    }

    /// Logs a missing template the first time it is seen.
    ///
    /// Returns true on the first report.
    pub fn report_missing(&mut self, program: ShaderProgram) -> bool {
        let first = self.reported.insert(program);
        if first {
            tracing::error!(program = program.name(), "shader template not available, pass disabled");
        }
        first
    }

    /// True once `program` was reported missing.
    #[must_use]
    pub fn reported(&self, program: ShaderProgram) -> bool {
        self.reported.contains(&program)
    }

    /// Forgets reported templates so a recovered backend is retried.
    pub fn reset_reports(&mut self) {
        self.reported.clear();
    }

    /// Number of [`apply`](Self::apply) calls
    #[must_use]
    pub const fn applies(&self) -> u64 {
        self.applies
    }

    /// Current outline ramp
    #[must_use]
    pub const fn outline_ramp(&self) -> Option<TextureHandle> {
        self.outline_ramp.texture()
    }

    fn sync_shared(&mut self, backend: &mut dyn RenderBackend, cfg: &EffectConfiguration) {
        for program in SHARED_PROGRAMS {
            let needed = shared_required(program, cfg);
            match (needed, self.shared.get(&program).copied()) {
                (true, None) => {
                    if let Some(handle) = backend.create_material(program) {
                        self.shared.insert(program, handle);
                    } else {
                        self.report_missing(program);
                    }
                }
                (false, Some(handle)) => {
                    backend.destroy_material(handle);
                    self.shared.remove(&program);
                }
                _ => {}
            }
        }
    }

    /// Pushes `cfg` into the effect-level materials and every forked
    /// material of `bindings`.
    pub fn apply(
        &mut self,
        backend: &mut dyn RenderBackend,
        cfg: &EffectConfiguration,
        bindings: &[ObjectBinding],
        highlighted: bool,
    ) {
        self.applies += 1;
        self.sync_shared(backend, cfg);

        let ramp = if cfg.outline.color_style == ColorStyle::Gradient {
            Some(self.outline_ramp.update(backend, &cfg.outline.gradient))
        } else {
            self.outline_ramp.release(backend);
            None
        };

        let sprite = bindings.iter().any(|b| b.kind == RendererKind::Sprite);
        let fx = EffectInputs { mask_on_top: cfg.mask_on_top(highlighted), sprite, outline_ramp: ramp };
        let fallback = SurfaceMaterial::default();
        for binding in bindings {
            for kind in EffectKind::ALL {
                for (submesh, &material) in binding.materials.handles(kind).iter().enumerate() {
                    let surface = binding.surfaces.get(submesh).unwrap_or(&fallback);
                    kind_state(kind, cfg, &fx, surface).write(backend, material, kind.row().keywords);
                }
            }
        }

        for (&program, &material) in &self.shared {
            shared_state(program, cfg, ramp).write(backend, material, shared_keywords(program));
        }
        tracing::debug!(objects = bindings.len(), shared = self.shared.len(), "materials applied");
    }

    /// Destroys the effect-level materials and the ramp.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        for (_, handle) in std::mem::take(&mut self.shared) {
            backend.destroy_material(handle);
        }
        self.outline_ramp.release(backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityLevel;
    use crate::ral::ParamValue;
    use crate::testing::RecordingBackend;

    #[test]
    fn test_smooth_outline_creates_compose_materials() {
        let mut backend = RecordingBackend::new();
        let mut binder = MaterialBinder::new();
        let mut cfg = EffectConfiguration::default();
        cfg.outline.quality = QualityLevel::Highest;
        binder.apply(&mut backend, &cfg, &[], true);
        assert!(binder.shared(ShaderProgram::ComposeOutline).is_some());
        assert!(binder.shared(ShaderProgram::BlurOutline).is_some());
        assert!(binder.shared(ShaderProgram::ComposeGlow).is_none());

        cfg.outline.quality = QualityLevel::Medium;
        binder.apply(&mut backend, &cfg, &[], true);
        assert!(binder.shared(ShaderProgram::ComposeOutline).is_none());
        assert_eq!(backend.live_materials(), 0);
    }

    #[test]
    fn test_missing_shared_template_is_reported_once() {
        let mut backend = RecordingBackend::new();
        backend.remove_program(ShaderProgram::Target);
        let mut binder = MaterialBinder::new();
        let mut cfg = EffectConfiguration::default();
        cfg.target_fx.enabled = true;
        binder.apply(&mut backend, &cfg, &[], false);
        assert!(!binder.report_missing(ShaderProgram::Target));
    }

    #[test]
    fn test_dashed_and_any_edges() {
        let mut cfg = EffectConfiguration::default();
        cfg.outline.dashed = true;
        cfg.outline.edge_mode = OutlineEdgeMode::Any;
        cfg.outline.downsampling = 4;
        let st = shared_state(ShaderProgram::ComposeOutline, &cfg, None);
        assert!(st.has_keyword(kw::OUTLINE_DASHED));
        assert!(st.has_keyword(kw::ALL_EDGES));
        assert_eq!(st.param(p::OUTLINE_STENCIL_COMP), Some(ParamValue::Int(CompareFunction::Always.as_int())));
        assert_eq!(outline_downsampling(&cfg), 1);
    }

    #[test]
    fn test_glow_blend_factors() {
        let mut cfg = EffectConfiguration::default();
        cfg.glow.blend_mode = GlowBlendMode::AlphaBlending;
        let st = shared_state(ShaderProgram::ComposeGlow, &cfg, None);
        assert_eq!(st.param(p::BLEND_SRC), Some(ParamValue::Int(BlendFactor::SrcAlpha.as_int())));
        assert_eq!(st.param(p::BLEND_DST), Some(ParamValue::Int(BlendFactor::OneMinusSrcAlpha.as_int())));
    }

    #[test]
    fn test_gradient_ramp_follows_color_style() {
        let mut backend = RecordingBackend::new();
        let mut binder = MaterialBinder::new();
        let mut cfg = EffectConfiguration::default();
        cfg.outline.color_style = ColorStyle::Gradient;
        binder.apply(&mut backend, &cfg, &[], true);
        binder.apply(&mut backend, &cfg, &[], true);
        assert!(binder.outline_ramp().is_some());
        assert_eq!(backend.ramp_uploads(), 1);

        cfg.outline.color_style = ColorStyle::SingleColor;
        binder.apply(&mut backend, &cfg, &[], true);
        assert!(binder.outline_ramp().is_none());
    }
}
