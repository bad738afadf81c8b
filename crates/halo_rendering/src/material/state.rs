//! Parameter values of the per-object kinds.

use halo_shared::{Color, MaterialHandle, TextureHandle, Vec4};

use super::kind::EffectKind;
use super::params::{self as p, keywords as kw};
use crate::config::{
    ColorStyle, EffectConfiguration, GlowDitheringStyle, InnerGlowBlendMode, NormalsOption, OutlineEdgeMode,
    OverlayPattern, QualityLevel, TextureUvSpace,
};
use crate::ral::{BlendFactor, CompareFunction, CullMode, ParamValue, RenderBackend, StencilOp};
use crate::scene::SurfaceMaterial;

/// Values and enabled keywords computed for one material.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialState {
    /// Parameter values
    pub params: Vec<(&'static str, ParamValue)>,
    /// Enabled keywords; every other keyword of the row is disabled
    pub keywords: Vec<&'static str>,
}

impl MaterialState {
    pub(super) fn float(&mut self, name: &'static str, v: f32) {
        self.params.push((name, ParamValue::Float(v)));
    }

    pub(super) fn int(&mut self, name: &'static str, v: i32) {
        self.params.push((name, ParamValue::Int(v)));
    }

    pub(super) fn vector(&mut self, name: &'static str, v: Vec4) {
        self.params.push((name, ParamValue::Vector(v)));
    }

    pub(super) fn color(&mut self, name: &'static str, c: Color) {
        self.params.push((name, ParamValue::Color(c)));
    }

    pub(super) fn texture(&mut self, name: &'static str, t: TextureHandle) {
        self.params.push((name, ParamValue::Texture(t)));
    }

    pub(super) fn enable(&mut self, keyword: &'static str) {
        self.keywords.push(keyword);
    }

    /// Value written for `name`, if any.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<ParamValue> {
        self.params.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
    }

    /// True when `keyword` is enabled.
    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.contains(&keyword)
    }

    /// Writes the state: every keyword of the row is set, then every value.
    pub fn write(&self, backend: &mut dyn RenderBackend, material: MaterialHandle, row_keywords: &[&'static str]) {
        for keyword in row_keywords {
            backend.set_keyword(material, keyword, self.keywords.contains(keyword));
        }
        for (name, value) in &self.params {
            backend.set_param(material, name, *value);
        }
    }
}

/// Per-effect inputs shared by every object.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectInputs {
    /// The mask pass ignores depth
    pub mask_on_top: bool,
    /// Sprite group
    pub sprite: bool,
    /// Baked outline gradient ramp
    pub outline_ramp: Option<TextureHandle>,
}

/// Cull mode for the effect passes of one surface.
#[must_use]
pub fn cull_mode(cfg: &EffectConfiguration, surface: &SurfaceMaterial) -> CullMode {
    if cfg.general.cull_back_faces {
        surface.cull.unwrap_or(CullMode::Back)
    } else {
        CullMode::Off
    }
}

fn alpha_cutoff(cfg: &EffectConfiguration, surface: &SurfaceMaterial) -> f32 {
    if cfg.general.alpha_cutoff > 0.0 {
        cfg.general.alpha_cutoff
    } else {
        surface.alpha_cutoff.unwrap_or(0.0)
    }
}

fn surface_common(st: &mut MaterialState, cfg: &EffectConfiguration, surface: &SurfaceMaterial) {
    if let Some(texture) = surface.main_texture {
        st.texture(p::MAIN_TEX, texture);
        st.vector(p::MAIN_TEX_ST, surface.main_texture_st);
        let cutoff = alpha_cutoff(cfg, surface);
        if cutoff > 0.0 {
            st.float(p::CUTOFF, cutoff);
            st.enable(kw::ALPHACLIP);
        }
    }
    st.int(p::CULL, cull_mode(cfg, surface).as_int());
}

fn texture_space_keyword(space: TextureUvSpace) -> &'static str {
    match space {
        TextureUvSpace::Triplanar => kw::TEXTURE_TRIPLANAR,
        TextureUvSpace::ObjectSpace => kw::TEXTURE_OBJECTSPACE,
        TextureUvSpace::ScreenSpace => kw::TEXTURE_SCREENSPACE,
    }
}

fn see_through_stencil(st: &mut MaterialState, cfg: &EffectConfiguration) {
    let s = &cfg.see_through;
    if s.occluder_mask_accurate && s.occluder_mask != u32::MAX {
        st.int(p::SEE_THROUGH_STENCIL_REF, 1);
        st.int(p::SEE_THROUGH_STENCIL_COMP, CompareFunction::Equal.as_int());
        st.int(p::SEE_THROUGH_STENCIL_PASS_OP, StencilOp::Zero.as_int());
    } else {
        st.int(p::SEE_THROUGH_STENCIL_REF, 2);
        st.int(p::SEE_THROUGH_STENCIL_COMP, CompareFunction::Greater.as_int());
        st.int(p::SEE_THROUGH_STENCIL_PASS_OP, StencilOp::Replace.as_int());
    }
    if s.ordered {
        st.int(p::Z_TEST, CompareFunction::LessEqual.as_int());
        st.int(p::SEE_THROUGH_ORDERED, 1);
    } else {
        st.int(p::Z_TEST, CompareFunction::Greater.as_int());
        st.int(p::SEE_THROUGH_ORDERED, 0);
    }
    if s.depth_offset > 0.0 || s.max_depth > 0.0 {
        st.float(p::SEE_THROUGH_DEPTH_OFFSET, if s.depth_offset > 0.0 { s.depth_offset } else { -1.0 });
        st.float(p::SEE_THROUGH_MAX_DEPTH, if s.max_depth > 0.0 { s.max_depth } else { 999_999.0 });
        st.enable(kw::DEPTH_OFFSET);
    }
}

fn bool_float(v: bool) -> f32 {
    if v {
        1.0
    } else {
        0.0
    }
}

/// Computes the configuration-driven state of one `kind` material.
#[must_use]
pub fn kind_state(
    kind: EffectKind,
    cfg: &EffectConfiguration,
    fx: &EffectInputs,
    surface: &SurfaceMaterial,
) -> MaterialState {
    let mut st = MaterialState::default();
    surface_common(&mut st, cfg, surface);
    let planar = cfg.general.normals_option == NormalsOption::Planar;
    let z_shift = if fx.sprite { 0.0 } else { 0.0001 };
    match kind {
        EffectKind::Mask => {
            if cfg.general.depth_clip && cfg.uses_visible_part_contour() && !fx.mask_on_top {
                st.enable(kw::DEPTHCLIP);
            }
            let z = if fx.mask_on_top { CompareFunction::Always } else { CompareFunction::LessEqual };
            st.int(p::Z_TEST, z.as_int());
            st.float(p::Z_SHIFT, z_shift);
            let padding = if cfg.outline.quality == QualityLevel::Highest { 0.0 } else { cfg.outline.padding * 0.01 };
            st.float(p::PADDING, padding);
        }
        EffectKind::Outline => {
            let extruded = cfg.outline.quality == QualityLevel::High || planar;
            st.float(p::OUTLINE_WIDTH, if extruded { 0.0 } else { cfg.real_outline_width() / 100.0 });
            st.float(p::OUTLINE_VERTEX_WIDTH, if planar { cfg.outline.width / 100.0 } else { 0.0 });
            st.vector(p::OUTLINE_DIRECTION, Vec4::ZERO);
            st.int(p::OUTLINE_Z_TEST, cfg.outline.visibility.z_test().as_int());
            st.float(p::CONSTANT_WIDTH, bool_float(cfg.general.constant_width));
            st.float(p::MINIMUM_WIDTH, cfg.general.minimum_width);
            let padding = if cfg.outline.quality == QualityLevel::Highest { 0.0 } else { cfg.outline.padding * 0.01 };
            st.float(p::PADDING, padding);
            if cfg.outline.color_style == ColorStyle::Gradient {
                if let Some(ramp) = fx.outline_ramp {
                    st.texture(p::OUTLINE_GRADIENT_TEX, ramp);
                }
                st.enable(if cfg.outline.gradient_in_local_space {
                    kw::OUTLINE_GRADIENT_LS
                } else {
                    kw::OUTLINE_GRADIENT_WS
                });
            }
        }
        EffectKind::Glow => {
            let outline_width = if cfg.outline.intensity > 0.0 { cfg.real_outline_width() } else { 0.0 };
            st.vector(
                p::GLOW_2,
                Vec4::new(
                    if planar { 0.0 } else { outline_width / 100.0 },
                    cfg.glow.animation_speed,
                    cfg.glow.dithering,
                    0.0,
                ),
            );
            if cfg.glow.dithering_style == GlowDitheringStyle::Noise {
                st.enable(kw::DITHER_BLUENOISE);
            }
            st.int(p::GLOW_Z_TEST, cfg.glow.visibility.z_test().as_int());
            st.float(p::CONSTANT_WIDTH, bool_float(cfg.general.constant_width));
            st.float(p::MINIMUM_WIDTH, cfg.general.minimum_width);
            let op = if cfg.glow.blend_passes { StencilOp::Keep } else { StencilOp::Replace };
            st.int(p::GLOW_STENCIL_OP, op.as_int());
            let comp = if cfg.glow.ignore_mask { CompareFunction::Always } else { CompareFunction::NotEqual };
            st.int(p::GLOW_STENCIL_COMP, comp.as_int());
        }
        EffectKind::InnerGlow => {
            let g = &cfg.inner_glow;
            st.vector(p::INNER_GLOW_DATA, Vec4::new(g.width, g.power, 0.0, 0.0));
            st.int(p::INNER_GLOW_Z_TEST, g.visibility.z_test().as_int());
            let dst = match g.blend_mode {
                InnerGlowBlendMode::Additive => BlendFactor::One,
                InnerGlowBlendMode::AlphaBlending => BlendFactor::OneMinusSrcAlpha,
            };
            st.int(p::INNER_GLOW_BLEND_MODE, dst.as_int());
        }
        EffectKind::SeeThrough => {
            let s = &cfg.see_through;
            st.float(p::SEE_THROUGH, s.intensity);
            st.float(p::SEE_THROUGH_NOISE, s.noise);
            st.color(p::SEE_THROUGH_TINT_COLOR, s.tint_color.with_alpha(s.tint_alpha));
            see_through_stencil(&mut st, cfg);
            if s.border_only {
                st.enable(kw::SEETHROUGH_ONLY_BORDER);
            }
            if let Some(texture) = s.texture {
                st.texture(p::SEE_THROUGH_TEXTURE, texture);
                st.float(p::SEE_THROUGH_TEXTURE_SCALE, s.texture_scale);
                st.enable(texture_space_keyword(s.texture_uv_space));
            }
        }
        EffectKind::SeeThroughBorder => {
            let s = &cfg.see_through;
            let has_border = s.border * s.border_width > 0.0;
            st.color(p::SEE_THROUGH_BORDER_COLOR, s.border_color.with_alpha(s.border));
            st.float(p::SEE_THROUGH_BORDER_WIDTH, if has_border { s.border_width / 100.0 } else { 0.0 });
            st.float(p::SEE_THROUGH_BORDER_CONSTANT_WIDTH, bool_float(cfg.general.constant_width));
            st.float(p::SEE_THROUGH_BORDER_MINIMUM_WIDTH, cfg.general.minimum_width);
            see_through_stencil(&mut st, cfg);
        }
        EffectKind::Overlay => {
            let o = &cfg.overlay;
            st.int(p::OVERLAY_Z_TEST, o.visibility.z_test().as_int());
            if let Some(texture) = o.texture {
                st.texture(p::OVERLAY_TEXTURE, texture);
                st.enable(texture_space_keyword(o.texture_uv_space));
            }
            st.vector(
                p::OVERLAY_TEXTURE_SCROLLING,
                Vec4::new(o.texture_scrolling_speed.x, o.texture_scrolling_speed.y, 0.0, 0.0),
            );
            match o.pattern {
                OverlayPattern::None => {}
                OverlayPattern::Polkadots => st.enable(kw::PATTERN_POLKADOTS),
                OverlayPattern::Grid => st.enable(kw::PATTERN_GRID),
                OverlayPattern::StaggeredLines => st.enable(kw::PATTERN_STAGGERED_LINES),
                OverlayPattern::ZigZag => st.enable(kw::PATTERN_ZIGZAG),
            }
            st.vector(p::OVERLAY_PATTERN_DATA, Vec4::new(o.pattern_scale, o.pattern_size, o.pattern_softness, 0.0));
        }
        EffectKind::SolidColor => {
            st.color(p::COLOR, cfg.glow.hq_color);
            let visibility = if cfg.uses_smooth_glow() { cfg.glow.visibility } else { cfg.outline.visibility };
            st.int(p::Z_TEST, visibility.z_test().as_int());
            st.float(p::PADDING, cfg.outline.padding * 0.01);
            st.float(p::OUTLINE_EDGE_THRESHOLD, cfg.outline.edge_threshold.clamp(0.0, 1.0));
            if cfg.general.depth_clip && !fx.mask_on_top {
                st.enable(kw::DEPTHCLIP);
            }
            if cfg.outline.edge_mode == OutlineEdgeMode::Any {
                st.enable(kw::ALL_EDGES);
            }
            st.float(p::Z_SHIFT, z_shift);
        }
    }
    st
}
