//! Per-object effect kinds and their parameter table.

use crate::config::{EffectConfiguration, HitFxMode, QualityLevel, SeeThroughMode};
use crate::ral::ShaderProgram;

use super::params::{self as p, keywords as kw};

/// Effect layers that fork one material per submesh of every object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EffectKind {
    /// Stencil mask
    Mask,
    /// Outline (non-highest tiers)
    Outline,
    /// Glow (non-highest tiers)
    Glow,
    /// Inner glow
    InnerGlow,
    /// See-through fill
    SeeThrough,
    /// See-through border
    SeeThroughBorder,
    /// Overlay
    Overlay,
    /// Silhouette for the smooth path
    SolidColor,
}

/// One row of the kind table.
#[derive(Debug)]
pub struct KindRow {
    /// Kind described by this row
    pub kind: EffectKind,
    /// Template the materials are forked from
    pub program: ShaderProgram,
    /// Parameters written on configuration changes
    pub params: &'static [&'static str],
    /// Parameters written per frame into the command stream
    pub frame_params: &'static [&'static str],
    /// Keywords toggled on configuration changes
    pub keywords: &'static [&'static str],
}

const SURFACE_KEYWORDS: &[&str] = &[kw::ALPHACLIP];
const TEXTURE_SPACE_KEYWORDS: [&str; 3] = [kw::TEXTURE_TRIPLANAR, kw::TEXTURE_OBJECTSPACE, kw::TEXTURE_SCREENSPACE];

/// Parameter and keyword sets per kind, in [`EffectKind::ALL`] order.
pub static KIND_TABLE: [KindRow; EffectKind::COUNT] = [
    KindRow {
        kind: EffectKind::Mask,
        program: ShaderProgram::Mask,
        params: &[p::MAIN_TEX, p::MAIN_TEX_ST, p::CUTOFF, p::CULL, p::Z_TEST, p::Z_SHIFT, p::PADDING],
        frame_params: &[],
        keywords: &[kw::ALPHACLIP, kw::DEPTHCLIP],
    },
    KindRow {
        kind: EffectKind::Outline,
        program: ShaderProgram::Outline,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::CULL,
            p::OUTLINE_WIDTH,
            p::OUTLINE_VERTEX_WIDTH,
            p::OUTLINE_DIRECTION,
            p::OUTLINE_Z_TEST,
            p::CONSTANT_WIDTH,
            p::MINIMUM_WIDTH,
            p::PADDING,
            p::OUTLINE_GRADIENT_TEX,
        ],
        frame_params: &[p::OUTLINE_COLOR, p::OUTLINE_DIRECTION, p::OUTLINE_VERTEX_DATA],
        keywords: &[kw::ALPHACLIP, kw::OUTLINE_GRADIENT_WS, kw::OUTLINE_GRADIENT_LS],
    },
    KindRow {
        kind: EffectKind::Glow,
        program: ShaderProgram::Glow,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::CULL,
            p::GLOW_2,
            p::GLOW_Z_TEST,
            p::CONSTANT_WIDTH,
            p::MINIMUM_WIDTH,
            p::GLOW_STENCIL_OP,
            p::GLOW_STENCIL_COMP,
        ],
        frame_params: &[p::GLOW, p::GLOW_COLOR, p::GLOW_DIRECTION],
        keywords: &[kw::ALPHACLIP, kw::DITHER_BLUENOISE],
    },
    KindRow {
        kind: EffectKind::InnerGlow,
        program: ShaderProgram::InnerGlow,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::CULL,
            p::INNER_GLOW_DATA,
            p::INNER_GLOW_Z_TEST,
            p::INNER_GLOW_BLEND_MODE,
        ],
        frame_params: &[p::INNER_GLOW_COLOR],
        keywords: SURFACE_KEYWORDS,
    },
    KindRow {
        kind: EffectKind::SeeThrough,
        program: ShaderProgram::SeeThrough,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::CULL,
            p::SEE_THROUGH,
            p::SEE_THROUGH_NOISE,
            p::SEE_THROUGH_TINT_COLOR,
            p::SEE_THROUGH_STENCIL_REF,
            p::SEE_THROUGH_STENCIL_COMP,
            p::SEE_THROUGH_STENCIL_PASS_OP,
            p::Z_TEST,
            p::SEE_THROUGH_ORDERED,
            p::SEE_THROUGH_DEPTH_OFFSET,
            p::SEE_THROUGH_MAX_DEPTH,
            p::SEE_THROUGH_TEXTURE,
            p::SEE_THROUGH_TEXTURE_SCALE,
        ],
        frame_params: &[],
        keywords: &[
            kw::ALPHACLIP,
            kw::DEPTH_OFFSET,
            kw::SEETHROUGH_ONLY_BORDER,
            TEXTURE_SPACE_KEYWORDS[0],
            TEXTURE_SPACE_KEYWORDS[1],
            TEXTURE_SPACE_KEYWORDS[2],
        ],
    },
    KindRow {
        kind: EffectKind::SeeThroughBorder,
        program: ShaderProgram::SeeThroughBorder,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::CULL,
            p::SEE_THROUGH_BORDER_COLOR,
            p::SEE_THROUGH_BORDER_WIDTH,
            p::SEE_THROUGH_BORDER_CONSTANT_WIDTH,
            p::SEE_THROUGH_BORDER_MINIMUM_WIDTH,
            p::SEE_THROUGH_STENCIL_REF,
            p::SEE_THROUGH_STENCIL_COMP,
            p::SEE_THROUGH_STENCIL_PASS_OP,
            p::Z_TEST,
            p::SEE_THROUGH_ORDERED,
            p::SEE_THROUGH_DEPTH_OFFSET,
            p::SEE_THROUGH_MAX_DEPTH,
        ],
        frame_params: &[],
        keywords: &[kw::ALPHACLIP, kw::DEPTH_OFFSET],
    },
    KindRow {
        kind: EffectKind::Overlay,
        program: ShaderProgram::Overlay,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::CULL,
            p::OVERLAY_Z_TEST,
            p::OVERLAY_TEXTURE,
            p::OVERLAY_TEXTURE_SCROLLING,
            p::OVERLAY_PATTERN_DATA,
        ],
        frame_params: &[p::OVERLAY_COLOR, p::OVERLAY_DATA, p::OVERLAY_HIT_POS_DATA, p::OVERLAY_HIT_START_TIME],
        keywords: &[
            kw::ALPHACLIP,
            kw::PATTERN_POLKADOTS,
            kw::PATTERN_GRID,
            kw::PATTERN_STAGGERED_LINES,
            kw::PATTERN_ZIGZAG,
            TEXTURE_SPACE_KEYWORDS[0],
            TEXTURE_SPACE_KEYWORDS[1],
            TEXTURE_SPACE_KEYWORDS[2],
        ],
    },
    KindRow {
        kind: EffectKind::SolidColor,
        program: ShaderProgram::SolidColor,
        params: &[
            p::MAIN_TEX,
            p::MAIN_TEX_ST,
            p::CUTOFF,
            p::COLOR,
            p::CULL,
            p::Z_TEST,
            p::PADDING,
            p::OUTLINE_EDGE_THRESHOLD,
            p::Z_SHIFT,
        ],
        frame_params: &[],
        keywords: &[kw::ALPHACLIP, kw::DEPTHCLIP, kw::ALL_EDGES],
    },
];

impl EffectKind {
    /// Number of kinds
    pub const COUNT: usize = 8;

    /// Every kind, in table order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Mask,
        Self::Outline,
        Self::Glow,
        Self::InnerGlow,
        Self::SeeThrough,
        Self::SeeThroughBorder,
        Self::Overlay,
        Self::SolidColor,
    ];

    /// Position in [`Self::ALL`] and [`KIND_TABLE`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Table row.
    #[must_use]
    pub fn row(self) -> &'static KindRow {
        &KIND_TABLE[self.index()]
    }

    /// Template program.
    #[must_use]
    pub fn program(self) -> ShaderProgram {
        self.row().program
    }

    /// True when the configuration needs materials of this kind.
    #[must_use]
    pub fn required(self, cfg: &EffectConfiguration) -> bool {
        match self {
            Self::Mask | Self::Overlay => true,
            Self::Outline => cfg.outline.intensity > 0.0 || cfg.outline.independent,
            Self::Glow => cfg.glow.intensity > 0.0,
            Self::InnerGlow => cfg.inner_glow.intensity > 0.0 || cfg.hit_fx.mode == HitFxMode::InnerGlow,
            Self::SeeThrough => cfg.see_through.mode != SeeThroughMode::Never,
            Self::SeeThroughBorder => cfg.see_through.mode != SeeThroughMode::Never && cfg.see_through.border > 0.0,
            Self::SolidColor => {
                cfg.outline.quality == QualityLevel::Highest || cfg.glow.quality == QualityLevel::Highest
            }
        }
    }

    /// Kinds the configuration needs.
    pub fn required_kinds(cfg: &EffectConfiguration) -> impl Iterator<Item = Self> + '_ {
        Self::ALL.into_iter().filter(move |k| k.required(cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_rows_match_kinds() {
        for kind in EffectKind::ALL {
            assert_eq!(kind.row().kind, kind);
        }
    }

    #[test]
    fn test_default_configuration_kinds() {
        let cfg = EffectConfiguration::default();
        let kinds: Vec<_> = EffectKind::required_kinds(&cfg).collect();
        assert_eq!(kinds, vec![EffectKind::Mask, EffectKind::Outline, EffectKind::Overlay]);
    }

    #[test]
    fn test_border_needs_see_through() {
        let mut cfg = EffectConfiguration::default();
        cfg.see_through.border = 1.0;
        assert!(!EffectKind::SeeThroughBorder.required(&cfg));
        cfg.see_through.mode = SeeThroughMode::WhenHighlighted;
        assert!(EffectKind::SeeThroughBorder.required(&cfg));
    }
}
