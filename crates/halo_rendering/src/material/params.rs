//! Names of the shader parameters and keywords the effect programs expose.

// Surface
/// Main texture
pub const MAIN_TEX: &str = "_MainTex";
/// Main texture scale (xy) and offset (zw)
pub const MAIN_TEX_ST: &str = "_MainTex_ST";
/// Alpha clip threshold
pub const CUTOFF: &str = "_Cutoff";
/// Cull mode
pub const CULL: &str = "_Cull";
/// Depth comparison
pub const Z_TEST: &str = "_ZTest";
/// Depth bias
pub const Z_SHIFT: &str = "_ZShift";
/// Extra silhouette padding
pub const PADDING: &str = "_Padding";
/// Generic color
pub const COLOR: &str = "_Color";
/// Secondary color
pub const SECOND_COLOR: &str = "_SecondColor";

// Outline
/// Outline color
pub const OUTLINE_COLOR: &str = "_OutlineColor";
/// Clip-space extrusion width
pub const OUTLINE_WIDTH: &str = "_OutlineWidth";
/// Object-space extrusion width
pub const OUTLINE_VERTEX_WIDTH: &str = "_OutlineVertexWidth";
/// Screen-space offset direction
pub const OUTLINE_DIRECTION: &str = "_OutlineDirection";
/// Gradient bounds: min y, height
pub const OUTLINE_VERTEX_DATA: &str = "_OutlineVertexData";
/// Outline depth comparison
pub const OUTLINE_Z_TEST: &str = "_OutlineZTest";
/// Constant screen width toggle
pub const CONSTANT_WIDTH: &str = "_ConstantWidth";
/// Minimum width in pixels
pub const MINIMUM_WIDTH: &str = "_MinimumWidth";
/// Gradient ramp texture
pub const OUTLINE_GRADIENT_TEX: &str = "_OutlineGradientTex";
/// Gradient knee and power
pub const OUTLINE_GRADIENT_DATA: &str = "_OutlineGradientData";
/// Composition sharpness
pub const OUTLINE_SHARPNESS: &str = "_OutlineSharpness";
/// Composition stencil comparison
pub const OUTLINE_STENCIL_COMP: &str = "_OutlineStencilComp";
/// Edge detection threshold
pub const OUTLINE_EDGE_THRESHOLD: &str = "_OutlineEdgeThreshold";
/// Stylized pattern texture
pub const PATTERN_TEX: &str = "_PatternTex";
/// Pattern scale, threshold, distortion, stop motion
pub const PATTERN_DATA: &str = "_PatternData";
/// Dash width, gap, speed
pub const DASH_DATA: &str = "_DashData";

// Glow
/// Per-pass glow data
pub const GLOW: &str = "_Glow";
/// Glow color
pub const GLOW_COLOR: &str = "_GlowColor";
/// Outline width, animation speed, dithering
pub const GLOW_2: &str = "_Glow2";
/// Screen-space offset direction
pub const GLOW_DIRECTION: &str = "_GlowDirection";
/// Glow depth comparison
pub const GLOW_Z_TEST: &str = "_GlowZTest";
/// Glow stencil pass operation
pub const GLOW_STENCIL_OP: &str = "_GlowStencilOp";
/// Glow stencil comparison
pub const GLOW_STENCIL_COMP: &str = "_GlowStencilComp";

// Inner glow
/// Inner glow color
pub const INNER_GLOW_COLOR: &str = "_InnerGlowColor";
/// Width and power
pub const INNER_GLOW_DATA: &str = "_InnerGlowData";
/// Inner glow depth comparison
pub const INNER_GLOW_Z_TEST: &str = "_InnerGlowZTest";
/// Destination blend factor
pub const INNER_GLOW_BLEND_MODE: &str = "_InnerGlowBlendMode";

// Overlay
/// Overlay color
pub const OVERLAY_COLOR: &str = "_OverlayColor";
/// Animation speed, min intensity, blending, texture scale
pub const OVERLAY_DATA: &str = "_OverlayData";
/// Local hit position and radius
pub const OVERLAY_HIT_POS_DATA: &str = "_OverlayHitPosData";
/// Local hit start time
pub const OVERLAY_HIT_START_TIME: &str = "_OverlayHitStartTime";
/// Overlay texture
pub const OVERLAY_TEXTURE: &str = "_OverlayTexture";
/// Texture scrolling speed
pub const OVERLAY_TEXTURE_SCROLLING: &str = "_OverlayTextureScrolling";
/// Pattern scale, size, softness
pub const OVERLAY_PATTERN_DATA: &str = "_OverlayPatternData";
/// Overlay depth comparison
pub const OVERLAY_Z_TEST: &str = "_OverlayZTest";

// See-through
/// Fill intensity
pub const SEE_THROUGH: &str = "_SeeThrough";
/// Noise amount
pub const SEE_THROUGH_NOISE: &str = "_SeeThroughNoise";
/// Tint color
pub const SEE_THROUGH_TINT_COLOR: &str = "_SeeThroughTintColor";
/// Stencil reference
pub const SEE_THROUGH_STENCIL_REF: &str = "_SeeThroughStencilRef";
/// Stencil comparison
pub const SEE_THROUGH_STENCIL_COMP: &str = "_SeeThroughStencilComp";
/// Stencil pass operation
pub const SEE_THROUGH_STENCIL_PASS_OP: &str = "_SeeThroughStencilPassOp";
/// Ordered mode toggle
pub const SEE_THROUGH_ORDERED: &str = "_SeeThroughOrdered";
/// Depth offset
pub const SEE_THROUGH_DEPTH_OFFSET: &str = "_SeeThroughDepthOffset";
/// Maximum depth
pub const SEE_THROUGH_MAX_DEPTH: &str = "_SeeThroughMaxDepth";
/// Fill texture
pub const SEE_THROUGH_TEXTURE: &str = "_SeeThroughTexture";
/// Fill texture scale
pub const SEE_THROUGH_TEXTURE_SCALE: &str = "_SeeThroughTextureScale";
/// Border color
pub const SEE_THROUGH_BORDER_COLOR: &str = "_SeeThroughBorderColor";
/// Border width
pub const SEE_THROUGH_BORDER_WIDTH: &str = "_SeeThroughBorderWidth";
/// Border constant width toggle
pub const SEE_THROUGH_BORDER_CONSTANT_WIDTH: &str = "_SeeThroughBorderConstantWidth";
/// Border minimum width
pub const SEE_THROUGH_BORDER_MINIMUM_WIDTH: &str = "_SeeThroughBorderMinimumWidth";

// Smooth path
/// Blur radius
pub const BLUR_SCALE: &str = "_BlurScale";
/// Radius of the first horizontal blur
pub const BLUR_SCALE_FIRST_HORIZ: &str = "_BlurScaleFirstHoriz";
/// Animation speed
pub const SPEED: &str = "_Speed";
/// Source blend factor
pub const BLEND_SRC: &str = "_BlendSrc";
/// Destination blend factor
pub const BLEND_DST: &str = "_BlendDst";
/// Blurred glow buffer read by the compose quad
pub const GLOW_RT: &str = "_GlowRT";
/// Blurred outline buffer read by the compose quad
pub const OUTLINE_RT: &str = "_OutlineRT";
/// Kawase resample offset
pub const RESAMPLE_SCALE: &str = "_ResampleScale";
/// Global per-object fade
pub const FADE_FACTOR: &str = "_FadeFactor";

// Decorations
/// Frame width, corner length, min opacity, ground min altitude
pub const TARGET_FRAME_DATA: &str = "_TargetFXFrameData";
/// Ground normal and fade power
pub const TARGET_RENDER_DATA: &str = "_TargetFXRenderData";

/// Shader keywords.
pub mod keywords {
    /// Alpha clipping against the main texture
    pub const ALPHACLIP: &str = "HALO_ALPHACLIP";
    /// Clip against scene depth
    pub const DEPTHCLIP: &str = "HALO_DEPTHCLIP";
    /// Gradient evaluated in world space
    pub const OUTLINE_GRADIENT_WS: &str = "HALO_OUTLINE_GRADIENT_WS";
    /// Gradient evaluated in mesh space
    pub const OUTLINE_GRADIENT_LS: &str = "HALO_OUTLINE_GRADIENT_LS";
    /// Detect every edge
    pub const ALL_EDGES: &str = "HALO_ALL_EDGES";
    /// Stylized outline pattern
    pub const OUTLINE_STYLIZED: &str = "HALO_OUTLINE_STYLIZED";
    /// Dashed outline
    pub const OUTLINE_DASHED: &str = "HALO_OUTLINE_DASHED";
    /// Blue-noise dithering
    pub const DITHER_BLUENOISE: &str = "HALO_DITHER_BLUENOISE";
    /// See-through border only
    pub const SEETHROUGH_ONLY_BORDER: &str = "HALO_SEETHROUGH_ONLY_BORDER";
    /// See-through depth window
    pub const DEPTH_OFFSET: &str = "HALO_DEPTH_OFFSET";
    /// Triplanar texture projection
    pub const TEXTURE_TRIPLANAR: &str = "HALO_TEXTURE_TRIPLANAR";
    /// Object-space texture projection
    pub const TEXTURE_OBJECTSPACE: &str = "HALO_TEXTURE_OBJECTSPACE";
    /// Screen-space texture projection
    pub const TEXTURE_SCREENSPACE: &str = "HALO_TEXTURE_SCREENSPACE";
    /// Polka-dot overlay pattern
    pub const PATTERN_POLKADOTS: &str = "HALO_PATTERN_POLKADOTS";
    /// Grid overlay pattern
    pub const PATTERN_GRID: &str = "HALO_PATTERN_GRID";
    /// Staggered-lines overlay pattern
    pub const PATTERN_STAGGERED_LINES: &str = "HALO_PATTERN_STAGGERED_LINES";
    /// Zig-zag overlay pattern
    pub const PATTERN_ZIGZAG: &str = "HALO_PATTERN_ZIGZAG";
    /// Local-hit overlay flash
    pub const OVERLAY_LOCAL_HIT: &str = "HALO_OVERLAY_LOCAL_HIT";
    /// Frame reticle
    pub const TARGET_FRAME: &str = "HALO_TARGET_FRAME";
    /// Inward-corner reticle
    pub const TARGET_INWARD_CORNERS: &str = "HALO_TARGET_INWARD_CORNERS";
    /// Cross reticle
    pub const TARGET_CROSS: &str = "HALO_TARGET_CROSS";
}
