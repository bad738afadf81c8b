//! # Effect Configuration
//!
//! Declarative settings of one highlight effect, grouped per effect kind.
//! Every group is `#[serde(default)]` so a profile only needs to spell out
//! what differs from the defaults.
//!
//! The configuration is owned by its effect, mutated between frames by the
//! host or by a profile load, and read-only while a frame renders.

mod profile;

pub use profile::EffectProfile;

use halo_shared::{Color, Gradient, MeshId, NodeId, TextureHandle, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::ral::CompareFunction;

/// Which renderers an effect applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetOptions {
    /// The target node and all its descendants
    #[default]
    Children,
    /// Only the renderer on the target node
    OnlyThisObject,
    /// From the group root down
    RootToChildren,
    /// Every renderer in the scene on the configured layers
    LayerInScene,
    /// Descendants of the target on the configured layers
    LayerInChildren,
    /// Explicit list supplied by the host
    Scripting,
}

/// How outline/glow extrusion normals are derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalsOption {
    /// Average normals of vertices sharing a position
    #[default]
    Smooth,
    /// Keep the source normals and draw the renderer itself
    PreserveOriginal,
    /// Centroid-relative outward normals
    Reorient,
    /// Planar meshes: outward normals, no screen-space offsets
    Planar,
}

/// Tier of the outline/glow algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    /// One offset
    Fastest,
    /// Four diagonal offsets
    #[default]
    Medium,
    /// Eight offsets
    High,
    /// Screen-space blur and compose
    Highest,
}

impl QualityLevel {
    /// True for tiers that draw several screen-space offsets.
    #[must_use]
    pub const fn uses_multiple_offsets(self) -> bool {
        matches!(self, Self::Medium | Self::High)
    }
}

/// Depth policy of an effect layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Depth tested like regular geometry
    #[default]
    Normal,
    /// Drawn over everything
    AlwaysOnTop,
    /// Drawn only where hidden
    OnlyWhenOccluded,
}

impl Visibility {
    /// Depth comparison realizing this policy.
    #[must_use]
    pub const fn z_test(self) -> CompareFunction {
        match self {
            Self::Normal => CompareFunction::LessEqual,
            Self::AlwaysOnTop => CompareFunction::Always,
            Self::OnlyWhenOccluded => CompareFunction::Greater,
        }
    }
}

/// When the see-through silhouette shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeeThroughMode {
    /// Only while highlighted
    WhenHighlighted,
    /// Whenever something occludes the object
    AlwaysWhenOccluded,
    /// Disabled
    #[default]
    Never,
}

/// Order of see-through draws among an effect's objects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeeThroughSortingMode {
    /// Discovery order
    #[default]
    Default,
    /// Ascending surface render queue
    SortByMaterialsRenderQueue,
    /// Descending surface render queue
    SortByMaterialsRenderQueueInverted,
}

/// Single color or vertical gradient.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorStyle {
    /// Flat color
    #[default]
    SingleColor,
    /// 32-sample ramp over the object height
    Gradient,
}

/// Which edges the smooth outline traces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineEdgeMode {
    /// Silhouette only
    #[default]
    Exterior,
    /// Every depth/normal edge
    Any,
}

/// Contour of the smooth outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourStyle {
    /// Around the visible pixels
    #[default]
    AroundVisibleParts,
    /// Around the full shape, occluded parts included
    AroundObjectShape,
}

/// Glow composition blending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlowBlendMode {
    /// One/One
    #[default]
    Additive,
    /// SrcAlpha/OneMinusSrcAlpha
    AlphaBlending,
}

/// Glow dithering pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlowDitheringStyle {
    /// Ordered pattern
    #[default]
    Pattern,
    /// Blue noise
    Noise,
}

/// Inner glow blending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InnerGlowBlendMode {
    /// Additive
    #[default]
    Additive,
    /// Alpha blended
    AlphaBlending,
}

/// Smooth glow blur algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlurMethod {
    /// Four-level separable pyramid
    #[default]
    Gaussian,
    /// Five-level Kawase chain
    Kawase,
}

/// When the overlay shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMode {
    /// While highlighted
    #[default]
    WhenHighlighted,
    /// Always
    Always,
}

/// Procedural overlay pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayPattern {
    /// Plain fill
    #[default]
    None,
    /// Dots
    Polkadots,
    /// Grid lines
    Grid,
    /// Staggered lines
    StaggeredLines,
    /// Zig-zag
    ZigZag,
}

/// Projection used for overlay and see-through textures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureUvSpace {
    /// Triplanar world projection
    #[default]
    Triplanar,
    /// Object-space projection
    ObjectSpace,
    /// Screen-space projection
    ScreenSpace,
}

/// Hit flash style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitFxMode {
    /// Flash the overlay
    #[default]
    Overlay,
    /// Flash the inner glow
    InnerGlow,
    /// Expanding overlay around a hit point
    LocalHit,
}

/// What fires a hit flash.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitFxTriggerMode {
    /// Host calls only
    #[default]
    Scripting,
    /// Every highlight start
    WhenHighlighted,
}

/// Target decoration shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFxStyle {
    /// Textured reticle
    #[default]
    Texture,
    /// Rectangular frame
    Frame,
    /// Inward-pointing corners
    InwardCorners,
    /// Cross hair
    Cross,
}

/// Icon decoration source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconAssetType {
    /// A mesh drawn with the icon program
    #[default]
    Mesh,
    /// A host-instantiated prefab
    Prefab,
}

/// Icon animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconAnimationOption {
    /// Static
    #[default]
    None,
    /// Bounces vertically
    VerticalBounce,
}

/// When the label shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelMode {
    /// While highlighted
    #[default]
    WhenHighlighted,
    /// Always
    Always,
}

/// Label horizontal anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAlignment {
    /// Picked from the screen position
    #[default]
    Auto,
    /// Left of the object
    Left,
    /// Right of the object
    Right,
}

/// One layer of the multi-pass glow.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlowPass {
    /// Extrusion multiplier of the glow width
    pub offset: f32,
    /// Layer opacity
    pub alpha: f32,
    /// Layer color
    pub color: Color,
}

/// Default HQ glow / glow pass color.
pub const DEFAULT_GLOW_COLOR: Color = Color::new(0.64, 1.0, 0.0, 1.0);

/// Four-pass falloff used when no passes are configured.
#[must_use]
pub fn default_glow_passes() -> Vec<GlowPass> {
    [(4.0, 0.1), (3.0, 0.2), (2.0, 0.3), (1.0, 0.4)]
        .into_iter()
        .map(|(offset, alpha)| GlowPass { offset, alpha, color: DEFAULT_GLOW_COLOR })
        .collect()
}

/// Renderer discovery.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Discovery mode
    pub mode: TargetOptions,
    /// Layers for the layer modes
    pub layer_mask: u32,
    /// Substring or regex node-name filter, empty for none
    pub name_filter: String,
    /// Interpret the filter as a regex
    pub use_regex: bool,
    /// Merge eligible static meshes into one combined binding
    pub combine_meshes: bool,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            mode: TargetOptions::Children,
            layer_mask: u32::MAX,
            name_filter: String::new(),
            use_regex: false,
            combine_meshes: false,
        }
    }
}

/// Cross-cutting options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Extrusion normals
    pub normals_option: NormalsOption,
    /// Submesh bit set; bit `l` enables submesh `l`
    pub sub_mesh_mask: u32,
    /// Fade-in time in seconds
    pub fade_in_duration: f32,
    /// Fade-out time in seconds
    pub fade_out_duration: f32,
    /// Outline width independent of distance
    pub constant_width: bool,
    /// Minimum outline width in pixels
    pub minimum_width: f32,
    /// Extra pixels around the optimal-blit rectangle
    pub extra_coverage_pixels: u32,
    /// Batch multi-offset draws with instancing
    pub gpu_instancing: bool,
    /// Re-bake skinned meshes each frame
    pub optimize_skinned_mesh: bool,
    /// Skip per-object layer/visibility checks
    pub ignore_object_visibility: bool,
    /// Render in reflection cameras
    pub reflection_probes: bool,
    /// Camera layers this effect renders in
    pub cameras_layer_mask: u32,
    /// Cull back faces in effect passes
    pub cull_back_faces: bool,
    /// Alpha cutoff, 0 disables alpha clipping
    pub alpha_cutoff: f32,
    /// Clip smooth effects against scene depth
    pub depth_clip: bool,
    /// Fade with camera distance
    pub camera_distance_fade: bool,
    /// Near fade distance
    pub camera_distance_fade_near: f32,
    /// Far fade distance
    pub camera_distance_fade_far: f32,
    /// Render from the registry's ordered sweep instead of per-effect callbacks
    pub custom_sorting: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            normals_option: NormalsOption::Smooth,
            sub_mesh_mask: u32::MAX,
            fade_in_duration: 0.0,
            fade_out_duration: 0.0,
            constant_width: true,
            minimum_width: 0.0,
            extra_coverage_pixels: 0,
            gpu_instancing: true,
            optimize_skinned_mesh: true,
            ignore_object_visibility: false,
            reflection_probes: false,
            cameras_layer_mask: u32::MAX,
            cull_back_faces: true,
            alpha_cutoff: 0.0,
            depth_clip: false,
            camera_distance_fade: false,
            camera_distance_fade_near: 0.0,
            camera_distance_fade_far: 1000.0,
            custom_sorting: false,
        }
    }
}

/// Outline layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSettings {
    /// Intensity, 0 disables
    pub intensity: f32,
    /// Color
    pub color: Color,
    /// Flat or gradient
    pub color_style: ColorStyle,
    /// Gradient for [`ColorStyle::Gradient`]
    pub gradient: Gradient,
    /// Evaluate the gradient in mesh space
    pub gradient_in_local_space: bool,
    /// Width
    pub width: f32,
    /// Extra width for non-highest tiers
    pub padding: f32,
    /// Smooth blur passes
    pub blur_passes: u32,
    /// Tier
    pub quality: QualityLevel,
    /// Smooth edge mode
    pub edge_mode: OutlineEdgeMode,
    /// Edge detection threshold for [`OutlineEdgeMode::Any`]
    pub edge_threshold: f32,
    /// Smooth outline sharpness
    pub sharpness: f32,
    /// Smooth downsampling factor
    pub downsampling: u32,
    /// Depth policy
    pub visibility: Visibility,
    /// Draw before and independently of the mask
    pub independent: bool,
    /// Smooth contour style
    pub contour_style: ContourStyle,
    /// Compose with a tight quad instead of a full-screen blit
    pub optimal_blit: bool,
    /// Gradient knee
    pub gradient_knee: f32,
    /// Gradient power
    pub gradient_power: f32,
    /// Stylized pattern
    pub stylized: bool,
    /// Pattern texture
    pub pattern: Option<TextureHandle>,
    /// Pattern scale
    pub pattern_scale: f32,
    /// Pattern threshold
    pub pattern_threshold: f32,
    /// Pattern distortion
    pub pattern_distortion_amount: f32,
    /// Pattern stop-motion rate
    pub pattern_stop_motion_scale: f32,
    /// Dashed outline
    pub dashed: bool,
    /// Dash width
    pub dash_width: f32,
    /// Dash gap
    pub dash_gap: f32,
    /// Dash speed
    pub dash_speed: f32,
}

impl Default for OutlineSettings {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            color: Color::BLACK,
            color_style: ColorStyle::SingleColor,
            gradient: Gradient::default(),
            gradient_in_local_space: false,
            width: 0.45,
            padding: 0.0,
            blur_passes: 2,
            quality: QualityLevel::Medium,
            edge_mode: OutlineEdgeMode::Exterior,
            edge_threshold: 0.995,
            sharpness: 1.0,
            downsampling: 1,
            visibility: Visibility::Normal,
            independent: false,
            contour_style: ContourStyle::AroundVisibleParts,
            optimal_blit: true,
            gradient_knee: 0.4,
            gradient_power: 8.0,
            stylized: false,
            pattern: None,
            pattern_scale: 0.3,
            pattern_threshold: 0.3,
            pattern_distortion_amount: 0.5,
            pattern_stop_motion_scale: 5.0,
            dashed: false,
            dash_width: 0.5,
            dash_gap: 0.3,
            dash_speed: 2.0,
        }
    }
}

/// Glow layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlowSettings {
    /// Intensity, 0 disables
    pub intensity: f32,
    /// Width
    pub width: f32,
    /// Tier
    pub quality: QualityLevel,
    /// Smooth blur algorithm
    pub blur_method: BlurMethod,
    /// Smooth downsampling factor
    pub downsampling: u32,
    /// Smooth glow color
    pub hq_color: Color,
    /// Dithering amount
    pub dithering: f32,
    /// Dithering style
    pub dithering_style: GlowDitheringStyle,
    /// Shader tuning constant 1
    pub magic_number1: f32,
    /// Shader tuning constant 2
    pub magic_number2: f32,
    /// Animation speed
    pub animation_speed: f32,
    /// Depth policy
    pub visibility: Visibility,
    /// Composition blending
    pub blend_mode: GlowBlendMode,
    /// Blend passes over each other instead of stenciling them
    pub blend_passes: bool,
    /// Layers for non-highest tiers
    pub passes: Vec<GlowPass>,
    /// Glow does not require the stencil mask
    pub ignore_mask: bool,
    /// 16-bit float smooth buffers
    pub high_precision: bool,
    /// Compose with a tight quad instead of a full-screen blit
    pub optimal_blit: bool,
}

impl Default for GlowSettings {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            width: 0.4,
            quality: QualityLevel::Medium,
            blur_method: BlurMethod::Gaussian,
            downsampling: 2,
            hq_color: DEFAULT_GLOW_COLOR,
            dithering: 1.0,
            dithering_style: GlowDitheringStyle::Pattern,
            magic_number1: 0.75,
            magic_number2: 0.5,
            animation_speed: 1.0,
            visibility: Visibility::Normal,
            blend_mode: GlowBlendMode::Additive,
            blend_passes: true,
            passes: default_glow_passes(),
            ignore_mask: false,
            high_precision: true,
            optimal_blit: true,
        }
    }
}

/// Inner glow layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnerGlowSettings {
    /// Intensity, 0 disables
    pub intensity: f32,
    /// Color
    pub color: Color,
    /// Width
    pub width: f32,
    /// Falloff power
    pub power: f32,
    /// Blending
    pub blend_mode: InnerGlowBlendMode,
    /// Depth policy
    pub visibility: Visibility,
}

impl Default for InnerGlowSettings {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            color: Color::WHITE,
            width: 1.0,
            power: 1.0,
            blend_mode: InnerGlowBlendMode::Additive,
            visibility: Visibility::Normal,
        }
    }
}

/// Overlay layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Intensity, 0 disables
    pub intensity: f32,
    /// Color
    pub color: Color,
    /// Pulse speed
    pub animation_speed: f32,
    /// Pulse floor
    pub min_intensity: f32,
    /// Blend with the surface
    pub blending: f32,
    /// When to show
    pub mode: OverlayMode,
    /// Texture
    pub texture: Option<TextureHandle>,
    /// Texture projection
    pub texture_uv_space: TextureUvSpace,
    /// Texture scale
    pub texture_scale: f32,
    /// Texture scrolling
    pub texture_scrolling_speed: Vec2,
    /// Procedural pattern
    pub pattern: OverlayPattern,
    /// Pattern scale
    pub pattern_scale: f32,
    /// Pattern size
    pub pattern_size: f32,
    /// Pattern edge softness
    pub pattern_softness: f32,
    /// Depth policy
    pub visibility: Visibility,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            color: Color::YELLOW,
            animation_speed: 1.0,
            min_intensity: 0.5,
            blending: 1.0,
            mode: OverlayMode::WhenHighlighted,
            texture: None,
            texture_uv_space: TextureUvSpace::Triplanar,
            texture_scale: 1.0,
            texture_scrolling_speed: Vec2::ZERO,
            pattern: OverlayPattern::None,
            pattern_scale: 10.0,
            pattern_size: 0.15,
            pattern_softness: 0.02,
            visibility: Visibility::Normal,
        }
    }
}

/// See-through layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeeThroughSettings {
    /// Activation mode
    pub mode: SeeThroughMode,
    /// Layers considered occluders
    pub occluder_mask: u32,
    /// Stencil-accurate occlusion
    pub occluder_mask_accurate: bool,
    /// Bounds shrink factor for the occlusion raycasts
    pub occluder_threshold: f32,
    /// Seconds between occlusion re-tests
    pub check_interval: f32,
    /// Test every object instead of the combined bounds
    pub check_individual_objects: bool,
    /// Depth offset
    pub depth_offset: f32,
    /// Maximum depth
    pub max_depth: f32,
    /// Fill intensity
    pub intensity: f32,
    /// Tint alpha
    pub tint_alpha: f32,
    /// Tint color
    pub tint_color: Color,
    /// Noise amount
    pub noise: f32,
    /// Border intensity
    pub border: f32,
    /// Border color
    pub border_color: Color,
    /// Border width
    pub border_width: f32,
    /// Draw the border only
    pub border_only: bool,
    /// Texture
    pub texture: Option<TextureHandle>,
    /// Texture projection
    pub texture_uv_space: TextureUvSpace,
    /// Texture scale
    pub texture_scale: f32,
    /// Sort order among objects
    pub sorting_mode: SeeThroughSortingMode,
    /// Clear stencil after see-through so later effects layer correctly
    pub ordered: bool,
}

impl Default for SeeThroughSettings {
    fn default() -> Self {
        Self {
            mode: SeeThroughMode::Never,
            occluder_mask: u32::MAX,
            occluder_mask_accurate: false,
            occluder_threshold: 0.3,
            check_interval: halo_shared::DEFAULT_OCCLUSION_CHECK_INTERVAL,
            check_individual_objects: false,
            depth_offset: 0.0,
            max_depth: 0.0,
            intensity: 0.8,
            tint_alpha: 0.5,
            tint_color: Color::RED,
            noise: 1.0,
            border: 0.0,
            border_color: Color::BLACK,
            border_width: 0.45,
            border_only: false,
            texture: None,
            texture_uv_space: TextureUvSpace::Triplanar,
            texture_scale: 1.0,
            sorting_mode: SeeThroughSortingMode::Default,
            ordered: false,
        }
    }
}

/// Hit flash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitFxSettings {
    /// Style
    pub mode: HitFxMode,
    /// Trigger
    pub trigger_mode: HitFxTriggerMode,
    /// Default duration
    pub fade_out_duration: f32,
    /// Default color
    pub color: Color,
    /// Local hit radius
    pub radius: f32,
}

impl Default for HitFxSettings {
    fn default() -> Self {
        Self {
            mode: HitFxMode::Overlay,
            trigger_mode: HitFxTriggerMode::Scripting,
            fade_out_duration: 0.25,
            color: Color::WHITE,
            radius: 0.5,
        }
    }
}

/// Target reticle decoration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetFxSettings {
    /// Enabled
    pub enabled: bool,
    /// Shape
    pub style: TargetFxStyle,
    /// Texture for [`TargetFxStyle::Texture`]
    pub texture: Option<TextureHandle>,
    /// Color
    pub color: Color,
    /// Explicit anchor node
    pub center: Option<NodeId>,
    /// Anchor on the last reported hit position
    pub use_hit_position: bool,
    /// Size from the enclosing bounds of all objects
    pub use_enclosing_bounds: bool,
    /// Offset from the anchor
    pub offset: Vec3,
    /// Spin speed in degrees per second
    pub rotation_speed: f32,
    /// Start scale
    pub initial_scale: f32,
    /// End scale
    pub end_scale: f32,
    /// Scale with the render bounds
    pub scale_to_render_bounds: bool,
    /// Force a square footprint
    pub square: bool,
    /// Project onto the ground
    pub align_to_ground: bool,
    /// Ground raycast length
    pub ground_max_distance: f32,
    /// Ground layers
    pub ground_layer_mask: u32,
    /// Reject ground hits below this altitude
    pub ground_min_altitude: f32,
    /// Fade power for ground projection
    pub fade_power: f32,
    /// Scale-in time
    pub transition_duration: f32,
    /// Time before fading out, 0 for forever
    pub stay_duration: f32,
    /// Depth policy
    pub visibility: Visibility,
    /// Frame line width
    pub frame_width: f32,
    /// Corner length
    pub corner_length: f32,
    /// Opacity floor of the frame styles
    pub frame_min_opacity: f32,
}

impl Default for TargetFxSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            style: TargetFxStyle::Texture,
            texture: None,
            color: Color::WHITE,
            center: None,
            use_hit_position: false,
            use_enclosing_bounds: false,
            offset: Vec3::ZERO,
            rotation_speed: 50.0,
            initial_scale: 4.0,
            end_scale: 1.5,
            scale_to_render_bounds: true,
            square: false,
            align_to_ground: false,
            ground_max_distance: 10.0,
            ground_layer_mask: u32::MAX,
            ground_min_altitude: -1000.0,
            fade_power: 32.0,
            transition_duration: 0.5,
            stay_duration: 1.5,
            visibility: Visibility::AlwaysOnTop,
            frame_width: 0.1,
            corner_length: 0.25,
            frame_min_opacity: 0.0,
        }
    }
}

/// Icon decoration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconFxSettings {
    /// Enabled
    pub enabled: bool,
    /// Source type
    pub asset_type: IconAssetType,
    /// Icon mesh for [`IconAssetType::Mesh`]
    pub mesh: Option<MeshId>,
    /// Lit color
    pub light_color: Color,
    /// Shadowed color
    pub dark_color: Color,
    /// Explicit anchor node
    pub center: Option<NodeId>,
    /// Spin speed in degrees per second
    pub rotation_speed: f32,
    /// Animation
    pub animation_option: IconAnimationOption,
    /// Bounce height
    pub animation_amount: f32,
    /// Bounce speed
    pub animation_speed: f32,
    /// Scale
    pub scale: f32,
    /// Scale with the render bounds
    pub scale_to_render_bounds: bool,
    /// Offset from the anchor
    pub offset: Vec3,
    /// Scale-in time
    pub transition_duration: f32,
    /// Time before fading out, 0 for forever
    pub stay_duration: f32,
}

impl Default for IconFxSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            asset_type: IconAssetType::Mesh,
            mesh: None,
            light_color: Color::WHITE,
            dark_color: Color::new(0.1, 0.1, 0.1, 1.0),
            center: None,
            rotation_speed: 50.0,
            animation_option: IconAnimationOption::None,
            animation_amount: 0.1,
            animation_speed: 3.0,
            scale: 1.0,
            scale_to_render_bounds: false,
            offset: Vec3::new(0.0, 1.0, 0.0),
            transition_duration: 0.5,
            stay_duration: 1.5,
        }
    }
}

/// Text label.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelSettings {
    /// Enabled
    pub enabled: bool,
    /// Text
    pub text: String,
    /// Color
    pub color: Color,
    /// Font size
    pub size: f32,
    /// When to show
    pub mode: LabelMode,
    /// Anchor side
    pub alignment: LabelAlignment,
    /// Offset from the object
    pub offset: Vec3,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            text: "Label".to_owned(),
            color: Color::WHITE,
            size: 14.0,
            mode: LabelMode::WhenHighlighted,
            alignment: LabelAlignment::Auto,
            offset: Vec3::ZERO,
        }
    }
}

/// Full configuration of one highlight effect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfiguration {
    /// Renderer discovery
    pub target: TargetSettings,
    /// Cross-cutting options
    pub general: GeneralSettings,
    /// Outline
    pub outline: OutlineSettings,
    /// Glow
    pub glow: GlowSettings,
    /// Inner glow
    pub inner_glow: InnerGlowSettings,
    /// Overlay
    pub overlay: OverlaySettings,
    /// See-through
    pub see_through: SeeThroughSettings,
    /// Hit flash
    pub hit_fx: HitFxSettings,
    /// Target decoration
    pub target_fx: TargetFxSettings,
    /// Icon decoration
    pub icon_fx: IconFxSettings,
    /// Label
    pub label: LabelSettings,
}

impl EffectConfiguration {
    /// True when either smooth layer is active.
    #[must_use]
    pub fn uses_smooth_blend(&self) -> bool {
        self.uses_smooth_glow() || self.uses_smooth_outline()
    }

    /// Glow renders through the screen-space blur path.
    #[must_use]
    pub fn uses_smooth_glow(&self) -> bool {
        self.glow.intensity > 0.0 && self.glow.width > 0.0 && self.glow.quality == QualityLevel::Highest
    }

    /// Outline renders through the screen-space blur path.
    #[must_use]
    pub fn uses_smooth_outline(&self) -> bool {
        self.outline.intensity > 0.0 && self.outline.width > 0.0 && self.outline.quality == QualityLevel::Highest
    }

    /// Outline width including padding for non-highest tiers.
    #[must_use]
    pub fn real_outline_width(&self) -> f32 {
        if self.outline.quality == QualityLevel::Highest {
            self.outline.width
        } else {
            self.outline.width + self.outline.padding
        }
    }

    /// True when submesh `index` passes the sub-mesh mask.
    #[must_use]
    pub fn submesh_enabled(&self, index: usize) -> bool {
        index < halo_shared::MAX_SUBMESH_BITS && self.general.sub_mesh_mask & (1u32 << index) != 0
    }

    /// The stencil mask pass is needed this frame.
    #[must_use]
    pub fn mask_required(&self, highlighted: bool) -> bool {
        (highlighted && (self.outline.intensity > 0.0 || (self.glow.intensity > 0.0 && !self.glow.ignore_mask)))
            || self.see_through.mode != SeeThroughMode::Never
            || (self.target_fx.enabled && self.target_fx.align_to_ground)
    }

    /// The mask ignores depth so on-top layers can stencil against it.
    #[must_use]
    pub fn mask_on_top(&self, highlighted: bool) -> bool {
        let on_top = highlighted
            && ((self.outline.intensity > 0.0 && self.outline.visibility != Visibility::Normal)
                || (self.glow.intensity > 0.0 && self.glow.visibility != Visibility::Normal)
                || (self.inner_glow.intensity > 0.0 && self.inner_glow.visibility != Visibility::Normal));
        on_top || (self.uses_smooth_blend() && self.outline.contour_style == ContourStyle::AroundObjectShape)
    }

    /// Smooth contours follow the visible pixels only.
    #[must_use]
    pub fn uses_visible_part_contour(&self) -> bool {
        self.outline.contour_style == ContourStyle::AroundVisibleParts || !self.uses_smooth_blend()
    }

    /// Skinned meshes are re-baked every frame for the extruded passes.
    #[must_use]
    pub fn bakes_skinned_mesh(&self) -> bool {
        self.general.optimize_skinned_mesh
            && ((self.outline.intensity > 0.0 && self.outline.quality != QualityLevel::Highest)
                || (self.glow.intensity > 0.0 && self.glow.quality != QualityLevel::Highest))
    }

    /// Extruded passes need derived normals.
    #[must_use]
    pub fn needs_derived_normals(&self) -> bool {
        self.inner_glow.intensity > 0.0
            || (self.glow.intensity > 0.0 && self.glow.quality != QualityLevel::Highest)
            || (self.outline.intensity > 0.0 && self.outline.quality != QualityLevel::Highest)
    }

    /// Forces the sprite-safe subset: smooth tiers, no see-through, inner glow or culling.
    pub fn apply_sprite_overrides(&mut self) {
        self.outline.independent = false;
        if self.general.alpha_cutoff <= 0.0 {
            self.general.alpha_cutoff = 0.5;
        }
        self.outline.quality = QualityLevel::Highest;
        self.glow.quality = QualityLevel::Highest;
        self.see_through.mode = SeeThroughMode::Never;
        self.inner_glow.intensity = 0.0;
        self.general.cull_back_faces = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_mapping_is_total() {
        let all = [Visibility::Normal, Visibility::AlwaysOnTop, Visibility::OnlyWhenOccluded];
        let tests: Vec<_> = all.iter().map(|v| v.z_test()).collect();
        assert_eq!(tests, vec![CompareFunction::LessEqual, CompareFunction::Always, CompareFunction::Greater]);
    }

    #[test]
    fn test_multiple_offsets_only_medium_high() {
        assert!(!QualityLevel::Fastest.uses_multiple_offsets());
        assert!(QualityLevel::Medium.uses_multiple_offsets());
        assert!(QualityLevel::High.uses_multiple_offsets());
        assert!(!QualityLevel::Highest.uses_multiple_offsets());
    }

    #[test]
    fn test_real_outline_width_padding() {
        let mut cfg = EffectConfiguration::default();
        cfg.outline.padding = 0.1;
        assert!((cfg.real_outline_width() - 0.55).abs() < 1e-6);
        cfg.outline.quality = QualityLevel::Highest;
        assert!((cfg.real_outline_width() - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_defaults() {
        let cfg = EffectConfiguration::default();
        assert_eq!(cfg.outline.intensity, 1.0);
        assert_eq!(cfg.glow.passes.len(), 4);
        assert_eq!(cfg.see_through.mode, SeeThroughMode::Never);
        assert!(cfg.general.gpu_instancing);
        assert!(cfg.submesh_enabled(0));
        assert!(!cfg.submesh_enabled(40));
    }

    #[test]
    fn test_mask_requirements() {
        let mut cfg = EffectConfiguration::default();
        assert!(cfg.mask_required(true));
        assert!(!cfg.mask_required(false));
        cfg.see_through.mode = SeeThroughMode::AlwaysWhenOccluded;
        assert!(cfg.mask_required(false));
    }

    #[test]
    fn test_mask_on_top_follows_visibility() {
        let mut cfg = EffectConfiguration::default();
        assert!(!cfg.mask_on_top(true));
        cfg.outline.visibility = Visibility::AlwaysOnTop;
        assert!(cfg.mask_on_top(true));
        assert!(!cfg.mask_on_top(false));
    }

    #[test]
    fn test_sprite_overrides() {
        let mut cfg = EffectConfiguration::default();
        cfg.inner_glow.intensity = 1.0;
        cfg.see_through.mode = SeeThroughMode::WhenHighlighted;
        cfg.apply_sprite_overrides();
        assert_eq!(cfg.outline.quality, QualityLevel::Highest);
        assert_eq!(cfg.see_through.mode, SeeThroughMode::Never);
        assert!(!cfg.general.cull_back_faces);
        assert_eq!(cfg.inner_glow.intensity, 0.0);
        assert_eq!(cfg.general.alpha_cutoff, 0.5);
    }
}
