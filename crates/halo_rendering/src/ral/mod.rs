//! # Rendering Abstraction Layer
//!
//! The compositor never calls a graphics API. It talks to a host-provided
//! [`RenderBackend`]: fork materials from named shader programs, set named
//! parameters and keywords on them, upload derived meshes, and submit
//! recorded [`CommandBuffer`]s.
//!
//! ```text
//! ┌────────────────┐  fork/set params   ┌────────────────┐
//! │ MaterialBinder │ ─────────────────► │                │
//! ├────────────────┤  upload/release    │  RenderBackend │ ──► GPU
//! │ GeometryCache  │ ─────────────────► │  (host impl)   │
//! ├────────────────┤  submit(commands)  │                │
//! │ FrameCompositor│ ─────────────────► │                │
//! └────────────────┘                    └────────────────┘
//! ```

pub mod commands;
pub mod state;

pub use commands::{CommandBuffer, InstanceParams, ParamValue, PixelRect, RenderCommand, TargetBinding};
pub use state::{BlendFactor, CompareFunction, CullMode, RenderTargetDesc, StencilOp, TargetFormat};

use halo_shared::{Color, MaterialHandle, MeshData, MeshId, TextureHandle};

/// External shader programs the compositor forks materials from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderProgram {
    /// Stencil mask
    Mask,
    /// Vertex-extruded or multi-offset outline
    Outline,
    /// Multi-pass glow
    Glow,
    /// Rim-style inner glow
    InnerGlow,
    /// See-through fill
    SeeThrough,
    /// See-through border
    SeeThroughBorder,
    /// Occluder stencil writer for accurate see-through
    SeeThroughOccluder,
    /// Stencil clearing
    ClearStencil,
    /// Surface overlay
    Overlay,
    /// Solid silhouette for the smooth path
    SolidColor,
    /// Glow blur chain
    BlurGlow,
    /// Outline blur chain
    BlurOutline,
    /// Glow composition
    ComposeGlow,
    /// Outline composition
    ComposeOutline,
    /// Target reticle
    Target,
    /// Icon decoration
    Icon,
}

impl ShaderProgram {
    /// Every program, in a stable order.
    pub const ALL: [Self; 16] = [
        Self::Mask,
        Self::Outline,
        Self::Glow,
        Self::InnerGlow,
        Self::SeeThrough,
        Self::SeeThroughBorder,
        Self::SeeThroughOccluder,
        Self::ClearStencil,
        Self::Overlay,
        Self::SolidColor,
        Self::BlurGlow,
        Self::BlurOutline,
        Self::ComposeGlow,
        Self::ComposeOutline,
        Self::Target,
        Self::Icon,
    ];

    /// Program name as registered with the host's shader library.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Mask => "Halo/Mask",
            Self::Outline => "Halo/Outline",
            Self::Glow => "Halo/Glow",
            Self::InnerGlow => "Halo/InnerGlow",
            Self::SeeThrough => "Halo/SeeThrough",
            Self::SeeThroughBorder => "Halo/SeeThroughBorder",
            Self::SeeThroughOccluder => "Halo/SeeThroughOccluder",
            Self::ClearStencil => "Halo/ClearStencil",
            Self::Overlay => "Halo/Overlay",
            Self::SolidColor => "Halo/SolidColor",
            Self::BlurGlow => "Halo/BlurGlow",
            Self::BlurOutline => "Halo/BlurOutline",
            Self::ComposeGlow => "Halo/ComposeGlow",
            Self::ComposeOutline => "Halo/ComposeOutline",
            Self::Target => "Halo/Target",
            Self::Icon => "Halo/Icon",
        }
    }
}

/// Host graphics port.
///
/// Implementations own every GPU object. Handles returned here stay valid
/// until the matching destroy/release call.
pub trait RenderBackend {
    /// Forks a new material instance from a shared program template.
    ///
    /// Returns `None` when the program is not available; callers log once
    /// and skip the pass.
    fn create_material(&mut self, program: ShaderProgram) -> Option<MaterialHandle>;

    /// Destroys a forked material.
    fn destroy_material(&mut self, material: MaterialHandle);

    /// Sets a named parameter immediately.
    fn set_param(&mut self, material: MaterialHandle, name: &'static str, value: ParamValue);

    /// Enables or disables a shader keyword immediately.
    fn set_keyword(&mut self, material: MaterialHandle, keyword: &'static str, enabled: bool);

    /// Makes a derived mesh available for drawing under its id.
    fn upload_mesh(&mut self, mesh: &MeshData);

    /// Frees a mesh previously uploaded.
    fn release_mesh(&mut self, mesh: MeshId);

    /// Creates a 1-D color ramp texture.
    fn create_ramp_texture(&mut self, pixels: &[Color]) -> TextureHandle;

    /// Replaces the contents of a ramp texture.
    fn update_ramp_texture(&mut self, texture: TextureHandle, pixels: &[Color]);

    /// Destroys a texture.
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Executes a recorded command list in order.
    fn submit(&mut self, commands: &CommandBuffer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_program_names_unique() {
        let names: HashSet<_> = ShaderProgram::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), ShaderProgram::ALL.len());
    }
}
