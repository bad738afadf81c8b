//! Deferred draw lists.
//!
//! The compositor records a [`CommandBuffer`] per effect per camera and hands
//! it to [`RenderBackend::submit`](super::RenderBackend::submit) in one go.
//! Commands execute strictly in recording order: later passes read the
//! stencil and depth state written by earlier ones.

use bytemuck::{Pod, Zeroable};
use halo_shared::{Color, Mat4, MaterialHandle, MeshId, RenderTargetHandle, RendererId, TextureHandle, Vec4};

use super::state::RenderTargetDesc;

/// Value of a named shader parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ParamValue {
    /// Scalar
    Float(f32),
    /// Integer (comparison functions, stencil ops, blend factors)
    Int(i32),
    /// Four-component vector
    Vector(Vec4),
    /// Color
    Color(Color),
    /// Texture binding
    Texture(TextureHandle),
    /// Matrix
    Matrix(Mat4),
    /// Temporary render target sampled as a texture
    Target(RenderTargetHandle),
}

/// Per-instance payload of an instanced outline/glow draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceParams {
    /// Screen-space extrusion direction
    pub direction: Vec4,
    /// Pass color
    pub color: Vec4,
    /// Glow data (intensity, offset, magic numbers)
    pub glow: Vec4,
}

/// Where a pass writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetBinding {
    /// The camera's color/depth target
    Camera,
    /// A temporary acquired earlier in the same buffer
    Temporary(RenderTargetHandle),
}

/// Screen rectangle in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelRect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

/// One recorded operation.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderCommand {
    /// Set a material parameter at this point of the stream
    SetParam {
        /// Material
        material: MaterialHandle,
        /// Parameter name
        name: &'static str,
        /// Value
        value: ParamValue,
    },
    /// Set a global shader float
    SetGlobalFloat {
        /// Parameter name
        name: &'static str,
        /// Value
        value: f32,
    },
    /// Draw a mesh with an explicit matrix
    DrawMesh {
        /// Mesh
        mesh: MeshId,
        /// Object-to-world matrix
        matrix: Mat4,
        /// Material
        material: MaterialHandle,
        /// Submesh index
        submesh: u32,
        /// Shader pass
        pass: u32,
    },
    /// Draw a scene renderer with a material override
    DrawRenderer {
        /// Renderer
        renderer: RendererId,
        /// Material
        material: MaterialHandle,
        /// Submesh index
        submesh: u32,
        /// Shader pass
        pass: u32,
    },
    /// Draw one mesh several times with per-instance parameters
    DrawMeshInstanced {
        /// Mesh
        mesh: MeshId,
        /// Object-to-world matrix shared by every instance
        matrix: Mat4,
        /// Material
        material: MaterialHandle,
        /// Submesh index
        submesh: u32,
        /// Shader pass
        pass: u32,
        /// One entry per instance
        instances: Vec<InstanceParams>,
    },
    /// Draw a screen-aligned quad covering `rect`
    DrawScreenQuad {
        /// Pixel rectangle
        rect: PixelRect,
        /// Material
        material: MaterialHandle,
        /// Shader pass
        pass: u32,
    },
    /// Allocate a temporary render target
    AcquireTemporary {
        /// Slot
        target: RenderTargetHandle,
        /// Size and format
        desc: RenderTargetDesc,
    },
    /// Release a temporary render target
    ReleaseTemporary {
        /// Slot
        target: RenderTargetHandle,
    },
    /// Bind color (and optionally depth) outputs
    SetRenderTarget {
        /// Color output
        color: TargetBinding,
        /// Depth output, `None` for none
        depth: Option<TargetBinding>,
    },
    /// Clear the bound color target
    ClearColor {
        /// Clear value
        color: Color,
    },
    /// Full-screen copy through a material pass
    Blit {
        /// Source
        source: TargetBinding,
        /// Destination
        dest: TargetBinding,
        /// Material
        material: MaterialHandle,
        /// Shader pass
        pass: u32,
    },
}

impl RenderCommand {
    /// True for commands that rasterize something.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Self::DrawMesh { .. }
                | Self::DrawRenderer { .. }
                | Self::DrawMeshInstanced { .. }
                | Self::DrawScreenQuad { .. }
                | Self::Blit { .. }
        )
    }

    /// Material used by a draw, if any.
    #[must_use]
    pub fn material(&self) -> Option<MaterialHandle> {
        match self {
            Self::SetParam { material, .. }
            | Self::DrawMesh { material, .. }
            | Self::DrawRenderer { material, .. }
            | Self::DrawMeshInstanced { material, .. }
            | Self::DrawScreenQuad { material, .. }
            | Self::Blit { material, .. } => Some(*material),
            _ => None,
        }
    }
}

/// Ordered list of render commands.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self { commands: Vec::with_capacity(64) }
    }

    /// Removes every command, keeping the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of commands
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Recorded commands in order.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Appends a raw command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Appends every command of `other`, in order.
    pub fn append(&mut self, other: &Self) {
        self.commands.extend_from_slice(&other.commands);
    }

    /// Instances across every instanced draw.
    #[must_use]
    pub fn instance_count(&self) -> usize {
        self.commands
            .iter()
            .map(|c| match c {
                RenderCommand::DrawMeshInstanced { instances, .. } => instances.len(),
                _ => 0,
            })
            .sum()
    }

    /// Records a parameter change.
    pub fn set_param(&mut self, material: MaterialHandle, name: &'static str, value: ParamValue) {
        self.push(RenderCommand::SetParam { material, name, value });
    }

    /// Records a global float.
    pub fn set_global_float(&mut self, name: &'static str, value: f32) {
        self.push(RenderCommand::SetGlobalFloat { name, value });
    }

    /// Records a mesh draw.
    pub fn draw_mesh(&mut self, mesh: MeshId, matrix: Mat4, material: MaterialHandle, submesh: u32, pass: u32) {
        self.push(RenderCommand::DrawMesh { mesh, matrix, material, submesh, pass });
    }

    /// Records a renderer draw.
    pub fn draw_renderer(&mut self, renderer: RendererId, material: MaterialHandle, submesh: u32, pass: u32) {
        self.push(RenderCommand::DrawRenderer { renderer, material, submesh, pass });
    }

    /// Records an instanced draw; empty instance lists are dropped.
    pub fn draw_mesh_instanced(
        &mut self,
        mesh: MeshId,
        matrix: Mat4,
        material: MaterialHandle,
        submesh: u32,
        instances: Vec<InstanceParams>,
    ) {
        if instances.is_empty() {
            return;
        }
        self.push(RenderCommand::DrawMeshInstanced { mesh, matrix, material, submesh, pass: 0, instances });
    }

    /// Records a screen quad draw.
    pub fn draw_screen_quad(&mut self, rect: PixelRect, material: MaterialHandle, pass: u32) {
        self.push(RenderCommand::DrawScreenQuad { rect, material, pass });
    }

    /// Records a temporary target allocation.
    pub fn acquire_temporary(&mut self, target: RenderTargetHandle, desc: RenderTargetDesc) {
        self.push(RenderCommand::AcquireTemporary { target, desc });
    }

    /// Records a temporary target release.
    pub fn release_temporary(&mut self, target: RenderTargetHandle) {
        self.push(RenderCommand::ReleaseTemporary { target });
    }

    /// Records an output binding.
    pub fn set_render_target(&mut self, color: TargetBinding, depth: Option<TargetBinding>) {
        self.push(RenderCommand::SetRenderTarget { color, depth });
    }

    /// Records a color clear.
    pub fn clear_color(&mut self, color: Color) {
        self.push(RenderCommand::ClearColor { color });
    }

    /// Records a blit.
    pub fn blit(&mut self, source: TargetBinding, dest: TargetBinding, material: MaterialHandle, pass: u32) {
        self.push(RenderCommand::Blit { source, dest, material, pass });
    }

    /// Number of draw-type commands.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }
}
