//! # Scene Port
//!
//! Hierarchy, transforms, layers, bounds and raycasts, as supplied by the
//! host engine. The compositor only reads through this trait.

mod camera;

pub use camera::{Camera, CameraKind};

use std::sync::Arc;

use halo_shared::{Bounds, Mat4, MeshData, NodeId, Quaternion, Ray, RendererId, TextureHandle, Vec3, Vec4};

use crate::ral::CullMode;

/// Renderer component type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RendererKind {
    /// Static mesh with a mesh filter
    Mesh,
    /// Skinned mesh
    SkinnedMesh,
    /// 2D sprite
    Sprite,
    /// Anything else (particles, lines, trails); never highlighted
    Other,
}

/// Surface material of one submesh, as far as the compositor needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMaterial {
    /// Render queue, used for ordered see-through sorting
    pub render_queue: i32,
    /// Main texture, if any
    pub main_texture: Option<TextureHandle>,
    /// Main texture scale (xy) and offset (zw)
    pub main_texture_st: Vec4,
    /// Alpha cutoff when the surface is alpha-tested
    pub alpha_cutoff: Option<f32>,
    /// Surface culling override
    pub cull: Option<CullMode>,
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        Self {
            render_queue: 2000,
            main_texture: None,
            main_texture_st: Vec4::new(1.0, 1.0, 0.0, 0.0),
            alpha_cutoff: None,
            cull: None,
        }
    }
}

/// Snapshot of a renderer attached to a node.
#[derive(Clone, Debug)]
pub struct RendererInfo {
    /// Renderer identity
    pub id: RendererId,
    /// Owning node
    pub node: NodeId,
    /// Component type
    pub kind: RendererKind,
    /// Component enabled flag
    pub enabled: bool,
    /// Seen by at least one camera this frame
    pub visible: bool,
    /// World-space bounds
    pub bounds: Bounds,
    /// Mesh from the filter or skinned bind pose; `None` for sprites
    pub mesh: Option<Arc<MeshData>>,
    /// Mesh of an attached collision proxy
    pub collider_mesh: Option<Arc<MeshData>>,
    /// Part of a static batch (original mesh reference unusable)
    pub static_batched: bool,
    /// One surface material per submesh
    pub materials: Vec<SurfaceMaterial>,
}

/// World transform of a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    /// World position
    pub position: Vec3,
    /// World rotation
    pub rotation: Quaternion,
    /// Accumulated scale
    pub lossy_scale: Vec3,
    /// Own scale relative to the parent
    pub local_scale: Vec3,
    /// Local-to-world matrix
    pub local_to_world: Mat4,
}

impl NodeTransform {
    /// Transform from position, rotation and scale at the root.
    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            lossy_scale: scale,
            local_scale: scale,
            local_to_world: Mat4::from_trs(position, rotation, scale),
        }
    }
}

/// Raycast result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// Node owning the hit collider
    pub node: NodeId,
    /// Hit point
    pub point: Vec3,
    /// Surface normal
    pub normal: Vec3,
    /// Distance from the ray origin
    pub distance: f32,
}

/// Host scene graph.
pub trait SceneGraph {
    /// True while the node exists.
    fn contains(&self, node: NodeId) -> bool;

    /// Parent node.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Direct children, in hierarchy order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Every node in the scene, in hierarchy order.
    fn all_nodes(&self) -> Vec<NodeId>;

    /// Active in hierarchy.
    fn is_active(&self, node: NodeId) -> bool;

    /// Layer index in 0..32.
    fn layer(&self, node: NodeId) -> u32;

    /// Node name.
    fn name(&self, node: NodeId) -> Option<&str>;

    /// Carries a group-root marker.
    fn has_root_marker(&self, node: NodeId) -> bool;

    /// Carries its own enabled effect configured to be ignored.
    fn is_ignored(&self, node: NodeId) -> bool;

    /// Renderer attached to the node.
    fn renderer(&self, node: NodeId) -> Option<RendererInfo>;

    /// World transform.
    fn transform(&self, node: NodeId) -> Option<NodeTransform>;

    /// All hits along a ray within `max_distance` on layers in `layer_mask`,
    /// nearest first.
    fn raycast_all(&self, ray: &Ray, max_distance: f32, layer_mask: u32) -> Vec<RaycastHit>;

    /// Current skinned pose of a renderer, with normals.
    fn bake_skinned_mesh(&self, renderer: RendererId) -> Option<MeshData>;

    /// Nearest hit along a ray.
    fn raycast(&self, ray: &Ray, max_distance: f32, layer_mask: u32) -> Option<RaycastHit> {
        self.raycast_all(ray, max_distance, layer_mask).into_iter().next()
    }

    /// Every node below `node` (excluded), depth first.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = self.children(node);
        stack.reverse();
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut kids = self.children(n);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }
}

/// Screen-space text billboard owned by the host.
pub trait LabelOverlay {
    /// Makes the label visible.
    fn show(&mut self);
    /// Hides the label.
    fn hide(&mut self);
    /// Sets opacity in [0, 1].
    fn set_alpha(&mut self, alpha: f32);
    /// Anchors the label at a world position.
    fn set_position(&mut self, position: Vec3);
}

/// True when `layer` is part of `mask`.
#[must_use]
pub const fn layer_in_mask(layer: u32, mask: u32) -> bool {
    layer < 32 && (1u32 << layer) & mask != 0
}
