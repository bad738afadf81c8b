//! Per-renderer state of an effect.

use std::sync::Arc;

use halo_shared::{Mat4, MeshData, MeshId, NodeId, RendererId};

use crate::config::NormalsOption;
use crate::geometry::bake_transform;
use crate::material::MaterialSet;
use crate::ral::RenderBackend;
use crate::scene::{NodeTransform, RendererInfo, RendererKind, SurfaceMaterial};

/// One renderer taking part in an effect.
///
/// Forked materials and baked meshes are owned here; derived and combined
/// meshes belong to the geometry cache and are only referenced.
#[derive(Debug)]
pub struct ObjectBinding {
    /// Renderer
    pub renderer: RendererId,
    /// Node carrying the renderer
    pub node: NodeId,
    /// Renderer type
    pub kind: RendererKind,
    /// Mesh resolved from the renderer
    pub original_mesh: Arc<MeshData>,
    /// Mesh before transform baking: the original, derived or combined mesh
    pub base_mesh: Arc<MeshData>,
    /// Mesh drawn by the extruded passes
    pub mesh: Arc<MeshData>,
    /// Normals handling for this object
    pub normals: NormalsOption,
    /// Stands for a whole combined group
    pub is_combined: bool,
    /// Transform the private mirrored copy was baked under
    pub baked_under: Option<NodeTransform>,
    /// Private id of the per-frame skinned pose
    pub skinned_pose: Option<MeshId>,
    /// Forked per-submesh materials
    pub materials: MaterialSet,
    /// Surface material per submesh
    pub surfaces: Vec<SurfaceMaterial>,
    /// Transform at setup
    pub transform: NodeTransform,
    /// Object-to-world matrix for explicit mesh draws
    pub render_matrix: Mat4,
    /// Renderer visibility when the binding was built
    pub visible_at_setup: bool,
    /// Draws this frame
    pub render: bool,
}

impl ObjectBinding {
    /// Binding drawing `mesh` for `info`.
    #[must_use]
    pub fn new(info: &RendererInfo, mesh: Arc<MeshData>, normals: NormalsOption, transform: NodeTransform) -> Self {
        Self {
            renderer: info.id,
            node: info.node,
            kind: info.kind,
            original_mesh: Arc::clone(&mesh),
            base_mesh: Arc::clone(&mesh),
            mesh,
            normals,
            is_combined: false,
            baked_under: None,
            skinned_pose: None,
            materials: MaterialSet::new(),
            surfaces: info.materials.clone(),
            transform,
            render_matrix: transform.local_to_world,
            visible_at_setup: info.visible,
            render: false,
        }
    }

    /// Drawn through the scene renderer instead of an explicit mesh.
    #[must_use]
    pub fn preserve_original(&self) -> bool {
        !self.is_combined && self.normals == NormalsOption::PreserveOriginal
    }

    /// Submeshes to iterate, at least one.
    #[must_use]
    pub fn submesh_count(&self) -> usize {
        self.mesh.submesh_count().max(1)
    }

    /// True while a mirrored private copy is drawn.
    #[must_use]
    pub const fn is_baked(&self) -> bool {
        self.baked_under.is_some()
    }

    /// Bakes `transform` into a private copy of the base mesh under `id`.
    pub fn bake(&mut self, backend: &mut dyn RenderBackend, id: MeshId, transform: &NodeTransform) {
        let baked = bake_transform(id, &self.base_mesh, &transform.local_to_world);
        backend.upload_mesh(&baked);
        self.mesh = Arc::new(baked);
        self.baked_under = Some(*transform);
        tracing::trace!(node = ?self.node, mesh = ?id, "mirrored mesh baked");
    }

    /// Updates the render matrix for this frame, re-baking a mirrored copy
    /// whose transform moved.
    pub fn update_render_matrix(&mut self, backend: &mut dyn RenderBackend, transform: &NodeTransform) {
        if self.is_combined || self.preserve_original() {
            self.render_matrix = transform.local_to_world;
            return;
        }
        match self.baked_under {
            Some(under) => {
                if under != *transform {
                    let id = self.mesh.id;
                    self.bake(backend, id, transform);
                }
                self.render_matrix = Mat4::IDENTITY;
            }
            None => {
                self.render_matrix = Mat4::from_trs(transform.position, transform.rotation, transform.lossy_scale);
            }
        }
    }

    /// Replaces the drawn mesh with a freshly baked skinned pose.
    pub fn set_skinned_pose(&mut self, backend: &mut dyn RenderBackend, id: MeshId, mut pose: MeshData) {
        pose.id = id;
        backend.upload_mesh(&pose);
        self.skinned_pose = Some(id);
        self.normals = NormalsOption::Smooth;
        self.mesh = Arc::new(pose);
    }

    /// Frees forked materials and binding-owned meshes.
    pub fn release(&mut self, backend: &mut dyn RenderBackend) {
        self.materials.destroy(backend);
        if self.baked_under.take().is_some() {
            backend.release_mesh(self.mesh.id);
        }
        if let Some(pose) = self.skinned_pose.take() {
            backend.release_mesh(pose);
        }
        self.mesh = Arc::clone(&self.base_mesh);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;
    use halo_shared::{Bounds, Quaternion, Vec3};

    fn info() -> RendererInfo {
        RendererInfo {
            id: RendererId(1),
            node: NodeId(1),
            kind: RendererKind::Mesh,
            enabled: true,
            visible: true,
            bounds: Bounds::default(),
            mesh: None,
            collider_mesh: None,
            static_batched: false,
            materials: vec![SurfaceMaterial::default()],
        }
    }

    fn tri() -> Arc<MeshData> {
        Arc::new(MeshData::new(MeshId(7), vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![Vec3::Z; 3], vec![0, 1, 2]))
    }

    #[test]
    fn test_preserve_original_unless_combined() {
        let t = NodeTransform::from_trs(Vec3::ZERO, Quaternion::IDENTITY, Vec3::ONE);
        let mut b = ObjectBinding::new(&info(), tri(), NormalsOption::PreserveOriginal, t);
        assert!(b.preserve_original());
        b.is_combined = true;
        assert!(!b.preserve_original());
    }

    #[test]
    fn test_mirrored_rebake_on_move() {
        let mut backend = RecordingBackend::new();
        let t = NodeTransform::from_trs(Vec3::ZERO, Quaternion::IDENTITY, Vec3::new(-1.0, 1.0, 1.0));
        let mut b = ObjectBinding::new(&info(), tri(), NormalsOption::Smooth, t);
        b.bake(&mut backend, MeshId::derived(9), &t);
        assert!(b.is_baked());
        assert!((b.mesh.positions[1].x + 1.0).abs() < 1e-6);

        b.update_render_matrix(&mut backend, &t);
        assert_eq!(b.render_matrix, Mat4::IDENTITY);
        assert_eq!(backend.uploaded_meshes().len(), 1);

        let moved = NodeTransform::from_trs(Vec3::new(0.0, 2.0, 0.0), Quaternion::IDENTITY, t.lossy_scale);
        b.update_render_matrix(&mut backend, &moved);
        assert_eq!(backend.uploaded_meshes().len(), 2);
        assert_eq!(b.mesh.id, MeshId::derived(9));

        b.release(&mut backend);
        assert_eq!(backend.released_meshes(), &[MeshId::derived(9)]);
        assert_eq!(b.mesh.id, MeshId(7));
    }
}
