//! In-memory scene graph.

use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Arc;

use halo_shared::{Bounds, MeshData, NodeId, Quaternion, Ray, RendererId, Vec3};

use crate::scene::{layer_in_mask, NodeTransform, RaycastHit, RendererInfo, RendererKind, SceneGraph, SurfaceMaterial};

#[derive(Clone, Debug)]
struct MockNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layer: u32,
    active: bool,
    root_marker: bool,
    ignored: bool,
    transform: NodeTransform,
    renderer: Option<RendererInfo>,
    collider: Option<Bounds>,
}

/// Node tree with renderers, box colliders and world transforms.
///
/// Transforms are stored in world space as given; parenting only drives the
/// hierarchy queries.
#[derive(Debug, Default)]
pub struct MockScene {
    nodes: BTreeMap<NodeId, MockNode>,
    next_id: u64,
    bakes: Cell<usize>,
}

impl MockScene {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty node.
    pub fn add_node(&mut self, name: &str, parent: Option<NodeId>) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        self.nodes.insert(
            id,
            MockNode {
                name: name.to_owned(),
                parent,
                children: Vec::new(),
                layer: 0,
                active: true,
                root_marker: false,
                ignored: false,
                transform: NodeTransform::from_trs(Vec3::ZERO, Quaternion::IDENTITY, Vec3::ONE),
                renderer: None,
                collider: None,
            },
        );
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.push(id);
        }
        id
    }

    /// Adds a node with a mesh renderer and a matching box collider.
    pub fn add_mesh_object(&mut self, name: &str, parent: Option<NodeId>, mesh: Arc<MeshData>, position: Vec3) -> NodeId {
        let id = self.add_node(name, parent);
        let materials = vec![SurfaceMaterial::default(); mesh.submesh_count().max(1)];
        let info = RendererInfo {
            id: RendererId(id.0),
            node: id,
            kind: RendererKind::Mesh,
            enabled: true,
            visible: true,
            bounds: mesh.bounds(),
            mesh: Some(mesh),
            collider_mesh: None,
            static_batched: false,
            materials,
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.renderer = Some(info);
        }
        self.set_transform(id, NodeTransform::from_trs(position, Quaternion::IDENTITY, Vec3::ONE));
        id
    }

    /// Adds a node with a sprite renderer.
    pub fn add_sprite(&mut self, name: &str, parent: Option<NodeId>, position: Vec3) -> NodeId {
        let id = self.add_node(name, parent);
        let info = RendererInfo {
            id: RendererId(id.0),
            node: id,
            kind: RendererKind::Sprite,
            enabled: true,
            visible: true,
            bounds: Bounds::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)),
            mesh: None,
            collider_mesh: None,
            static_batched: false,
            materials: vec![SurfaceMaterial::default()],
        };
        if let Some(node) = self.nodes.get_mut(&id) {
            node.renderer = Some(info);
        }
        self.set_transform(id, NodeTransform::from_trs(position, Quaternion::IDENTITY, Vec3::ONE));
        id
    }

    /// Replaces the world transform, moving renderer bounds and collider along.
    pub fn set_transform(&mut self, node: NodeId, transform: NodeTransform) {
        let Some(n) = self.nodes.get_mut(&node) else { return };
        n.transform = transform;
        if let Some(r) = n.renderer.as_mut() {
            let local = r.mesh.as_ref().map_or(Bounds::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0)), |m| m.bounds());
            r.bounds = local.transformed(&transform.local_to_world);
            if r.kind != RendererKind::Sprite {
                n.collider = Some(r.bounds);
            }
        }
    }

    /// Mutable access to a node's renderer.
    pub fn renderer_mut(&mut self, node: NodeId) -> Option<&mut RendererInfo> {
        self.nodes.get_mut(&node)?.renderer.as_mut()
    }

    /// Sets the layer.
    pub fn set_layer(&mut self, node: NodeId, layer: u32) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.layer = layer;
        }
    }

    /// Activates or deactivates a node.
    pub fn set_active(&mut self, node: NodeId, active: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.active = active;
        }
    }

    /// Adds or removes the group-root marker.
    pub fn set_root_marker(&mut self, node: NodeId, marker: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.root_marker = marker;
        }
    }

    /// Marks the node as carrying an ignoring effect.
    pub fn set_ignored(&mut self, node: NodeId, ignored: bool) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.ignored = ignored;
        }
    }

    /// Replaces the box collider; `None` removes it.
    pub fn set_collider(&mut self, node: NodeId, collider: Option<Bounds>) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.collider = collider;
        }
    }

    /// Removes a node and its subtree.
    pub fn remove_node(&mut self, node: NodeId) {
        let mut doomed = self.descendants(node);
        doomed.push(node);
        if let Some(parent) = self.nodes.get(&node).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != node);
            }
        }
        for id in doomed {
            self.nodes.remove(&id);
        }
    }

    /// Number of skinned bakes served
    #[must_use]
    pub fn skinned_bakes(&self) -> usize {
        self.bakes.get()
    }
}

impl SceneGraph for MockScene {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes.get(&node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn all_nodes(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for (id, node) in &self.nodes {
            if node.parent.is_none() {
                out.push(*id);
                out.extend(self.descendants(*id));
            }
        }
        out
    }

    fn is_active(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            match self.nodes.get(&id) {
                Some(n) if n.active => current = n.parent,
                _ => return false,
            }
        }
        true
    }

    fn layer(&self, node: NodeId) -> u32 {
        self.nodes.get(&node).map_or(0, |n| n.layer)
    }

    fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|n| n.name.as_str())
    }

    fn has_root_marker(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.root_marker)
    }

    fn is_ignored(&self, node: NodeId) -> bool {
        self.nodes.get(&node).is_some_and(|n| n.ignored)
    }

    fn renderer(&self, node: NodeId) -> Option<RendererInfo> {
        self.nodes.get(&node)?.renderer.clone()
    }

    fn transform(&self, node: NodeId) -> Option<NodeTransform> {
        self.nodes.get(&node).map(|n| n.transform)
    }

    fn raycast_all(&self, ray: &Ray, max_distance: f32, layer_mask: u32) -> Vec<RaycastHit> {
        let mut hits: Vec<RaycastHit> = self
            .nodes
            .iter()
            .filter(|(id, n)| layer_in_mask(n.layer, layer_mask) && self.is_active(**id))
            .filter_map(|(id, n)| {
                let collider = n.collider?;
                let distance = collider.intersect_ray(ray)?;
                if distance > max_distance {
                    return None;
                }
                let point = ray.at(distance);
                Some(RaycastHit { node: *id, point, normal: box_normal(&collider, point), distance })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn bake_skinned_mesh(&self, renderer: RendererId) -> Option<MeshData> {
        let info = self.nodes.values().find_map(|n| n.renderer.as_ref().filter(|r| r.id == renderer))?;
        if info.kind != RendererKind::SkinnedMesh {
            return None;
        }
        self.bakes.set(self.bakes.get() + 1);
        info.mesh.as_deref().cloned()
    }
}

fn box_normal(bounds: &Bounds, point: Vec3) -> Vec3 {
    let d = point - bounds.center;
    let e = bounds.extents;
    let rel = [
        if e.x > 0.0 { d.x / e.x } else { 0.0 },
        if e.y > 0.0 { d.y / e.y } else { 0.0 },
        if e.z > 0.0 { d.z / e.z } else { 0.0 },
    ];
    let axis = (0..3).max_by(|a, b| rel[*a].abs().total_cmp(&rel[*b].abs())).unwrap_or(1);
    let sign = rel[axis].signum();
    match axis {
        0 => Vec3::new(sign, 0.0, 0.0),
        1 => Vec3::new(0.0, sign, 0.0),
        _ => Vec3::new(0.0, 0.0, sign),
    }
}
