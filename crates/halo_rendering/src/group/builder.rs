//! Renderer discovery and binding construction.

use std::collections::BTreeSet;
use std::sync::Arc;

use halo_shared::{EffectId, MeshData, MeshId, NodeId};

use super::binding::ObjectBinding;
use super::filter::NameFilter;
use crate::config::{EffectConfiguration, NormalsOption, TargetOptions};
use crate::error::{HighlightError, HighlightResult};
use crate::geometry::{CombinePart, DerivedMode, GeometryCache};
use crate::material::{EffectKind, MaterialBinder};
use crate::ral::RenderBackend;
use crate::scene::{layer_in_mask, RendererInfo, RendererKind, SceneGraph};

/// Mesh id of the shared sprite quad. Derived ids issued by the cache start at 1.
pub const SPRITE_QUAD_MESH: MeshId = MeshId::derived(0);

/// Outcome of a rebuild.
#[derive(Debug, Default)]
pub struct GroupBuild {
    /// New bindings, in discovery order
    pub bindings: Vec<ObjectBinding>,
    /// At least one active sprite renderer was found
    pub sprite_mode: bool,
    /// Configuration error hit during resolution
    pub error: Option<HighlightError>,
}

/// Builds the bindings of one effect.
///
/// ```text
/// target mode ──► candidate nodes ──► valid renderers ──► name filter
///                                                             │
///   combine ◄── bake mirrored ◄── derive normals ◄── fork materials
/// ```
pub struct MeshGroupBuilder<'a> {
    backend: &'a mut dyn RenderBackend,
    cache: &'a mut GeometryCache,
    scene: &'a dyn SceneGraph,
    effect: EffectId,
    quad: Arc<MeshData>,
    held: BTreeSet<MeshId>,
}

impl<'a> MeshGroupBuilder<'a> {
    /// Builder for `effect`.
    pub fn new(
        backend: &'a mut dyn RenderBackend,
        cache: &'a mut GeometryCache,
        scene: &'a dyn SceneGraph,
        effect: EffectId,
    ) -> Self {
        Self { backend, cache, scene, effect, quad: Arc::new(MeshData::quad(SPRITE_QUAD_MESH)), held: BTreeSet::new() }
    }

    /// Renderers the effect applies to, after every filter.
    ///
    /// # Errors
    /// [`HighlightError::InvalidNameFilter`] when the regex filter does not
    /// parse; nothing matches in that case.
    pub fn resolve(&self, cfg: &EffectConfiguration, target: NodeId, explicit: &[NodeId]) -> HighlightResult<Vec<RendererInfo>> {
        let mode = cfg.target.mode;
        let filter = if mode == TargetOptions::OnlyThisObject {
            NameFilter::Any
        } else {
            NameFilter::new(&cfg.target.name_filter, cfg.target.use_regex)?
        };

        let renderers = self
            .candidates(cfg, target, explicit)
            .into_iter()
            .filter_map(|node| self.scene.renderer(node))
            .filter(|r| r.kind != RendererKind::Other)
            .filter(|r| filter.matches(self.scene.name(r.node).unwrap_or_default()))
            .filter(|r| r.node == target || !self.scene.is_ignored(r.node))
            .collect();
        Ok(renderers)
    }

    fn candidates(&self, cfg: &EffectConfiguration, target: NodeId, explicit: &[NodeId]) -> Vec<NodeId> {
        let in_layer = |n: &NodeId| layer_in_mask(self.scene.layer(*n), cfg.target.layer_mask) && self.scene.is_active(*n);
        match cfg.target.mode {
            TargetOptions::OnlyThisObject => vec![target],
            TargetOptions::Children => self.subtree(target),
            TargetOptions::RootToChildren => self.subtree(self.group_root(target)),
            TargetOptions::LayerInScene => self.scene.all_nodes().into_iter().filter(in_layer).collect(),
            TargetOptions::LayerInChildren => self.subtree(target).into_iter().filter(in_layer).collect(),
            TargetOptions::Scripting => explicit.to_vec(),
        }
    }

    fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        if !self.scene.contains(node) {
            return Vec::new();
        }
        let mut nodes = vec![node];
        nodes.extend(self.scene.descendants(node));
        nodes
    }

    /// Nearest ancestor (or self) carrying a root marker, else the hierarchy root.
    fn group_root(&self, target: NodeId) -> NodeId {
        let mut current = target;
        loop {
            if self.scene.has_root_marker(current) {
                return current;
            }
            match self.scene.parent(current) {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    /// Replaces `previous` with freshly built bindings.
    ///
    /// Previous materials are destroyed before new ones are forked. Derived
    /// meshes still in use survive the rebuild. Sprite groups rewrite `cfg`
    /// to the sprite-safe subset before anything is forked.
    pub fn rebuild(
        &mut self,
        cfg: &mut EffectConfiguration,
        target: NodeId,
        explicit: &[NodeId],
        previous: Vec<ObjectBinding>,
        binder: &mut MaterialBinder,
    ) -> GroupBuild {
        let mut build = GroupBuild::default();
        let renderers = match self.resolve(cfg, target, explicit) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "renderer resolution failed, nothing included");
                build.error = Some(e);
                Vec::new()
            }
        };

        build.sprite_mode = renderers.iter().any(|r| r.kind == RendererKind::Sprite && self.scene.is_active(r.node));
        if build.sprite_mode {
            cfg.apply_sprite_overrides();
        }

        for mut old in previous {
            old.release(self.backend);
        }

        self.held.clear();
        for info in &renderers {
            if let Some(binding) = self.bind(cfg, info, binder) {
                build.bindings.push(binding);
            }
        }
        if cfg.target.combine_meshes && !build.sprite_mode {
            self.combine(&mut build.bindings);
        }
        self.cache.release_unused(self.backend, self.effect, &self.held);

        tracing::debug!(
            effect = ?self.effect,
            renderers = renderers.len(),
            bindings = build.bindings.len(),
            sprite_mode = build.sprite_mode,
            "mesh group rebuilt"
        );
        build
    }

    fn source_mesh(&self, info: &RendererInfo) -> Option<Arc<MeshData>> {
        match info.kind {
            RendererKind::Sprite => Some(Arc::clone(&self.quad)),
            RendererKind::SkinnedMesh => info.mesh.clone(),
            RendererKind::Mesh if info.static_batched => info.collider_mesh.clone(),
            RendererKind::Mesh => info.mesh.clone(),
            RendererKind::Other => None,
        }
    }

    fn bind(&mut self, cfg: &EffectConfiguration, info: &RendererInfo, binder: &mut MaterialBinder) -> Option<ObjectBinding> {
        let source = self.source_mesh(info)?;
        let transform = self.scene.transform(info.node)?;
        let normals = match info.kind {
            RendererKind::SkinnedMesh | RendererKind::Sprite => NormalsOption::PreserveOriginal,
            _ => cfg.general.normals_option,
        };
        let mut binding = ObjectBinding::new(info, source, normals, transform);

        let submeshes = binding.submesh_count();
        for kind in EffectKind::required_kinds(cfg) {
            if let Err(e) = binding.materials.fork(self.backend, kind, submeshes) {
                tracing::debug!(error = %e, ?kind, "material fork failed");
                binder.report_missing(kind.program());
            }
        }

        if binding.preserve_original() {
            return Some(binding);
        }
        if cfg.needs_derived_normals() {
            if let Some(mode) = DerivedMode::for_normals(normals) {
                match self.cache.get_or_build(self.backend, &binding.original_mesh, mode, self.effect) {
                    Ok(mesh) => {
                        self.held.insert(mesh.id);
                        binding.base_mesh = Arc::clone(&mesh);
                        binding.mesh = mesh;
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, node = ?info.node, "derivation skipped, drawing original");
                        binding.normals = NormalsOption::PreserveOriginal;
                        return Some(binding);
                    }
                }
            }
        }
        if transform.local_scale.any_negative() {
            let id = self.cache.allocate_id();
            binding.bake(self.backend, id, &transform);
        }
        Some(binding)
    }

    fn combine(&mut self, bindings: &mut Vec<ObjectBinding>) {
        let eligible: Vec<usize> = bindings
            .iter()
            .enumerate()
            .filter(|(_, b)| {
                b.kind == RendererKind::Mesh && !b.is_baked() && b.mesh.readable && self.scene.is_active(b.node)
            })
            .map(|(i, _)| i)
            .collect();
        if eligible.len() < 2 {
            return;
        }
        let first = eligible[0];
        let Some(to_root) = bindings[first].transform.local_to_world.inverse() else { return };
        let parts: Vec<CombinePart> = eligible
            .iter()
            .map(|&i| CombinePart {
                node: bindings[i].node,
                mesh: Arc::clone(&bindings[i].mesh),
                transform: to_root * bindings[i].transform.local_to_world,
            })
            .collect();
        let Some(combined) = self.cache.get_or_combine(self.backend, &parts, self.effect) else { return };

        self.held.insert(combined.id);
        let merged: Vec<MeshId> = eligible.iter().map(|&i| bindings[i].base_mesh.id).collect();
        let root = &mut bindings[first];
        root.base_mesh = Arc::clone(&combined);
        root.mesh = combined;
        root.is_combined = true;
        for &i in eligible[1..].iter().rev() {
            bindings.remove(i).release(self.backend);
        }
        for id in merged {
            if !bindings.iter().any(|b| b.base_mesh.id == id) {
                self.held.remove(&id);
            }
        }
    }
}
