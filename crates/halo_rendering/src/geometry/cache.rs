//! Reference-counted store of derived meshes.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use halo_shared::{EffectId, MeshData, MeshId, NodeId};

use super::combine::{combine_meshes, CombinePart};
use super::normals::{average_normals, reorient_normals};
use crate::config::NormalsOption;
use crate::error::{HighlightError, HighlightResult};
use crate::ral::RenderBackend;

/// Derivation applied to a single source mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DerivedMode {
    /// Position-averaged normals
    Smooth,
    /// Centroid-relative normals (also used for planar meshes)
    Reorient,
}

impl DerivedMode {
    /// Derivation for a normals option; `None` keeps the source.
    #[must_use]
    pub const fn for_normals(option: NormalsOption) -> Option<Self> {
        match option {
            NormalsOption::Smooth => Some(Self::Smooth),
            NormalsOption::Reorient | NormalsOption::Planar => Some(Self::Reorient),
            NormalsOption::PreserveOriginal => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum CacheKey {
    Derived { source: MeshId, mode: DerivedMode },
    /// Per part: node, source mesh and the derivation applied to it
    Combined(Vec<(NodeId, MeshId, Option<DerivedMode>)>),
}

#[derive(Debug)]
struct CacheEntry {
    mesh: Arc<MeshData>,
    users: BTreeSet<EffectId>,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryCacheStats {
    /// Meshes built and uploaded
    pub created: u64,
    /// Meshes released
    pub destroyed: u64,
    /// Requests served from the cache
    pub hits: u64,
}

/// Process-wide derived geometry, shared between effects.
///
/// Every entry remembers which effects use it. An entry is destroyed, and
/// its backend mesh released, once its last user lets go.
#[derive(Debug, Default)]
pub struct GeometryCache {
    entries: HashMap<CacheKey, CacheEntry>,
    next_seq: u64,
    stats: GeometryCacheStats,
}

impl GeometryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh derived mesh id.
    pub fn allocate_id(&mut self) -> MeshId {
        self.next_seq += 1;
        MeshId::derived(self.next_seq)
    }

    /// Returns the derived variant of `source`, building it on first use.
    ///
    /// # Errors
    /// [`HighlightError::UnreadableMesh`], [`HighlightError::EmptyMesh`] or
    /// [`HighlightError::MissingNormals`] when the source cannot be derived;
    /// callers fall back to drawing the source as is.
    pub fn get_or_build(
        &mut self,
        backend: &mut dyn RenderBackend,
        source: &Arc<MeshData>,
        mode: DerivedMode,
        user: EffectId,
    ) -> HighlightResult<Arc<MeshData>> {
        let key = CacheKey::Derived { source: source.id, mode };
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.users.insert(user);
            self.stats.hits += 1;
            return Ok(Arc::clone(&entry.mesh));
        }

        if !source.readable {
            return Err(HighlightError::UnreadableMesh(source.id));
        }
        if source.is_empty() {
            return Err(HighlightError::EmptyMesh(source.id));
        }
        let normals = match mode {
            DerivedMode::Smooth => {
                if source.normals.is_empty() {
                    return Err(HighlightError::MissingNormals(source.id));
                }
                average_normals(source)
            }
            DerivedMode::Reorient => reorient_normals(source),
        };

        let mut derived = (**source).clone();
        derived.id = self.allocate_id();
        derived.name = format!("{} ({mode:?})", source.name);
        derived.normals = normals;
        tracing::debug!(source = ?source.id, derived = ?derived.id, ?mode, "derived mesh built");
        Ok(self.insert(backend, key, derived, user))
    }

    /// Returns the combined mesh of `parts`, building it on first use.
    ///
    /// `None` when fewer than two readable parts remain.
    pub fn get_or_combine(
        &mut self,
        backend: &mut dyn RenderBackend,
        parts: &[CombinePart],
        user: EffectId,
    ) -> Option<Arc<MeshData>> {
        let mut ids: Vec<(NodeId, MeshId, Option<DerivedMode>)> = parts
            .iter()
            .filter(|p| p.mesh.readable)
            .map(|p| {
                let (source, mode) = self.origin(p.mesh.id);
                (p.node, source, mode)
            })
            .collect();
        if ids.len() < 2 {
            return None;
        }
        ids.sort_unstable();
        let key = CacheKey::Combined(ids);
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.users.insert(user);
            self.stats.hits += 1;
            return Some(Arc::clone(&entry.mesh));
        }

        let id = self.allocate_id();
        let combined = combine_meshes(id, parts);
        tracing::debug!(mesh = ?id, vertices = combined.vertex_count(), parts = parts.len(), "combined mesh built");
        Some(self.insert(backend, key, combined, user))
    }

    /// Source mesh and derivation behind a cached derived mesh; other meshes map to themselves.
    fn origin(&self, mesh: MeshId) -> (MeshId, Option<DerivedMode>) {
        self.entries
            .iter()
            .find_map(|(key, entry)| match key {
                CacheKey::Derived { source, mode } if entry.mesh.id == mesh => Some((*source, Some(*mode))),
                _ => None,
            })
            .unwrap_or((mesh, None))
    }

    fn insert(&mut self, backend: &mut dyn RenderBackend, key: CacheKey, mesh: MeshData, user: EffectId) -> Arc<MeshData> {
        backend.upload_mesh(&mesh);
        self.stats.created += 1;
        let mesh = Arc::new(mesh);
        let mut users = BTreeSet::new();
        users.insert(user);
        self.entries.insert(key, CacheEntry { mesh: Arc::clone(&mesh), users });
        mesh
    }

    /// Drops every usage held by `user`, destroying orphaned meshes.
    pub fn release_user(&mut self, backend: &mut dyn RenderBackend, user: EffectId) {
        let stats = &mut self.stats;
        self.entries.retain(|_, entry| {
            entry.users.remove(&user);
            if entry.users.is_empty() {
                backend.release_mesh(entry.mesh.id);
                stats.destroyed += 1;
                tracing::debug!(mesh = ?entry.mesh.id, "derived mesh released");
                false
            } else {
                true
            }
        });
    }

    /// Drops the usages of `user` on every mesh not listed in `keep`.
    ///
    /// Used after a rebuild so meshes still in use are not recreated.
    pub fn release_unused(&mut self, backend: &mut dyn RenderBackend, user: EffectId, keep: &BTreeSet<MeshId>) {
        let stats = &mut self.stats;
        self.entries.retain(|_, entry| {
            if keep.contains(&entry.mesh.id) {
                return true;
            }
            entry.users.remove(&user);
            if entry.users.is_empty() {
                backend.release_mesh(entry.mesh.id);
                stats.destroyed += 1;
                false
            } else {
                true
            }
        });
    }

    /// Destroys every mesh regardless of users.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for entry in self.entries.values() {
            backend.release_mesh(entry.mesh.id);
            self.stats.destroyed += 1;
        }
        tracing::debug!(count = self.entries.len(), "geometry cache cleared");
        self.entries.clear();
    }

    /// True while a mesh with this id is cached.
    #[must_use]
    pub fn contains(&self, mesh: MeshId) -> bool {
        self.entries.values().any(|e| e.mesh.id == mesh)
    }

    /// Number of effects using a cached mesh.
    #[must_use]
    pub fn user_count(&self, mesh: MeshId) -> usize {
        self.entries.values().find(|e| e.mesh.id == mesh).map_or(0, |e| e.users.len())
    }

    /// Number of cached meshes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lifetime counters
    #[must_use]
    pub const fn stats(&self) -> GeometryCacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;
    use halo_shared::Vec3;

    fn source(id: u64) -> Arc<MeshData> {
        Arc::new(MeshData::new(
            MeshId(id),
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![Vec3::Z; 3],
            vec![0, 1, 2],
        ))
    }

    #[test]
    fn test_shared_mesh_survives_until_last_user() {
        let mut backend = RecordingBackend::new();
        let mut cache = GeometryCache::new();
        let src = source(1);

        let a = cache.get_or_build(&mut backend, &src, DerivedMode::Smooth, EffectId(1)).unwrap();
        let b = cache.get_or_build(&mut backend, &src, DerivedMode::Smooth, EffectId(2)).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(cache.user_count(a.id), 2);
        assert_eq!(backend.uploaded_meshes().len(), 1);

        cache.release_user(&mut backend, EffectId(1));
        assert!(cache.contains(a.id));

        cache.release_user(&mut backend, EffectId(2));
        assert!(!cache.contains(a.id));
        assert_eq!(backend.released_meshes(), &[a.id]);
        assert_eq!(cache.stats().created, 1);
        assert_eq!(cache.stats().destroyed, 1);
    }

    #[test]
    fn test_modes_are_separate_entries() {
        let mut backend = RecordingBackend::new();
        let mut cache = GeometryCache::new();
        let src = source(1);
        let smooth = cache.get_or_build(&mut backend, &src, DerivedMode::Smooth, EffectId(1)).unwrap();
        let reorient = cache.get_or_build(&mut backend, &src, DerivedMode::Reorient, EffectId(1)).unwrap();
        assert_ne!(smooth.id, reorient.id);
        assert_eq!(cache.len(), 2);
        assert!(smooth.id.is_derived());
    }

    #[test]
    fn test_unreadable_source_is_rejected() {
        let mut backend = RecordingBackend::new();
        let mut cache = GeometryCache::new();
        let mut raw = (*source(5)).clone();
        raw.readable = false;
        let err = cache.get_or_build(&mut backend, &Arc::new(raw), DerivedMode::Smooth, EffectId(1)).unwrap_err();
        assert_eq!(err, HighlightError::UnreadableMesh(MeshId(5)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_combine_needs_two_parts() {
        let mut backend = RecordingBackend::new();
        let mut cache = GeometryCache::new();
        let one = [CombinePart { node: NodeId(1), mesh: source(1), transform: halo_shared::Mat4::IDENTITY }];
        assert!(cache.get_or_combine(&mut backend, &one, EffectId(1)).is_none());

        let two = [one[0].clone(), CombinePart { node: NodeId(2), mesh: source(2), transform: halo_shared::Mat4::IDENTITY }];
        let combined = cache.get_or_combine(&mut backend, &two, EffectId(1)).unwrap();
        assert_eq!(combined.vertex_count(), 6);
        let again = cache.get_or_combine(&mut backend, &two, EffectId(2)).unwrap();
        assert_eq!(combined.id, again.id);
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut backend = RecordingBackend::new();
        let mut cache = GeometryCache::new();
        cache.get_or_build(&mut backend, &source(1), DerivedMode::Smooth, EffectId(1)).unwrap();
        cache.get_or_build(&mut backend, &source(2), DerivedMode::Smooth, EffectId(2)).unwrap();
        cache.clear(&mut backend);
        assert!(cache.is_empty());
        assert_eq!(backend.released_meshes().len(), 2);
    }

    #[test]
    fn test_release_unused_keeps_listed_meshes() {
        let mut backend = RecordingBackend::new();
        let mut cache = GeometryCache::new();
        let kept = cache.get_or_build(&mut backend, &source(1), DerivedMode::Smooth, EffectId(1)).unwrap();
        let dropped = cache.get_or_build(&mut backend, &source(2), DerivedMode::Smooth, EffectId(1)).unwrap();
        let keep: BTreeSet<MeshId> = [kept.id].into_iter().collect();
        cache.release_unused(&mut backend, EffectId(1), &keep);
        assert!(cache.contains(kept.id));
        assert!(!cache.contains(dropped.id));
        assert_eq!(backend.uploaded_meshes().len(), 2);
    }
}
