//! Forked per-submesh materials of one object.

use halo_shared::MaterialHandle;

use super::kind::EffectKind;
use crate::error::{HighlightError, HighlightResult};
use crate::ral::RenderBackend;

/// Materials exclusively owned by one binding, one per submesh per kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialSet {
    slots: [Vec<MaterialHandle>; EffectKind::COUNT],
}

impl MaterialSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forks `submeshes` materials of `kind` from its template.
    ///
    /// # Errors
    /// [`HighlightError::MissingResource`] when the backend has no template;
    /// nothing is forked for the kind in that case.
    pub fn fork(&mut self, backend: &mut dyn RenderBackend, kind: EffectKind, submeshes: usize) -> HighlightResult<()> {
        let slot = &mut self.slots[kind.index()];
        for handle in slot.drain(..) {
            backend.destroy_material(handle);
        }
        for _ in 0..submeshes.max(1) {
            match backend.create_material(kind.program()) {
                Some(handle) => slot.push(handle),
                None => {
                    for handle in slot.drain(..) {
                        backend.destroy_material(handle);
                    }
                    return Err(HighlightError::MissingResource { resource: kind.program().name().to_owned() });
                }
            }
        }
        Ok(())
    }

    /// Material of `kind` for `submesh`.
    #[must_use]
    pub fn get(&self, kind: EffectKind, submesh: usize) -> Option<MaterialHandle> {
        self.slots[kind.index()].get(submesh).copied()
    }

    /// Every material of `kind`, indexed by submesh.
    #[must_use]
    pub fn handles(&self, kind: EffectKind) -> &[MaterialHandle] {
        &self.slots[kind.index()]
    }

    /// True when `kind` was forked.
    #[must_use]
    pub fn has(&self, kind: EffectKind) -> bool {
        !self.slots[kind.index()].is_empty()
    }

    /// Total number of forked materials
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().map(Vec::len).sum()
    }

    /// True when nothing is forked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Destroys every material.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        for slot in &mut self.slots {
            for handle in slot.drain(..) {
                backend.destroy_material(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ral::ShaderProgram;
    use crate::testing::RecordingBackend;

    #[test]
    fn test_fork_one_per_submesh() {
        let mut backend = RecordingBackend::new();
        let mut set = MaterialSet::new();
        set.fork(&mut backend, EffectKind::Outline, 3).unwrap();
        assert_eq!(set.handles(EffectKind::Outline).len(), 3);
        assert!(set.get(EffectKind::Outline, 2).is_some());
        assert!(!set.has(EffectKind::Glow));

        set.destroy(&mut backend);
        assert!(set.is_empty());
        assert_eq!(backend.live_materials(), 0);
    }

    #[test]
    fn test_missing_template() {
        let mut backend = RecordingBackend::new();
        backend.remove_program(ShaderProgram::Glow);
        let mut set = MaterialSet::new();
        let err = set.fork(&mut backend, EffectKind::Glow, 2).unwrap_err();
        assert!(matches!(err, HighlightError::MissingResource { .. }));
        assert!(!set.has(EffectKind::Glow));
    }

    #[test]
    fn test_refork_replaces() {
        let mut backend = RecordingBackend::new();
        let mut set = MaterialSet::new();
        set.fork(&mut backend, EffectKind::Mask, 1).unwrap();
        set.fork(&mut backend, EffectKind::Mask, 2).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(backend.live_materials(), 2);
    }
}
