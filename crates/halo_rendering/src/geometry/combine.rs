//! Merging and transform baking of mesh data.

use std::sync::Arc;

use halo_shared::{IndexFormat, Mat4, MeshData, MeshId, NodeId, Vec3};

/// One mesh taking part in a combine.
#[derive(Clone, Debug)]
pub struct CombinePart {
    /// Node the mesh belongs to
    pub node: NodeId,
    /// Source geometry
    pub mesh: Arc<MeshData>,
    /// Local-to-combined-root transform
    pub transform: Mat4,
}

/// Merges every part into one single-submesh mesh.
///
/// Unreadable parts are skipped. Index width switches to 32 bits when the
/// merged vertex count no longer fits 16-bit indices.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn combine_meshes(id: MeshId, parts: &[CombinePart]) -> MeshData {
    let readable: Vec<&CombinePart> = parts.iter().filter(|p| p.mesh.readable).collect();
    let vertex_total: usize = readable.iter().map(|p| p.mesh.vertex_count()).sum();
    let index_total: usize = readable.iter().map(|p| p.mesh.index_count()).sum();
    let keep_uvs = readable.iter().all(|p| p.mesh.uvs.len() == p.mesh.vertex_count());
    let keep_normals = readable.iter().all(|p| p.mesh.normals.len() == p.mesh.vertex_count());

    let mut positions = Vec::with_capacity(vertex_total);
    let mut normals = Vec::with_capacity(if keep_normals { vertex_total } else { 0 });
    let mut uvs = Vec::with_capacity(if keep_uvs { vertex_total } else { 0 });
    let mut indices = Vec::with_capacity(index_total);

    for part in readable {
        let base = positions.len() as u32;
        positions.extend(part.mesh.positions.iter().map(|p| part.transform.transform_point3(*p)));
        if keep_normals {
            normals.extend(part.mesh.normals.iter().map(|n| part.transform.transform_vector3(*n).normalize_or_zero()));
        }
        if keep_uvs {
            uvs.extend_from_slice(&part.mesh.uvs);
        }
        for submesh in &part.mesh.submeshes {
            indices.extend(submesh.iter().map(|i| i + base));
        }
    }

    MeshData {
        id,
        name: "combined".to_owned(),
        index_format: IndexFormat::for_vertex_count(positions.len()),
        positions,
        normals,
        uvs,
        submeshes: vec![indices],
        readable: true,
    }
}

/// Pre-transforms a mesh into world space.
///
/// Used for mirrored objects: the result is drawn with an identity matrix.
/// Triangle winding is flipped when the transform mirrors an odd number of
/// axes so front faces stay front faces.
#[must_use]
pub fn bake_transform(id: MeshId, mesh: &MeshData, transform: &Mat4) -> MeshData {
    let mut baked = mesh.clone();
    baked.id = id;
    for p in &mut baked.positions {
        *p = transform.transform_point3(*p);
    }
    for n in &mut baked.normals {
        *n = transform.transform_vector3(*n).normalize_or_zero();
    }
    if determinant3(transform) < 0.0 {
        for submesh in &mut baked.submeshes {
            for tri in submesh.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }
    }
    baked
}

fn determinant3(m: &Mat4) -> f32 {
    let x = Vec3::new(m.cols[0][0], m.cols[0][1], m.cols[0][2]);
    let y = Vec3::new(m.cols[1][0], m.cols[1][1], m.cols[1][2]);
    let z = Vec3::new(m.cols[2][0], m.cols[2][1], m.cols[2][2]);
    x.cross(y).dot(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_shared::Quaternion;

    fn grid(id: u64, vertices: usize) -> Arc<MeshData> {
        let positions = (0..vertices).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        let normals = vec![Vec3::Y; vertices];
        let indices = (0..(vertices as u32 / 3) * 3).collect();
        Arc::new(MeshData::new(MeshId(id), positions, normals, indices))
    }

    fn part(node: u64, mesh: Arc<MeshData>) -> CombinePart {
        CombinePart { node: NodeId(node), mesh, transform: Mat4::IDENTITY }
    }

    #[test]
    fn test_vertex_count_is_sum() {
        let combined = combine_meshes(MeshId::derived(1), &[part(1, grid(1, 30)), part(2, grid(2, 12))]);
        assert_eq!(combined.vertex_count(), 42);
        assert_eq!(combined.index_count(), 42);
        assert_eq!(combined.submesh_count(), 1);
        assert_eq!(combined.index_format, IndexFormat::U16);
        assert_eq!(*combined.submeshes[0].last().unwrap(), 41);
    }

    #[test]
    fn test_switches_to_32_bit_indices_past_u16_range() {
        let combined = combine_meshes(MeshId::derived(1), &[part(1, grid(1, 40_000)), part(2, grid(2, 25_536))]);
        assert_eq!(combined.vertex_count(), 65_536);
        assert_eq!(combined.index_format, IndexFormat::U32);

        let fits = combine_meshes(MeshId::derived(2), &[part(1, grid(1, 40_000)), part(2, grid(2, 25_535))]);
        assert_eq!(fits.index_format, IndexFormat::U16);
    }

    #[test]
    fn test_unreadable_parts_skipped() {
        let mut hidden = (*grid(3, 9)).clone();
        hidden.readable = false;
        let combined = combine_meshes(MeshId::derived(1), &[part(1, grid(1, 9)), part(2, Arc::new(hidden))]);
        assert_eq!(combined.vertex_count(), 9);
    }

    #[test]
    fn test_bake_mirrored_flips_winding() {
        let mesh = grid(1, 3);
        let m = Mat4::from_trs(Vec3::new(0.0, 1.0, 0.0), Quaternion::IDENTITY, Vec3::new(-1.0, 1.0, 1.0));
        let baked = bake_transform(MeshId::derived(9), &mesh, &m);
        assert_eq!(baked.positions[1], Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(baked.submeshes[0], vec![0, 2, 1]);
        assert_eq!(baked.id, MeshId::derived(9));
    }
}
