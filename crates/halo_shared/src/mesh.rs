//! CPU-side mesh data.

use crate::constants::MAX_U16_VERTICES;
use crate::ids::MeshId;
use crate::math::{Bounds, Vec2, Vec3};

/// Index buffer width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    /// 16-bit indices
    #[default]
    U16,
    /// 32-bit indices
    U32,
}

impl IndexFormat {
    /// Narrowest format able to address `vertex_count` vertices.
    #[must_use]
    pub const fn for_vertex_count(vertex_count: usize) -> Self {
        if vertex_count > MAX_U16_VERTICES {
            Self::U32
        } else {
            Self::U16
        }
    }
}

/// Geometry of one mesh, split in submeshes of triangle lists.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    /// Identity
    pub id: MeshId,
    /// Debug name
    pub name: String,
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals, empty when absent
    pub normals: Vec<Vec3>,
    /// Primary UV channel, empty when absent
    pub uvs: Vec<Vec2>,
    /// Triangle indices per submesh
    pub submeshes: Vec<Vec<u32>>,
    /// Whether vertex data is accessible on the CPU
    pub readable: bool,
    /// Index buffer width
    pub index_format: IndexFormat,
}

impl MeshData {
    /// Creates a readable single-submesh mesh.
    #[must_use]
    pub fn new(id: MeshId, positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let index_format = IndexFormat::for_vertex_count(positions.len());
        Self {
            id,
            name: String::new(),
            positions,
            normals,
            uvs: Vec::new(),
            submeshes: vec![indices],
            readable: true,
            index_format,
        }
    }

    /// Unit quad in the XY plane, used for sprites and screen composition.
    #[must_use]
    pub fn quad(id: MeshId) -> Self {
        let mut mesh = Self::new(
            id,
            vec![
                Vec3::new(-0.5, -0.5, 0.0),
                Vec3::new(0.5, -0.5, 0.0),
                Vec3::new(0.5, 0.5, 0.0),
                Vec3::new(-0.5, 0.5, 0.0),
            ],
            vec![-Vec3::Z; 4],
            vec![0, 2, 1, 0, 3, 2],
        );
        mesh.uvs = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
        mesh.name = "quad".to_owned();
        mesh
    }

    /// Unit cube centered on the origin, one normal per corner.
    #[must_use]
    pub fn cube(id: MeshId) -> Self {
        let positions: Vec<Vec3> = (0..8u32)
            .map(|i| {
                let bit = |b: u32| if i & b == 0 { -0.5 } else { 0.5 };
                Vec3::new(bit(1), bit(2), bit(4))
            })
            .collect();
        let normals = positions.iter().map(|p| p.normalize_or_zero()).collect();
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        let mut mesh = Self::new(id, positions, normals, indices);
        mesh.name = "cube".to_owned();
        mesh
    }

    /// Number of vertices
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of submeshes
    #[must_use]
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }

    /// Total index count over all submeshes
    #[must_use]
    pub fn index_count(&self) -> usize {
        self.submeshes.iter().map(Vec::len).sum()
    }

    /// True when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Local-space bounds; zero-sized at the origin for empty meshes.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.positions).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_format_threshold() {
        assert_eq!(IndexFormat::for_vertex_count(65_535), IndexFormat::U16);
        assert_eq!(IndexFormat::for_vertex_count(65_536), IndexFormat::U32);
    }

    #[test]
    fn test_quad() {
        let q = MeshData::quad(MeshId(1));
        assert_eq!(q.vertex_count(), 4);
        assert_eq!(q.index_count(), 6);
        assert_eq!(q.bounds().size(), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_cube() {
        let c = MeshData::cube(MeshId(2));
        assert_eq!(c.vertex_count(), 8);
        assert_eq!(c.index_count(), 36);
        assert_eq!(c.bounds().size(), Vec3::ONE);
    }
}
