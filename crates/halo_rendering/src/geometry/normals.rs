//! Normal derivation for extruded outline and glow passes.

use std::collections::HashMap;

use halo_shared::{MeshData, Vec3};

/// Position key merging vertices at the exact same location.
///
/// Adding `0.0` folds `-0.0` into `+0.0` so both hash alike.
fn position_key(p: Vec3) -> [u32; 3] {
    [(p.x + 0.0).to_bits(), (p.y + 0.0).to_bits(), (p.z + 0.0).to_bits()]
}

/// Averages the normals of vertices sharing a position.
///
/// Returns one normal per vertex. Vertices beyond the normal count keep a
/// zero normal.
#[must_use]
pub fn average_normals(mesh: &MeshData) -> Vec<Vec3> {
    let count = mesh.positions.len().min(mesh.normals.len());
    let mut sums: HashMap<[u32; 3], Vec3> = HashMap::with_capacity(count);
    for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
        *sums.entry(position_key(*p)).or_insert(Vec3::ZERO) += *n;
    }
    mesh.positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            if i < count {
                sums.get(&position_key(*p)).copied().unwrap_or(Vec3::ZERO).normalize_or_zero()
            } else {
                Vec3::ZERO
            }
        })
        .collect()
}

/// Outward normals relative to the vertex centroid.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn reorient_normals(mesh: &MeshData) -> Vec<Vec3> {
    if mesh.positions.is_empty() {
        return Vec::new();
    }
    let sum = mesh.positions.iter().fold(Vec3::ZERO, |acc, p| acc + *p);
    let centroid = sum * (1.0 / mesh.positions.len() as f32);
    mesh.positions.iter().map(|p| (*p - centroid).normalize_or_zero()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_shared::MeshId;

    /// Two triangles meeting at a hard crease along the x axis.
    fn crease() -> MeshData {
        MeshData::new(
            MeshId(1),
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            vec![Vec3::Z, Vec3::Z, Vec3::Z, Vec3::Y, Vec3::Y, Vec3::Y],
            vec![0, 1, 2, 3, 4, 5],
        )
    }

    #[test]
    fn test_shared_positions_get_identical_normals() {
        let mesh = crease();
        let normals = average_normals(&mesh);
        assert_eq!(normals.len(), mesh.vertex_count());
        assert!(normals[0].abs_diff_eq(normals[3], 1e-6));
        assert!(normals[1].abs_diff_eq(normals[4], 1e-6));
        let expected = Vec3::new(0.0, 1.0, 1.0).normalize_or_zero();
        assert!(normals[0].abs_diff_eq(expected, 1e-6));
        assert!(normals[2].abs_diff_eq(Vec3::Z, 1e-6));
    }

    #[test]
    fn test_negative_zero_merges() {
        let mut mesh = crease();
        mesh.positions[3] = Vec3::new(-0.0, 0.0, -0.0);
        let normals = average_normals(&mesh);
        assert!(normals[0].abs_diff_eq(normals[3], 1e-6));
    }

    #[test]
    fn test_reorient_points_away_from_centroid() {
        let mesh = MeshData::new(
            MeshId(2),
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            Vec::new(),
            vec![],
        );
        let normals = reorient_normals(&mesh);
        assert_eq!(normals, vec![-Vec3::X, Vec3::X]);
    }

    #[test]
    fn test_reorient_empty() {
        let mesh = MeshData::new(MeshId(3), Vec::new(), Vec::new(), Vec::new());
        assert!(reorient_normals(&mesh).is_empty());
    }
}
