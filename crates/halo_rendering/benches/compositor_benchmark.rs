//! Benchmark for derived geometry and per-frame recording.
//!
//! Run with: cargo bench --package halo_rendering --bench compositor_benchmark

#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use halo_rendering::geometry::{average_normals, combine_meshes, CombinePart};
use halo_rendering::testing::{MockScene, RecordingBackend};
use halo_rendering::{Camera, EffectConfiguration, EffectRegistry};
use halo_shared::{CameraId, Mat4, MeshData, MeshId, NodeId, Vec3};

/// Flat grid of `n` x `n` quads with per-face vertices.
fn grid(id: u64, n: u32) -> MeshData {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut indices = Vec::new();
    for z in 0..n {
        for x in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let (fx, fz) = (x as f32, z as f32);
            #[allow(clippy::cast_possible_truncation)]
            let base = positions.len() as u32;
            positions.extend([
                Vec3::new(fx, 0.0, fz),
                Vec3::new(fx + 1.0, 0.0, fz),
                Vec3::new(fx + 1.0, 0.0, fz + 1.0),
                Vec3::new(fx, 0.0, fz + 1.0),
            ]);
            normals.extend([Vec3::Y; 4]);
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }
    MeshData::new(MeshId(id), positions, normals, indices)
}

fn benchmark_average_normals(c: &mut Criterion) {
    let mesh = grid(1, 128);

    c.bench_function("average_normals_65k_vertices", |b| {
        b.iter(|| black_box(average_normals(&mesh)));
    });
}

fn benchmark_combine(c: &mut Criterion) {
    let parts: Vec<CombinePart> = (0..256u64)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let offset = Vec3::new(i as f32 * 2.0, 0.0, 0.0);
            CombinePart {
                node: NodeId(i + 1),
                mesh: Arc::new(MeshData::cube(MeshId(i + 1))),
                transform: Mat4::from_translation(offset),
            }
        })
        .collect();

    c.bench_function("combine_256_cubes", |b| {
        b.iter(|| black_box(combine_meshes(MeshId(1_000), &parts)));
    });
}

fn benchmark_frame(c: &mut Criterion) {
    let mut scene = MockScene::new();
    let root = scene.add_node("Root", None);
    let cube = Arc::new(MeshData::cube(MeshId(1)));
    for k in 0..64u32 {
        #[allow(clippy::cast_precision_loss)]
        let position = Vec3::new((k % 8) as f32 * 2.0, (k / 8) as f32 * 2.0, 0.0);
        scene.add_mesh_object(&format!("Part{k}"), Some(root), Arc::clone(&cube), position);
    }
    let camera = Camera::perspective(CameraId(1), Vec3::new(8.0, 8.0, 30.0), -Vec3::Z, 60.0, 1920, 1080);
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let mut cfg = EffectConfiguration::default();
    cfg.glow.intensity = 1.0;
    let id = registry.create(root, cfg);
    if let Ok(effect) = registry.get_mut(id) {
        effect.set_highlighted(true, 0.0);
    }

    let mut frame = 0u64;
    c.bench_function("frame_64_objects_outline_glow", |b| {
        b.iter(|| {
            frame += 1;
            backend.clear_submissions();
            black_box(registry.render_camera(&mut backend, &scene, &camera, frame, 0.0))
        });
    });
}

criterion_group!(benches, benchmark_average_normals, benchmark_combine, benchmark_frame);
criterion_main!(benches);
