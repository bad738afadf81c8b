//! # Highlight Scenarios
//!
//! End-to-end runs through the registry against the recording backend:
//! discovery, derived geometry sharing, per-frame draws and teardown.

use std::sync::Arc;

use halo_rendering::config::{HitFxMode, QualityLevel};
use halo_rendering::material::params;
use halo_rendering::ral::{ParamValue, RenderCommand};
use halo_rendering::testing::{MockScene, RecordingBackend};
use halo_rendering::{Camera, EffectConfiguration, EffectRegistry, HighlightError, ShaderProgram};
use halo_shared::{CameraId, Color, MeshData, MeshId, NodeId, Vec3};

fn camera() -> Camera {
    Camera::perspective(CameraId(1), Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, 60.0, 1280, 720)
}

/// One parent with a single cube child.
fn crate_scene() -> (MockScene, NodeId) {
    let mut scene = MockScene::new();
    let root = scene.add_node("Crate", None);
    scene.add_mesh_object("Body", Some(root), Arc::new(MeshData::cube(MeshId(1))), Vec3::ZERO);
    (scene, root)
}

/// Alpha of the last overlay color recorded in the submitted stream.
fn overlay_alpha(backend: &RecordingBackend) -> Option<f32> {
    backend
        .commands()
        .filter_map(|c| match c {
            RenderCommand::SetParam { name, value: ParamValue::Color(color), .. } if *name == params::OVERLAY_COLOR => {
                Some(color.a)
            }
            _ => None,
        })
        .last()
}

/// Test: medium outline on one object is one mask draw plus four offsets.
#[test]
fn test_medium_outline_single_object() {
    let (scene, root) = crate_scene();
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let mut cfg = EffectConfiguration::default();
    cfg.general.gpu_instancing = false;
    let id = registry.create(root, cfg);
    registry.get_mut(id).unwrap().set_highlighted(true, 0.0);

    let stats = registry.render_effect(id, &mut backend, &scene, &camera(), 1, 0.0).unwrap();

    assert_eq!(backend.draws_with(ShaderProgram::Mask), 1);
    assert_eq!(backend.draws_with(ShaderProgram::Outline), 4);
    assert_eq!(backend.draws_with(ShaderProgram::Glow), 0);
    assert_eq!(stats.objects, 1);
    assert_eq!(stats.draw_calls, 5);
}

/// Test: two effects over the same source mesh share one derived mesh.
#[test]
fn test_shared_derived_mesh_is_ref_counted() {
    let mut scene = MockScene::new();
    let rock = Arc::new(MeshData::cube(MeshId(7)));
    let a = scene.add_mesh_object("RockA", None, Arc::clone(&rock), Vec3::ZERO);
    let b = scene.add_mesh_object("RockB", None, rock, Vec3::new(3.0, 0.0, 0.0));
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let ea = registry.create(a, EffectConfiguration::default());
    let eb = registry.create(b, EffectConfiguration::default());
    for id in [ea, eb] {
        registry.get_mut(id).unwrap().set_highlighted(true, 0.0);
    }
    registry.render_camera(&mut backend, &scene, &camera(), 1, 0.0);

    let derived = registry.get(ea).unwrap().bindings()[0].base_mesh.id;
    assert!(derived.is_derived());
    assert_eq!(registry.get(eb).unwrap().bindings()[0].base_mesh.id, derived);
    assert_eq!(registry.cache().len(), 1);
    assert_eq!(registry.cache().user_count(derived), 2);
    assert_eq!(backend.uploaded_meshes().iter().filter(|m| **m == derived).count(), 1);

    registry.destroy(ea, &mut backend).unwrap();
    assert!(registry.cache().contains(derived));
    assert!(!backend.released_meshes().contains(&derived));

    registry.destroy(eb, &mut backend).unwrap();
    assert!(!registry.cache().contains(derived));
    assert_eq!(backend.released_meshes().iter().filter(|m| **m == derived).count(), 1);
    assert_eq!(backend.live_materials(), 0);
}

/// Test: an overlay hit flash ramps 1, 0.5, 0 over a quarter second.
#[test]
fn test_hit_flash_overlay_ramp() {
    let (scene, root) = crate_scene();
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let mut cfg = EffectConfiguration::default();
    cfg.hit_fx.mode = HitFxMode::Overlay;
    let id = registry.create(root, cfg);
    registry.get_mut(id).unwrap().hit_fx(Color::WHITE, 0.25, 1.0, 10.0);

    let mut samples = Vec::new();
    for (frame, now) in [(1, 10.0), (2, 10.125), (3, 10.26)] {
        backend.clear_submissions();
        registry.render_effect(id, &mut backend, &scene, &camera(), frame, now).unwrap();
        samples.push(overlay_alpha(&backend).unwrap_or(0.0));
    }
    assert!((samples[0] - 1.0).abs() < 1e-4);
    assert!((samples[1] - 0.5).abs() < 1e-4);
    assert!(samples[2].abs() < 1e-6);

    backend.clear_submissions();
    registry.render_effect(id, &mut backend, &scene, &camera(), 4, 10.5).unwrap();
    assert!(backend.submitted.is_empty());
}

/// Test: an invalid regex filter includes nothing and reports why.
#[test]
fn test_invalid_regex_includes_nothing() {
    let (scene, root) = crate_scene();
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let mut cfg = EffectConfiguration::default();
    cfg.target.name_filter = "Bo(dy".into();
    cfg.target.use_regex = true;
    let id = registry.create(root, cfg);
    registry.get_mut(id).unwrap().set_highlighted(true, 0.0);

    let stats = registry.render_effect(id, &mut backend, &scene, &camera(), 1, 0.0).unwrap();

    let effect = registry.get(id).unwrap();
    assert!(effect.bindings().is_empty());
    assert!(matches!(effect.last_error(), Some(HighlightError::InvalidNameFilter { .. })));
    assert_eq!(stats.objects, 0);
    assert!(backend.submitted.is_empty());
}

/// Test: turning the highlight off mid fade-in continues from the current intensity.
#[test]
fn test_fade_out_is_continuous() {
    let (scene, root) = crate_scene();
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let mut cfg = EffectConfiguration::default();
    cfg.general.fade_in_duration = 1.0;
    cfg.general.fade_out_duration = 1.0;
    let id = registry.create(root, cfg);
    registry.get_mut(id).unwrap().set_highlighted(true, 0.0);
    registry.render_effect(id, &mut backend, &scene, &camera(), 1, 0.5).unwrap();

    let effect = registry.get_mut(id).unwrap();
    let before = effect.fade_value(0.5);
    effect.set_highlighted(false, 0.5);
    assert!((effect.fade_value(0.5) - before).abs() < 1e-5);
    assert!((effect.fade_value(0.75) - 0.25).abs() < 1e-5);
    assert!(effect.is_highlighted());

    registry.render_effect(id, &mut backend, &scene, &camera(), 2, 1.5).unwrap();
    assert!(!registry.get(id).unwrap().is_highlighted());
}

/// Test: the highest tier releases every temporary target it acquires.
#[test]
fn test_smooth_outline_releases_targets() {
    let (scene, root) = crate_scene();
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let mut cfg = EffectConfiguration::default();
    cfg.outline.quality = QualityLevel::Highest;
    let id = registry.create(root, cfg);
    registry.get_mut(id).unwrap().set_highlighted(true, 0.0);

    let stats = registry.render_effect(id, &mut backend, &scene, &camera(), 1, 0.0).unwrap();

    assert!(backend.acquired_targets() > 0);
    assert_eq!(backend.acquired_targets(), backend.released_targets());
    assert!(stats.smooth_composed);
}

/// Test: every registered effect renders once per frame and camera.
#[test]
fn test_one_render_per_camera_per_frame() {
    let (scene, root) = crate_scene();
    let mut backend = RecordingBackend::new();
    let mut registry = EffectRegistry::new();
    let id = registry.create(root, EffectConfiguration::default());
    registry.get_mut(id).unwrap().set_highlighted(true, 0.0);
    let cam = camera();
    let mut other = camera();
    other.id = CameraId(2);

    registry.render_effect(id, &mut backend, &scene, &cam, 1, 0.0).unwrap();
    assert!(registry.render_effect(id, &mut backend, &scene, &cam, 1, 0.0).unwrap().skipped);
    registry.render_effect(id, &mut backend, &scene, &other, 1, 0.0).unwrap();
    registry.render_effect(id, &mut backend, &scene, &cam, 2, 0.0).unwrap();
    assert_eq!(backend.submitted.len(), 3);
}
