//! Camera description handed to the compositor each frame.

use halo_shared::{CameraId, Mat4, Quaternion, Vec3};

/// What the camera renders for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// Regular game camera
    #[default]
    Game,
    /// Editor scene view
    SceneView,
    /// Reflection probe capture
    Reflection,
    /// Asset preview
    Preview,
}

/// Camera state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Identity
    pub id: CameraId,
    /// Purpose
    pub kind: CameraKind,
    /// World position
    pub position: Vec3,
    /// World rotation; forward is -Z
    pub rotation: Quaternion,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Viewport width in pixels
    pub pixel_width: u32,
    /// Viewport height in pixels
    pub pixel_height: u32,
    /// Layer of the camera itself
    pub layer: u32,
    /// Layers this camera renders
    pub culling_mask: u32,
    /// Multisampling active on the target
    pub msaa: bool,
    /// World-to-view matrix
    pub view: Mat4,
    /// View-to-clip matrix
    pub projection: Mat4,
}

impl Camera {
    /// Perspective camera at `position` looking along `forward`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn perspective(id: CameraId, position: Vec3, forward: Vec3, fov_y_degrees: f32, width: u32, height: u32) -> Self {
        let (near, far) = (0.3, 1000.0);
        let width = width.max(1);
        let height = height.max(1);
        let forward = forward.normalize_or_zero();
        let rotation = rotation_from_forward(forward);
        Self {
            id,
            kind: CameraKind::Game,
            position,
            rotation,
            near,
            far,
            pixel_width: width,
            pixel_height: height,
            layer: 0,
            culling_mask: u32::MAX,
            msaa: false,
            view: Mat4::look_to_rh(position, forward, Vec3::Y),
            projection: Mat4::perspective_rh(fov_y_degrees.to_radians(), width as f32 / height as f32, near, far),
        }
    }

    /// Width over height.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn aspect(&self) -> f32 {
        self.pixel_width.max(1) as f32 / self.pixel_height.max(1) as f32
    }

    /// Viewing direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation.rotate(-Vec3::Z)
    }

    /// Combined world-to-clip matrix.
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// Viewport coordinates (x, y in [0, 1]) plus view depth in z.
    #[must_use]
    pub fn world_to_viewport(&self, p: Vec3) -> Vec3 {
        let clip = self.view_projection().mul_vec4(p.extend(1.0));
        let w = if clip.w.abs() > f32::EPSILON { clip.w } else { f32::EPSILON };
        Vec3::new((clip.x / w + 1.0) * 0.5, (clip.y / w + 1.0) * 0.5, clip.w)
    }
}

fn rotation_from_forward(forward: Vec3) -> Quaternion {
    let from = -Vec3::Z;
    let d = from.dot(forward);
    if d > 1.0 - 1e-6 {
        return Quaternion::IDENTITY;
    }
    if d < -1.0 + 1e-6 {
        return Quaternion::from_axis_angle(Vec3::Y, std::f32::consts::PI);
    }
    let axis = from.cross(forward);
    Quaternion::from_axis_angle(axis, d.clamp(-1.0, 1.0).acos())
}
