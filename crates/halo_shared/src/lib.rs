//! # HALO Shared
//!
//! Common types used by the highlight compositor and the host that embeds it.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a rendering backend. If you need GPU
//! or scene types, put them in `halo_rendering`.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod color;
pub mod constants;
pub mod events;
pub mod ids;
pub mod math;
pub mod mesh;

pub use color::{Color, Gradient, GradientKey};
pub use constants::{DEFAULT_OCCLUSION_CHECK_INTERVAL, GRADIENT_RAMP_SAMPLES, MAX_SUBMESH_BITS, MAX_U16_VERTICES};
pub use events::{HighlightEvent, HighlightEventKind};
pub use ids::{CameraId, EffectId, MaterialHandle, MeshId, NodeId, RenderTargetHandle, RendererId, TextureHandle};
pub use math::{Bounds, Mat4, Quaternion, Ray, Vec2, Vec3, Vec4};
pub use mesh::{IndexFormat, MeshData};
