//! # HALO Rendering
//!
//! Engine-agnostic highlight compositor. Given a target in a host scene it
//! discovers the renderers to highlight, derives outline-friendly geometry,
//! binds effect materials and records the per-camera draw stream for
//! outline, glow, overlay, inner glow, see-through and decorations.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      EffectRegistry                          │
//! │   HighlightContext (GeometryCache) ◄──── HighlightEffect[]   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  SceneGraph ─► MeshGroupBuilder ─► ObjectBinding[]            │
//! │                      │                   │                   │
//! │               GeometryCache        MaterialBinder            │
//! │                      │                   │                   │
//! │  OcclusionTester ─► FrameCompositor ─► CommandBuffer ─► RAL  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## HOUSE RULES
//!
//! - The host owns the GPU. Everything reaches it through [`RenderBackend`].
//! - Nothing on the render path panics; failures degrade to "draw less".
//! - One command buffer per effect per camera per frame.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod compositor;
pub mod config;
pub mod effect;
pub mod error;
pub mod geometry;
pub mod group;
pub mod material;
pub mod occlusion;
pub mod ral;
pub mod registry;
pub mod scene;
pub mod stats;
pub mod testing;

pub use compositor::{FadeDurations, FadeTracker, FrameCompositor, HitFlash, SmoothPass};
pub use config::{EffectConfiguration, EffectProfile, NormalsOption, QualityLevel, SeeThroughMode, TargetOptions};
pub use effect::{HighlightEffect, RenderServices};
pub use error::{ErrorCategory, HighlightError, HighlightResult};
pub use geometry::{DerivedMode, GeometryCache, GeometryCacheStats};
pub use group::{MeshGroupBuilder, NameFilter, ObjectBinding};
pub use material::{EffectKind, MaterialBinder, MaterialSet};
pub use occlusion::{OcclusionQuery, OcclusionTester};
pub use ral::{CommandBuffer, RenderBackend, RenderCommand, ShaderProgram};
pub use registry::{EffectRegistry, HighlightContext};
pub use scene::{Camera, CameraKind, LabelOverlay, RendererInfo, RendererKind, SceneGraph};
pub use stats::FrameStats;
