//! # Frame Compositor
//!
//! Per-camera, per-frame draw orchestration of one effect.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐
//! │ FadeTracker  │──►│  HitFlash    │──►│     FrameCompositor      │
//! │ (intensity)  │   │ (surface     │   │ mask ► see-through ►     │
//! └──────────────┘   │  tint)       │   │ overlay ► glow ►         │
//!                    └──────────────┘   │ outline ► decorations ►  │
//!                                       │ smooth compose ► submit  │
//!                                       └──────────────────────────┘
//! ```
//!
//! Tiers below highest extrude the silhouette along screen-space offsets
//! ([`quality`]); the highest tier renders a silhouette buffer, blurs it and
//! composes it back over a tight screen rectangle ([`smooth`]).

pub mod decorations;
pub mod fade;
pub mod frame;
pub mod hit;
pub mod quality;
pub mod smooth;

pub use decorations::{camera_distance_fade, update_label, DecorationFrame, Decorations, IconPlacement};
pub use fade::{FadeDurations, FadePhase, FadeRequest, FadeTracker};
pub use frame::{FrameCompositor, FrameInputs, FrameJob};
pub use hit::{HitFlash, SurfaceTint};
pub use quality::{glow_intensity_scale, offset_count, offset_directions, offset_range};
pub use smooth::{compose_rects, ComposeRects, SmoothOutcome, SmoothPass, SmoothVisibility};
