//! # Material Parameter Binder
//!
//! Turns an [`EffectConfiguration`](crate::config::EffectConfiguration)
//! into named shader parameters and keywords.
//!
//! ```text
//! EffectKind ──► KIND_TABLE row ──► kind_state() ──► MaterialState::write()
//!   (tag)        (program, params,   (values from      (set every row keyword,
//!                 keywords)           the config)       then every value)
//! ```
//!
//! Per-object materials are forked per submesh into a [`MaterialSet`] and
//! owned by their binding. Effect-level materials (blur, compose, target,
//! icon, stencil clearing) live in the [`MaterialBinder`]. Shared templates
//! are never written.

mod binder;
mod kind;
pub mod params;
mod ramp;
mod set;
mod state;

pub use binder::{
    glow_downsampling, outline_downsampling, outline_edge_width, shared_required, shared_state, MaterialBinder,
    SHARED_PROGRAMS,
};
pub use kind::{EffectKind, KindRow, KIND_TABLE};
pub use ramp::{ramp_samples, GradientRamp};
pub use set::MaterialSet;
pub use state::{cull_mode, kind_state, EffectInputs, MaterialState};
