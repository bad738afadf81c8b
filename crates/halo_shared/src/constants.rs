//! Constants shared by the compositor and host integrations.

/// Largest vertex count addressable with 16-bit indices.
pub const MAX_U16_VERTICES: usize = 65_535;

/// Samples in a baked gradient ramp texture.
pub const GRADIENT_RAMP_SAMPLES: usize = 32;

/// Default minimum interval between occlusion re-tests, in seconds.
pub const DEFAULT_OCCLUSION_CHECK_INTERVAL: f32 = 1.0;

/// Number of submesh bits in a sub-mesh mask.
pub const MAX_SUBMESH_BITS: usize = 32;

