//! # Geometry Cache
//!
//! Derived meshes for the extruded passes: position-averaged normals,
//! centroid-reoriented normals and multi-object combined meshes. Derived
//! meshes live in a process-wide [`GeometryCache`] and are shared by every
//! effect whose source mesh and normals mode match.
//!
//! Mirrored objects are baked per binding with [`bake_transform`]; those
//! copies are owned by the binding, not by the cache.

mod cache;
mod combine;
mod normals;

pub use cache::{DerivedMode, GeometryCache, GeometryCacheStats};
pub use combine::{bake_transform, combine_meshes, CombinePart};
pub use normals::{average_normals, reorient_normals};
