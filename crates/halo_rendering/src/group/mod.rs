//! # Mesh-Group Builder
//!
//! Decides which renderers belong to an effect and what each of them draws.
//!
//! | Renderer | Source mesh | Normals |
//! |---|---|---|
//! | mesh | filter mesh | configured |
//! | mesh, static batched | collision proxy mesh | configured |
//! | skinned mesh | bind-pose mesh | original |
//! | sprite | shared quad | original |
//!
//! A malformed regex name filter includes nothing and is reported back in
//! [`GroupBuild::error`]; it never aborts the caller.

mod binding;
mod builder;
mod filter;

pub use binding::ObjectBinding;
pub use builder::{GroupBuild, MeshGroupBuilder, SPRITE_QUAD_MESH};
pub use filter::NameFilter;
