//! # Headless Test Doubles
//!
//! A [`RecordingBackend`] that keeps every material, parameter, mesh and
//! submitted command, and a [`MockScene`] holding an in-memory node tree.
//! Both are plain data so tests can assert on them directly.

mod backend;
mod scene;

pub use backend::RecordingBackend;
pub use scene::MockScene;
