//! # Highlight Error Types
//!
//! Every failure the compositor can hit. None of them is fatal: callers on
//! the render path turn them into a degraded draw (skip a pass, skip an
//! object, rebuild bindings) and at most log them.

use halo_shared::{EffectId, MeshId, RendererId};
use thiserror::Error;

/// Errors that can occur while building or rendering highlight effects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// Name filter is not a valid regular expression.
    #[error("invalid name filter {pattern:?}: {reason}")]
    InvalidNameFilter {
        /// The offending pattern.
        pattern: String,
        /// Parser message.
        reason: String,
    },

    /// A shader template or other backend resource is not available.
    #[error("missing resource: {resource}")]
    MissingResource {
        /// Resource name.
        resource: String,
    },

    /// Optional asset referenced by the configuration is absent.
    #[error("missing asset: {asset}")]
    MissingAsset {
        /// Asset description.
        asset: String,
    },

    /// Mesh has no CPU-side vertex data.
    #[error("mesh {0:?} is not readable")]
    UnreadableMesh(MeshId),

    /// Mesh has no vertices.
    #[error("mesh {0:?} has no vertices")]
    EmptyMesh(MeshId),

    /// Mesh has no normals to average.
    #[error("mesh {0:?} has no normals")]
    MissingNormals(MeshId),

    /// Renderer vanished between setup and render.
    #[error("renderer {0:?} is no longer in the scene")]
    StaleRenderer(RendererId),

    /// Profile document could not be parsed.
    #[error("profile parse error: {0}")]
    ProfileParse(String),

    /// Profile could not be serialized.
    #[error("profile serialize error: {0}")]
    ProfileSerialize(String),

    /// Effect id is not registered.
    #[error("unknown effect {0:?}")]
    UnknownEffect(EffectId),
}

/// Broad failure classes, each with its own recovery policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Recorded on the effect, the sub-feature is skipped.
    Configuration,
    /// Logged once, the pass becomes a no-op.
    Resource,
    /// Silently falls back to the simplest path.
    Data,
    /// Triggers a rebuild of the bindings.
    Consistency,
}

impl HighlightError {
    /// Recovery class of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidNameFilter { .. }
            | Self::MissingAsset { .. }
            | Self::ProfileParse(_)
            | Self::ProfileSerialize(_)
            | Self::UnknownEffect(_) => ErrorCategory::Configuration,
            Self::MissingResource { .. } => ErrorCategory::Resource,
            Self::UnreadableMesh(_) | Self::EmptyMesh(_) | Self::MissingNormals(_) => ErrorCategory::Data,
            Self::StaleRenderer(_) => ErrorCategory::Consistency,
        }
    }
}

/// Result type for highlight operations.
pub type HighlightResult<T> = Result<T, HighlightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(HighlightError::UnreadableMesh(MeshId(1)).category(), ErrorCategory::Data);
        assert_eq!(
            HighlightError::MissingResource { resource: "mask".into() }.category(),
            ErrorCategory::Resource
        );
        assert_eq!(HighlightError::StaleRenderer(RendererId(4)).category(), ErrorCategory::Consistency);
    }

    #[test]
    fn test_display() {
        let err = HighlightError::InvalidNameFilter { pattern: "[".into(), reason: "unclosed".into() };
        assert_eq!(err.to_string(), "invalid name filter \"[\": unclosed");
    }
}
