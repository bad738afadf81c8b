//! Reusable effect profiles stored as TOML.

use serde::{Deserialize, Serialize};

use super::EffectConfiguration;
use crate::error::{HighlightError, HighlightResult};

/// A named, versioned configuration shared by several effects.
///
/// Effects bound to a profile with `sync` set re-apply it whenever
/// `revision` moves past the revision they last applied.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectProfile {
    /// Display name
    pub name: String,
    /// Re-apply on every change
    pub sync: bool,
    /// Bumped on every save
    pub revision: u64,
    /// Stored settings
    pub settings: EffectConfiguration,
}

impl EffectProfile {
    /// New profile holding `settings`.
    #[must_use]
    pub fn new(name: impl Into<String>, settings: EffectConfiguration) -> Self {
        Self { name: name.into(), sync: false, revision: 1, settings }
    }

    /// Parses a TOML document; missing keys take their defaults.
    ///
    /// # Errors
    /// Returns [`HighlightError::ProfileParse`] for malformed documents.
    pub fn from_toml_str(text: &str) -> HighlightResult<Self> {
        toml::from_str(text).map_err(|e| HighlightError::ProfileParse(e.to_string()))
    }

    /// Serializes to a TOML document.
    ///
    /// # Errors
    /// Returns [`HighlightError::ProfileSerialize`] when serialization fails.
    pub fn to_toml_string(&self) -> HighlightResult<String> {
        toml::to_string(self).map_err(|e| HighlightError::ProfileSerialize(e.to_string()))
    }

    /// Copies the stored settings into `target`.
    pub fn load(&self, target: &mut EffectConfiguration) {
        target.clone_from(&self.settings);
    }

    /// Stores `source` and bumps the revision.
    pub fn save(&mut self, source: &EffectConfiguration) {
        self.settings.clone_from(source);
        self.revision = self.revision.wrapping_add(1);
        tracing::debug!(profile = %self.name, revision = self.revision, "profile saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QualityLevel, Visibility};

    #[test]
    fn test_partial_document_fills_defaults() {
        let text = r#"
            name = "selection"
            sync = true

            [settings.outline]
            width = 0.8
            quality = "highest"

            [settings.glow]
            intensity = 1.5
            visibility = "always_on_top"
        "#;
        let profile = EffectProfile::from_toml_str(text).unwrap();
        assert!(profile.sync);
        assert_eq!(profile.settings.outline.width, 0.8);
        assert_eq!(profile.settings.outline.quality, QualityLevel::Highest);
        assert_eq!(profile.settings.outline.intensity, 1.0);
        assert_eq!(profile.settings.glow.visibility, Visibility::AlwaysOnTop);
        assert_eq!(profile.settings.glow.passes.len(), 4);
    }

    #[test]
    fn test_save_then_reload() {
        let mut cfg = EffectConfiguration::default();
        cfg.overlay.intensity = 0.5;
        let mut profile = EffectProfile::new("p", EffectConfiguration::default());
        profile.save(&cfg);
        assert_eq!(profile.revision, 2);

        let text = profile.to_toml_string().unwrap();
        let parsed = EffectProfile::from_toml_str(&text).unwrap();
        let mut out = EffectConfiguration::default();
        parsed.load(&mut out);
        assert_eq!(out, cfg);
    }

    #[test]
    fn test_malformed_document() {
        let err = EffectProfile::from_toml_str("settings = [").unwrap_err();
        assert!(matches!(err, HighlightError::ProfileParse(_)));
    }
}
