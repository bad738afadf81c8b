//! Renderer name filtering.

use regex::Regex;

use crate::error::{HighlightError, HighlightResult};

/// Compiled name filter.
#[derive(Clone, Debug, Default)]
pub enum NameFilter {
    /// Accepts every name
    #[default]
    Any,
    /// Name must contain the text
    Substring(String),
    /// Name must match the expression somewhere
    Pattern(Regex),
}

impl NameFilter {
    /// Compiles a filter; an empty pattern accepts everything.
    ///
    /// # Errors
    /// [`HighlightError::InvalidNameFilter`] when `use_regex` is set and the
    /// pattern does not parse.
    pub fn new(pattern: &str, use_regex: bool) -> HighlightResult<Self> {
        if pattern.is_empty() {
            return Ok(Self::Any);
        }
        if !use_regex {
            return Ok(Self::Substring(pattern.to_owned()));
        }
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| HighlightError::InvalidNameFilter { pattern: pattern.to_owned(), reason: e.to_string() })
    }

    /// True when `name` passes.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Substring(text) => name.contains(text.as_str()),
            Self::Pattern(re) => re.is_match(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring() {
        let f = NameFilter::new("Wheel", false).unwrap();
        assert!(f.matches("FrontWheel_L"));
        assert!(!f.matches("Body"));
    }

    #[test]
    fn test_regex() {
        let f = NameFilter::new("^Wheel_[LR]$", true).unwrap();
        assert!(f.matches("Wheel_L"));
        assert!(!f.matches("FrontWheel_L"));
    }

    #[test]
    fn test_empty_accepts_all() {
        assert!(NameFilter::new("", true).unwrap().matches("anything"));
    }

    #[test]
    fn test_malformed_regex() {
        let err = NameFilter::new("Wheel(", true).unwrap_err();
        match err {
            HighlightError::InvalidNameFilter { pattern, reason } => {
                assert_eq!(pattern, "Wheel(");
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
