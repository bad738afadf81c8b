//! Quality tiers and multi-offset sampling directions.
//!
//! ```text
//!  index  0      1      2      3      4       5      6       7
//!        (0,1)  (1,0)  (0,-1) (-1,0) (-d,d)  (d,d)  (d,-d)  (-d,-d)     d = 0.70711
//!  Fastest ▲
//!  Medium                              ◄───────── 4..=7 ─────────►
//!  High   ◄──────────────────────── 0..=7 ──────────────────────►
//! ```

use std::ops::RangeInclusive;

use halo_shared::Vec4;

use crate::config::QualityLevel;

const D: f32 = 0.707_11;

/// Screen-space sampling directions.
pub const OFFSETS: [[f32; 2]; 8] = [[0.0, 1.0], [1.0, 0.0], [0.0, -1.0], [-1.0, 0.0], [-D, D], [D, D], [D, -D], [-D, -D]];

/// Offset indices sampled by a tier.
///
/// Highest never samples offsets; it has an empty range and goes through
/// the smooth path.
#[must_use]
#[allow(clippy::reversed_empty_ranges)]
pub const fn offset_range(quality: QualityLevel) -> RangeInclusive<usize> {
    match quality {
        QualityLevel::Fastest => 0..=0,
        QualityLevel::Medium => 4..=7,
        QualityLevel::High => 0..=7,
        QualityLevel::Highest => 1..=0,
    }
}

/// Number of offsets sampled by a tier.
#[must_use]
pub fn offset_count(quality: QualityLevel) -> usize {
    offset_range(quality).count()
}

/// Offset directions scaled by `width` percent, aspect-corrected.
#[must_use]
pub fn offset_directions(quality: QualityLevel, width: f32, aspect: f32) -> Vec<Vec4> {
    offset_range(quality)
        .map(|i| {
            let [x, y] = OFFSETS[i];
            Vec4::new(x * width / 100.0, y * width / 100.0 * aspect, 0.0, 0.0)
        })
        .collect()
}

/// Glow intensity scale compensating overlapping offsets.
#[must_use]
pub const fn glow_intensity_scale(quality: QualityLevel) -> f32 {
    match quality {
        QualityLevel::High => 0.25,
        QualityLevel::Medium => 0.5,
        QualityLevel::Fastest | QualityLevel::Highest => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_counts() {
        assert_eq!(offset_count(QualityLevel::Fastest), 1);
        assert_eq!(offset_count(QualityLevel::Medium), 4);
        assert_eq!(offset_count(QualityLevel::High), 8);
        assert_eq!(offset_count(QualityLevel::Highest), 0);
    }

    #[test]
    fn test_ranges_in_table() {
        for q in [QualityLevel::Fastest, QualityLevel::Medium, QualityLevel::High] {
            let r = offset_range(q);
            assert!(!r.is_empty());
            assert!(*r.end() < OFFSETS.len());
        }
    }

    #[test]
    fn test_directions_scaled_and_aspect_corrected() {
        let dirs = offset_directions(QualityLevel::Fastest, 50.0, 2.0);
        assert_eq!(dirs, vec![Vec4::new(0.0, 1.0, 0.0, 0.0)]);
        let diag = offset_directions(QualityLevel::Medium, 100.0, 1.0);
        assert!((diag[1].x - D).abs() < 1e-6);
        assert!((diag[1].y - D).abs() < 1e-6);
    }
}
