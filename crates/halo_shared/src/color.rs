//! Linear RGBA colors and color gradients.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::Vec4;

/// Linear RGBA color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Creates a color.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque white
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque red
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Unity-style yellow (1, 0.92, 0.016)
    pub const YELLOW: Self = Self::new(1.0, 0.92, 0.016, 1.0);
    /// Transparent black
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Same color with another alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }

    /// Multiplies every channel, alpha included.
    #[must_use]
    pub fn scaled(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k, self.a * k)
    }

    /// Unclamped linear interpolation.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }

    /// As a shader vector.
    #[must_use]
    pub const fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

/// One stop of a [`Gradient`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradientKey {
    /// Position in [0, 1]
    pub time: f32,
    /// Color at this stop
    pub color: Color,
}

/// Piecewise-linear color gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Stops, sorted by time.
    pub keys: Vec<GradientKey>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            keys: vec![
                GradientKey { time: 0.0, color: Color::WHITE },
                GradientKey { time: 1.0, color: Color::WHITE },
            ],
        }
    }
}

impl Gradient {
    /// Builds a gradient from unsorted stops.
    #[must_use]
    pub fn new(mut keys: Vec<GradientKey>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Color at `t`, clamped to the end stops.
    #[must_use]
    pub fn evaluate(&self, t: f32) -> Color {
        let Some(first) = self.keys.first() else {
            return Color::WHITE;
        };
        if t <= first.time {
            return first.color;
        }
        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.time {
                let span = b.time - a.time;
                let k = if span > 0.0 { (t - a.time) / span } else { 1.0 };
                return a.color.lerp(b.color, k);
            }
        }
        self.keys.last().map_or(Color::WHITE, |k| k.color)
    }

    /// Evenly spaced samples over [0, 1].
    #[must_use]
    pub fn sample(&self, count: usize) -> Vec<Color> {
        let denom = count.saturating_sub(1).max(1) as f32;
        (0..count).map(|i| self.evaluate(i as f32 / denom)).collect()
    }
}
