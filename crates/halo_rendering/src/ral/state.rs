//! Fixed-function state values handed to shader programs as integers.
//!
//! The discriminants follow the common engine encoding so a backend can
//! forward them to the pipeline state unchanged.

use serde::{Deserialize, Serialize};

/// Depth and stencil comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum CompareFunction {
    /// Never passes
    Never = 1,
    /// Less than
    Less = 2,
    /// Equal
    Equal = 3,
    /// Less or equal
    LessEqual = 4,
    /// Greater than
    Greater = 5,
    /// Not equal
    NotEqual = 6,
    /// Greater or equal
    GreaterEqual = 7,
    /// Always passes
    Always = 8,
}

/// Stencil buffer update.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum StencilOp {
    /// Keep the current value
    Keep = 0,
    /// Write zero
    Zero = 1,
    /// Write the reference value
    Replace = 2,
}

/// Blend factor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum BlendFactor {
    /// 0
    Zero = 0,
    /// 1
    One = 1,
    /// Source alpha
    SrcAlpha = 5,
    /// 1 - source alpha
    OneMinusSrcAlpha = 10,
}

/// Face culling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum CullMode {
    /// Draw both faces
    Off = 0,
    /// Cull front faces
    Front = 1,
    /// Cull back faces
    Back = 2,
}

macro_rules! impl_as_int {
    ($($ty:ty),*) => {
        $(impl $ty {
            /// Integer encoding for shader parameters.
            #[must_use]
            pub const fn as_int(self) -> i32 {
                self as i32
            }
        })*
    };
}

impl_as_int!(CompareFunction, StencilOp, BlendFactor, CullMode);

/// Pixel format of a temporary render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// Single 8-bit channel
    R8,
    /// Single 16-bit float channel
    RHalf,
    /// 8-bit RGBA
    Argb32,
}

/// Temporary render target request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderTargetDesc {
    /// Width in pixels, at least 1
    pub width: u32,
    /// Height in pixels, at least 1
    pub height: u32,
    /// Pixel format
    pub format: TargetFormat,
    /// MSAA sample count
    pub msaa_samples: u32,
    /// Generate mips
    pub use_mips: bool,
    /// Depth buffer bits, 0 for none
    pub depth_bits: u32,
}

impl RenderTargetDesc {
    /// Color-only, single-sample, no mips.
    #[must_use]
    pub fn color(width: u32, height: u32, format: TargetFormat) -> Self {
        Self { width: width.max(1), height: height.max(1), format, msaa_samples: 1, use_mips: false, depth_bits: 0 }
    }

    /// Same description scaled down by `divisor`, clamped to 1 pixel.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn reduced(&self, divisor: f32) -> Self {
        let w = ((self.width as f32) / divisor) as u32;
        let h = ((self.height as f32) / divisor) as u32;
        Self { width: w.max(1), height: h.max(1), ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodings() {
        assert_eq!(CompareFunction::LessEqual.as_int(), 4);
        assert_eq!(CompareFunction::Always.as_int(), 8);
        assert_eq!(StencilOp::Replace.as_int(), 2);
        assert_eq!(BlendFactor::OneMinusSrcAlpha.as_int(), 10);
    }

    #[test]
    fn test_reduced_never_zero() {
        let desc = RenderTargetDesc::color(3, 3, TargetFormat::R8);
        let small = desc.reduced(5.0);
        assert_eq!((small.width, small.height), (1, 1));
        let half = RenderTargetDesc::color(100, 50, TargetFormat::R8).reduced(2.0);
        assert_eq!((half.width, half.height), (50, 25));
    }
}
