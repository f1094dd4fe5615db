//! Working color space of blending and convolution math.
//!
//! Stored samples of integer formats are gamma-encoded sRGB; float formats
//! store linear light. The working color space decides whether arithmetic
//! (alpha blending, weighted sums) runs on the encoded values or on
//! linearized ones. Linear blending is physically correct; sRGB blending
//! matches what most editors do.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{PixelFormat, WorkingColorSpace};
//!
//! let space = WorkingColorSpace::Default;
//! assert!(!space.is_linear_for(PixelFormat::Argb32));
//! assert!(space.is_linear_for(PixelFormat::RgbaF32));
//! assert!(WorkingColorSpace::Linear.is_linear_for(PixelFormat::Argb32));
//! ```

use crate::PixelFormat;
use std::fmt;

/// Color space in which blending and resampling math is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WorkingColorSpace {
    /// Follow the preference of the pixel format the result is written to:
    /// linear for floating-point formats, sRGB otherwise.
    #[default]
    Default,
    /// Operate on gamma-encoded sRGB values.
    Srgb,
    /// Operate on linearized values.
    Linear,
}

impl WorkingColorSpace {
    /// Resolves [`Default`](Self::Default) against a target format and
    /// returns `true` if math should be done in linear space.
    #[inline]
    pub fn is_linear_for(self, format: PixelFormat) -> bool {
        match self {
            Self::Default => format.info().linear_gamma,
            Self::Srgb => false,
            Self::Linear => true,
        }
    }
}

impl fmt::Display for WorkingColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Srgb => "sRGB",
            Self::Linear => "linear",
        };
        f.write_str(name)
    }
}
