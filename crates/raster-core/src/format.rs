//! Pixel formats and their descriptors.
//!
//! A [`PixelFormat`] names the memory layout of one pixel; its
//! [`PixelFormatInfo`] tells operations how to treat it without matching on
//! every variant: whether it has (multi-level) alpha, whether the stored
//! colors are premultiplied, which color width loses nothing when reading
//! and writing, and whether the samples are linear.
//!
//! # Layouts
//!
//! | Format       | Bytes | Memory order (little endian)          |
//! |--------------|-------|---------------------------------------|
//! | `Argb32`     | 4     | B G R A                               |
//! | `PArgb32`    | 4     | B G R A, premultiplied                |
//! | `Rgb24`      | 3     | B G R                                 |
//! | `Argb1555`   | 2     | `u16`: A:1 R:5 G:5 B:5                |
//! | `Argb64`     | 8     | `u16` B G R A                         |
//! | `PArgb64`    | 8     | `u16` B G R A, premultiplied          |
//! | `RgbaF32`    | 16    | `f32` R G B A, linear                 |
//! | `PRgbaF32`   | 16    | `f32` R G B A, linear, premultiplied  |
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{ColorWidth, PixelFormat};
//!
//! let info = PixelFormat::PArgb64.info();
//! assert!(info.premultiplied);
//! assert_eq!(info.color_width, ColorWidth::Bits64);
//! assert_eq!(PixelFormat::Argb1555.info().alpha_threshold, Some(128));
//! ```

/// Widest color representation a format can be read and written through
/// without losing precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorWidth {
    /// 8 bits per channel ([`Color32`](crate::Color32)).
    Bits32,
    /// 16 bits per channel ([`Color64`](crate::Color64)).
    Bits64,
    /// 32-bit float per channel ([`ColorF`](crate::ColorF)).
    Bits128,
}

/// Memory layout of a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PixelFormat {
    /// 8-bit straight ARGB.
    #[default]
    Argb32,
    /// 8-bit premultiplied ARGB.
    PArgb32,
    /// 8-bit RGB without alpha.
    Rgb24,
    /// 5 bits per color channel, single-bit alpha.
    Argb1555,
    /// 16-bit straight ARGB.
    Argb64,
    /// 16-bit premultiplied ARGB.
    PArgb64,
    /// 32-bit float straight RGBA, linear.
    RgbaF32,
    /// 32-bit float premultiplied RGBA, linear.
    PRgbaF32,
}

/// Static properties of a [`PixelFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatInfo {
    /// Bits occupied by one pixel.
    pub bits_per_pixel: u32,
    /// Format stores alpha (single-bit or multi-level).
    pub has_alpha: bool,
    /// Alpha has only two levels.
    pub single_bit_alpha: bool,
    /// Colors are stored premultiplied by alpha.
    pub premultiplied: bool,
    /// Preferred color width for reading and writing.
    pub color_width: ColorWidth,
    /// Samples are stored as linear light rather than sRGB.
    pub linear_gamma: bool,
    /// Colors with alpha below this value cannot be represented as visible
    /// pixels; `None` for formats with multi-level alpha or without alpha.
    pub alpha_threshold: Option<u8>,
}

impl PixelFormat {
    /// Every supported format.
    pub const ALL: [PixelFormat; 8] = [
        Self::Argb32,
        Self::PArgb32,
        Self::Rgb24,
        Self::Argb1555,
        Self::Argb64,
        Self::PArgb64,
        Self::RgbaF32,
        Self::PRgbaF32,
    ];

    /// Returns the descriptor of this format.
    pub const fn info(self) -> PixelFormatInfo {
        const fn info(
            bits_per_pixel: u32,
            has_alpha: bool,
            premultiplied: bool,
            color_width: ColorWidth,
            linear_gamma: bool,
        ) -> PixelFormatInfo {
            PixelFormatInfo {
                bits_per_pixel,
                has_alpha,
                single_bit_alpha: false,
                premultiplied,
                color_width,
                linear_gamma,
                alpha_threshold: None,
            }
        }

        match self {
            Self::Argb32 => info(32, true, false, ColorWidth::Bits32, false),
            Self::PArgb32 => info(32, true, true, ColorWidth::Bits32, false),
            Self::Rgb24 => info(24, false, false, ColorWidth::Bits32, false),
            Self::Argb1555 => PixelFormatInfo {
                single_bit_alpha: true,
                alpha_threshold: Some(128),
                ..info(16, true, false, ColorWidth::Bits32, false)
            },
            Self::Argb64 => info(64, true, false, ColorWidth::Bits64, false),
            Self::PArgb64 => info(64, true, true, ColorWidth::Bits64, false),
            Self::RgbaF32 => info(128, true, false, ColorWidth::Bits128, true),
            Self::PRgbaF32 => info(128, true, true, ColorWidth::Bits128, true),
        }
    }

    /// Bytes occupied by one pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        (self.info().bits_per_pixel / 8) as usize
    }

    /// Short human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Argb32 => "Argb32",
            Self::PArgb32 => "PArgb32",
            Self::Rgb24 => "Rgb24",
            Self::Argb1555 => "Argb1555",
            Self::Argb64 => "Argb64",
            Self::PArgb64 => "PArgb64",
            Self::RgbaF32 => "RgbaF32",
            Self::PRgbaF32 => "PRgbaF32",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(PixelFormat::Argb32.bytes_per_pixel(), 4);
        assert_eq!(PixelFormat::Rgb24.bytes_per_pixel(), 3);
        assert_eq!(PixelFormat::Argb1555.bytes_per_pixel(), 2);
        assert_eq!(PixelFormat::PArgb64.bytes_per_pixel(), 8);
        assert_eq!(PixelFormat::PRgbaF32.bytes_per_pixel(), 16);
    }

    #[test]
    fn test_only_single_bit_alpha_has_threshold() {
        for format in PixelFormat::ALL {
            let info = format.info();
            assert_eq!(info.alpha_threshold.is_some(), info.single_bit_alpha, "{format}");
        }
    }

    #[test]
    fn test_float_formats_are_linear() {
        for format in PixelFormat::ALL {
            let info = format.info();
            assert_eq!(info.linear_gamma, info.color_width == ColorWidth::Bits128);
        }
    }
}
