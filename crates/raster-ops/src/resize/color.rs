//! Per-format color dispatch shared by the resizing sessions.
//!
//! The color type a session computes with is picked once per call
//! ([`ColorRepresentation::select`]) and the session is monomorphized over
//! it through [`ResizeColor`]. Source samples enter the convolution through
//! one [`SourceAccessor`], also picked once per call.

use crate::quantize::{DitheringSession, QuantizingSession};
use raster_core::{
    BlendColor, Color32, Color64, ColorF, ColorWidth, PColor32, PColor64, PColorF, PixelFormat,
    ReadRow, RowMut,
};

/// Color type used to produce and blend destination pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColorRepresentation {
    Color32,
    PColor32,
    Color64,
    PColor64,
    ColorF,
    PColorF,
}

impl ColorRepresentation {
    /// Picks the representation matching the target's preferred color
    /// width. Premultiplied types are used only for premultiplied targets
    /// whose native encoding matches the working space: integer
    /// premultiplied colors are sRGB, [`PColorF`] is linear.
    pub(crate) fn select(format: PixelFormat, linear: bool) -> Self {
        let info = format.info();
        match info.color_width {
            ColorWidth::Bits32 if info.premultiplied && !linear => Self::PColor32,
            ColorWidth::Bits32 => Self::Color32,
            ColorWidth::Bits64 if info.premultiplied && !linear => Self::PColor64,
            ColorWidth::Bits64 => Self::Color64,
            ColorWidth::Bits128 if info.premultiplied && linear => Self::PColorF,
            ColorWidth::Bits128 => Self::ColorF,
        }
    }
}

/// A color type the resizing sessions can produce, read back and write.
pub(crate) trait ResizeColor: BlendColor + Send + Sync {
    /// Converts a clipped convolution result. `linear` tells how the
    /// accumulator was populated.
    fn from_accumulator(acc: PColorF, linear: bool) -> Self;

    /// Reads pixel `x` of a row.
    fn read(row: &impl ReadRow, x: u32) -> Self;

    /// Writes pixel `x` of a row.
    fn write(row: &mut RowMut<'_>, x: u32, color: Self);
}

impl ResizeColor for Color32 {
    #[inline]
    fn from_accumulator(acc: PColorF, linear: bool) -> Self {
        acc.to_straight().to_color32(linear)
    }

    #[inline]
    fn read(row: &impl ReadRow, x: u32) -> Self {
        row.get_color32(x)
    }

    #[inline]
    fn write(row: &mut RowMut<'_>, x: u32, color: Self) {
        row.set_color32(x, color);
    }
}

impl ResizeColor for PColor32 {
    #[inline]
    fn from_accumulator(acc: PColorF, _linear: bool) -> Self {
        acc.to_pcolor32()
    }

    #[inline]
    fn read(row: &impl ReadRow, x: u32) -> Self {
        row.get_pcolor32(x)
    }

    #[inline]
    fn write(row: &mut RowMut<'_>, x: u32, color: Self) {
        row.set_pcolor32(x, color);
    }
}

impl ResizeColor for Color64 {
    #[inline]
    fn from_accumulator(acc: PColorF, linear: bool) -> Self {
        acc.to_straight().to_color64(linear)
    }

    #[inline]
    fn read(row: &impl ReadRow, x: u32) -> Self {
        row.get_color64(x)
    }

    #[inline]
    fn write(row: &mut RowMut<'_>, x: u32, color: Self) {
        row.set_color64(x, color);
    }
}

impl ResizeColor for PColor64 {
    #[inline]
    fn from_accumulator(acc: PColorF, _linear: bool) -> Self {
        acc.to_pcolor64()
    }

    #[inline]
    fn read(row: &impl ReadRow, x: u32) -> Self {
        row.get_pcolor64(x)
    }

    #[inline]
    fn write(row: &mut RowMut<'_>, x: u32, color: Self) {
        row.set_pcolor64(x, color);
    }
}

impl ResizeColor for ColorF {
    #[inline]
    fn from_accumulator(acc: PColorF, linear: bool) -> Self {
        // float colors are always handed around linear
        let c = acc.to_straight();
        if linear { c } else { c.to_linear() }
    }

    #[inline]
    fn read(row: &impl ReadRow, x: u32) -> Self {
        row.get_colorf(x)
    }

    #[inline]
    fn write(row: &mut RowMut<'_>, x: u32, color: Self) {
        row.set_colorf(x, color);
    }
}

impl ResizeColor for PColorF {
    #[inline]
    fn from_accumulator(acc: PColorF, _linear: bool) -> Self {
        acc
    }

    #[inline]
    fn read(row: &impl ReadRow, x: u32) -> Self {
        row.get_pcolorf(x)
    }

    #[inline]
    fn write(row: &mut RowMut<'_>, x: u32, color: Self) {
        row.set_pcolorf(x, color);
    }
}

/// How source pixels are turned into convolution samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceAccessor {
    /// Read straight colors in the working space, then premultiply.
    Straight { width: ColorWidth, linear: bool },
    /// Premultiplied sRGB storage read as is.
    PremultipliedSrgb { width: ColorWidth },
    /// Premultiplied linear float storage read as is.
    PremultipliedLinear,
}

impl SourceAccessor {
    pub(crate) fn select(format: PixelFormat, linear: bool) -> Self {
        match format {
            PixelFormat::PArgb32 | PixelFormat::PArgb64 if !linear => Self::PremultipliedSrgb {
                width: format.info().color_width,
            },
            PixelFormat::PRgbaF32 if linear => Self::PremultipliedLinear,
            _ => Self::Straight {
                width: format.info().color_width,
                linear,
            },
        }
    }

    /// Reads pixel `x` as a premultiplied sample in the working space.
    #[inline]
    pub(crate) fn read(self, row: &impl ReadRow, x: u32) -> PColorF {
        match self {
            Self::Straight {
                width: ColorWidth::Bits32,
                linear,
            } => ColorF::from_color32(row.get_color32(x), linear).to_premultiplied(),
            Self::Straight {
                width: ColorWidth::Bits64,
                linear,
            } => ColorF::from_color64(row.get_color64(x), linear).to_premultiplied(),
            Self::Straight {
                width: ColorWidth::Bits128,
                linear,
            } => {
                let c = row.get_colorf(x);
                let c = if linear { c } else { c.to_srgb() };
                c.to_premultiplied()
            }
            Self::PremultipliedSrgb {
                width: ColorWidth::Bits64,
            } => PColorF::from_pcolor64(row.get_pcolor64(x)),
            Self::PremultipliedSrgb { .. } => PColorF::from_pcolor32(row.get_pcolor32(x)),
            Self::PremultipliedLinear => row.get_pcolorf(x),
        }
    }
}

/// Writes `color` over pixel `x` of `row`.
///
/// Opaque colors overwrite, transparent ones are skipped, anything else is
/// blended with the current pixel. A blended result with alpha below
/// `alpha_threshold` leaves the pixel untouched.
#[inline]
pub(crate) fn composite<C: ResizeColor>(
    row: &mut RowMut<'_>,
    x: u32,
    color: C,
    linear: bool,
    alpha_threshold: u8,
) {
    if color.is_opaque() {
        C::write(row, x, color);
        return;
    }
    if color.is_transparent() {
        return;
    }
    let back = C::read(row, x);
    let blended = if back.is_opaque() {
        color.blend_with_background(back, linear)
    } else {
        color.blend_with(back, linear)
    };
    if blended.alpha_u8() < alpha_threshold {
        return;
    }
    C::write(row, x, blended);
}

/// Destination writer of the quantized modes.
///
/// Composites like [`composite`] in [`Color32`], then writes the quantized
/// or dithered result.
#[derive(Clone, Copy)]
pub(crate) struct PaletteWriter<'a> {
    quantizer: &'a dyn QuantizingSession,
    ditherer: Option<&'a dyn DitheringSession>,
    alpha_threshold: u8,
}

impl<'a> PaletteWriter<'a> {
    pub(crate) fn new(
        quantizer: &'a dyn QuantizingSession,
        ditherer: Option<&'a dyn DitheringSession>,
    ) -> Self {
        Self {
            alpha_threshold: quantizer.alpha_threshold(),
            quantizer,
            ditherer,
        }
    }

    #[inline]
    pub(crate) fn write(&self, row: &mut RowMut<'_>, x: u32, color: Color32, linear: bool) {
        let color = if color.is_opaque() {
            color
        } else if color.is_transparent() {
            return;
        } else {
            let back = row.get_color32(x);
            if back.is_opaque() {
                color.blend_with_background(back, linear)
            } else {
                color.blend_with(back, linear)
            }
        };
        if color.a < self.alpha_threshold {
            return;
        }
        let out = match self.ditherer {
            Some(ditherer) => ditherer.dithered_color(color, x, row.y()),
            None => self.quantizer.quantized_color(color),
        };
        row.set_color32(x, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_core::Bitmap;

    #[test]
    fn test_select_representation() {
        use ColorRepresentation as R;
        assert_eq!(R::select(PixelFormat::Argb32, false), R::Color32);
        assert_eq!(R::select(PixelFormat::PArgb32, false), R::PColor32);
        assert_eq!(R::select(PixelFormat::PArgb32, true), R::Color32);
        assert_eq!(R::select(PixelFormat::Rgb24, true), R::Color32);
        assert_eq!(R::select(PixelFormat::PArgb64, false), R::PColor64);
        assert_eq!(R::select(PixelFormat::Argb64, true), R::Color64);
        assert_eq!(R::select(PixelFormat::PRgbaF32, true), R::PColorF);
        assert_eq!(R::select(PixelFormat::PRgbaF32, false), R::ColorF);
        assert_eq!(R::select(PixelFormat::RgbaF32, true), R::ColorF);
    }

    #[test]
    fn test_select_accessor() {
        assert_eq!(
            SourceAccessor::select(PixelFormat::PArgb32, false),
            SourceAccessor::PremultipliedSrgb {
                width: ColorWidth::Bits32
            }
        );
        assert_eq!(
            SourceAccessor::select(PixelFormat::PRgbaF32, true),
            SourceAccessor::PremultipliedLinear
        );
        assert!(matches!(
            SourceAccessor::select(PixelFormat::PArgb32, true),
            SourceAccessor::Straight { linear: true, .. }
        ));
    }

    #[test]
    fn test_accessors_agree() {
        let c = Color32::new(200, 100, 50, 128);
        for format in [PixelFormat::Argb32, PixelFormat::PArgb32, PixelFormat::PArgb64] {
            let bmp = Bitmap::filled(1, 1, format, c).unwrap();
            let straight = SourceAccessor::Straight {
                width: format.info().color_width,
                linear: false,
            }
            .read(&bmp.row(0), 0);
            let chosen = SourceAccessor::select(format, false).read(&bmp.row(0), 0);
            assert!((straight.r - chosen.r).abs() < 2.0 / 255.0, "{format}");
            assert!((straight.a - chosen.a).abs() < 1e-6, "{format}");
        }
    }

    #[test]
    fn test_from_accumulator_keeps_color() {
        let acc = ColorF::from_color32(Color32::new(10, 20, 30, 255), false).to_premultiplied();
        assert_eq!(Color32::from_accumulator(acc, false), Color32::new(10, 20, 30, 255));
        let back = ColorF::from_accumulator(acc, false).to_color32(true);
        assert_eq!(back, Color32::new(10, 20, 30, 255));
    }

    #[test]
    fn test_composite_rules() {
        let mut bmp = Bitmap::filled(3, 1, PixelFormat::Argb32, Color32::from_gray(10)).unwrap();
        let mut row = bmp.row_mut(0);
        composite(&mut row, 0, Color32::new(200, 0, 0, 255), false, 0);
        composite(&mut row, 1, Color32::new(200, 0, 0, 0), false, 0);
        composite(&mut row, 2, Color32::new(200, 0, 0, 128), false, 0);
        assert_eq!(bmp.get_color32(0, 0), Color32::new(200, 0, 0, 255));
        assert_eq!(bmp.get_color32(1, 0), Color32::from_gray(10));
        let blended = bmp.get_color32(2, 0);
        assert_eq!(blended.a, 255);
        assert!(blended.r > 90 && blended.r < 110);
    }

    #[test]
    fn test_composite_threshold_skips() {
        let mut bmp = Bitmap::new(1, 1, PixelFormat::Argb1555).unwrap();
        composite(&mut bmp.row_mut(0), 0, Color32::new(255, 255, 255, 100), false, 128);
        assert_eq!(bmp.get_color32(0, 0), Color32::TRANSPARENT);
    }
}
