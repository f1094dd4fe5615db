//! Bitmap storage with pixel-format-agnostic row access.
//!
//! This module provides:
//! - [`Bitmap`] - owned, row-major pixel buffer of any [`PixelFormat`]
//! - [`Row`] / [`RowMut`] - row objects that read (and write) a pixel as any
//!   of the six color types
//! - [`ReadRow`] - the getters shared by both row types
//!
//! # Memory Layout
//!
//! Rows are stored top-to-bottom, each `stride` bytes long:
//!
//! ```text
//! Memory: [px px px px ... pad]  ← Row 0
//!         [px px px px ... pad]  ← Row 1
//! ```
//!
//! # Conversions
//!
//! Every getter and setter converts between the stored layout and the
//! requested color type. Integer formats hold sRGB; float formats hold
//! linear light, so [`ColorF`]/[`PColorF`] accessors always speak linear
//! values. Writing a translucent color to [`PixelFormat::Rgb24`] blends it
//! over black; writing to [`PixelFormat::Argb1555`] turns alpha below 128
//! into a fully transparent pixel.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Bitmap, Color32, PixelFormat, ReadRow};
//!
//! let mut bmp = Bitmap::new(4, 2, PixelFormat::Argb64).unwrap();
//! bmp.set_color32(1, 1, Color32::new(255, 0, 0, 255));
//!
//! let row = bmp.row(1);
//! assert_eq!(row.get_color32(1), Color32::new(255, 0, 0, 255));
//! assert_eq!(row.get_color64(1).r, 65535);
//! ```
//!
//! # Used By
//!
//! - `raster-ops` - source reads, destination read-modify-write, quantizer
//!   initialization

use crate::{
    Color32, Color64, ColorF, ColorWidth, Error, PColor32, PColor64, PColorF, PixelFormat,
    Rect, Result, Size,
};
use std::ops::Range;

/// Owned bitmap of a runtime-selected [`PixelFormat`].
///
/// # Example
///
/// ```rust
/// use raster_core::{Bitmap, Color32, PixelFormat};
///
/// let bmp = Bitmap::filled(8, 8, PixelFormat::PArgb32, Color32::new(0, 0, 255, 128)).unwrap();
/// assert_eq!(bmp.get_color32(7, 7).a, 128);
/// ```
#[derive(Clone)]
pub struct Bitmap {
    /// Pixel bytes, `stride * height` long
    data: Vec<u8>,
    /// Bitmap width in pixels
    width: u32,
    /// Bitmap height in pixels
    height: u32,
    /// Bytes per row
    stride: usize,
    /// Layout of every pixel
    format: PixelFormat,
}

impl Bitmap {
    /// Creates a zero-filled bitmap (transparent black, or black for formats
    /// without alpha).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if a dimension is zero or the
    /// buffer size overflows.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(
                width,
                height,
                "width and height must be > 0",
            ));
        }
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflow"))?;
        let len = stride
            .checked_mul(height as usize)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflow"))?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|e| Error::allocation_failed(len, e.to_string()))?;
        data.resize(len, 0);

        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    /// Creates a bitmap filled with one color.
    pub fn filled(width: u32, height: u32, format: PixelFormat, color: Color32) -> Result<Self> {
        let mut bmp = Self::new(width, height, format)?;
        bmp.clear(color);
        Ok(bmp)
    }

    /// Wraps existing pixel bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] for zero sizes or a buffer that is too short
    /// - [`Error::InvalidStride`] if `stride` cannot hold one row
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
        data: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(
                width,
                height,
                "width and height must be > 0",
            ));
        }
        let min_stride = width as usize * format.bytes_per_pixel();
        if stride < min_stride {
            return Err(Error::InvalidStride {
                stride,
                min_stride,
                width,
            });
        }
        let expected = stride * height as usize;
        if data.len() < expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
        })
    }

    /// Returns the bitmap width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the bitmap height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bitmap dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns a rectangle covering the entire bitmap.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns the pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the number of bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Checks that `region` is non-empty and lies inside the bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] otherwise.
    pub fn validate_region(&self, region: Rect) -> Result<()> {
        if region.is_empty() || !self.bounds().contains_rect(&region) {
            return Err(Error::invalid_region(region, self.width, self.height));
        }
        Ok(())
    }

    /// Returns the row object of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> Row<'_> {
        assert!(y < self.height, "row {y} out of bounds");
        let start = y as usize * self.stride;
        Row {
            bytes: &self.data[start..start + self.stride],
            y,
            width: self.width,
            format: self.format,
        }
    }

    /// Returns the mutable row object of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> RowMut<'_> {
        assert!(y < self.height, "row {y} out of bounds");
        let start = y as usize * self.stride;
        RowMut {
            bytes: &mut self.data[start..start + self.stride],
            y,
            width: self.width,
            format: self.format,
        }
    }

    /// Splits the rows in `range` into disjoint mutable row objects, so they
    /// can be handed to different worker threads.
    ///
    /// # Panics
    ///
    /// Panics if `range.end > height`.
    pub fn rows_mut(&mut self, range: Range<u32>) -> impl Iterator<Item = RowMut<'_>> + '_ {
        assert!(range.end <= self.height, "row range {range:?} out of bounds");
        let (width, format, stride) = (self.width, self.format, self.stride);
        let bytes = &mut self.data[range.start as usize * stride..range.end as usize * stride];
        bytes
            .chunks_mut(stride)
            .zip(range)
            .map(move |(bytes, y)| RowMut {
                bytes,
                y,
                width,
                format,
            })
    }

    /// Returns the pixel at (x, y) as [`Color32`].
    #[inline]
    pub fn get_color32(&self, x: u32, y: u32) -> Color32 {
        self.row(y).get_color32(x)
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color32> {
        (x < self.width && y < self.height).then(|| self.get_color32(x, y))
    }

    /// Sets the pixel at (x, y) from a [`Color32`].
    #[inline]
    pub fn set_color32(&mut self, x: u32, y: u32, color: Color32) {
        self.row_mut(y).set_color32(x, color);
    }

    /// Fills the whole bitmap with one color.
    pub fn clear(&mut self, color: Color32) {
        let bpp = self.format.bytes_per_pixel();
        let mut pixel = [0u8; 16];
        write_color32(self.format, &mut pixel[..bpp], color);
        let row_len = self.width as usize * bpp;
        for row in self.data.chunks_mut(self.stride) {
            for px in row[..row_len].chunks_exact_mut(bpp) {
                px.copy_from_slice(&pixel[..bpp]);
            }
        }
    }

    /// Copies `region` of this bitmap into `target` at (`x`, `y`), converting
    /// through the widest color representation either format needs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the region does not fit in either
    /// bitmap.
    pub fn copy_region(&self, region: Rect, target: &mut Bitmap, x: u32, y: u32) -> Result<()> {
        self.validate_region(region)?;
        target.validate_region(Rect::new(x, y, region.width, region.height))?;

        let width = widest(self.format, target.format);
        for dy in 0..region.height {
            let src = self.row(region.y + dy);
            let mut dst = target.row_mut(y + dy);
            for dx in 0..region.width {
                let sx = region.x + dx;
                match width {
                    _ if self.format == dst.format => {
                        dst.pixel_bytes_mut(x + dx).copy_from_slice(src.pixel_bytes(sx));
                    }
                    ColorWidth::Bits32 => dst.set_color32(x + dx, src.get_color32(sx)),
                    ColorWidth::Bits64 => dst.set_color64(x + dx, src.get_color64(sx)),
                    ColorWidth::Bits128 => dst.set_pcolorf(x + dx, src.get_pcolorf(sx)),
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("stride", &self.stride)
            .finish()
    }
}

fn widest(a: PixelFormat, b: PixelFormat) -> ColorWidth {
    match (a.info().color_width, b.info().color_width) {
        (ColorWidth::Bits128, _) | (_, ColorWidth::Bits128) => ColorWidth::Bits128,
        (ColorWidth::Bits64, _) | (_, ColorWidth::Bits64) => ColorWidth::Bits64,
        _ => ColorWidth::Bits32,
    }
}

/// Read access to the pixels of one row.
///
/// Implemented by [`Row`] and [`RowMut`]; `x` is relative to the bitmap's
/// left edge and must be below the row width.
pub trait ReadRow {
    /// Layout of the pixels.
    fn format(&self) -> PixelFormat;

    /// Row index in the bitmap.
    fn y(&self) -> u32;

    /// Row width in pixels.
    fn width(&self) -> u32;

    /// Bytes of pixel `x`.
    fn pixel_bytes(&self, x: u32) -> &[u8];

    /// Reads pixel `x` as [`Color32`].
    #[inline]
    fn get_color32(&self, x: u32) -> Color32 {
        read_color32(self.format(), self.pixel_bytes(x))
    }

    /// Reads pixel `x` as [`PColor32`].
    #[inline]
    fn get_pcolor32(&self, x: u32) -> PColor32 {
        let px = self.pixel_bytes(x);
        match self.format() {
            PixelFormat::PArgb32 => PColor32::new(px[2], px[1], px[0], px[3]),
            PixelFormat::PArgb64 => {
                let p = read_pcolor64_raw(px);
                let n = |c: u16| (c >> 8) as u8;
                PColor32::new(n(p.r), n(p.g), n(p.b), n(p.a))
            }
            format => read_color32(format, px).to_premultiplied(),
        }
    }

    /// Reads pixel `x` as [`Color64`].
    #[inline]
    fn get_color64(&self, x: u32) -> Color64 {
        read_color64(self.format(), self.pixel_bytes(x))
    }

    /// Reads pixel `x` as [`PColor64`].
    #[inline]
    fn get_pcolor64(&self, x: u32) -> PColor64 {
        let px = self.pixel_bytes(x);
        match self.format() {
            PixelFormat::PArgb64 => read_pcolor64_raw(px),
            PixelFormat::PArgb32 => {
                let w = |c: u8| c as u16 * 257;
                PColor64::new(w(px[2]), w(px[1]), w(px[0]), w(px[3]))
            }
            format => read_color64(format, px).to_premultiplied(),
        }
    }

    /// Reads pixel `x` as a linear [`ColorF`].
    #[inline]
    fn get_colorf(&self, x: u32) -> ColorF {
        read_colorf(self.format(), self.pixel_bytes(x))
    }

    /// Reads pixel `x` as a linear [`PColorF`].
    #[inline]
    fn get_pcolorf(&self, x: u32) -> PColorF {
        let px = self.pixel_bytes(x);
        match self.format() {
            PixelFormat::PRgbaF32 => read_f32x4(px),
            format => read_colorf(format, px).to_premultiplied(),
        }
    }
}

/// Read-only row of a [`Bitmap`].
///
/// Obtained from [`Bitmap::row`]; borrow it for one row at a time.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    bytes: &'a [u8],
    y: u32,
    width: u32,
    format: PixelFormat,
}

impl ReadRow for Row<'_> {
    #[inline]
    fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn y(&self) -> u32 {
        self.y
    }

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn pixel_bytes(&self, x: u32) -> &[u8] {
        let bpp = self.format.bytes_per_pixel();
        let start = x as usize * bpp;
        &self.bytes[start..start + bpp]
    }
}

/// Mutable row of a [`Bitmap`].
///
/// Obtained from [`Bitmap::row_mut`] or [`Bitmap::rows_mut`].
pub struct RowMut<'a> {
    bytes: &'a mut [u8],
    y: u32,
    width: u32,
    format: PixelFormat,
}

impl ReadRow for RowMut<'_> {
    #[inline]
    fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    fn y(&self) -> u32 {
        self.y
    }

    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn pixel_bytes(&self, x: u32) -> &[u8] {
        let bpp = self.format.bytes_per_pixel();
        let start = x as usize * bpp;
        &self.bytes[start..start + bpp]
    }
}

impl RowMut<'_> {
    #[inline]
    fn pixel_bytes_mut(&mut self, x: u32) -> &mut [u8] {
        let bpp = self.format.bytes_per_pixel();
        let start = x as usize * bpp;
        &mut self.bytes[start..start + bpp]
    }

    /// Writes pixel `x` from a [`Color32`].
    #[inline]
    pub fn set_color32(&mut self, x: u32, c: Color32) {
        let format = self.format;
        write_color32(format, self.pixel_bytes_mut(x), c);
    }

    /// Writes pixel `x` from a [`PColor32`].
    #[inline]
    pub fn set_pcolor32(&mut self, x: u32, c: PColor32) {
        let format = self.format;
        let px = self.pixel_bytes_mut(x);
        match format {
            PixelFormat::PArgb32 => px.copy_from_slice(&[c.b, c.g, c.r, c.a]),
            PixelFormat::PArgb64 => {
                let w = |c: u8| c as u16 * 257;
                write_u16x4(px, [w(c.b), w(c.g), w(c.r), w(c.a)]);
            }
            _ => write_color32(format, px, c.to_straight()),
        }
    }

    /// Writes pixel `x` from a [`Color64`].
    #[inline]
    pub fn set_color64(&mut self, x: u32, c: Color64) {
        let format = self.format;
        let px = self.pixel_bytes_mut(x);
        match format {
            PixelFormat::Argb64 => write_u16x4(px, [c.b, c.g, c.r, c.a]),
            PixelFormat::PArgb64 => {
                let p = c.to_premultiplied();
                write_u16x4(px, [p.b, p.g, p.r, p.a]);
            }
            PixelFormat::RgbaF32 | PixelFormat::PRgbaF32 => {
                write_colorf(format, px, ColorF::from_color64(c, true));
            }
            _ => write_color32(format, px, c.to_color32()),
        }
    }

    /// Writes pixel `x` from a [`PColor64`].
    #[inline]
    pub fn set_pcolor64(&mut self, x: u32, c: PColor64) {
        if self.format == PixelFormat::PArgb64 {
            write_u16x4(self.pixel_bytes_mut(x), [c.b, c.g, c.r, c.a]);
        } else {
            self.set_color64(x, c.to_straight());
        }
    }

    /// Writes pixel `x` from a linear [`ColorF`].
    #[inline]
    pub fn set_colorf(&mut self, x: u32, c: ColorF) {
        let format = self.format;
        write_colorf(format, self.pixel_bytes_mut(x), c);
    }

    /// Writes pixel `x` from a linear [`PColorF`].
    #[inline]
    pub fn set_pcolorf(&mut self, x: u32, c: PColorF) {
        if self.format == PixelFormat::PRgbaF32 {
            write_f32x4(self.pixel_bytes_mut(x), c);
        } else {
            self.set_colorf(x, c.to_straight());
        }
    }
}

#[inline]
fn read_u16(px: &[u8], i: usize) -> u16 {
    u16::from_le_bytes([px[i * 2], px[i * 2 + 1]])
}

#[inline]
fn write_u16x4(px: &mut [u8], v: [u16; 4]) {
    for (chunk, v) in px.chunks_exact_mut(2).zip(v) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

#[inline]
fn read_f32x4(px: &[u8]) -> PColorF {
    let f = |i: usize| f32::from_le_bytes([px[i * 4], px[i * 4 + 1], px[i * 4 + 2], px[i * 4 + 3]]);
    PColorF::new(f(0), f(1), f(2), f(3))
}

#[inline]
fn write_f32x4(px: &mut [u8], c: PColorF) {
    for (chunk, v) in px.chunks_exact_mut(4).zip([c.r, c.g, c.b, c.a]) {
        chunk.copy_from_slice(&v.to_le_bytes());
    }
}

#[inline]
fn read_pcolor64_raw(px: &[u8]) -> PColor64 {
    PColor64::new(read_u16(px, 2), read_u16(px, 1), read_u16(px, 0), read_u16(px, 3))
}

#[inline]
fn expand5(v: u16) -> u8 {
    let v = (v & 0x1f) as u8;
    (v << 3) | (v >> 2)
}

fn read_color32(format: PixelFormat, px: &[u8]) -> Color32 {
    match format {
        PixelFormat::Argb32 => Color32::new(px[2], px[1], px[0], px[3]),
        PixelFormat::PArgb32 => PColor32::new(px[2], px[1], px[0], px[3]).to_straight(),
        PixelFormat::Rgb24 => Color32::from_rgb(px[2], px[1], px[0]),
        PixelFormat::Argb1555 => {
            let v = read_u16(px, 0);
            let a = if v & 0x8000 != 0 { 255 } else { 0 };
            Color32::new(expand5(v >> 10), expand5(v >> 5), expand5(v), a)
        }
        PixelFormat::Argb64 | PixelFormat::PArgb64 => read_color64(format, px).to_color32(),
        PixelFormat::RgbaF32 | PixelFormat::PRgbaF32 => read_colorf(format, px).to_color32(true),
    }
}

fn read_color64(format: PixelFormat, px: &[u8]) -> Color64 {
    match format {
        PixelFormat::Argb64 => Color64::new(read_u16(px, 2), read_u16(px, 1), read_u16(px, 0), read_u16(px, 3)),
        PixelFormat::PArgb64 => read_pcolor64_raw(px).to_straight(),
        PixelFormat::RgbaF32 | PixelFormat::PRgbaF32 => read_colorf(format, px).to_color64(true),
        _ => read_color32(format, px).to_color64(),
    }
}

fn read_colorf(format: PixelFormat, px: &[u8]) -> ColorF {
    match format {
        PixelFormat::RgbaF32 => {
            let c = read_f32x4(px);
            ColorF::new(c.r, c.g, c.b, c.a)
        }
        PixelFormat::PRgbaF32 => read_f32x4(px).to_straight(),
        PixelFormat::Argb64 | PixelFormat::PArgb64 => ColorF::from_color64(read_color64(format, px), true),
        _ => ColorF::from_color32(read_color32(format, px), true),
    }
}

fn write_color32(format: PixelFormat, px: &mut [u8], c: Color32) {
    match format {
        PixelFormat::Argb32 => px.copy_from_slice(&[c.b, c.g, c.r, c.a]),
        PixelFormat::PArgb32 => {
            let p = c.to_premultiplied();
            px.copy_from_slice(&[p.b, p.g, p.r, p.a]);
        }
        PixelFormat::Rgb24 => {
            // translucent colors end up over black
            let p = c.to_premultiplied();
            px.copy_from_slice(&[p.b, p.g, p.r]);
        }
        PixelFormat::Argb1555 => {
            let v = if c.a < 128 {
                0
            } else {
                0x8000
                    | ((c.r as u16 >> 3) << 10)
                    | ((c.g as u16 >> 3) << 5)
                    | (c.b as u16 >> 3)
            };
            px.copy_from_slice(&v.to_le_bytes());
        }
        PixelFormat::Argb64 => {
            let w = c.to_color64();
            write_u16x4(px, [w.b, w.g, w.r, w.a]);
        }
        PixelFormat::PArgb64 => {
            let p = c.to_color64().to_premultiplied();
            write_u16x4(px, [p.b, p.g, p.r, p.a]);
        }
        PixelFormat::RgbaF32 | PixelFormat::PRgbaF32 => {
            write_colorf(format, px, ColorF::from_color32(c, true));
        }
    }
}

fn write_colorf(format: PixelFormat, px: &mut [u8], c: ColorF) {
    match format {
        PixelFormat::RgbaF32 => write_f32x4(px, PColorF::new(c.r, c.g, c.b, c.a)),
        PixelFormat::PRgbaF32 => write_f32x4(px, c.to_premultiplied()),
        PixelFormat::Argb64 => {
            let w = c.to_color64(true);
            write_u16x4(px, [w.b, w.g, w.r, w.a]);
        }
        PixelFormat::PArgb64 => {
            let p = c.to_color64(true).to_premultiplied();
            write_u16x4(px, [p.b, p.g, p.r, p.a]);
        }
        _ => write_color32(format, px, c.to_color32(true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert!(Bitmap::new(0, 10, PixelFormat::Argb32).is_err());
        assert!(Bitmap::new(10, 0, PixelFormat::RgbaF32).is_err());
    }

    #[test]
    fn test_from_raw_checks_stride() {
        let err = Bitmap::from_raw(4, 4, PixelFormat::Argb32, 8, vec![0; 64]).unwrap_err();
        assert!(matches!(err, Error::InvalidStride { min_stride: 16, .. }));
        assert!(Bitmap::from_raw(4, 4, PixelFormat::Argb32, 20, vec![0; 80]).is_ok());
    }

    #[test]
    fn test_color32_roundtrip_all_formats() {
        let opaque = Color32::new(200, 100, 50, 255);
        for format in PixelFormat::ALL {
            let mut bmp = Bitmap::new(2, 2, format).unwrap();
            bmp.set_color32(1, 0, opaque);
            let back = bmp.get_color32(1, 0);
            if format == PixelFormat::Argb1555 {
                assert_eq!(back.a, 255);
                assert!((back.r as i32 - 200).abs() <= 8);
            } else {
                assert_eq!(back, opaque, "{format}");
            }
        }
    }

    #[test]
    fn test_translucent_roundtrip_alpha_formats() {
        let c = Color32::new(255, 128, 0, 128);
        for format in [PixelFormat::Argb32, PixelFormat::Argb64, PixelFormat::RgbaF32] {
            let mut bmp = Bitmap::new(1, 1, format).unwrap();
            bmp.set_color32(0, 0, c);
            assert_eq!(bmp.get_color32(0, 0), c, "{format}");
        }
        let mut bmp = Bitmap::new(1, 1, PixelFormat::PArgb32).unwrap();
        bmp.set_color32(0, 0, c);
        let back = bmp.get_color32(0, 0);
        assert_eq!(back.a, 128);
        assert!((back.g as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_rgb24_blends_over_black() {
        let mut bmp = Bitmap::new(1, 1, PixelFormat::Rgb24).unwrap();
        bmp.set_color32(0, 0, Color32::new(255, 255, 255, 128));
        assert_eq!(bmp.get_color32(0, 0), Color32::new(128, 128, 128, 255));
    }

    #[test]
    fn test_argb1555_alpha_threshold() {
        let mut bmp = Bitmap::new(2, 1, PixelFormat::Argb1555).unwrap();
        bmp.set_color32(0, 0, Color32::new(255, 0, 0, 127));
        bmp.set_color32(1, 0, Color32::new(255, 0, 0, 128));
        assert_eq!(bmp.get_color32(0, 0).a, 0);
        assert_eq!(bmp.get_color32(1, 0), Color32::new(255, 0, 0, 255));
    }

    #[test]
    fn test_premultiplied_accessors() {
        let mut bmp = Bitmap::new(1, 1, PixelFormat::PArgb64).unwrap();
        bmp.row_mut(0).set_pcolor64(0, PColor64::new(1000, 2000, 3000, 4000));
        assert_eq!(bmp.row(0).get_pcolor64(0), PColor64::new(1000, 2000, 3000, 4000));

        let mut bmp = Bitmap::new(1, 1, PixelFormat::PRgbaF32).unwrap();
        bmp.row_mut(0).set_pcolorf(0, PColorF::new(0.1, 0.2, 0.3, 0.5));
        assert_eq!(bmp.row(0).get_pcolorf(0), PColorF::new(0.1, 0.2, 0.3, 0.5));
    }

    #[test]
    fn test_rows_mut_are_disjoint() {
        let mut bmp = Bitmap::new(3, 4, PixelFormat::Argb32).unwrap();
        for mut row in bmp.rows_mut(1..3) {
            let y = row.y() as u8;
            row.set_color32(0, Color32::from_gray(y * 10));
        }
        assert_eq!(bmp.get_color32(0, 0), Color32::TRANSPARENT);
        assert_eq!(bmp.get_color32(0, 1), Color32::from_gray(10));
        assert_eq!(bmp.get_color32(0, 2), Color32::from_gray(20));
        assert_eq!(bmp.get_color32(0, 3), Color32::TRANSPARENT);
    }

    #[test]
    fn test_copy_region_between_formats() {
        let src = Bitmap::filled(4, 4, PixelFormat::Argb32, Color32::new(10, 20, 30, 255)).unwrap();
        let mut dst = Bitmap::new(8, 8, PixelFormat::Argb64).unwrap();
        src.copy_region(Rect::new(1, 1, 2, 2), &mut dst, 5, 6).unwrap();
        assert_eq!(dst.get_color32(5, 6), Color32::new(10, 20, 30, 255));
        assert_eq!(dst.get_color32(6, 7), Color32::new(10, 20, 30, 255));
        assert_eq!(dst.get_color32(4, 6), Color32::TRANSPARENT);
        assert!(src.copy_region(Rect::new(0, 0, 2, 2), &mut dst, 7, 7).is_err());
    }

    #[test]
    fn test_validate_region() {
        let bmp = Bitmap::new(10, 10, PixelFormat::Argb32).unwrap();
        assert!(bmp.validate_region(Rect::new(0, 0, 10, 10)).is_ok());
        assert!(bmp.validate_region(Rect::new(5, 5, 6, 1)).is_err());
        assert!(bmp.validate_region(Rect::new(5, 5, 0, 1)).is_err());
    }
}
