//! Color sample types.
//!
//! Six interchangeable representations of one pixel color:
//!
//! | Type         | Channels | Alpha          | Encoding            |
//! |--------------|----------|----------------|---------------------|
//! | [`Color32`]  | `u8`     | straight       | sRGB                |
//! | [`PColor32`] | `u8`     | premultiplied  | sRGB                |
//! | [`Color64`]  | `u16`    | straight       | sRGB                |
//! | [`PColor64`] | `u16`    | premultiplied  | sRGB                |
//! | [`ColorF`]   | `f32`    | straight       | caller-tracked      |
//! | [`PColorF`]  | `f32`    | premultiplied  | caller-tracked      |
//!
//! Float colors do not carry their encoding: a [`ColorF`] read from a float
//! bitmap is linear, one built with [`ColorF::from_color32`]`(c, false)` keeps
//! the sRGB-encoded values. Conversions that cross encodings take an explicit
//! `linear` flag.
//!
//! [`PColorF`] is the accumulator of resize convolutions: premultiplied
//! samples can be summed with weights without transparent pixels bleeding
//! their color into the result.
//!
//! # Invariants
//!
//! Premultiplied components are never greater than alpha. Weighted sums may
//! transiently break that (negative lobes of sharpening kernels), so
//! [`PColorF::clip`] must run before the accumulator is converted.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Color32, ColorF};
//!
//! let c = Color32::new(255, 128, 0, 128);
//! let p = c.to_premultiplied();
//! assert_eq!(p.r, 128);
//!
//! let f = ColorF::from_color32(c, true);
//! assert_eq!(f.to_color32(true), c);
//! ```
//!
//! # Dependencies
//!
//! - [`crate::transfer`] - sRGB EOTF/OETF
//!
//! # Used By
//!
//! - [`crate::bitmap`] - row accessors
//! - [`crate::blend`] - compositing formulas
//! - `raster-ops` - convolution accumulator, quantizers

use crate::transfer;
use std::ops::{Add, AddAssign, Mul};

/// 8-bit straight-alpha sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color32 {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha
    pub a: u8,
}

/// 8-bit premultiplied sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PColor32 {
    /// Red, premultiplied
    pub r: u8,
    /// Green, premultiplied
    pub g: u8,
    /// Blue, premultiplied
    pub b: u8,
    /// Alpha
    pub a: u8,
}

/// 16-bit straight-alpha sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color64 {
    /// Red
    pub r: u16,
    /// Green
    pub g: u16,
    /// Blue
    pub b: u16,
    /// Alpha
    pub a: u16,
}

/// 16-bit premultiplied sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PColor64 {
    /// Red, premultiplied
    pub r: u16,
    /// Green, premultiplied
    pub g: u16,
    /// Blue, premultiplied
    pub b: u16,
    /// Alpha
    pub a: u16,
}

/// Floating-point straight-alpha color. Nominal range is [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorF {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

/// Floating-point premultiplied color.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PColorF {
    /// Red, premultiplied
    pub r: f32,
    /// Green, premultiplied
    pub g: f32,
    /// Blue, premultiplied
    pub b: f32,
    /// Alpha
    pub a: f32,
}

#[inline]
fn premultiply_u8(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 127) / 255) as u8
}

#[inline]
fn unpremultiply_u8(c: u8, a: u8) -> u8 {
    ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8
}

#[inline]
fn premultiply_u16(c: u16, a: u16) -> u16 {
    ((c as u64 * a as u64 + 32767) / 65535) as u16
}

#[inline]
fn unpremultiply_u16(c: u16, a: u16) -> u16 {
    ((c as u64 * 65535 + a as u64 / 2) / a as u64).min(65535) as u16
}

#[inline]
fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[inline]
fn unit_to_u16(v: f32) -> u16 {
    (v.clamp(0.0, 1.0) * 65535.0).round() as u16
}

impl Color32 {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Creates a color from its components.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Creates an opaque gray.
    #[inline]
    pub const fn from_gray(v: u8) -> Self {
        Self::new(v, v, v, 255)
    }

    /// Returns the color with premultiplied components.
    #[inline]
    pub fn to_premultiplied(self) -> PColor32 {
        match self.a {
            255 => PColor32::new(self.r, self.g, self.b, 255),
            0 => PColor32::default(),
            a => PColor32::new(
                premultiply_u8(self.r, a),
                premultiply_u8(self.g, a),
                premultiply_u8(self.b, a),
                a,
            ),
        }
    }

    /// Widens to 16 bits per channel.
    #[inline]
    pub fn to_color64(self) -> Color64 {
        let w = |c: u8| c as u16 * 257;
        Color64::new(w(self.r), w(self.g), w(self.b), w(self.a))
    }

    /// Returns the same color with the given alpha.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl PColor32 {
    /// Creates a premultiplied color; components should not exceed `a`.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the straight-alpha color.
    #[inline]
    pub fn to_straight(self) -> Color32 {
        match self.a {
            255 => Color32::new(self.r, self.g, self.b, 255),
            0 => Color32::TRANSPARENT,
            a => Color32::new(
                unpremultiply_u8(self.r, a),
                unpremultiply_u8(self.g, a),
                unpremultiply_u8(self.b, a),
                a,
            ),
        }
    }
}

impl Color64 {
    /// Creates a color from its components.
    #[inline]
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the color with premultiplied components.
    #[inline]
    pub fn to_premultiplied(self) -> PColor64 {
        match self.a {
            u16::MAX => PColor64::new(self.r, self.g, self.b, u16::MAX),
            0 => PColor64::default(),
            a => PColor64::new(
                premultiply_u16(self.r, a),
                premultiply_u16(self.g, a),
                premultiply_u16(self.b, a),
                a,
            ),
        }
    }

    /// Narrows to 8 bits per channel (keeps the high byte).
    #[inline]
    pub fn to_color32(self) -> Color32 {
        let n = |c: u16| (c >> 8) as u8;
        Color32::new(n(self.r), n(self.g), n(self.b), n(self.a))
    }
}

impl PColor64 {
    /// Creates a premultiplied color; components should not exceed `a`.
    #[inline]
    pub const fn new(r: u16, g: u16, b: u16, a: u16) -> Self {
        Self { r, g, b, a }
    }

    /// Returns the straight-alpha color.
    #[inline]
    pub fn to_straight(self) -> Color64 {
        match self.a {
            u16::MAX => Color64::new(self.r, self.g, self.b, u16::MAX),
            0 => Color64::default(),
            a => Color64::new(
                unpremultiply_u16(self.r, a),
                unpremultiply_u16(self.g, a),
                unpremultiply_u16(self.b, a),
                a,
            ),
        }
    }
}

impl ColorF {
    /// Creates a color from its components.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Converts an 8-bit color; `linear` decodes the sRGB channels to
    /// linear light, otherwise the encoded values are only rescaled.
    #[inline]
    pub fn from_color32(c: Color32, linear: bool) -> Self {
        let a = c.a as f32 / 255.0;
        if linear {
            Self::new(
                transfer::linear_from_u8(c.r),
                transfer::linear_from_u8(c.g),
                transfer::linear_from_u8(c.b),
                a,
            )
        } else {
            Self::new(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0, a)
        }
    }

    /// Converts a 16-bit color; see [`from_color32`](Self::from_color32).
    #[inline]
    pub fn from_color64(c: Color64, linear: bool) -> Self {
        let a = c.a as f32 / 65535.0;
        if linear {
            Self::new(
                transfer::linear_from_u16(c.r),
                transfer::linear_from_u16(c.g),
                transfer::linear_from_u16(c.b),
                a,
            )
        } else {
            Self::new(
                c.r as f32 / 65535.0,
                c.g as f32 / 65535.0,
                c.b as f32 / 65535.0,
                a,
            )
        }
    }

    /// Converts to an 8-bit color; `linear` states that `self` holds linear
    /// values which must be sRGB-encoded.
    #[inline]
    pub fn to_color32(self, linear: bool) -> Color32 {
        let a = unit_to_u8(self.a);
        if linear {
            Color32::new(
                transfer::u8_from_linear(self.r),
                transfer::u8_from_linear(self.g),
                transfer::u8_from_linear(self.b),
                a,
            )
        } else {
            Color32::new(unit_to_u8(self.r), unit_to_u8(self.g), unit_to_u8(self.b), a)
        }
    }

    /// Converts to a 16-bit color; see [`to_color32`](Self::to_color32).
    #[inline]
    pub fn to_color64(self, linear: bool) -> Color64 {
        let a = unit_to_u16(self.a);
        if linear {
            Color64::new(
                transfer::u16_from_linear(self.r),
                transfer::u16_from_linear(self.g),
                transfer::u16_from_linear(self.b),
                a,
            )
        } else {
            Color64::new(unit_to_u16(self.r), unit_to_u16(self.g), unit_to_u16(self.b), a)
        }
    }

    /// Decodes sRGB-encoded channels to linear light. Alpha is unchanged.
    #[inline]
    pub fn to_linear(self) -> Self {
        Self::new(
            transfer::eotf(self.r),
            transfer::eotf(self.g),
            transfer::eotf(self.b),
            self.a,
        )
    }

    /// Encodes linear channels to sRGB. Alpha is unchanged.
    #[inline]
    pub fn to_srgb(self) -> Self {
        Self::new(
            transfer::oetf(self.r),
            transfer::oetf(self.g),
            transfer::oetf(self.b),
            self.a,
        )
    }

    /// Clamps every component to [0, 1].
    #[inline]
    pub fn clip(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }

    /// Returns the color with premultiplied components.
    #[inline]
    pub fn to_premultiplied(self) -> PColorF {
        PColorF::new(self.r * self.a, self.g * self.a, self.b * self.a, self.a)
    }
}

impl PColorF {
    /// Creates a premultiplied color.
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Rescales an 8-bit premultiplied color without changing its encoding.
    #[inline]
    pub fn from_pcolor32(c: PColor32) -> Self {
        Self::new(
            c.r as f32 / 255.0,
            c.g as f32 / 255.0,
            c.b as f32 / 255.0,
            c.a as f32 / 255.0,
        )
    }

    /// Rescales a 16-bit premultiplied color without changing its encoding.
    #[inline]
    pub fn from_pcolor64(c: PColor64) -> Self {
        Self::new(
            c.r as f32 / 65535.0,
            c.g as f32 / 65535.0,
            c.b as f32 / 65535.0,
            c.a as f32 / 65535.0,
        )
    }

    /// Clamps alpha to [0, 1] and color components to [0, alpha].
    #[inline]
    pub fn clip(self) -> Self {
        let a = self.a.clamp(0.0, 1.0);
        Self::new(
            self.r.clamp(0.0, a),
            self.g.clamp(0.0, a),
            self.b.clamp(0.0, a),
            a,
        )
    }

    /// Returns the straight-alpha color. Zero alpha yields transparent black.
    #[inline]
    pub fn to_straight(self) -> ColorF {
        if self.a <= 0.0 {
            return ColorF::default();
        }
        let inv = 1.0 / self.a;
        ColorF::new(self.r * inv, self.g * inv, self.b * inv, self.a)
    }

    /// Rescales to an 8-bit premultiplied color without changing encoding.
    /// The value should be [`clip`](Self::clip)ped first.
    #[inline]
    pub fn to_pcolor32(self) -> PColor32 {
        PColor32::new(
            unit_to_u8(self.r),
            unit_to_u8(self.g),
            unit_to_u8(self.b),
            unit_to_u8(self.a),
        )
    }

    /// Rescales to a 16-bit premultiplied color without changing encoding.
    #[inline]
    pub fn to_pcolor64(self) -> PColor64 {
        PColor64::new(
            unit_to_u16(self.r),
            unit_to_u16(self.g),
            unit_to_u16(self.b),
            unit_to_u16(self.a),
        )
    }
}

impl Add for PColorF {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b, self.a + rhs.a)
    }
}

impl AddAssign for PColorF {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
        self.a += rhs.a;
    }
}

impl Mul<f32> for PColorF {
    type Output = Self;

    #[inline]
    fn mul(self, w: f32) -> Self {
        Self::new(self.r * w, self.g * w, self.b * w, self.a * w)
    }
}

impl From<PColor32> for Color32 {
    fn from(c: PColor32) -> Self {
        c.to_straight()
    }
}

impl From<Color32> for PColor32 {
    fn from(c: Color32) -> Self {
        c.to_premultiplied()
    }
}

impl From<Color32> for Color64 {
    fn from(c: Color32) -> Self {
        c.to_color64()
    }
}

impl From<Color64> for Color32 {
    fn from(c: Color64) -> Self {
        c.to_color32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_premultiply_roundtrip_opaque() {
        let c = Color32::new(12, 200, 99, 255);
        assert_eq!(c.to_premultiplied().to_straight(), c);
    }

    #[test]
    fn test_premultiply_half_alpha() {
        let p = Color32::new(255, 100, 0, 128).to_premultiplied();
        assert_eq!(p, PColor32::new(128, 50, 0, 128));
        let back = p.to_straight();
        assert_eq!(back.a, 128);
        assert_eq!(back.r, 255);
        assert!((back.g as i32 - 100).abs() <= 1);
    }

    #[test]
    fn test_transparent_loses_color() {
        let c = Color32::new(10, 20, 30, 0);
        assert_eq!(c.to_premultiplied().to_straight(), Color32::TRANSPARENT);
    }

    #[test]
    fn test_color64_widening() {
        let c = Color32::new(0, 128, 255, 255);
        let w = c.to_color64();
        assert_eq!(w, Color64::new(0, 128 * 257, 65535, 65535));
        assert_eq!(w.to_color32(), c);
    }

    #[test]
    fn test_color64_premultiply() {
        let c = Color64::new(65535, 0, 32768, 32768);
        let p = c.to_premultiplied();
        assert_eq!(p.a, 32768);
        assert!(p.r <= p.a && p.b <= p.a);
        let s = p.to_straight();
        assert_eq!(s.r, 65535);
    }

    #[test]
    fn test_colorf_srgb_and_linear() {
        let c = Color32::new(128, 64, 255, 255);
        let encoded = ColorF::from_color32(c, false);
        assert_abs_diff_eq!(encoded.r, 128.0 / 255.0);
        let linear = ColorF::from_color32(c, true);
        assert!(linear.r < encoded.r);
        assert_eq!(linear.to_color32(true), c);
        assert_eq!(encoded.to_color32(false), c);
        let via = encoded.to_linear().to_color32(true);
        assert_eq!(via, c);
    }

    #[test]
    fn test_pcolorf_clip() {
        let p = PColorF::new(1.2, -0.1, 0.6, 0.5).clip();
        assert_eq!(p, PColorF::new(0.5, 0.0, 0.5, 0.5));
        let p = PColorF::new(0.2, 0.2, 0.2, 1.3).clip();
        assert_eq!(p.a, 1.0);
    }

    #[test]
    fn test_pcolorf_accumulate() {
        let a = PColorF::new(0.2, 0.4, 0.6, 1.0);
        let b = PColorF::new(0.0, 0.0, 0.0, 0.0);
        let mut sum = PColorF::default();
        sum += a * 0.5;
        sum += b * 0.5;
        assert_abs_diff_eq!(sum.a, 0.5);
        let s = sum.to_straight();
        assert_abs_diff_eq!(s.r, 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(s.b, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_pcolor32_rescale() {
        let p = PColor32::new(64, 32, 0, 128);
        assert_eq!(PColorF::from_pcolor32(p).to_pcolor32(), p);
    }
}
