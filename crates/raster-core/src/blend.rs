//! Alpha blending of single colors.
//!
//! Two source-over formulas are provided for every color type through
//! [`BlendColor`]:
//!
//! - [`blend_with_background`](BlendColor::blend_with_background) - the
//!   background is opaque, the result stays opaque:
//!   `out = src * src.a + back * (1 - src.a)`
//! - [`blend_with`](BlendColor::blend_with) - Porter-Duff Over onto a
//!   translucent background:
//!   `out.a = src.a + back.a * (1 - src.a)`,
//!   `out = (src * src.a + back * back.a * (1 - src.a)) / out.a`
//!
//! Each exists in an sRGB and a linear variant, selected with the `linear`
//! flag. Integer colors are always stored sRGB, so their linear variant
//! decodes, blends and re-encodes. Float colors are linear, so their sRGB
//! variant does the opposite round trip.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{BlendColor, Color32};
//!
//! let fg = Color32::new(255, 0, 0, 128);
//! let bg = Color32::new(0, 0, 255, 255);
//! let out = fg.blend_with_background(bg, false);
//! assert_eq!(out.a, 255);
//! assert!(out.r > 120 && out.b > 120);
//! ```

use crate::{Color32, Color64, ColorF, PColor32, PColor64, PColorF};

/// Source-over compositing of a color onto a background of the same type.
pub trait BlendColor: Copy {
    /// Alpha is at its maximum.
    fn is_opaque(self) -> bool;

    /// Alpha is zero.
    fn is_transparent(self) -> bool;

    /// Alpha scaled to `0..=255`, for alpha threshold comparisons.
    fn alpha_u8(self) -> u8;

    /// Blends `self` over an opaque `background`; the result is opaque.
    fn blend_with_background(self, background: Self, linear: bool) -> Self;

    /// Blends `self` over a possibly translucent `background`.
    fn blend_with(self, background: Self, linear: bool) -> Self;
}

#[inline]
fn over_opaque(src: ColorF, back: ColorF) -> ColorF {
    let a = src.a;
    let inv = 1.0 - a;
    ColorF::new(
        src.r * a + back.r * inv,
        src.g * a + back.g * inv,
        src.b * a + back.b * inv,
        1.0,
    )
}

#[inline]
fn over(src: ColorF, back: ColorF) -> ColorF {
    let back_weight = back.a * (1.0 - src.a);
    let out_a = src.a + back_weight;
    if out_a <= 0.0 {
        return ColorF::default();
    }
    let inv_out_a = 1.0 / out_a;
    ColorF::new(
        (src.r * src.a + back.r * back_weight) * inv_out_a,
        (src.g * src.a + back.g * back_weight) * inv_out_a,
        (src.b * src.a + back.b * back_weight) * inv_out_a,
        out_a,
    )
}

#[inline]
fn premultiplied_over(src: PColorF, back: PColorF, opaque_back: bool) -> PColorF {
    let inv = 1.0 - src.a;
    PColorF::new(
        src.r + back.r * inv,
        src.g + back.g * inv,
        src.b + back.b * inv,
        if opaque_back { 1.0 } else { src.a + back.a * inv },
    )
}

impl BlendColor for Color32 {
    #[inline]
    fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }

    #[inline]
    fn is_transparent(self) -> bool {
        self.a == 0
    }

    #[inline]
    fn alpha_u8(self) -> u8 {
        self.a
    }

    fn blend_with_background(self, background: Self, linear: bool) -> Self {
        let out = over_opaque(
            ColorF::from_color32(self, linear),
            ColorF::from_color32(background, linear),
        );
        out.to_color32(linear)
    }

    fn blend_with(self, background: Self, linear: bool) -> Self {
        let out = over(
            ColorF::from_color32(self, linear),
            ColorF::from_color32(background, linear),
        );
        out.to_color32(linear)
    }
}

impl BlendColor for Color64 {
    #[inline]
    fn is_opaque(self) -> bool {
        self.a == u16::MAX
    }

    #[inline]
    fn is_transparent(self) -> bool {
        self.a == 0
    }

    #[inline]
    fn alpha_u8(self) -> u8 {
        (self.a >> 8) as u8
    }

    fn blend_with_background(self, background: Self, linear: bool) -> Self {
        let out = over_opaque(
            ColorF::from_color64(self, linear),
            ColorF::from_color64(background, linear),
        );
        out.to_color64(linear)
    }

    fn blend_with(self, background: Self, linear: bool) -> Self {
        let out = over(
            ColorF::from_color64(self, linear),
            ColorF::from_color64(background, linear),
        );
        out.to_color64(linear)
    }
}

impl BlendColor for PColor32 {
    #[inline]
    fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }

    #[inline]
    fn is_transparent(self) -> bool {
        self.a == 0
    }

    #[inline]
    fn alpha_u8(self) -> u8 {
        self.a
    }

    fn blend_with_background(self, background: Self, linear: bool) -> Self {
        if linear {
            return self
                .to_straight()
                .blend_with_background(background.to_straight(), true)
                .to_premultiplied();
        }
        premultiplied_over(
            PColorF::from_pcolor32(self),
            PColorF::from_pcolor32(background),
            true,
        )
        .clip()
        .to_pcolor32()
    }

    fn blend_with(self, background: Self, linear: bool) -> Self {
        if linear {
            return self
                .to_straight()
                .blend_with(background.to_straight(), true)
                .to_premultiplied();
        }
        premultiplied_over(
            PColorF::from_pcolor32(self),
            PColorF::from_pcolor32(background),
            false,
        )
        .clip()
        .to_pcolor32()
    }
}

impl BlendColor for PColor64 {
    #[inline]
    fn is_opaque(self) -> bool {
        self.a == u16::MAX
    }

    #[inline]
    fn is_transparent(self) -> bool {
        self.a == 0
    }

    #[inline]
    fn alpha_u8(self) -> u8 {
        (self.a >> 8) as u8
    }

    fn blend_with_background(self, background: Self, linear: bool) -> Self {
        if linear {
            return self
                .to_straight()
                .blend_with_background(background.to_straight(), true)
                .to_premultiplied();
        }
        premultiplied_over(
            PColorF::from_pcolor64(self),
            PColorF::from_pcolor64(background),
            true,
        )
        .clip()
        .to_pcolor64()
    }

    fn blend_with(self, background: Self, linear: bool) -> Self {
        if linear {
            return self
                .to_straight()
                .blend_with(background.to_straight(), true)
                .to_premultiplied();
        }
        premultiplied_over(
            PColorF::from_pcolor64(self),
            PColorF::from_pcolor64(background),
            false,
        )
        .clip()
        .to_pcolor64()
    }
}

impl BlendColor for ColorF {
    #[inline]
    fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    #[inline]
    fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    fn blend_with_background(self, background: Self, linear: bool) -> Self {
        if linear {
            over_opaque(self, background)
        } else {
            over_opaque(self.to_srgb(), background.to_srgb()).to_linear()
        }
    }

    fn blend_with(self, background: Self, linear: bool) -> Self {
        if linear {
            over(self, background)
        } else {
            over(self.to_srgb(), background.to_srgb()).to_linear()
        }
    }
}

impl BlendColor for PColorF {
    #[inline]
    fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    fn is_transparent(self) -> bool {
        self.a <= 0.0
    }

    #[inline]
    fn alpha_u8(self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    fn blend_with_background(self, background: Self, linear: bool) -> Self {
        if linear {
            premultiplied_over(self, background, true)
        } else {
            self.to_straight()
                .blend_with_background(background.to_straight(), false)
                .to_premultiplied()
        }
    }

    fn blend_with(self, background: Self, linear: bool) -> Self {
        if linear {
            premultiplied_over(self, background, false)
        } else {
            self.to_straight()
                .blend_with(background.to_straight(), false)
                .to_premultiplied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_over_opaque_background_stays_opaque() {
        let fg = Color32::new(255, 255, 255, 64);
        let bg = Color32::new(0, 0, 0, 255);
        let out = fg.blend_with_background(bg, false);
        assert_eq!(out.a, 255);
        assert_eq!(out.r, 64);
    }

    #[test]
    fn test_linear_blend_is_brighter() {
        let fg = Color32::new(255, 255, 255, 128);
        let bg = Color32::BLACK;
        let srgb = fg.blend_with_background(bg, false);
        let linear = fg.blend_with_background(bg, true);
        assert!(linear.r > srgb.r);
    }

    #[test]
    fn test_blend_with_transparent_background_keeps_source() {
        let fg = Color32::new(10, 200, 30, 100);
        let out = fg.blend_with(Color32::TRANSPARENT, false);
        assert_eq!(out, fg);
    }

    #[test]
    fn test_blend_with_combines_alpha() {
        let fg = Color32::new(255, 0, 0, 128);
        let bg = Color32::new(0, 0, 255, 128);
        let out = fg.blend_with(bg, false);
        // 0.502 + 0.502 * 0.498
        assert_eq!(out.a, 192);
        assert!(out.r > out.b);
    }

    #[test]
    fn test_premultiplied_matches_straight() {
        let fg = Color32::new(200, 100, 50, 100);
        let bg = Color32::new(20, 40, 60, 200);
        let straight = fg.blend_with(bg, false);
        let premultiplied = fg
            .to_premultiplied()
            .blend_with(bg.to_premultiplied(), false)
            .to_straight();
        assert!((straight.r as i32 - premultiplied.r as i32).abs() <= 2);
        assert!((straight.g as i32 - premultiplied.g as i32).abs() <= 2);
        assert_eq!(straight.a, premultiplied.a);
    }

    #[test]
    fn test_pcolorf_linear_over() {
        let fg = PColorF::new(0.25, 0.0, 0.0, 0.5);
        let bg = PColorF::new(0.0, 0.0, 1.0, 1.0);
        let out = fg.blend_with_background(bg, true);
        assert_abs_diff_eq!(out.r, 0.25);
        assert_abs_diff_eq!(out.b, 0.5);
        assert_eq!(out.a, 1.0);
    }

    #[test]
    fn test_colorf_srgb_roundtrip_when_opaque_source() {
        let fg = ColorF::new(0.3, 0.6, 0.9, 1.0);
        let bg = ColorF::new(0.1, 0.1, 0.1, 1.0);
        let out = fg.blend_with_background(bg, false);
        assert_abs_diff_eq!(out.g, 0.6, epsilon = 1e-5);
    }

    #[test]
    fn test_alpha_u8_scales() {
        assert_eq!(Color64::new(0, 0, 0, 0x8000).alpha_u8(), 128);
        assert_eq!(ColorF::new(0.0, 0.0, 0.0, 1.5).alpha_u8(), 255);
        assert!(PColor64::new(0, 0, 0, u16::MAX).is_opaque());
    }
}
