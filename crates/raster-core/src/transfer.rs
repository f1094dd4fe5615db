//! sRGB transfer function.
//!
//! Integer color types ([`Color32`](crate::Color32), [`Color64`](crate::Color64))
//! hold gamma-encoded sRGB samples, floating color types are linear when
//! stored in a float bitmap. Blending in the linear working space decodes with
//! [`eotf`] and re-encodes with [`oetf`].
//!
//! # Range
//!
//! - Input/Output: [0, 1]; values outside are clamped.
//!
//! # Reference
//!
//! IEC 61966-2-1:1999

use std::sync::LazyLock;

/// Linear values of all 256 8-bit sRGB levels.
static LINEAR_FROM_U8: LazyLock<[f32; 256]> = LazyLock::new(|| {
    let mut table = [0.0f32; 256];
    for (i, v) in table.iter_mut().enumerate() {
        *v = eotf(i as f32 / 255.0);
    }
    table
});

/// sRGB EOTF: decodes sRGB encoded values to linear light.
///
/// # Formula
///
/// ```text
/// if V <= 0.04045:
///     L = V / 12.92
/// else:
///     L = ((V + 0.055) / 1.055)^2.4
/// ```
///
/// # Example
///
/// ```rust
/// use raster_core::transfer::eotf;
///
/// let linear = eotf(0.5);
/// assert!((linear - 0.214).abs() < 0.01);
/// ```
#[inline]
pub fn eotf(v: f32) -> f32 {
    let v = v.clamp(0.0, 1.0);
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB OETF: encodes linear light to sRGB.
///
/// # Formula
///
/// ```text
/// if L <= 0.0031308:
///     V = L * 12.92
/// else:
///     V = 1.055 * L^(1/2.4) - 0.055
/// ```
#[inline]
pub fn oetf(l: f32) -> f32 {
    let l = l.clamp(0.0, 1.0);
    if l <= 0.0031308 {
        l * 12.92
    } else {
        1.055 * l.powf(1.0 / 2.4) - 0.055
    }
}

/// Decodes an 8-bit sRGB level to linear light using a lookup table.
#[inline]
pub fn linear_from_u8(v: u8) -> f32 {
    LINEAR_FROM_U8[v as usize]
}

/// Decodes a 16-bit sRGB level to linear light.
#[inline]
pub fn linear_from_u16(v: u16) -> f32 {
    eotf(v as f32 / 65535.0)
}

/// Encodes linear light to an 8-bit sRGB level.
#[inline]
pub fn u8_from_linear(l: f32) -> u8 {
    (oetf(l) * 255.0).round() as u8
}

/// Encodes linear light to a 16-bit sRGB level.
#[inline]
pub fn u16_from_linear(l: f32) -> u16 {
    (oetf(l) * 65535.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_roundtrip() {
        for i in 0..=100 {
            let v = i as f32 / 100.0;
            assert_abs_diff_eq!(oetf(eotf(v)), v, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_u8_levels_roundtrip() {
        for v in 0..=255u8 {
            assert_eq!(u8_from_linear(linear_from_u8(v)), v);
        }
    }

    #[test]
    fn test_u16_endpoints() {
        assert_eq!(linear_from_u16(0), 0.0);
        assert_abs_diff_eq!(linear_from_u16(u16::MAX), 1.0, epsilon = 1e-6);
        assert_eq!(u16_from_linear(1.0), u16::MAX);
    }

    #[test]
    fn test_clamps_out_of_range() {
        assert_eq!(eotf(-0.5), 0.0);
        assert_abs_diff_eq!(oetf(2.0), 1.0, epsilon = 1e-6);
    }
}
