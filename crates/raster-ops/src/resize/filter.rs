//! Interpolation function catalog.
//!
//! Every interpolated [`ScalingMode`] maps to a support radius and a
//! weighting function `f(x)`, where `x` is the distance from the kernel
//! center measured in (scaled) source pixels.
//!
//! # Filters
//!
//! | Mode                  | Radius | Function                          |
//! |-----------------------|--------|-----------------------------------|
//! | `Box`                 | 0.5    | rectangle                         |
//! | `Bilinear`            | 1      | triangle                          |
//! | `Hermite`             | 1      | cubic, B=0 C=0                    |
//! | `Bicubic`             | 2      | Keys cubic, a=-0.5                |
//! | `Spline`              | 2      | cubic B-spline, B=1 C=0           |
//! | `CatmullRom`          | 2      | cubic, B=0 C=0.5                  |
//! | `MitchellNetravali`   | 2      | cubic, B=1/3 C=1/3                |
//! | `Robidoux`            | 2      | cubic, Robidoux B/C               |
//! | `RobidouxSharp`       | 2      | cubic, sharp Robidoux B/C         |
//! | `Lanczos2`            | 2      | windowed sinc                     |
//! | `Lanczos3`            | 3      | windowed sinc                     |
//! | `Welch`               | 3      | sinc with parabolic window        |
//!
//! `NearestNeighbor` has no kernel and `Auto` is resolved by the resizing
//! operation before a kernel is requested.

use raster_core::Size;
use std::f64::consts::PI;
use std::fmt;

/// Scaling algorithm of a resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalingMode {
    /// `MitchellNetravali` when enlarging along either axis, `Bicubic`
    /// otherwise.
    #[default]
    Auto,
    /// Picks the nearest source pixel; no interpolation.
    NearestNeighbor,
    /// Box filter (area average when shrinking).
    Box,
    /// Linear interpolation.
    Bilinear,
    /// Keys cubic convolution.
    Bicubic,
    /// Lanczos with two lobes.
    Lanczos2,
    /// Lanczos with three lobes.
    Lanczos3,
    /// Cubic B-spline; smooth, slightly blurry.
    Spline,
    /// Catmull-Rom spline.
    CatmullRom,
    /// Mitchell-Netravali cubic.
    MitchellNetravali,
    /// Robidoux cubic (cylindrical-optimized Mitchell variant).
    Robidoux,
    /// Sharper Robidoux cubic.
    RobidouxSharp,
    /// Welch windowed sinc.
    Welch,
    /// Hermite cubic.
    Hermite,
}

impl ScalingMode {
    /// All modes, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Auto,
        Self::NearestNeighbor,
        Self::Box,
        Self::Bilinear,
        Self::Bicubic,
        Self::Lanczos2,
        Self::Lanczos3,
        Self::Spline,
        Self::CatmullRom,
        Self::MitchellNetravali,
        Self::Robidoux,
        Self::RobidouxSharp,
        Self::Welch,
        Self::Hermite,
    ];

    /// Resolves [`Auto`](Self::Auto) for resizing `source` to `target`:
    /// `MitchellNetravali` if either axis is enlarged, `Bicubic` otherwise.
    /// Other modes are returned unchanged.
    ///
    /// ```rust
    /// use raster_core::Size;
    /// use raster_ops::resize::ScalingMode;
    ///
    /// let mode = ScalingMode::Auto.resolve(Size::new(10, 10), Size::new(5, 20));
    /// assert_eq!(mode, ScalingMode::MitchellNetravali);
    /// ```
    pub fn resolve(self, source: Size, target: Size) -> Self {
        match self {
            Self::Auto if target.width > source.width || target.height > source.height => {
                Self::MitchellNetravali
            }
            Self::Auto => Self::Bicubic,
            mode => mode,
        }
    }

    /// Support radius of the interpolation function, or `None` for modes
    /// without a kernel (`Auto`, `NearestNeighbor`).
    pub fn radius(self) -> Option<f64> {
        let r = match self {
            Self::Auto | Self::NearestNeighbor => return None,
            Self::Box => 0.5,
            Self::Bilinear | Self::Hermite => 1.0,
            Self::Bicubic
            | Self::Lanczos2
            | Self::Spline
            | Self::CatmullRom
            | Self::MitchellNetravali
            | Self::Robidoux
            | Self::RobidouxSharp => 2.0,
            Self::Lanczos3 | Self::Welch => 3.0,
        };
        Some(r)
    }

    /// Evaluates the interpolation function at `x`.
    ///
    /// Returns `0.0` for modes without a kernel.
    pub fn weight(self, x: f64) -> f64 {
        match self {
            Self::Auto | Self::NearestNeighbor => 0.0,
            Self::Box => box_weight(x),
            Self::Bilinear => triangle(x),
            Self::Bicubic => keys_cubic(x, -0.5),
            Self::Lanczos2 => lanczos(x, 2.0),
            Self::Lanczos3 => lanczos(x, 3.0),
            Self::Spline => bc_cubic(x, 1.0, 0.0),
            Self::CatmullRom => bc_cubic(x, 0.0, 0.5),
            Self::MitchellNetravali => bc_cubic(x, 1.0 / 3.0, 1.0 / 3.0),
            Self::Robidoux => bc_cubic(x, 0.378_215_755_093_998_67, 0.310_892_122_453_000_67),
            Self::RobidouxSharp => bc_cubic(x, 0.262_014_512_399_014_2, 0.368_992_743_800_492_9),
            Self::Welch => welch(x, 3.0),
            Self::Hermite => bc_cubic(x, 0.0, 0.0),
        }
    }

    /// Returns the mode name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::NearestNeighbor => "NearestNeighbor",
            Self::Box => "Box",
            Self::Bilinear => "Bilinear",
            Self::Bicubic => "Bicubic",
            Self::Lanczos2 => "Lanczos2",
            Self::Lanczos3 => "Lanczos3",
            Self::Spline => "Spline",
            Self::CatmullRom => "CatmullRom",
            Self::MitchellNetravali => "MitchellNetravali",
            Self::Robidoux => "Robidoux",
            Self::RobidouxSharp => "RobidouxSharp",
            Self::Welch => "Welch",
            Self::Hermite => "Hermite",
        }
    }
}

impl fmt::Display for ScalingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn box_weight(x: f64) -> f64 {
    // half-open so that a sample exactly between two pixels is counted once
    if x > -0.5 && x <= 0.5 { 1.0 } else { 0.0 }
}

#[inline]
fn triangle(x: f64) -> f64 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Keys cubic convolution kernel with parameter `a`.
#[inline]
fn keys_cubic(x: f64, a: f64) -> f64 {
    let ax = x.abs();
    let ax2 = ax * ax;
    let ax3 = ax2 * ax;
    if ax <= 1.0 {
        (a + 2.0) * ax3 - (a + 3.0) * ax2 + 1.0
    } else if ax < 2.0 {
        a * ax3 - 5.0 * a * ax2 + 8.0 * a * ax - 4.0 * a
    } else {
        0.0
    }
}

/// Mitchell-Netravali family of cubics, parameterized by B and C.
#[inline]
fn bc_cubic(x: f64, b: f64, c: f64) -> f64 {
    let ax = x.abs();
    let ax2 = ax * ax;
    let ax3 = ax2 * ax;
    let v = if ax < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) * ax3 + (-18.0 + 12.0 * b + 6.0 * c) * ax2 + (6.0 - 2.0 * b)
    } else if ax < 2.0 {
        (-b - 6.0 * c) * ax3 + (6.0 * b + 30.0 * c) * ax2 + (-12.0 * b - 48.0 * c) * ax
            + (8.0 * b + 24.0 * c)
    } else {
        return 0.0;
    };
    v / 6.0
}

#[inline]
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

#[inline]
fn lanczos(x: f64, lobes: f64) -> f64 {
    if x.abs() < lobes {
        sinc(x) * sinc(x / lobes)
    } else {
        0.0
    }
}

#[inline]
fn welch(x: f64, radius: f64) -> f64 {
    if x.abs() < radius {
        sinc(x) * (1.0 - (x * x) / (radius * radius))
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn kernel_modes() -> impl Iterator<Item = ScalingMode> {
        ScalingMode::ALL.into_iter().filter(|m| m.radius().is_some())
    }

    #[test]
    fn test_center_weight_positive() {
        for mode in kernel_modes() {
            assert!(mode.weight(0.0) > 0.0, "{mode}");
        }
    }

    #[test]
    fn test_zero_outside_radius() {
        for mode in kernel_modes() {
            let r = mode.radius().unwrap();
            assert_eq!(mode.weight(r + 0.01), 0.0, "{mode}");
            assert_eq!(mode.weight(-r - 0.01), 0.0, "{mode}");
        }
    }

    #[test]
    fn test_symmetric() {
        for mode in kernel_modes().filter(|m| *m != ScalingMode::Box) {
            for x in [0.1, 0.5, 0.9, 1.3, 1.7, 2.5] {
                assert_abs_diff_eq!(mode.weight(x), mode.weight(-x), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_interpolating_kernels() {
        // kernels that pass through the samples: 1 at 0, 0 at other integers
        for mode in [
            ScalingMode::Bilinear,
            ScalingMode::Bicubic,
            ScalingMode::CatmullRom,
            ScalingMode::Lanczos2,
            ScalingMode::Lanczos3,
            ScalingMode::Hermite,
        ] {
            assert_abs_diff_eq!(mode.weight(0.0), 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(mode.weight(1.0), 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(mode.weight(2.0), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_mitchell_values() {
        assert_abs_diff_eq!(ScalingMode::MitchellNetravali.weight(0.0), 8.0 / 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ScalingMode::Spline.weight(0.0), 2.0 / 3.0, epsilon = 1e-12);
        assert!(ScalingMode::CatmullRom.weight(1.5) < 0.0);
    }

    #[test]
    fn test_resolve_auto() {
        let small = Size::new(10, 10);
        let large = Size::new(20, 20);
        assert_eq!(ScalingMode::Auto.resolve(small, large), ScalingMode::MitchellNetravali);
        assert_eq!(ScalingMode::Auto.resolve(large, small), ScalingMode::Bicubic);
        assert_eq!(ScalingMode::Auto.resolve(small, small), ScalingMode::Bicubic);
        assert_eq!(ScalingMode::Box.resolve(small, large), ScalingMode::Box);
    }

    #[test]
    fn test_kernelless_modes() {
        assert_eq!(ScalingMode::Auto.radius(), None);
        assert_eq!(ScalingMode::NearestNeighbor.radius(), None);
        assert_eq!(ScalingMode::default(), ScalingMode::Auto);
    }
}
