//! Behavioral tests of the resizing engine.

use raster_core::{Bitmap, Color32, PixelFormat, Rect, WorkingColorSpace};
use raster_ops::quantize::PredefinedColorsQuantizer;
use raster_ops::resize::{draw_into, resize, resize_with_context};
use raster_ops::{CancellationToken, Context, OperationStage, ProgressReporter, ResizeOptions, ScalingMode};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

const KERNEL_MODES: [ScalingMode; 12] = [
    ScalingMode::Box,
    ScalingMode::Bilinear,
    ScalingMode::Bicubic,
    ScalingMode::Lanczos2,
    ScalingMode::Lanczos3,
    ScalingMode::Spline,
    ScalingMode::CatmullRom,
    ScalingMode::MitchellNetravali,
    ScalingMode::Robidoux,
    ScalingMode::RobidouxSharp,
    ScalingMode::Welch,
    ScalingMode::Hermite,
];

fn opaque_pattern(width: u32, height: u32, format: PixelFormat) -> Bitmap {
    let mut bmp = Bitmap::new(width, height, format).unwrap();
    for y in 0..height {
        for x in 0..width {
            let c = Color32::from_rgb((x * 37 % 256) as u8, (y * 59 % 256) as u8, ((x ^ y) * 11 % 256) as u8);
            bmp.set_color32(x, y, c);
        }
    }
    bmp
}

fn checkerboard(size: u32) -> Bitmap {
    let mut bmp = Bitmap::new(size, size, PixelFormat::Argb32).unwrap();
    for y in 0..size {
        for x in 0..size {
            let c = if (x + y) % 2 == 0 { Color32::BLACK } else { Color32::WHITE };
            bmp.set_color32(x, y, c);
        }
    }
    bmp
}

fn options(mode: ScalingMode) -> ResizeOptions {
    ResizeOptions::default().with_scaling_mode(mode)
}

fn mean_and_variance(bmp: &Bitmap) -> (f64, f64) {
    let values: Vec<f64> = (0..bmp.height())
        .flat_map(|y| (0..bmp.width()).map(move |x| (x, y)))
        .map(|(x, y)| bmp.get_color32(x, y).r as f64)
        .collect();
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance)
}

/// Cancels its token after a number of processed rows.
struct CancelAfter {
    rows: usize,
    seen: AtomicUsize,
    token: CancellationToken,
}

impl ProgressReporter for CancelAfter {
    fn new_stage(&self, _stage: OperationStage, _total: usize) {}

    fn increment(&self) {
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 >= self.rows {
            self.token.cancel();
        }
    }

    fn complete(&self) {}
}

#[test]
fn test_identity_reproduces_source() {
    for format in [
        PixelFormat::Argb32,
        PixelFormat::PArgb32,
        PixelFormat::Argb64,
        PixelFormat::PArgb64,
        PixelFormat::RgbaF32,
        PixelFormat::Rgb24,
    ] {
        let src = opaque_pattern(13, 9, format);
        for mode in [ScalingMode::Box, ScalingMode::NearestNeighbor] {
            let dst = resize(&src, 13, 9, &options(mode)).unwrap();
            assert_eq!(dst.data(), src.data(), "{format} {mode}");
        }
    }
}

#[test]
fn test_solid_color_survives_every_filter() {
    let color = Color32::from_rgb(12, 200, 99);
    let src = Bitmap::filled(4, 4, PixelFormat::Argb32, color).unwrap();
    for mode in KERNEL_MODES {
        for (w, h) in [(1, 1), (3, 7), (4, 4), (16, 2), (33, 33)] {
            let dst = resize(&src, w, h, &options(mode)).unwrap();
            for y in 0..h {
                for x in 0..w {
                    assert_eq!(dst.get_color32(x, y), color, "{mode} {w}x{h} at ({x}, {y})");
                }
            }
        }
    }
}

#[test]
fn test_solid_color_in_every_target_format() {
    let color = Color32::from_rgb(40, 120, 240);
    let src = Bitmap::filled(4, 4, PixelFormat::PRgbaF32, color).unwrap();
    for format in PixelFormat::ALL {
        let mut dst = Bitmap::new(9, 5, format).unwrap();
        let bounds = dst.bounds();
        let completed = draw_into(&src, src.bounds(), &mut dst, bounds, &options(ScalingMode::Lanczos3), &Context::new()).unwrap();
        assert!(completed);
        let tolerance = if format == PixelFormat::Argb1555 { 8 } else { 1 };
        let got = dst.get_color32(4, 2);
        assert_eq!(got.a, 255, "{format}");
        for (a, b) in [(got.r, color.r), (got.g, color.g), (got.b, color.b)] {
            assert!((a as i32 - b as i32).abs() <= tolerance, "{format}: {got:?}");
        }
    }
}

#[test]
fn test_transparent_source_leaves_target_unchanged() {
    let src = Bitmap::new(10, 10, PixelFormat::Argb32).unwrap();
    for format in [PixelFormat::Argb32, PixelFormat::PArgb64, PixelFormat::RgbaF32] {
        let original = opaque_pattern(12, 12, format);
        for mode in [ScalingMode::NearestNeighbor, ScalingMode::Bicubic, ScalingMode::Lanczos3] {
            let mut dst = original.clone();
            let completed = draw_into(
                &src,
                src.bounds(),
                &mut dst,
                Rect::new(1, 2, 7, 9),
                &options(mode),
                &Context::new(),
            )
            .unwrap();
            assert!(completed);
            assert_eq!(dst.data(), original.data(), "{format} {mode}");
        }
    }
}

#[test]
fn test_downsampled_checkerboard_does_not_alias() {
    let src = checkerboard(60);
    let nearest = resize(&src, 20, 20, &options(ScalingMode::NearestNeighbor)).unwrap();
    let (_, nearest_variance) = mean_and_variance(&nearest);
    assert!(nearest_variance > 10_000.0);

    for mode in [
        ScalingMode::Box,
        ScalingMode::Bilinear,
        ScalingMode::Bicubic,
        ScalingMode::Lanczos3,
        ScalingMode::MitchellNetravali,
    ] {
        let dst = resize(&src, 20, 20, &options(mode)).unwrap();
        let (mean, variance) = mean_and_variance(&dst);
        assert!(variance < nearest_variance / 4.0, "{mode}: variance {variance}");
        assert!((mean - 127.5).abs() < 20.0, "{mode}: mean {mean}");
    }
}

#[test]
fn test_linear_working_space_is_brighter() {
    // one pixel wide black and white columns
    let mut src = Bitmap::new(8, 2, PixelFormat::Argb32).unwrap();
    for y in 0..2 {
        for x in 0..8 {
            src.set_color32(x, y, if x % 2 == 0 { Color32::BLACK } else { Color32::WHITE });
        }
    }
    let srgb = resize(&src, 4, 2, &options(ScalingMode::Box)).unwrap();
    let linear = resize(
        &src,
        4,
        2,
        &options(ScalingMode::Box).with_working_color_space(WorkingColorSpace::Linear),
    )
    .unwrap();
    let (s, l) = (srgb.get_color32(1, 0).r, linear.get_color32(1, 0).r);
    assert!((s as i32 - 128).abs() <= 1, "sRGB average {s}");
    assert!((l as i32 - 188).abs() <= 1, "linear average {l}");
}

#[test]
fn test_translucent_source_blends_with_target() {
    let src = Bitmap::filled(3, 3, PixelFormat::Argb32, Color32::new(255, 255, 255, 128)).unwrap();
    let mut dst = Bitmap::filled(6, 6, PixelFormat::Rgb24, Color32::BLACK).unwrap();
    let bounds = dst.bounds();
    assert!(draw_into(&src, src.bounds(), &mut dst, bounds, &options(ScalingMode::Bilinear), &Context::new()).unwrap());
    let c = dst.get_color32(3, 3);
    assert!((c.r as i32 - 128).abs() <= 1, "{c:?}");
}

#[test]
fn test_single_bit_alpha_threshold_skips_pixels() {
    let src = Bitmap::filled(2, 2, PixelFormat::Argb32, Color32::new(255, 0, 0, 100)).unwrap();
    let mut dst = Bitmap::new(4, 4, PixelFormat::Argb1555).unwrap();
    let bounds = dst.bounds();
    assert!(draw_into(&src, src.bounds(), &mut dst, bounds, &options(ScalingMode::Bicubic), &Context::new()).unwrap());
    assert_eq!(dst.get_color32(1, 1), Color32::TRANSPARENT);

    let src = Bitmap::filled(2, 2, PixelFormat::Argb32, Color32::new(255, 0, 0, 200)).unwrap();
    assert!(draw_into(&src, src.bounds(), &mut dst, bounds, &options(ScalingMode::Bicubic), &Context::new()).unwrap());
    assert_eq!(dst.get_color32(1, 1).a, 255);
}

#[test]
fn test_cancellation_mid_operation() {
    let src = opaque_pattern(32, 32, PixelFormat::Argb32);
    for mode in [ScalingMode::NearestNeighbor, ScalingMode::Lanczos3] {
        let token = CancellationToken::new();
        let reporter = Arc::new(CancelAfter {
            rows: 10,
            seen: AtomicUsize::new(0),
            token: token.clone(),
        });
        let ctx = Context::new()
            .with_cancellation(token)
            .with_progress(reporter)
            .with_max_parallelism(1);
        let mut dst = Bitmap::new(40, 100, PixelFormat::Argb32).unwrap();
        let bounds = dst.bounds();
        let completed = draw_into(&src, src.bounds(), &mut dst, bounds, &options(mode), &ctx).unwrap();
        assert!(!completed, "{mode}");
        assert_ne!(dst.get_color32(0, 9), Color32::TRANSPARENT, "{mode}");
        assert_eq!(dst.get_color32(0, 10), Color32::TRANSPARENT, "{mode}");
        assert_eq!(dst.get_color32(39, 99), Color32::TRANSPARENT, "{mode}");
    }
}

#[test]
fn test_cancellation_in_parallel_does_not_panic() {
    let src = opaque_pattern(300, 300, PixelFormat::PArgb32);
    let token = CancellationToken::new();
    let reporter = Arc::new(CancelAfter {
        rows: 5,
        seen: AtomicUsize::new(0),
        token: token.clone(),
    });
    let ctx = Context::new().with_cancellation(token).with_progress(reporter);
    let result = resize_with_context(&src, 200, 500, &options(ScalingMode::Lanczos3), &ctx).unwrap();
    assert!(result.is_none());
}

#[test]
fn test_large_parallel_resize_matches_sequential() {
    let src = opaque_pattern(150, 90, PixelFormat::Argb32);
    let parallel = resize(&src, 128, 200, &options(ScalingMode::Lanczos3)).unwrap();
    let mut sequential = Bitmap::new(128, 200, PixelFormat::Argb32).unwrap();
    let bounds = sequential.bounds();
    let ctx = Context::new().with_max_parallelism(1);
    assert!(draw_into(&src, src.bounds(), &mut sequential, bounds, &options(ScalingMode::Lanczos3), &ctx).unwrap());
    assert_eq!(parallel.data(), sequential.data());
}

#[test]
fn test_quantized_resize_uses_palette() {
    let src = opaque_pattern(20, 20, PixelFormat::Argb32);
    let palette = [0u8, 85, 170, 255].map(Color32::from_gray);
    for mode in [ScalingMode::NearestNeighbor, ScalingMode::Bilinear] {
        let options = options(mode).with_quantizer(PredefinedColorsQuantizer::grayscale4());
        let dst = resize(&src, 7, 11, &options).unwrap();
        for y in 0..11 {
            for x in 0..7 {
                assert!(palette.contains(&dst.get_color32(x, y)), "{mode} at ({x}, {y})");
            }
        }
    }
}
