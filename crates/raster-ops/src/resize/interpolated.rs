//! Two-pass separable resizing with a sliding window.
//!
//! # Algorithm
//!
//! 1. Horizontal pass: a source row is read as premultiplied samples and
//!    convolved by the kernel of every target column.
//! 2. The results are stored transposed in a window that holds a band of
//!    consecutive source rows:
//!
//! ```text
//! window[column * capacity + (source_row - top)]
//! ```
//!
//! 3. Vertical pass: the kernel of a target row runs down one window column
//!    per target pixel.
//!
//! Target rows are processed top to bottom in bands. Before a band starts,
//! the window slides so it covers every source row the band's kernels
//! need: rows still in use move to the top of each column, the rest are
//! computed from the source. The window is only mutated between bands;
//! rows of a band read it concurrently.
//!
//! Memory is `O(target_width * capacity)` regardless of the source height.

use crate::context::Context;
use crate::parallel;
use crate::resize::color::{PaletteWriter, ResizeColor, SourceAccessor, composite};
use crate::resize::kernel::KernelMap;
use crate::OpsResult;
use raster_core::{Bitmap, Color32, PColorF, ReadRow, Rect, RowMut};
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Window rows used when nothing forces a different capacity.
const MIN_WINDOW_ROWS: usize = 64;

/// First-pass results for a band of source rows, stored column-major.
struct Window {
    samples: Vec<PColorF>,
    columns: usize,
    capacity: usize,
    /// First source row held, relative to the source rectangle.
    top: usize,
    /// Number of valid rows.
    rows: usize,
}

impl Window {
    fn new(columns: usize, capacity: usize) -> Self {
        Self {
            samples: vec![PColorF::default(); columns * capacity],
            columns,
            capacity,
            top: 0,
            rows: 0,
        }
    }

    #[inline]
    fn covers(&self, start: usize, end: usize) -> bool {
        start >= self.top && end <= self.top + self.rows
    }

    #[inline]
    fn column(&self, column: usize) -> &[PColorF] {
        let from = column * self.capacity;
        &self.samples[from..from + self.rows]
    }
}

pub(crate) struct InterpolatedSession<'a> {
    source: &'a Bitmap,
    source_rect: Rect,
    target_rect: Rect,
    horizontal: KernelMap,
    vertical: KernelMap,
    accessor: SourceAccessor,
    linear: bool,
    parallel: bool,
    window: Window,
}

impl<'a> InterpolatedSession<'a> {
    /// Builds both kernel maps and the window. Both rectangles must be
    /// non-empty and inside their bitmaps.
    pub(crate) fn new(
        source: &'a Bitmap,
        source_rect: Rect,
        target_rect: Rect,
        horizontal: KernelMap,
        vertical: KernelMap,
        linear: bool,
        parallel: bool,
    ) -> Self {
        let rows = default_capacity(vertical.max_diameter(), source_rect.height as usize);
        debug!(
            horizontal_periodic = horizontal.is_periodic(),
            vertical_periodic = vertical.is_periodic(),
            window_rows = rows,
            parallel,
            "interpolated session"
        );
        Self {
            accessor: SourceAccessor::select(source.format(), linear),
            window: Window::new(target_rect.width as usize, rows),
            source,
            source_rect,
            target_rect,
            horizontal,
            vertical,
            linear,
            parallel,
        }
    }

    /// Overrides the window capacity; never below the longest vertical
    /// kernel.
    pub(crate) fn with_window_rows(mut self, rows: usize) -> Self {
        let rows = rows.max(self.vertical.max_diameter());
        self.window = Window::new(self.target_rect.width as usize, rows);
        self
    }

    /// Horizontal pass of one source row (relative to the source
    /// rectangle); one sample per target column.
    fn convolve_row(&self, row: usize) -> Vec<PColorF> {
        let source_row = self.source.row(self.source_rect.y + row as u32);
        let line: Vec<PColorF> = (0..self.source_rect.width)
            .map(|x| self.accessor.read(&source_row, self.source_rect.x + x))
            .collect();
        self.horizontal.iter().map(|k| k.convolve(&line)).collect()
    }

    /// Slides the window so it holds source rows `start..end` (relative to
    /// the source rectangle), filling it with as many following rows as
    /// fit.
    fn ensure(&mut self, start: usize, end: usize) {
        if self.window.covers(start, end) {
            return;
        }
        let source_rows = self.source_rect.height as usize;
        let new_top = start;
        let new_bottom = (start + self.window.capacity).min(source_rows).max(end);

        // rows already computed move to their new position
        let old_bottom = self.window.top + self.window.rows;
        let keep_from = self.window.top.max(new_top);
        let keep_to = old_bottom.min(new_bottom);
        let kept = keep_from..keep_to.max(keep_from);
        if !kept.is_empty() {
            let from = kept.start - self.window.top;
            let to = kept.start - new_top;
            let len = kept.len();
            for column in 0..self.window.columns {
                let base = column * self.window.capacity;
                self.window
                    .samples
                    .copy_within(base + from..base + from + len, base + to);
            }
        }

        let missing: Vec<usize> = (new_top..new_bottom).filter(|r| !kept.contains(r)).collect();
        let lines = self.convolve_rows(&missing);
        let capacity = self.window.capacity;
        for (row, line) in missing.iter().zip(lines) {
            let offset = row - new_top;
            for (column, sample) in line.into_iter().enumerate() {
                self.window.samples[column * capacity + offset] = sample;
            }
        }
        self.window.top = new_top;
        self.window.rows = new_bottom - new_top;
    }

    fn convolve_rows(&self, rows: &[usize]) -> Vec<Vec<PColorF>> {
        #[cfg(feature = "parallel")]
        if self.parallel {
            return rows.par_iter().map(|&r| self.convolve_row(r)).collect();
        }
        rows.iter().map(|&r| self.convolve_row(r)).collect()
    }

    /// Runs the bands; `emit` writes one row given the vertical pass of a
    /// target column. Returns `false` on cancellation.
    fn run<F>(&mut self, target: &mut Bitmap, parallel: bool, context: &Context, emit: F) -> bool
    where
        F: Fn(&mut RowMut<'_>, u32, PColorF) + Send + Sync,
    {
        let height = self.target_rect.height as usize;
        let mut band_start = 0;
        while band_start < height {
            if context.is_cancellation_requested() {
                debug!(row = band_start, "resize cancelled");
                return false;
            }
            let first = self.vertical.kernel(band_start);
            let (start, end) = (first.start(), first.end());
            self.ensure(start, end);

            let mut band_end = band_start + 1;
            while band_end < height {
                let k = self.vertical.kernel(band_end);
                if !self.window.covers(k.start(), k.end()) {
                    break;
                }
                band_end += 1;
            }

            let rows = target
                .rows_mut(
                    self.target_rect.y + band_start as u32..self.target_rect.y + band_end as u32,
                )
                .collect();
            let (window, vertical, target_rect) = (&self.window, &self.vertical, self.target_rect);
            let completed = parallel::process_rows(rows, parallel, context, |row| {
                let kernel = vertical.kernel((row.y() - target_rect.y) as usize);
                for column in 0..window.columns {
                    let acc = kernel.convolve_window(window.column(column), window.top);
                    emit(row, target_rect.x + column as u32, acc.clip());
                }
            });
            if !completed {
                debug!(row = band_start, "resize cancelled");
                return false;
            }
            band_start = band_end;
        }
        true
    }

    /// Writes the target rectangle in color type `C`.
    pub(crate) fn process_direct<C: ResizeColor>(
        &mut self,
        target: &mut Bitmap,
        context: &Context,
    ) -> bool {
        let alpha_threshold = target.format().info().alpha_threshold.unwrap_or(0);
        let linear = self.linear;
        let parallel = self.parallel;
        self.run(target, parallel, context, |row, x, acc| {
            composite(row, x, C::from_accumulator(acc, linear), linear, alpha_threshold);
        })
    }

    /// Writes the target rectangle through a quantizing or dithering
    /// session.
    pub(crate) fn process_quantized(
        &mut self,
        target: &mut Bitmap,
        writer: PaletteWriter<'_>,
        context: &Context,
    ) -> bool {
        let linear = self.linear;
        let parallel = self.parallel;
        self.run(target, parallel, context, |row, x, acc| {
            writer.write(row, x, Color32::from_accumulator(acc, linear), linear);
        })
    }
}

fn default_capacity(max_diameter: usize, source_rows: usize) -> usize {
    (2 * max_diameter)
        .max(MIN_WINDOW_ROWS)
        .min(source_rows)
        .max(max_diameter)
}

/// Builds the session for one resize call.
pub(crate) fn create<'a>(
    source: &'a Bitmap,
    source_rect: Rect,
    target_rect: Rect,
    mode: crate::resize::ScalingMode,
    linear: bool,
    parallel: bool,
) -> OpsResult<InterpolatedSession<'a>> {
    let horizontal = KernelMap::new(source_rect.width as usize, target_rect.width as usize, mode)?;
    let vertical = KernelMap::new(source_rect.height as usize, target_rect.height as usize, mode)?;
    Ok(InterpolatedSession::new(
        source,
        source_rect,
        target_rect,
        horizontal,
        vertical,
        linear,
        parallel,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancellationToken;
    use crate::resize::ScalingMode;
    use raster_core::PixelFormat;

    fn gradient(width: u32, height: u32) -> Bitmap {
        let mut bmp = Bitmap::new(width, height, PixelFormat::Argb32).unwrap();
        for y in 0..height {
            for x in 0..width {
                let c = Color32::new(
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    ((x * 7 + y * 13) % 256) as u8,
                    (128 + (x + y) % 128) as u8,
                );
                bmp.set_color32(x, y, c);
            }
        }
        bmp
    }

    fn run(
        src: &Bitmap,
        w: u32,
        h: u32,
        mode: ScalingMode,
        window_rows: Option<usize>,
    ) -> Bitmap {
        let mut dst = Bitmap::new(w, h, PixelFormat::Argb32).unwrap();
        let mut session = create(src, src.bounds(), dst.bounds(), mode, false, false).unwrap();
        if let Some(rows) = window_rows {
            session = session.with_window_rows(rows);
        }
        assert!(session.process_direct::<Color32>(&mut dst, &Context::new()));
        dst
    }

    /// Straightforward two-pass convolution over the whole image.
    fn reference(src: &Bitmap, w: u32, h: u32, mode: ScalingMode) -> Bitmap {
        let horizontal = KernelMap::new(src.width() as usize, w as usize, mode).unwrap();
        let vertical = KernelMap::new(src.height() as usize, h as usize, mode).unwrap();
        let accessor = SourceAccessor::select(src.format(), false);
        let first: Vec<Vec<PColorF>> = (0..src.height())
            .map(|y| {
                let row = src.row(y);
                let line: Vec<PColorF> = (0..src.width()).map(|x| accessor.read(&row, x)).collect();
                horizontal.iter().map(|k| k.convolve(&line)).collect()
            })
            .collect();
        let mut dst = Bitmap::new(w, h, PixelFormat::Argb32).unwrap();
        for y in 0..h {
            let k = vertical.kernel(y as usize);
            let mut row = dst.row_mut(y);
            for x in 0..w {
                let column: Vec<PColorF> = first.iter().map(|line| line[x as usize]).collect();
                let acc = k.convolve(&column).clip();
                composite(&mut row, x, Color32::from_accumulator(acc, false), false, 0);
            }
        }
        dst
    }

    #[test]
    fn test_window_matches_reference() {
        let src = gradient(23, 97);
        for (mode, w, h) in [
            (ScalingMode::Bicubic, 11, 31),
            (ScalingMode::Lanczos3, 40, 200),
            (ScalingMode::Bilinear, 23, 97),
            (ScalingMode::Box, 7, 13),
        ] {
            let expected = reference(&src, w, h, mode);
            let minimal = run(&src, w, h, mode, Some(0));
            let full = run(&src, w, h, mode, Some(src.height() as usize));
            assert_eq!(minimal.data(), expected.data(), "{mode} minimal window");
            assert_eq!(full.data(), expected.data(), "{mode} full window");
        }
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(default_capacity(10, 1000), 64);
        assert_eq!(default_capacity(40, 1000), 80);
        assert_eq!(default_capacity(10, 30), 30);
        assert_eq!(default_capacity(10, 5), 10);
    }

    #[test]
    fn test_cancel_returns_false() {
        let src = gradient(8, 8);
        let mut dst = Bitmap::new(16, 16, PixelFormat::Argb32).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = Context::new().with_cancellation(token);
        let mut session =
            create(&src, src.bounds(), dst.bounds(), ScalingMode::Bilinear, false, false).unwrap();
        assert!(!session.process_direct::<Color32>(&mut dst, &ctx));
        assert_eq!(dst.get_color32(0, 0), Color32::TRANSPARENT);
    }

    #[test]
    fn test_sub_rectangles() {
        let src = Bitmap::filled(10, 10, PixelFormat::Argb32, Color32::from_rgb(0, 0, 255)).unwrap();
        let mut dst = Bitmap::new(10, 10, PixelFormat::Argb32).unwrap();
        let mut session = create(
            &src,
            Rect::new(2, 2, 4, 4),
            Rect::new(3, 3, 5, 5),
            ScalingMode::Lanczos3,
            false,
            false,
        )
        .unwrap();
        assert!(session.process_direct::<Color32>(&mut dst, &Context::new()));
        assert_eq!(dst.get_color32(3, 3), Color32::from_rgb(0, 0, 255));
        assert_eq!(dst.get_color32(7, 7), Color32::from_rgb(0, 0, 255));
        assert_eq!(dst.get_color32(2, 2), Color32::TRANSPARENT);
        assert_eq!(dst.get_color32(8, 8), Color32::TRANSPARENT);
    }
}
