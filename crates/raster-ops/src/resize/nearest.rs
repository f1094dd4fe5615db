//! Nearest-neighbor resizing.
//!
//! Destination pixel `(x, y)` of the target rectangle takes source pixel
//! `(floor(x * sw / tw), floor(y * sh / th))` of the source rectangle. No
//! kernels are involved; the picked color is composited onto the target
//! the same way interpolated results are.

use crate::context::Context;
use crate::parallel;
use crate::resize::color::{PaletteWriter, ResizeColor, composite};
use raster_core::{Bitmap, ReadRow, Rect};

/// Scaled position of destination index `i`, relative to the rectangle.
#[inline]
fn nearest_index(i: u32, source_length: u32, target_length: u32) -> u32 {
    let s = (i as u64 * source_length as u64 / target_length as u64) as u32;
    s.min(source_length - 1)
}

pub(crate) struct NearestNeighborSession<'a> {
    source: &'a Bitmap,
    source_rect: Rect,
    target_rect: Rect,
    /// Absolute source column of every target column.
    columns: Vec<u32>,
    linear: bool,
    parallel: bool,
}

impl<'a> NearestNeighborSession<'a> {
    /// Both rectangles must be non-empty and inside their bitmaps.
    pub(crate) fn new(
        source: &'a Bitmap,
        source_rect: Rect,
        target_rect: Rect,
        linear: bool,
        parallel: bool,
    ) -> Self {
        let columns = (0..target_rect.width)
            .map(|x| source_rect.x + nearest_index(x, source_rect.width, target_rect.width))
            .collect();
        Self {
            source,
            source_rect,
            target_rect,
            columns,
            linear,
            parallel,
        }
    }

    #[inline]
    fn source_y(&self, target_y: u32) -> u32 {
        let dy = target_y - self.target_rect.y;
        self.source_rect.y + nearest_index(dy, self.source_rect.height, self.target_rect.height)
    }

    /// Writes the target rectangle in color type `C`.
    pub(crate) fn process_direct<C: ResizeColor>(&self, target: &mut Bitmap, context: &Context) -> bool {
        let alpha_threshold = target.format().info().alpha_threshold.unwrap_or(0);
        let (left, linear) = (self.target_rect.x, self.linear);
        let rows = target
            .rows_mut(self.target_rect.y..self.target_rect.bottom())
            .collect();
        parallel::process_rows(rows, self.parallel, context, |row| {
            let source_row = self.source.row(self.source_y(row.y()));
            for (x, &sx) in (left..).zip(&self.columns) {
                composite(row, x, C::read(&source_row, sx), linear, alpha_threshold);
            }
        })
    }

    /// Writes the target rectangle through a quantizing or dithering
    /// session.
    pub(crate) fn process_quantized(
        &self,
        target: &mut Bitmap,
        writer: PaletteWriter<'_>,
        context: &Context,
    ) -> bool {
        let (left, linear) = (self.target_rect.x, self.linear);
        let rows = target
            .rows_mut(self.target_rect.y..self.target_rect.bottom())
            .collect();
        parallel::process_rows(rows, self.parallel, context, |row| {
            let source_row = self.source.row(self.source_y(row.y()));
            for (x, &sx) in (left..).zip(&self.columns) {
                writer.write(row, x, source_row.get_color32(sx), linear);
            }
        })
    }
}
