//! Row dispatch for per-row image operations.
//!
//! Operations hand a batch of disjoint destination rows to
//! [`process_rows`], which runs them on the Rayon pool or in order on the
//! calling thread. Either way every row polls cancellation before it starts
//! and reports one progress increment when it is done.
//!
//! Without the `parallel` feature everything runs sequentially.

use crate::context::Context;
use raster_core::RowMut;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Row loop was interrupted by cancellation.
struct Cancelled;

/// Decides whether rows of a `width`-pixel wide operation should be
/// processed in parallel.
///
/// `sequential` is set when a collaborator (an error-diffusion ditherer)
/// needs rows in order.
pub(crate) fn should_parallelize(
    width: u32,
    threshold: u32,
    sequential: bool,
    context: &Context,
) -> bool {
    cfg!(feature = "parallel") && !sequential && context.max_parallelism() != 1 && width >= threshold
}

/// Runs `f` on every row of `rows`.
///
/// Returns `false` if cancellation was requested; rows that already ran
/// keep their output.
pub(crate) fn process_rows<'a, F>(
    rows: Vec<RowMut<'a>>,
    parallel: bool,
    context: &Context,
    f: F,
) -> bool
where
    F: Fn(&mut RowMut<'a>) + Send + Sync,
{
    let process = |mut row: RowMut<'a>| -> Result<(), Cancelled> {
        if context.is_cancellation_requested() {
            return Err(Cancelled);
        }
        f(&mut row);
        context.increment();
        Ok(())
    };

    #[cfg(feature = "parallel")]
    if parallel {
        return rows.into_par_iter().try_for_each(process).is_ok();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    rows.into_iter().try_for_each(process).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancellationToken;
    use raster_core::{Bitmap, Color32, PixelFormat, ReadRow};

    #[test]
    fn test_all_rows_visited() {
        let mut bmp = Bitmap::new(4, 16, PixelFormat::Argb32).unwrap();
        let ctx = Context::new();
        for parallel in [false, true] {
            let rows: Vec<_> = bmp.rows_mut(0..16).collect();
            let done = process_rows(rows, parallel, &ctx, |row| {
                let y = row.y() as u8;
                row.set_color32(0, Color32::from_gray(y));
            });
            assert!(done);
        }
        for y in 0..16 {
            assert_eq!(bmp.get_color32(0, y), Color32::from_gray(y as u8));
        }
    }

    #[test]
    fn test_cancelled_before_start() {
        let mut bmp = Bitmap::new(4, 4, PixelFormat::Argb32).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = Context::new().with_cancellation(token);
        let rows: Vec<_> = bmp.rows_mut(0..4).collect();
        assert!(!process_rows(rows, true, &ctx, |row| row.set_color32(0, Color32::WHITE)));
        assert_eq!(bmp.get_color32(0, 0), Color32::TRANSPARENT);
    }

    #[test]
    fn test_should_parallelize() {
        let ctx = Context::new();
        assert!(!should_parallelize(10, 64, false, &ctx));
        assert!(!should_parallelize(100, 64, true, &ctx));
        assert!(!should_parallelize(100, 64, false, &ctx.clone().with_max_parallelism(1)));
        assert_eq!(should_parallelize(100, 64, false, &ctx), cfg!(feature = "parallel"));
    }
}
