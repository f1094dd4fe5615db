//! Image resizing.
//!
//! Draws a rectangle of a source bitmap into a rectangle of a target bitmap
//! of any size, or resizes a whole bitmap into a new one.
//!
//! # Sessions
//!
//! - [`ScalingMode::NearestNeighbor`] maps every target pixel to one source
//!   pixel.
//! - Every other mode runs a two-pass separable convolution with one
//!   [`KernelMap`] per axis, see [`KernelMap`] for the kernel layout.
//!
//! Produced colors are composited onto the target: opaque colors replace
//! the target pixel, transparent ones leave it alone, translucent ones are
//! blended in the working color space.
//!
//! # Color reduction
//!
//! With a [`Quantizer`] in the options, produced colors go through the
//! quantizing session (and the [`Ditherer`] session, if any) before they
//! are written. Quantizers that need the final image to compute their
//! palette get it from a temporary bitmap holding the unquantized result.
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Bitmap, Color32, PixelFormat, Rect};
//! use raster_ops::context::Context;
//! use raster_ops::resize::{draw_into, ResizeOptions, ScalingMode};
//!
//! let src = Bitmap::filled(64, 64, PixelFormat::Argb32, Color32::from_rgb(0, 128, 255)).unwrap();
//! let mut dst = Bitmap::new(100, 100, PixelFormat::PArgb32).unwrap();
//!
//! let options = ResizeOptions::default().with_scaling_mode(ScalingMode::Lanczos3);
//! let completed = draw_into(
//!     &src,
//!     src.bounds(),
//!     &mut dst,
//!     Rect::new(10, 10, 32, 32),
//!     &options,
//!     &Context::new(),
//! )
//! .unwrap();
//! assert!(completed);
//! assert_eq!(dst.get_color32(20, 20), Color32::from_rgb(0, 128, 255));
//! ```
//!
//! # Dependencies
//!
//! - `raster-core` - bitmaps, colors, blending
//! - `rayon` - parallel rows (feature `parallel`)
//! - `tracing` - diagnostics

mod color;
mod filter;
mod interpolated;
mod kernel;
mod nearest;

pub use filter::ScalingMode;
pub use kernel::{KernelMap, ResizeKernel};

use crate::context::{Context, OperationStage};
use crate::parallel;
use crate::quantize::{Ditherer, DitheringSession, Quantizer, QuantizingSession};
use crate::{OpsError, OpsResult};
use color::{ColorRepresentation, PaletteWriter};
use interpolated::InterpolatedSession;
use nearest::NearestNeighborSession;
use raster_core::{
    Bitmap, Color32, Color64, ColorF, PColor32, PColor64, PColorF, ReadRow, Rect,
    WorkingColorSpace,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Default minimum target width for processing rows in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: u32 = 64;

/// Settings of a resize operation.
///
/// # Example
///
/// ```rust
/// use raster_core::WorkingColorSpace;
/// use raster_ops::resize::{ResizeOptions, ScalingMode};
///
/// let options = ResizeOptions::default()
///     .with_scaling_mode(ScalingMode::Lanczos2)
///     .with_working_color_space(WorkingColorSpace::Linear);
/// assert_eq!(options.parallel_threshold, 64);
/// ```
#[derive(Clone)]
pub struct ResizeOptions {
    /// Scaling algorithm.
    pub scaling_mode: ScalingMode,
    /// Color space of blending and convolution.
    pub working_color_space: WorkingColorSpace,
    /// Optional color reduction of the written pixels.
    pub quantizer: Option<Arc<dyn Quantizer>>,
    /// Optional dithering; only used together with a quantizer.
    pub ditherer: Option<Arc<dyn Ditherer>>,
    /// Minimum target width for parallel row processing.
    pub parallel_threshold: u32,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            scaling_mode: ScalingMode::Auto,
            working_color_space: WorkingColorSpace::Default,
            quantizer: None,
            ditherer: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ResizeOptions {
    /// Sets the scaling mode.
    pub fn with_scaling_mode(mut self, mode: ScalingMode) -> Self {
        self.scaling_mode = mode;
        self
    }

    /// Sets the working color space.
    pub fn with_working_color_space(mut self, space: WorkingColorSpace) -> Self {
        self.working_color_space = space;
        self
    }

    /// Sets the quantizer.
    pub fn with_quantizer(mut self, quantizer: impl Quantizer + 'static) -> Self {
        self.quantizer = Some(Arc::new(quantizer));
        self
    }

    /// Sets the ditherer.
    pub fn with_ditherer(mut self, ditherer: impl Ditherer + 'static) -> Self {
        self.ditherer = Some(Arc::new(ditherer));
        self
    }

    /// Sets the minimum target width for parallel row processing.
    pub fn with_parallel_threshold(mut self, threshold: u32) -> Self {
        self.parallel_threshold = threshold;
        self
    }
}

impl fmt::Debug for ResizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeOptions")
            .field("scaling_mode", &self.scaling_mode)
            .field("working_color_space", &self.working_color_space)
            .field("quantizer", &self.quantizer.is_some())
            .field("ditherer", &self.ditherer.is_some())
            .field("parallel_threshold", &self.parallel_threshold)
            .finish()
    }
}

/// Resizing session of one call.
enum Session<'a> {
    Nearest(NearestNeighborSession<'a>),
    Interpolated(InterpolatedSession<'a>),
}

impl<'a> Session<'a> {
    fn create(
        source: &'a Bitmap,
        source_rect: Rect,
        target_rect: Rect,
        mode: ScalingMode,
        linear: bool,
        parallel: bool,
    ) -> OpsResult<Self> {
        let session = match mode {
            ScalingMode::NearestNeighbor => Self::Nearest(NearestNeighborSession::new(
                source,
                source_rect,
                target_rect,
                linear,
                parallel,
            )),
            mode => Self::Interpolated(interpolated::create(
                source,
                source_rect,
                target_rect,
                mode,
                linear,
                parallel,
            )?),
        };
        Ok(session)
    }

    fn process_direct<C: color::ResizeColor>(&mut self, target: &mut Bitmap, context: &Context) -> bool {
        match self {
            Self::Nearest(s) => s.process_direct::<C>(target, context),
            Self::Interpolated(s) => s.process_direct::<C>(target, context),
        }
    }

    fn process_quantized(
        &mut self,
        target: &mut Bitmap,
        writer: PaletteWriter<'_>,
        context: &Context,
    ) -> bool {
        match self {
            Self::Nearest(s) => s.process_quantized(target, writer, context),
            Self::Interpolated(s) => s.process_quantized(target, writer, context),
        }
    }
}

/// Draws `source_rect` of `source` into `target_rect` of `target`.
///
/// Returns `Ok(true)` when every target row was written and `Ok(false)`
/// when `context` requested cancellation; rows written before that are
/// kept.
///
/// # Errors
///
/// - [`OpsError::Core`] if a rectangle is empty or outside its bitmap
/// - [`OpsError::InvalidParameter`] for a ditherer without a quantizer
/// - any error of the quantizer or ditherer initialization
pub fn draw_into(
    source: &Bitmap,
    source_rect: Rect,
    target: &mut Bitmap,
    target_rect: Rect,
    options: &ResizeOptions,
    context: &Context,
) -> OpsResult<bool> {
    trace!(
        src = %source_rect,
        dst = %target_rect,
        src_format = %source.format(),
        dst_format = %target.format(),
        mode = %options.scaling_mode,
        "resize::draw_into"
    );
    source.validate_region(source_rect)?;
    target.validate_region(target_rect)?;

    let mode = options.scaling_mode.resolve(source_rect.size(), target_rect.size());
    match (&options.quantizer, &options.ditherer) {
        (None, None) => draw_direct(source, source_rect, target, target_rect, mode, options, context),
        (None, Some(_)) => Err(OpsError::InvalidParameter(
            "a ditherer requires a quantizer".into(),
        )),
        (Some(quantizer), ditherer) if quantizer.initialize_relies_on_content() => {
            draw_content_reliant(
                source,
                source_rect,
                target,
                target_rect,
                mode,
                quantizer.as_ref(),
                ditherer.as_deref(),
                options,
                context,
            )
        }
        (Some(quantizer), ditherer) => draw_quantized(
            source,
            source_rect,
            target,
            target_rect,
            mode,
            quantizer.as_ref(),
            ditherer.as_deref(),
            options,
            context,
        ),
    }
}

/// Resizes `source` into a new bitmap of the same format.
///
/// # Errors
///
/// Returns [`OpsError::InvalidDimensions`] for a zero target size and
/// forwards the errors of [`draw_into`].
///
/// # Example
///
/// ```rust
/// use raster_core::{Bitmap, Color32, PixelFormat};
/// use raster_ops::resize::{resize, ResizeOptions};
///
/// let src = Bitmap::filled(8, 8, PixelFormat::Argb64, Color32::WHITE).unwrap();
/// let dst = resize(&src, 3, 5, &ResizeOptions::default()).unwrap();
/// assert_eq!(dst.size().width, 3);
/// assert_eq!(dst.get_color32(1, 4), Color32::WHITE);
/// ```
pub fn resize(
    source: &Bitmap,
    width: u32,
    height: u32,
    options: &ResizeOptions,
) -> OpsResult<Bitmap> {
    resize_with_context(source, width, height, options, &Context::new())?
        .ok_or_else(|| OpsError::Unsupported("resize without cancellation was cancelled".into()))
}

/// Resizes `source` into a new bitmap of the same format, observing
/// `context`. Returns `Ok(None)` if the operation was cancelled.
///
/// # Errors
///
/// Same as [`resize`].
pub fn resize_with_context(
    source: &Bitmap,
    width: u32,
    height: u32,
    options: &ResizeOptions,
    context: &Context,
) -> OpsResult<Option<Bitmap>> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "target size must be > 0, got {width}x{height}"
        )));
    }
    let mut target = Bitmap::new(width, height, source.format())?;
    let bounds = target.bounds();
    let completed = draw_into(source, source.bounds(), &mut target, bounds, options, context)?;
    Ok(completed.then_some(target))
}

fn draw_direct(
    source: &Bitmap,
    source_rect: Rect,
    target: &mut Bitmap,
    target_rect: Rect,
    mode: ScalingMode,
    options: &ResizeOptions,
    context: &Context,
) -> OpsResult<bool> {
    let linear = options.working_color_space.is_linear_for(target.format());
    let parallel =
        parallel::should_parallelize(target_rect.width, options.parallel_threshold, false, context);
    let representation = ColorRepresentation::select(target.format(), linear);
    debug!(%mode, linear, parallel, ?representation, "direct resize");

    let mut session = Session::create(source, source_rect, target_rect, mode, linear, parallel)?;
    context.new_stage(OperationStage::ProcessingPixels, target_rect.height as usize);
    let completed = match representation {
        ColorRepresentation::Color32 => session.process_direct::<Color32>(target, context),
        ColorRepresentation::PColor32 => session.process_direct::<PColor32>(target, context),
        ColorRepresentation::Color64 => session.process_direct::<Color64>(target, context),
        ColorRepresentation::PColor64 => session.process_direct::<PColor64>(target, context),
        ColorRepresentation::ColorF => session.process_direct::<ColorF>(target, context),
        ColorRepresentation::PColorF => session.process_direct::<PColorF>(target, context),
    };
    if completed {
        context.complete();
    }
    Ok(completed)
}

/// Sessions created for the quantized modes.
struct PaletteSessions {
    quantizer: Arc<dyn QuantizingSession>,
    ditherer: Option<Box<dyn DitheringSession>>,
}

impl PaletteSessions {
    /// Initializes the sessions against `area` of `bitmap`. Returns `None`
    /// if cancellation was requested meanwhile.
    fn initialize(
        quantizer: &dyn Quantizer,
        ditherer: Option<&dyn Ditherer>,
        bitmap: &Bitmap,
        area: Rect,
        context: &Context,
    ) -> OpsResult<Option<Self>> {
        context.new_stage(OperationStage::InitializingQuantizer, 1);
        let quantizing = quantizer.initialize(bitmap, area, context)?;
        context.complete();
        if context.is_cancellation_requested() {
            return Ok(None);
        }

        let dithering = match ditherer {
            Some(ditherer) => {
                context.new_stage(OperationStage::InitializingDitherer, 1);
                let session = ditherer.initialize(bitmap, area, Arc::clone(&quantizing), context)?;
                context.complete();
                if context.is_cancellation_requested() {
                    return Ok(None);
                }
                Some(session)
            }
            None => None,
        };
        Ok(Some(Self {
            quantizer: quantizing,
            ditherer: dithering,
        }))
    }

    fn is_sequential(&self) -> bool {
        self.ditherer.as_ref().is_some_and(|d| d.is_sequential())
    }

    fn writer(&self) -> PaletteWriter<'_> {
        PaletteWriter::new(self.quantizer.as_ref(), self.ditherer.as_deref())
    }

    /// Linear blending if explicitly requested or preferred by the
    /// quantizer; quantized colors are 8-bit sRGB otherwise.
    fn is_linear(&self, requested: WorkingColorSpace) -> bool {
        let space = match requested {
            WorkingColorSpace::Default => self.quantizer.working_color_space(),
            space => space,
        };
        space == WorkingColorSpace::Linear
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_quantized(
    source: &Bitmap,
    source_rect: Rect,
    target: &mut Bitmap,
    target_rect: Rect,
    mode: ScalingMode,
    quantizer: &dyn Quantizer,
    ditherer: Option<&dyn Ditherer>,
    options: &ResizeOptions,
    context: &Context,
) -> OpsResult<bool> {
    let Some(sessions) = PaletteSessions::initialize(quantizer, ditherer, target, target_rect, context)?
    else {
        debug!("resize cancelled during quantizer initialization");
        return Ok(false);
    };
    let linear = sessions.is_linear(options.working_color_space);
    let sequential = sessions.is_sequential();
    let parallel = parallel::should_parallelize(
        target_rect.width,
        options.parallel_threshold,
        sequential,
        context,
    );
    debug!(%mode, linear, parallel, sequential, "quantized resize");

    let mut session = Session::create(source, source_rect, target_rect, mode, linear, parallel)?;
    context.new_stage(OperationStage::ProcessingPixels, target_rect.height as usize);
    let completed = session.process_quantized(target, sessions.writer(), context);
    if completed {
        context.complete();
    }
    Ok(completed)
}

/// Resizes into a temporary copy of the target region, lets the quantizer
/// analyze the result, then writes the quantized pixels back.
#[allow(clippy::too_many_arguments)]
fn draw_content_reliant(
    source: &Bitmap,
    source_rect: Rect,
    target: &mut Bitmap,
    target_rect: Rect,
    mode: ScalingMode,
    quantizer: &dyn Quantizer,
    ditherer: Option<&dyn Ditherer>,
    options: &ResizeOptions,
    context: &Context,
) -> OpsResult<bool> {
    debug!(%mode, "quantizer relies on content, resizing into a temporary bitmap");
    let mut temp = Bitmap::new(target_rect.width, target_rect.height, target.format())?;
    target.copy_region(target_rect, &mut temp, 0, 0)?;
    let temp_bounds = temp.bounds();
    if !draw_direct(source, source_rect, &mut temp, temp_bounds, mode, options, context)? {
        return Ok(false);
    }

    let Some(sessions) = PaletteSessions::initialize(quantizer, ditherer, &temp, temp_bounds, context)?
    else {
        debug!("resize cancelled during quantizer initialization");
        return Ok(false);
    };
    let parallel = parallel::should_parallelize(
        target_rect.width,
        options.parallel_threshold,
        sessions.is_sequential(),
        context,
    );

    context.new_stage(OperationStage::ProcessingPixels, target_rect.height as usize);
    let (quantizing, dithering) = (sessions.quantizer.as_ref(), sessions.ditherer.as_deref());
    let rows = target.rows_mut(target_rect.y..target_rect.bottom()).collect();
    let completed = parallel::process_rows(rows, parallel, context, |row| {
        let y = row.y();
        let temp_row = temp.row(y - target_rect.y);
        for dx in 0..target_rect.width {
            let c = temp_row.get_color32(dx);
            let x = target_rect.x + dx;
            let out = match dithering {
                Some(d) => d.dithered_color(c, x, y),
                None => quantizing.quantized_color(c),
            };
            row.set_color32(x, out);
        }
    });
    if completed {
        context.complete();
    }
    Ok(completed)
}
