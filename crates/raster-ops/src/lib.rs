//! # raster-ops
//!
//! Image resizing for `raster-core` bitmaps.
//!
//! This crate resizes rectangles between bitmaps of any pixel format with
//! nearest-neighbor mapping or separable convolution kernels, blending the
//! result onto the target in sRGB or linear space.
//!
//! # Modules
//!
//! - [`resize`] - kernel maps, resizing sessions, [`draw_into`](resize::draw_into)
//! - [`quantize`] - quantizer and ditherer contracts with simple implementations
//! - [`context`] - cancellation and progress reporting
//!
//! # Example
//!
//! ```rust
//! use raster_core::{Bitmap, Color32, PixelFormat};
//! use raster_ops::{resize, ResizeOptions, ScalingMode};
//!
//! let src = Bitmap::filled(40, 30, PixelFormat::Argb32, Color32::from_rgb(200, 10, 10)).unwrap();
//! let options = ResizeOptions::default().with_scaling_mode(ScalingMode::Bilinear);
//! let dst = resize::resize(&src, 80, 60, &options).unwrap();
//! assert_eq!(dst.get_color32(79, 59), Color32::from_rgb(200, 10, 10));
//! ```
//!
//! ## Color reduction
//!
//! ```rust
//! use raster_core::{Bitmap, Color32, PixelFormat};
//! use raster_ops::quantize::{OrderedDitherer, PredefinedColorsQuantizer};
//! use raster_ops::{resize, ResizeOptions};
//!
//! let src = Bitmap::filled(16, 16, PixelFormat::Argb32, Color32::from_gray(90)).unwrap();
//! let options = ResizeOptions::default()
//!     .with_quantizer(PredefinedColorsQuantizer::grayscale4())
//!     .with_ditherer(OrderedDitherer::default());
//! let dst = resize::resize(&src, 8, 8, &options).unwrap();
//! let gray = dst.get_color32(0, 0).r;
//! assert!([0, 85, 170, 255].contains(&gray));
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - process rows on the Rayon thread pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod context;
mod error;
mod parallel;
pub mod quantize;
pub mod resize;

pub use context::{CancellationToken, Context, OperationStage, ProgressReporter};
pub use error::{OpsError, OpsResult};
pub use resize::{ResizeOptions, ScalingMode};
