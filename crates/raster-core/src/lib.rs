//! # raster-core
//!
//! Core types for raster image processing.
//!
//! This crate provides the storage and color layer used by `raster-ops`:
//!
//! - [`Color32`], [`PColor32`], [`Color64`], [`PColor64`], [`ColorF`], [`PColorF`] -
//!   the six interchangeable color representations
//! - [`BlendColor`] - sRGB and linear source-over formulas for each of them
//! - [`WorkingColorSpace`] - which space blending and resampling math runs in
//! - [`PixelFormat`] - runtime pixel layouts and their descriptors
//! - [`Bitmap`], [`Row`], [`RowMut`] - row-major storage with per-row access
//! - [`Rect`], [`Size`] - regions of a bitmap
//!
//! ## Crate Structure
//!
//! ```text
//! raster-core (this crate)
//!    ^
//!    |
//!    +-- raster-ops (resizing, quantizer/ditherer contracts)
//!    +-- raster-bench
//! ```
//!
//! ## Example
//!
//! ```rust
//! use raster_core::prelude::*;
//!
//! let mut bmp = Bitmap::new(16, 16, PixelFormat::PArgb32).unwrap();
//! bmp.clear(Color32::new(255, 0, 0, 128));
//!
//! let px = bmp.row(3).get_pcolor32(3);
//! assert_eq!(px.r, px.a);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod bitmap;
pub mod blend;
pub mod color;
pub mod colorspace;
pub mod error;
pub mod format;
pub mod rect;
pub mod transfer;

// Re-exports for convenience
pub use bitmap::{Bitmap, ReadRow, Row, RowMut};
pub use blend::BlendColor;
pub use color::{Color32, Color64, ColorF, PColor32, PColor64, PColorF};
pub use colorspace::WorkingColorSpace;
pub use error::{Error, Result};
pub use format::{ColorWidth, PixelFormat, PixelFormatInfo};
pub use rect::{Rect, Size};

/// Prelude module for convenient imports.
///
/// ```
/// use raster_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bitmap::{Bitmap, ReadRow, Row, RowMut};
    pub use crate::blend::BlendColor;
    pub use crate::color::{Color32, Color64, ColorF, PColor32, PColor64, PColorF};
    pub use crate::colorspace::WorkingColorSpace;
    pub use crate::error::{Error, Result};
    pub use crate::format::{ColorWidth, PixelFormat};
    pub use crate::rect::{Rect, Size};
}
