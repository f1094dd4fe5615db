//! Error types for raster-core operations.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of the storage layer:
//! - Bitmap allocation and size validation
//! - Pixel and region bounds checking
//! - Raw buffer construction (stride, length)
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Error, Result};
//!
//! fn check_pixel(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_pixel(3, 3, 2, 2).is_err());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - derive macro for [`std::error::Error`]
//!
//! # Used By
//!
//! - [`crate::bitmap::Bitmap`] - construction and region checks
//! - `raster-ops` - wrapped into `OpsError::Core`

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by bitmap storage and geometry.
///
/// # Categories
///
/// - **Bounds errors**: [`OutOfBounds`](Error::OutOfBounds), [`InvalidRegion`](Error::InvalidRegion)
/// - **Size errors**: [`InvalidDimensions`](Error::InvalidDimensions), [`InvalidStride`](Error::InvalidStride)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside bitmap bounds.
    #[error("pixel ({x}, {y}) out of bounds for bitmap {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Bitmap width
        width: u32,
        /// Bitmap height
        height: u32,
    },

    /// Region is empty or extends beyond bitmap bounds.
    #[error("region ({rx}, {ry}, {rw}x{rh}) is not a valid area of bitmap {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: u32,
        /// Region Y origin
        ry: u32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
        /// Bitmap width
        width: u32,
        /// Bitmap height
        height: u32,
    },

    /// Invalid bitmap dimensions.
    ///
    /// Returned when width or height is zero, or the buffer size would
    /// overflow `usize`.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the given width and pixel size.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Bitmap width
        width: u32,
    },

    /// Memory allocation failed.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error from a rectangle and the
    /// size of the bitmap it was checked against.
    #[inline]
    pub fn invalid_region(region: crate::Rect, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            rx: region.x,
            ry: region.y,
            rw: region.width,
            rh: region.height,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }
}
