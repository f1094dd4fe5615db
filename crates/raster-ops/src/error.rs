//! Error types for image operations.

use thiserror::Error;

/// Error type for image operations.
///
/// Cancellation is not an error: operations report it as `Ok(false)`.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions or rectangles specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Operation not supported for this input.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// A quantizer or ditherer could not create its session.
    #[error("quantizer error: {0}")]
    Quantizer(String),

    /// Error from the storage layer.
    #[error(transparent)]
    Core(#[from] raster_core::Error),
}

/// Result type for image operations.
pub type OpsResult<T> = Result<T, OpsError>;
