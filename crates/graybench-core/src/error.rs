//! Error types for graybench-core
//!
//! Provides a unified error type for raster construction and the grayscale
//! transforms. Each variant carries enough context to explain which
//! precondition was violated.

use thiserror::Error;

/// graybench-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Channel count outside 1..=4
    #[error("invalid channel count: {0}")]
    InvalidChannels(u32),

    /// The operation needs at least R, G and B samples
    #[error("unsupported channel count: {0} (at least 3 required)")]
    UnsupportedChannels(u32),

    /// Sample buffer length does not match the declared geometry
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Incompatible image sizes
    #[error("incompatible image sizes: {0}x{1} vs {2}x{3}")]
    IncompatibleSizes(u32, u32, u32, u32),

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for graybench-core operations
pub type Result<T> = std::result::Result<T, Error>;
