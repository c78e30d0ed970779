//! I/O error types
//!
//! Decoder and encoder failures carry the format they came from, so a
//! failed load can be reported without knowing which codec ran.

use graybench_core::ImageFormat;
use thiserror::Error;

/// Error type for image I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported or not enabled via features
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The image data is structurally invalid
    #[error("invalid {format:?} data: {message}")]
    InvalidData { format: ImageFormat, message: String },

    /// The header promises more pixel data than the input holds
    #[error("{format:?} data truncated: header needs {needed} bytes, {available} present")]
    Truncated {
        format: ImageFormat,
        needed: u64,
        available: u64,
    },

    /// A format-specific decoder returned an error
    #[error("{format:?} decode error: {message}")]
    DecodeError { format: ImageFormat, message: String },

    /// A format-specific encoder returned an error
    #[error("{format:?} encode error: {message}")]
    EncodeError { format: ImageFormat, message: String },

    /// An error from the core library (e.g. a buffer size mismatch)
    #[error("core error: {0}")]
    Core(#[from] graybench_core::Error),
}

impl IoError {
    pub(crate) fn invalid(format: ImageFormat, message: impl Into<String>) -> Self {
        IoError::InvalidData {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn decode(format: ImageFormat, message: impl Into<String>) -> Self {
        IoError::DecodeError {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn encode(format: ImageFormat, message: impl Into<String>) -> Self {
        IoError::EncodeError {
            format,
            message: message.into(),
        }
    }

    /// Fail unless `available` bytes cover `needed`.
    pub(crate) fn check_available(format: ImageFormat, needed: u64, available: u64) -> IoResult<()> {
        if needed > available {
            return Err(IoError::Truncated {
                format,
                needed,
                available,
            });
        }
        Ok(())
    }
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
