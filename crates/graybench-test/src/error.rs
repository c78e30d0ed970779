//! Error types for the test framework

use thiserror::Error;

/// Errors raised while preparing test inputs
#[derive(Debug, Error)]
pub enum TestError {
    /// Failed to encode a fixture to disk
    #[error("failed to build fixture '{name}': {message}")]
    Fixture { name: String, message: String },
}

/// Result type for test operations
pub type TestResult<T> = Result<T, TestError>;
