//! Error types for the PICA video runtime
//!
//! This module defines the error types used throughout the runtime,
//! including allocation, transfer recording, and backend failures.

use std::fmt;

/// Result type for PICA video operations
pub type Result<T> = std::result::Result<T, Error>;

/// PICA video runtime errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, OpenGL)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (surface, framebuffer, staging buffer)
    InvalidResource(String),

    /// Initialization failed (runtime, allocator, stream buffers)
    InitializationFailed(String),

    /// Pixel format has no usable host representation
    UnsupportedFormat(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
