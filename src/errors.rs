// SPDX-License-Identifier: MPL-2.0

//! Error types for the depth viewer

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Device-related errors
    Device(DeviceError),
    /// Compositing errors
    Compose(ComposeError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Device-specific errors
#[derive(Debug, Clone)]
pub enum DeviceError {
    /// Device initialization failed
    InitializationFailed(String),
    /// Rejected device configuration
    InvalidConfig(String),
    /// No frame arrived within the requested wait
    Timeout,
    /// Producer thread exited; no further frames will arrive
    Disconnected,
    /// Mask model inference failed
    Model(String),
}

/// Compositing errors
#[derive(Debug, Clone)]
pub enum ComposeError {
    /// Flat buffer length does not match the declared grid
    ShapeMismatch { expected: usize, actual: usize },
    /// Two panels disagree on dimensions
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },
    /// A panel has zero width or height
    EmptyPanel,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Device(e) => write!(f, "Device error: {}", e),
            AppError::Compose(e) => write!(f, "Compose error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            DeviceError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            DeviceError::Timeout => write!(f, "Timed out waiting for frame"),
            DeviceError::Disconnected => write!(f, "Device disconnected"),
            DeviceError::Model(msg) => write!(f, "Model inference failed: {}", msg),
        }
    }
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposeError::ShapeMismatch { expected, actual } => {
                write!(f, "Buffer length {} does not match grid size {}", actual, expected)
            }
            ComposeError::DimensionMismatch { left, right } => write!(
                f,
                "Panel dimensions differ: {}x{} vs {}x{}",
                left.0, left.1, right.0, right.1
            ),
            ComposeError::EmptyPanel => write!(f, "Panel has zero width or height"),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DeviceError {}
impl std::error::Error for ComposeError {}

// Conversions from sub-errors to AppError
impl From<DeviceError> for AppError {
    fn from(err: DeviceError) -> Self {
        AppError::Device(err)
    }
}

impl From<ComposeError> for AppError {
    fn from(err: ComposeError) -> Self {
        AppError::Compose(err)
    }
}

// Conversions for I/O errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}
