// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner

use std::fmt;

/// Result type alias using ScanError
pub type ScanResult<T> = Result<T, ScanError>;

/// Top-level error type
#[derive(Debug)]
pub enum ScanError {
    /// Camera-related errors
    Camera(CameraError),
    /// Frame acquisition errors
    Frame(FrameError),
    /// Terminal/presentation errors
    Display(String),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Camera-specific errors
#[derive(Debug)]
pub enum CameraError {
    /// The requested device could not be opened or streamed
    DeviceUnavailable { index: usize, reason: String },
    /// The device offers no pixel format this tool can consume
    UnsupportedFormat(String),
}

/// Errors while reading frames from an open source
#[derive(Debug)]
pub enum FrameError {
    /// The capture stream ended (device disconnected or read failed).
    /// Terminates the session; there is no retry policy.
    EndOfStream(String),
    /// A frame arrived but its contents could not be interpreted
    Malformed(String),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Camera(e) => write!(f, "Camera error: {}", e),
            ScanError::Frame(e) => write!(f, "Frame error: {}", e),
            ScanError::Display(msg) => write!(f, "Display error: {}", msg),
            ScanError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScanError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::DeviceUnavailable { index, reason } => {
                write!(f, "Camera {} unavailable: {}", index, reason)
            }
            CameraError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::EndOfStream(msg) => write!(f, "Capture stream ended: {}", msg),
            FrameError::Malformed(msg) => write!(f, "Malformed frame: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}
impl std::error::Error for CameraError {}
impl std::error::Error for FrameError {}

impl From<CameraError> for ScanError {
    fn from(err: CameraError) -> Self {
        ScanError::Camera(err)
    }
}

impl From<FrameError> for ScanError {
    fn from(err: FrameError) -> Self {
        ScanError::Frame(err)
    }
}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Other(err.to_string())
    }
}
