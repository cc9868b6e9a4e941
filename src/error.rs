//! # Error Types
//!
//! Custom error types for FMS-PIC Bridge using `thiserror`.
//!
//! The frame synchronizer itself never fails: desynchronization is recovered
//! silently on the next sync byte. These errors cover the transport,
//! configuration and output sides only.

use thiserror::Error;

/// Main error type for FMS-PIC Bridge
#[derive(Debug, Error)]
pub enum FmsPicError {
    /// Serial port errors (open, read)
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial devices could be opened
    #[error("No FMS-PIC serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Virtual input device errors
    #[error("Input device error: {0}")]
    Input(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FMS-PIC Bridge
pub type Result<T> = std::result::Result<T, FmsPicError>;
