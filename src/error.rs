//! # Error Types
//!
//! Custom error types for Joy Motor Bridge using `thiserror`.

use thiserror::Error;

use crate::motor::MotorError;

/// Main error type for Joy Motor Bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Motor errors that cannot be absorbed (startup attach)
    #[error("Motor error: {0}")]
    Motor(#[from] MotorError),

    /// Logging setup errors
    #[error("Logging error: {0}")]
    Logging(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Joy Motor Bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
