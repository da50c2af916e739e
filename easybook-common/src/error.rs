//! Common error types for Easy Booking services

use thiserror::Error;

/// Common result type for Easy Booking operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Easy Booking services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
