//! Error types for VarunaNav

use thiserror::Error;

/// VarunaNav error type
#[derive(Error, Debug)]
pub enum VarunaError {
    /// Invalid configuration, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Degenerate geometric construction
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Position outside the declared conversion domain
    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    /// No valid search path could be produced, fatal to that planning call
    #[error("Planning failure: {0}")]
    Planning(String),

    /// Vehicle link failure
    #[error("Vehicle error: {0}")]
    Vehicle(String),

    /// Watchdog channel failure
    #[error("Watchdog error: {0}")]
    Watchdog(#[from] sindhu_io::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for VarunaError {
    fn from(e: toml::de::Error) -> Self {
        VarunaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VarunaError>;
