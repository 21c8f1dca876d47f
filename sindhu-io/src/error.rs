//! Error types for SindhuIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// SindhuIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No complete frame arrived before the read deadline
    #[error("Communication timeout")]
    Timeout,

    /// Response did not match the `'$' body '\n'` frame grammar
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
}
