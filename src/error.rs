//! Error types for pellet protocol operations.

use thiserror::Error;

/// Result type alias for pellet operations.
pub type Result<T> = std::result::Result<T, PelletError>;

/// Error types for pellet-stove communication.
#[derive(Error, Debug)]
pub enum PelletError {
    /// Serial port communication error
    #[error("Serial port error: {0}")]
    SerialPort(#[from] serialport::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or parameter table could not be parsed
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration values are out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Parameter name is not in the registry
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// Scaled value does not map onto a single raw byte
    #[error("Invalid value {value} for parameter {name}")]
    InvalidValue {
        /// Parameter the value was meant for
        name: String,
        /// Requested scaled value
        value: f64,
    },

    /// Command queue has no free slot
    #[error("Command queue full ({capacity} slots)")]
    QueueFull {
        /// Usable queue slots
        capacity: usize,
    },

    /// Response failed validation
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// Byte the response should have carried
        expected: u8,
        /// Byte actually received
        actual: u8,
    },

    /// Parameter table entry is unusable
    #[error("Invalid descriptor {name}: {reason}")]
    InvalidDescriptor {
        /// Offending parameter name
        name: String,
        /// Why it was rejected
        reason: String,
    },
}
