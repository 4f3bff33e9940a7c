//! Error types for pillboot.

use std::io;
use thiserror::Error;

/// Result type for pillboot operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pillboot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (serial port, file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Communication timeout.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Frame shorter than its declared or required length.
    #[error("Short frame: expected {expected} bytes, got {actual}")]
    ShortFrame {
        /// Required length in bytes.
        expected: usize,
        /// Length actually available.
        actual: usize,
    },

    /// CRC32 mismatch between the computed and the received value.
    #[error("CRC mismatch: expected {expected:#010x}, got {actual:#010x}")]
    BadCrc {
        /// CRC computed over the received bytes.
        expected: u32,
        /// CRC carried inside the frame.
        actual: u32,
    },

    /// The leading command ID did not match the expected frame kind.
    #[error("Unexpected frame: expected command {expected:#04x}, got {actual:#04x}")]
    UnexpectedFrame {
        /// Command ID the engine was waiting for.
        expected: u8,
        /// Command ID that arrived.
        actual: u8,
    },

    /// A frame field held a value outside its admissible range.
    #[error("Field out of range: {0}")]
    FieldOutOfRange(String),

    /// The target rejected the exchange; carries the NACK reason field.
    #[error("Target NACKed with field {0:#04x}")]
    Nack(u8),

    /// A data packet exhausted its retry budget.
    #[error("Too many retries: data packet failed after {attempts} attempts")]
    TooManyRetries {
        /// Number of transmission attempts made.
        attempts: u32,
    },

    /// Cancellation signal observed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Caller-supplied parameters were rejected before any transmission.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No serial port matched the requested pattern.
    #[error("Device not found")]
    DeviceNotFound,
}
