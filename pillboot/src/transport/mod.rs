//! Transport abstraction for the bootloader byte stream.
//!
//! The engine only needs a reliable-ordered byte stream with bounded reads;
//! it never assumes a particular physical medium. Serial hardware goes
//! through [`SerialTransport`]; tests script a mock against the same trait.

pub mod serial;

// Re-export for convenience
pub use serial::SerialTransport;

use crate::error::Result;
use std::time::Duration;

/// Byte-stream capability set the engine drives.
///
/// Implementations must preserve byte ordering and must not report a
/// successful [`Transport::read_exact`] with a partially-filled buffer.
pub trait Transport: Send {
    /// Write the whole buffer, blocking until the transport accepted it.
    fn write_all(&mut self, bytes: &[u8]) -> Result<()>;

    /// Read exactly `buf.len()` bytes, waiting at most `deadline`.
    ///
    /// Fails with [`crate::Error::Timeout`] when the deadline expires first,
    /// or [`crate::Error::Cancelled`] when the cancellation signal threaded
    /// through the transport fires while the call is blocked.
    fn read_exact(&mut self, buf: &mut [u8], deadline: Duration) -> Result<()>;

    /// Drain immediately-available bytes into `buf` without blocking.
    ///
    /// Returns the number of bytes read, possibly 0.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Set the default read timeout of the underlying device.
    fn set_read_timeout(&mut self, timeout: Duration) -> Result<()>;

    /// Human-readable identifier for log output.
    fn name(&self) -> &str;
}
