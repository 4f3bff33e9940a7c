//! # pillboot
//!
//! A library for driving the BluePill serial bootloader from the host side.
//!
//! This crate provides the protocol engine for in-field firmware updates
//! over a half-duplex byte stream, including:
//!
//! - CRC32-framed command encoding and checked decoding
//! - The sync-byte handshake and per-session state machine
//! - 256-byte block streaming for memory reads and writes, with per-packet
//!   acknowledgement and replay
//! - A transport abstraction so the same engine runs over a serial port, a
//!   TCP socket, or a scripted mock
//!
//! ## Caller surface
//!
//! [`BootloaderHost`] exposes the seven bootloader operations:
//! `version`, `flash_erase`, `mem_read`, `mem_write`, `enter_cmd_mode`,
//! `jump_to_app`, and `goto_addr`. The reason field of the most recent
//! NACK stays readable via [`BootloaderHost::last_nack_field`].
//!
//! ## Cancellation Model
//!
//! Long-running operations (streamed writes, the unbounded sync handshake)
//! can be cancelled via the [`CancelContext`] mechanism. This allows the
//! embedding application (e.g., CLI) to signal interruption (e.g., Ctrl-C)
//! and have the operation stop gracefully. The context is threaded through
//! the transport: a cancel fired while the engine is blocked reading makes
//! the operation fail with [`Error::Cancelled`].
//!
//! ### Quick Start
//!
//! ```ignore
//! use pillboot::{CancelContext, cancel_context_from_global};
//!
//! // Option 1: Use global interrupt flag (set by CLI when Ctrl-C is pressed)
//! let cancel = cancel_context_from_global();
//!
//! // Option 2: Create a custom cancel context
//! use std::sync::atomic::{AtomicBool, Ordering};
//! let flag = AtomicBool::new(false);
//! let cancel = CancelContext::new(move || flag.load(Ordering::SeqCst));
//!
//! // Option 3: No cancellation (always returns "not cancelled")
//! let cancel = CancelContext::none();
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use pillboot::{BootloaderHost, SerialTransport, cancel_context_from_global};
//!
//! fn main() -> pillboot::Result<()> {
//!     let transport = SerialTransport::open("/dev/ttyUSB0", 115200)?
//!         .with_cancel(cancel_context_from_global());
//!     let mut host = BootloaderHost::new(transport);
//!
//!     host.enter_cmd_mode()?;
//!     println!("bootloader version {:#04x}", host.version()?);
//!
//!     let firmware = std::fs::read("app.bin")?;
//!     host.flash_erase(62, 2)?;
//!     host.mem_write(0x0800_F800, &firmware)?;
//!     host.jump_to_app()?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod error;
pub mod host;
pub mod protocol;
pub mod transport;

/// Global interrupt flag for CLI-to-library communication.
///
/// This is set by CLI when Ctrl-C is received, and checked by
/// `cancel_context_from_global()` during long-running operations.
static INTERRUPT_FLAG: AtomicBool = AtomicBool::new(false);

/// Explicit cancellation context for long-running library operations.
///
/// Unlike the global interrupt checker, this is explicitly passed through
/// the call chain, making it testable and composable.
#[derive(Clone, Default)]
pub struct CancelContext {
    checker: Option<Arc<dyn Fn() -> bool + Send + Sync>>,
}

impl CancelContext {
    /// Create a new cancel context with the given checker function.
    #[must_use]
    pub fn new<F>(checker: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self {
            checker: Some(Arc::new(checker)),
        }
    }

    /// Create a no-op cancel context (always returns "not cancelled").
    #[must_use]
    pub fn none() -> Self {
        Self { checker: None }
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.checker.as_ref().is_some_and(|c| c())
    }

    /// Check and return a [`Error::Cancelled`] error if cancelled.
    pub fn check(&self) -> crate::Result<()> {
        if self.is_cancelled() {
            return Err(crate::Error::Cancelled);
        }
        Ok(())
    }
}

/// Create a CancelContext that bridges to the global interrupt flag.
#[must_use]
pub fn cancel_context_from_global() -> CancelContext {
    CancelContext::new(|| INTERRUPT_FLAG.load(Ordering::SeqCst))
}

/// Set the global interrupt flag (for CLI to call when Ctrl-C is received).
pub fn set_interrupt_flag() {
    INTERRUPT_FLAG.store(true, Ordering::SeqCst);
}

/// Clear the global interrupt flag.
pub fn clear_interrupt_flag() {
    INTERRUPT_FLAG.store(false, Ordering::SeqCst);
}

/// Returns whether interruption was requested.
#[must_use]
pub fn is_interrupt_requested() -> bool {
    INTERRUPT_FLAG.load(Ordering::SeqCst)
}

#[cfg(test)]
pub(crate) fn test_set_interrupted(value: bool) {
    INTERRUPT_FLAG.store(value, Ordering::SeqCst);
}

// Re-exports for convenience
pub use {
    error::{Error, Result},
    host::{BootloaderHost, HostConfig, HostState},
    protocol::frame::{
        Ack, Command, CommandId, DataPacket, Response, DATA_BLOCK_SIZE, ENTER_CMD_MODE_KEY,
        JUMP_APP_KEY, SYNC_BYTE,
    },
    transport::{
        serial::{find_port, list_ports},
        SerialTransport, Transport,
    },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interrupt_checker_default_false() {
        test_set_interrupted(false);
        assert!(!is_interrupt_requested());
    }

    #[test]
    fn test_interrupt_checker_toggle_true_false() {
        test_set_interrupted(true);
        assert!(is_interrupt_requested());

        test_set_interrupted(false);
        assert!(!is_interrupt_requested());
    }

    #[test]
    fn test_cancel_context_none_never_cancels() {
        let cancel = CancelContext::none();
        assert!(!cancel.is_cancelled());
        assert!(cancel.check().is_ok());
    }

    #[test]
    fn test_cancel_context_custom_checker() {
        let cancel = CancelContext::new(|| true);
        assert!(cancel.is_cancelled());
        assert!(matches!(cancel.check(), Err(Error::Cancelled)));
    }
}
