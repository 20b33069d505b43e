//! Radio transport abstractions
//!
//! Provides the two halves of the transport shim: link setup, which only
//! the startup code touches, and the receive side the listener depends on.

use core::time::Duration;

use crate::link::{LinkConfig, Pipe};

/// Link setup for a point-to-point radio
pub trait RadioSetup {
    /// Error type for setup operations
    type Error: core::fmt::Debug;

    /// Apply addressing, channel, power and payload settings
    ///
    /// Leaves the radio in standby; call [`RadioSetup::start_listening`]
    /// to enter receive mode.
    fn configure(&mut self, config: &LinkConfig) -> Result<(), Self::Error>;

    /// Put the radio in receive mode
    fn start_listening(&mut self) -> Result<(), Self::Error>;
}

/// Receive side of a point-to-point radio
///
/// The receive loop only needs to know whether a payload is pending, on
/// which pipe, and to copy it out.
pub trait RadioRx {
    /// Error type for receive operations
    type Error: core::fmt::Debug;

    /// Check for a pending payload without blocking
    ///
    /// Returns the pipe the head payload arrived on, or `None` when the
    /// RX FIFO is empty.
    fn available(&mut self) -> Result<Option<Pipe>, Self::Error>;

    /// Wait up to `timeout` for a payload
    ///
    /// Implementations that can block (IRQ line, polling with a delay
    /// provider) should override this. The default performs a single
    /// non-blocking check, which makes the caller's loop a busy-poll.
    fn wait_available(&mut self, timeout: Duration) -> Result<Option<Pipe>, Self::Error> {
        let _ = timeout;
        self.available()
    }

    /// Sleep for `duration` without touching the link
    ///
    /// The receive loop calls this after a failed wait or read so a dead
    /// radio is not polled back to back. The default returns at once.
    fn idle(&mut self, duration: Duration) {
        let _ = duration;
    }

    /// Read the pending payload into `buf`
    ///
    /// Reads exactly [`RadioRx::payload_size`] bytes and returns that
    /// count. `buf` must be at least that long.
    fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Static payload size in bytes
    fn payload_size(&self) -> u8;
}
