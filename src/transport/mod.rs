//! The [`Bus`] trait abstracts over the byte stream the protocol runs on.

#[cfg(feature = "serial2")]
pub mod serial2;

use crate::error::ByteReadError;
use std::time::Duration;

/// A half-duplex byte stream the protocol core reads from and writes to.
///
/// Implementors only need to provide raw byte I/O with a per-read timeout; framing,
/// checksums and timeout classification all live above this trait. The protocol is
/// strictly one request in flight at a time, so `Bus` does not need to be `Send` or
/// support concurrent access.
pub trait Bus {
	/// The error type returned when the underlying transport fails.
	type Error: core::fmt::Debug + core::fmt::Display;

	/// Write every byte of `data` to the bus.
	fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error>;

	/// Block for at most `timeout` waiting for a single byte.
	fn read_byte(&mut self, timeout: Duration) -> Result<u8, ByteReadError<Self::Error>>;
}
