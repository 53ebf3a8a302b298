//! [`Bus`](super::Bus) implementation backed by the `serial2` crate.

use super::Bus;
use crate::error::ByteReadError;
use std::time::Duration;

/// Re-exported `serial2` crate in case callers need to tweak serial port settings.
pub use serial2;

impl Bus for serial2::SerialPort {
	type Error = std::io::Error;

	fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
		serial2::SerialPort::write_all(self, data)
	}

	fn read_byte(&mut self, timeout: Duration) -> Result<u8, ByteReadError<Self::Error>> {
		self.set_read_timeout(timeout).map_err(ByteReadError::Io)?;
		let mut byte = [0u8; 1];
		match serial2::SerialPort::read(self, &mut byte) {
			Ok(_) => Ok(byte[0]),
			Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Err(ByteReadError::Timeout),
			Err(e) => Err(ByteReadError::Io(e)),
		}
	}
}
