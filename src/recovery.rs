//! Recovery: run the bus quiet again after a corrupted frame.

use crate::error::{ByteReadError, ProtocolError};
use crate::transport::Bus;
use crate::RECOVER_TIMEOUT;
use std::time::Duration;

/// Drain the bus until it has been silent for [`RECOVER_TIMEOUT`], or `timeout` elapses.
///
/// Run this after any protocol operation returns `Corrupted`, and once before the very
/// first exchange on a freshly opened bus: see [`crate::Client::connect`] and
/// [`crate::Server::connect`]. If `timeout` is shorter than `RECOVER_TIMEOUT` this
/// always returns `Err(ProtocolError::Timeout)` without reading anything, since there is
/// no way to observe a silent bus in less time than the polling interval itself.
pub fn recover<B: Bus>(bus: &mut B, timeout: Duration) -> Result<(), ProtocolError<B::Error>> {
	if timeout < RECOVER_TIMEOUT {
		return Err(ProtocolError::Timeout);
	}

	let mut waited = Duration::from_millis(0);
	let mut garbage = 0u32;
	loop {
		match bus.read_byte(RECOVER_TIMEOUT) {
			Ok(byte) => {
				garbage += 1;
				trace!("skipped garbage byte during recovery: {:02X}", byte);
				waited += RECOVER_TIMEOUT;
				if waited >= timeout {
					debug!("recovery timed out after skipping {} garbage bytes", garbage);
					return Err(ProtocolError::Timeout);
				}
			},
			Err(ByteReadError::Timeout) => {
				if garbage > 0 {
					debug!("bus recovered after skipping {} garbage bytes", garbage);
				}
				return Ok(());
			},
			Err(ByteReadError::Io(e)) => return Err(ProtocolError::Io(e)),
		}
	}
}
