//! A deterministic [`Bus`] used by unit tests across the crate.
//!
//! Unlike a real transport, `MockBus` never sleeps: a queued timeout resolves as soon
//! as it is read, so tests exercising the 50ms/5000ms/100ms timing constants run
//! instantly instead of actually waiting on the clock.

use crate::error::ByteReadError;
use crate::transport::Bus;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
	Byte(u8),
	Timeout,
}

pub struct MockBus {
	written: Vec<u8>,
	queue: VecDeque<Event>,
}

impl MockBus {
	pub fn new() -> Self {
		Self { written: Vec::new(), queue: VecDeque::new() }
	}

	pub fn queue_bytes(&mut self, bytes: &[u8]) {
		self.queue.extend(bytes.iter().map(|&byte| Event::Byte(byte)));
	}

	pub fn queue_timeout(&mut self) {
		self.queue.push_back(Event::Timeout);
	}

	/// Move everything written so far onto the read queue, as if it had looped back
	/// from the other end of the wire.
	pub fn loopback(&mut self) {
		let written = std::mem::take(&mut self.written);
		self.queue_bytes(&written);
	}

	pub fn corrupt_last_byte(&mut self) {
		if let Some(last) = self.written.last_mut() {
			*last ^= 0xFF;
		}
	}

	pub fn written(&self) -> &[u8] {
		&self.written
	}
}

impl Default for MockBus {
	fn default() -> Self {
		Self::new()
	}
}

impl Bus for MockBus {
	type Error = std::io::Error;

	fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
		self.written.extend_from_slice(data);
		Ok(())
	}

	fn read_byte(&mut self, _timeout: Duration) -> Result<u8, ByteReadError<Self::Error>> {
		match self.queue.pop_front() {
			Some(Event::Byte(byte)) => Ok(byte),
			Some(Event::Timeout) | None => Err(ByteReadError::Timeout),
		}
	}
}
