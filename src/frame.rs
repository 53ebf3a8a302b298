//! Reading and writing the wire frame: `payload_size:u16 | type:u32 | payload:N | crc:u16`.

use crate::checksum::Crc;
use crate::endian::{read_u16_le, read_u32_le, write_u16_le, write_u32_le};
use crate::error::FrameError;
use crate::transport::Bus;
use crate::BETWEEN_BYTES_TIMEOUT;
use std::time::Duration;

/// A frame decoded off the wire, before its tag is interpreted as a request or answer type.
pub struct RawFrame {
	pub tag: u32,
	pub payload: Vec<u8>,
}

/// Read `buffer.len()` bytes, one at a time.
///
/// Only the very first byte of `buffer` uses `first_byte_timeout`; every later byte
/// uses the fixed between-bytes timeout, even within this same call. That matches how
/// the reference implementation classifies timeouts: a timeout on byte zero means no
/// message was coming, a timeout on any later byte means a message started and then
/// stalled, which is corruption, not an absence of traffic.
///
/// `corrupted_if_timeout` forces even a timeout on index zero to `FrameError::Corrupted`.
/// Only the payload-size group (the very first group read by [`read_frame`]) may report a
/// timeout as benign; the tag, payload, and crc groups all pass `true` here, since a
/// timeout on their first byte still means a frame started and then stalled.
fn read_exact<B: Bus>(
	bus: &mut B,
	buffer: &mut [u8],
	first_byte_timeout: Duration,
	corrupted_if_timeout: bool,
) -> Result<(), FrameError<B::Error>> {
	for (index, slot) in buffer.iter_mut().enumerate() {
		let timeout = if index == 0 { first_byte_timeout } else { BETWEEN_BYTES_TIMEOUT };
		match bus.read_byte(timeout) {
			Ok(byte) => *slot = byte,
			Err(err) => {
				return Err(if index == 0 && !corrupted_if_timeout {
					FrameError::from(err)
				} else {
					match err {
						crate::error::ByteReadError::Timeout => FrameError::Corrupted,
						crate::error::ByteReadError::Io(e) => FrameError::Io(e),
					}
				});
			},
		}
	}
	Ok(())
}

/// Read a frame, classifying its tag's expected payload size with `expected_payload_size`.
///
/// `first_byte_timeout` applies only to the first byte of the payload-size field: every
/// other byte of the frame, including the second byte of that same field, uses the fixed
/// between-bytes timeout.
pub fn read_frame<B: Bus>(
	bus: &mut B,
	first_byte_timeout: Duration,
	expected_payload_size: impl Fn(u32) -> u16,
) -> Result<RawFrame, FrameError<B::Error>> {
	let mut size_buffer = [0u8; 2];
	read_exact(bus, &mut size_buffer, first_byte_timeout, false)?;
	let payload_size = read_u16_le(&size_buffer);

	let mut tag_buffer = [0u8; 4];
	read_exact(bus, &mut tag_buffer, BETWEEN_BYTES_TIMEOUT, true)?;
	let tag = read_u32_le(&tag_buffer);

	if expected_payload_size(tag) != payload_size {
		debug!("unexpected payload size for tag {}: expected {}, got {}", tag, expected_payload_size(tag), payload_size);
		return Err(FrameError::Corrupted);
	}

	let mut payload = vec![0u8; usize::from(payload_size)];
	if payload_size > 0 {
		read_exact(bus, &mut payload, BETWEEN_BYTES_TIMEOUT, true)?;
	}

	let mut crc_buffer = [0u8; 2];
	read_exact(bus, &mut crc_buffer, BETWEEN_BYTES_TIMEOUT, true)?;
	let received_crc = read_u16_le(&crc_buffer);

	let mut crc = Crc::new();
	crc.update(&size_buffer).update(&tag_buffer).update(&payload);
	if crc.finish() != received_crc {
		debug!("checksum mismatch on tag {}: expected {:04X}, got {:04X}", tag, crc.finish(), received_crc);
		return Err(FrameError::Corrupted);
	}

	trace!("read frame: tag {}, payload {:02X?}", tag, payload);
	Ok(RawFrame { tag, payload })
}

/// Write a frame with the given tag and payload, appending its checksum.
pub fn write_frame<B: Bus>(bus: &mut B, tag: u32, payload: &[u8]) -> Result<(), FrameError<B::Error>> {
	trace!("writing frame: tag {}, payload {:02X?}", tag, payload);
	let mut size_buffer = [0u8; 2];
	write_u16_le(&mut size_buffer, payload.len() as u16);
	let mut tag_buffer = [0u8; 4];
	write_u32_le(&mut tag_buffer, tag);

	let mut crc = Crc::new();
	crc.update(&size_buffer).update(&tag_buffer).update(payload);
	let mut crc_buffer = [0u8; 2];
	write_u16_le(&mut crc_buffer, crc.finish());

	bus.write_all(&size_buffer).map_err(FrameError::Io)?;
	bus.write_all(&tag_buffer).map_err(FrameError::Io)?;
	if !payload.is_empty() {
		bus.write_all(payload).map_err(FrameError::Io)?;
	}
	bus.write_all(&crc_buffer).map_err(FrameError::Io)?;
	Ok(())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test_support::MockBus;
	use assert2::assert;

	#[test]
	fn write_then_read_roundtrips() {
		let mut bus = MockBus::new();
		write_frame(&mut bus, 2, &[1, 2, 3, 4]).unwrap();
		bus.loopback();
		let frame = read_frame(&mut bus, Duration::from_millis(100), |_| 4).unwrap();
		assert!(frame.tag == 2);
		assert!(frame.payload == [1, 2, 3, 4]);
	}

	#[test]
	fn wrong_expected_size_is_corrupted() {
		let mut bus = MockBus::new();
		write_frame(&mut bus, 2, &[1, 2, 3, 4]).unwrap();
		bus.loopback();
		let err = read_frame(&mut bus, Duration::from_millis(100), |_| 2).unwrap_err();
		assert!(matches!(err, FrameError::Corrupted));
	}

	#[test]
	fn bad_checksum_is_corrupted() {
		let mut bus = MockBus::new();
		write_frame(&mut bus, 2, &[1, 2, 3, 4]).unwrap();
		bus.corrupt_last_byte();
		bus.loopback();
		let err = read_frame(&mut bus, Duration::from_millis(100), |_| 4).unwrap_err();
		assert!(matches!(err, FrameError::Corrupted));
	}

	#[test]
	fn first_byte_timeout_is_benign() {
		let mut bus = MockBus::new();
		bus.queue_timeout();
		let err = read_frame(&mut bus, Duration::from_millis(100), |_| 0).unwrap_err();
		assert!(matches!(err, FrameError::Timeout));
	}

	#[test]
	fn mid_frame_timeout_is_corrupted() {
		let mut bus = MockBus::new();
		bus.queue_bytes(&[4, 0]);
		bus.queue_timeout();
		let err = read_frame(&mut bus, Duration::from_millis(100), |_| 0).unwrap_err();
		assert!(matches!(err, FrameError::Corrupted));
	}
}
