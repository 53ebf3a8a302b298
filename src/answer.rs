//! Answer types sent from server to client.

use crate::endian::{read_u16_le, read_u32_le, write_u16_le, write_u32_le};
use crate::request;

/// Request successfully processed.
pub const SUCCESS: u32 = 0;
/// Request rejected because of inappropriate server state or similar reason.
pub const REQUEST_REJECTED: u32 = 1;
/// Request contained wrong, probably out of range, arguments.
pub const WRONG_REQUEST_ARGUMENTS: u32 = 2;

/// Hardware and firmware identifiers reported by [`GET_DEVICE_INFO`](request::GET_DEVICE_INFO).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
	pub hardware_version: u32,
	pub firmware_version: u32,
}

/// A decoded answer, ready to send or just received.
///
/// `RequestRejected` and `WrongRequestArguments` are modeled here rather than as errors:
/// they are well-formed, successfully transferred answers that happen to carry bad news.
/// Only a corrupted or missing transfer is an error, see [`crate::ProtocolError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
	MatchProtocolVersion { protocol_version: u16 },
	GetDeviceInfo(DeviceInfo),
	Custom { request_type: u32, payload: Vec<u8> },
	RequestRejected,
	WrongRequestArguments,
}

impl Answer {
	/// The wire type code of this answer.
	pub fn answer_type(&self) -> u32 {
		match self {
			Self::RequestRejected => REQUEST_REJECTED,
			Self::WrongRequestArguments => WRONG_REQUEST_ARGUMENTS,
			_ => SUCCESS,
		}
	}

	pub(crate) fn encode_payload(&self) -> Vec<u8> {
		match self {
			Self::MatchProtocolVersion { protocol_version } => {
				let mut buffer = [0u8; 2];
				write_u16_le(&mut buffer, *protocol_version);
				buffer.to_vec()
			},
			Self::GetDeviceInfo(info) => {
				let mut buffer = [0u8; 8];
				write_u32_le(&mut buffer[0..4], info.hardware_version);
				write_u32_le(&mut buffer[4..8], info.firmware_version);
				buffer.to_vec()
			},
			Self::Custom { payload, .. } => payload.clone(),
			Self::RequestRejected | Self::WrongRequestArguments => Vec::new(),
		}
	}

	/// Decode an answer from the request type it answers, its own type code, and a
	/// payload whose length has already been validated against the catalog.
	pub(crate) fn decode(request_type: u32, answer_type: u32, payload: &[u8]) -> Self {
		match answer_type {
			REQUEST_REJECTED => Self::RequestRejected,
			WRONG_REQUEST_ARGUMENTS => Self::WrongRequestArguments,
			SUCCESS => match request_type {
				request::MATCH_PROTOCOL_VERSION => Self::MatchProtocolVersion { protocol_version: read_u16_le(payload) },
				request::GET_DEVICE_INFO => Self::GetDeviceInfo(DeviceInfo {
					hardware_version: read_u32_le(&payload[0..4]),
					firmware_version: read_u32_le(&payload[4..8]),
				}),
				_ => Self::Custom { request_type, payload: payload.to_vec() },
			},
			_ => Self::Custom { request_type, payload: payload.to_vec() },
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn roundtrip_match_protocol_version() {
		let answer = Answer::MatchProtocolVersion { protocol_version: 1 };
		let payload = answer.encode_payload();
		assert!(Answer::decode(request::MATCH_PROTOCOL_VERSION, SUCCESS, &payload) == answer);
	}

	#[test]
	fn roundtrip_get_device_info() {
		let answer = Answer::GetDeviceInfo(DeviceInfo { hardware_version: 1, firmware_version: 2 });
		let payload = answer.encode_payload();
		assert!(payload.len() == 8);
		assert!(Answer::decode(request::GET_DEVICE_INFO, SUCCESS, &payload) == answer);
	}

	#[test]
	fn rejection_answers_carry_no_payload() {
		assert!(Answer::RequestRejected.encode_payload().is_empty());
		assert!(Answer::decode(request::GET_DEVICE_INFO, REQUEST_REJECTED, &[]) == Answer::RequestRejected);
		assert!(Answer::decode(request::GET_DEVICE_INFO, WRONG_REQUEST_ARGUMENTS, &[]) == Answer::WrongRequestArguments);
	}
}
