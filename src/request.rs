//! Request types sent from client to server.

use crate::endian::{read_u16_le, write_u16_le};

/// No request. Never appears on the wire; used as a sentinel by host-side dispatchers.
pub const UNDEFINED: u32 = 0;
/// Ask the server to report its protocol version.
pub const MATCH_PROTOCOL_VERSION: u32 = 1;
/// Ask the server to report its hardware and firmware version.
pub const GET_DEVICE_INFO: u32 = 2;

/// A decoded request, ready to send or just received.
///
/// `Custom` carries any request type not built into this crate, so that a host
/// application can extend the protocol without forking it: pair it with a [`crate::Catalog`]
/// impl that knows the payload size for the new type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
	MatchProtocolVersion { protocol_version: u16 },
	GetDeviceInfo,
	Custom { request_type: u32, payload: Vec<u8> },
}

impl Request {
	/// The wire type code of this request.
	pub fn request_type(&self) -> u32 {
		match self {
			Self::MatchProtocolVersion { .. } => MATCH_PROTOCOL_VERSION,
			Self::GetDeviceInfo => GET_DEVICE_INFO,
			Self::Custom { request_type, .. } => *request_type,
		}
	}

	pub(crate) fn encode_payload(&self) -> Vec<u8> {
		match self {
			Self::MatchProtocolVersion { protocol_version } => {
				let mut buffer = [0u8; 2];
				write_u16_le(&mut buffer, *protocol_version);
				buffer.to_vec()
			},
			Self::GetDeviceInfo => Vec::new(),
			Self::Custom { payload, .. } => payload.clone(),
		}
	}

	/// Decode a request from its type code and a payload whose length has already been
	/// validated against the catalog by the framer.
	pub(crate) fn decode(request_type: u32, payload: &[u8]) -> Self {
		match request_type {
			MATCH_PROTOCOL_VERSION => Self::MatchProtocolVersion { protocol_version: read_u16_le(payload) },
			GET_DEVICE_INFO => Self::GetDeviceInfo,
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
		let request = Request::MatchProtocolVersion { protocol_version: 1 };
		let payload = request.encode_payload();
		assert!(Request::decode(MATCH_PROTOCOL_VERSION, &payload) == request);
	}

	#[test]
	fn roundtrip_get_device_info() {
		let request = Request::GetDeviceInfo;
		let payload = request.encode_payload();
		assert!(payload.is_empty());
		assert!(Request::decode(GET_DEVICE_INFO, &payload) == request);
	}

	#[test]
	fn unknown_type_becomes_custom() {
		let decoded = Request::decode(0xBEEF, &[1, 2, 3]);
		assert!(decoded == Request::Custom { request_type: 0xBEEF, payload: vec![1, 2, 3] });
	}
}
