//! Maps request and answer type codes to the payload size the wire format expects.
//!
//! The two built-in request types are covered by [`BuiltinCatalog`]. A host application
//! that adds its own request types implements [`Catalog`] itself, typically by matching
//! on the built-in types and falling through to `BuiltinCatalog` for the rest.

use crate::request;

/// Looks up the expected payload size for a request or answer type.
///
/// An unrecognized type is expected to carry a zero-length payload: that mirrors the
/// C reference implementation, where an unmatched `switch` falls through to a size of
/// zero rather than rejecting the frame outright. Rejecting unknown request types is a
/// policy decision left to the server, not the catalog: see [`crate::Server::poll`].
pub trait Catalog {
	/// Expected payload size of a request frame of the given type.
	fn request_payload_size(&self, request_type: u32) -> u16;

	/// Expected payload size of an answer frame, given the request type it answers and
	/// the answer type it carries.
	///
	/// Every answer type other than `SUCCESS` carries no payload.
	fn answer_payload_size(&self, request_type: u32, answer_type: u32) -> u16;
}

/// Catalog covering exactly the two built-in request types.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl Catalog for BuiltinCatalog {
	fn request_payload_size(&self, request_type: u32) -> u16 {
		match request_type {
			request::MATCH_PROTOCOL_VERSION => 2,
			_ => 0,
		}
	}

	fn answer_payload_size(&self, request_type: u32, answer_type: u32) -> u16 {
		if answer_type != crate::answer::SUCCESS {
			return 0;
		}
		match request_type {
			request::MATCH_PROTOCOL_VERSION => 2,
			request::GET_DEVICE_INFO => 8,
			_ => 0,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn builtin_request_sizes() {
		let catalog = BuiltinCatalog;
		assert!(catalog.request_payload_size(request::MATCH_PROTOCOL_VERSION) == 2);
		assert!(catalog.request_payload_size(request::GET_DEVICE_INFO) == 0);
		assert!(catalog.request_payload_size(0xBEEF) == 0);
	}

	#[test]
	fn builtin_answer_sizes() {
		let catalog = BuiltinCatalog;
		assert!(catalog.answer_payload_size(request::MATCH_PROTOCOL_VERSION, crate::answer::SUCCESS) == 2);
		assert!(catalog.answer_payload_size(request::GET_DEVICE_INFO, crate::answer::SUCCESS) == 8);
		assert!(catalog.answer_payload_size(request::GET_DEVICE_INFO, crate::answer::REQUEST_REJECTED) == 0);
	}
}
