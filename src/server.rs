//! Server side of the protocol: the side that waits for requests and answers them.

use crate::catalog::{BuiltinCatalog, Catalog};
use crate::error::{next_sync_state, ProtocolError};
use crate::frame::{read_frame, write_frame};
use crate::recovery::recover;
use crate::request::{self, Request};
use crate::transport::Bus;
use crate::{Answer, DeviceInfo, SyncState, PROTOCOL_VERSION, RECOVERY_WAIT_TIMEOUT};
use std::time::Duration;

/// Outcome of [`Server::poll`].
///
/// Resolves what the reference server's `bridge_process()` cannot distinguish on its
/// own: both "nothing arrived" and "something arrived, was corrupt, and the bus has now
/// been recovered" return the same `BRIDGE_REQUEST_TYPE_UNDEFINED` sentinel there. Here
/// they are two different variants, so a caller that logs or counts corruption events
/// does not have to guess which case just happened.
#[derive(Debug)]
pub enum ServerEvent {
	/// No request arrived before the poll timeout elapsed. Nothing to do.
	NoRequest,
	/// A well-formed request arrived and should be answered.
	Request(Request),
	/// A corrupted frame arrived and the bus has been recovered. No request to answer.
	UnknownRequestRecovered,
}

/// The answering side of the protocol.
pub struct Server<B: Bus, C: Catalog = BuiltinCatalog> {
	bus: B,
	catalog: C,
	state: SyncState,
}

impl<B: Bus> Server<B, BuiltinCatalog> {
	/// Run the bus-quiet bootstrap procedure, then return a server ready to read requests.
	///
	/// Mirrors [`crate::Client::connect`] and the reference server's `bridge_init()`.
	pub fn connect(bus: B) -> Result<Self, ProtocolError<B::Error>> {
		Self::connect_with_catalog(bus, BuiltinCatalog)
	}
}

impl<B: Bus, C: Catalog> Server<B, C> {
	/// Wrap a bus that is already known to be synchronized, without running the bootstrap.
	pub fn new(bus: B, catalog: C) -> Self {
		Self { bus, catalog, state: SyncState::Synchronized }
	}

	/// Like [`Server::connect`], but with a catalog covering custom request types.
	pub fn connect_with_catalog(mut bus: B, catalog: C) -> Result<Self, ProtocolError<B::Error>> {
		debug!("waiting for bus to fall silent before serving requests");
		loop {
			match recover(&mut bus, RECOVERY_WAIT_TIMEOUT) {
				Ok(()) => break,
				Err(ProtocolError::Timeout) => continue,
				Err(e) => return Err(e),
			}
		}
		Ok(Self { bus, catalog, state: SyncState::Synchronized })
	}

	/// Current synchronization state, tracked purely from the return values of past operations.
	pub fn state(&self) -> SyncState {
		self.state
	}

	/// Run the recovery procedure after a `Corrupted` result.
	pub fn recover(&mut self, timeout: Duration) -> Result<(), ProtocolError<B::Error>> {
		match recover(&mut self.bus, timeout) {
			Ok(()) => {
				self.state = SyncState::Synchronized;
				Ok(())
			},
			Err(ProtocolError::Timeout) => Err(ProtocolError::Timeout),
			Err(e) => {
				self.state = SyncState::Failed;
				Err(e)
			},
		}
	}

	/// Wait for a single request.
	///
	/// `first_byte_timeout` bounds only the wait for the first byte of the frame; pass
	/// `None` to block forever. Every byte after the first uses the fixed between-bytes
	/// timeout regardless of what is passed here: see [`crate::frame::read_frame`].
	pub fn read_request(&mut self, first_byte_timeout: Option<Duration>) -> Result<Request, ProtocolError<B::Error>> {
		let timeout = first_byte_timeout.unwrap_or(Duration::MAX);
		let catalog = &self.catalog;
		let frame = read_frame(&mut self.bus, timeout, |request_type| catalog.request_payload_size(request_type));

		match frame {
			Ok(frame) => {
				self.state = SyncState::Synchronized;
				Ok(Request::decode(frame.tag, &frame.payload))
			},
			Err(e) => {
				if !matches!(e, ProtocolError::Timeout) {
					warn!("failed to read request: {}", e);
				}
				self.state = next_sync_state(self.state, &e);
				Err(e)
			},
		}
	}

	/// Poll once for a request, recovering automatically if a corrupted frame arrives.
	///
	/// This is the convenience entry point for a server's main loop: call it repeatedly
	/// with a short timeout and dispatch on the returned [`ServerEvent`].
	pub fn poll(&mut self, timeout: Duration) -> Result<ServerEvent, ProtocolError<B::Error>> {
		match self.read_request(Some(timeout)) {
			Ok(request) => Ok(ServerEvent::Request(request)),
			Err(ProtocolError::Timeout) => Ok(ServerEvent::NoRequest),
			Err(ProtocolError::Corrupted) => {
				debug!("corrupted request, recovering");
				self.recover_until_quiet()?;
				Ok(ServerEvent::UnknownRequestRecovered)
			},
			Err(e) => Err(e),
		}
	}

	/// Call this from a request dispatcher's fallback arm when `request`'s type is not
	/// one the application implements.
	///
	/// Mirrors the reference server's `default:` case: an otherwise well-formed request
	/// of an unrecognized type is treated the same as corruption, since the peer now
	/// expects an answer that will never come unless the bus is reset.
	pub fn recover_unknown_request(&mut self) -> Result<ServerEvent, ProtocolError<B::Error>> {
		self.recover_until_quiet()?;
		Ok(ServerEvent::UnknownRequestRecovered)
	}

	fn recover_until_quiet(&mut self) -> Result<(), ProtocolError<B::Error>> {
		loop {
			match recover(&mut self.bus, RECOVERY_WAIT_TIMEOUT) {
				Ok(()) => {
					self.state = SyncState::Synchronized;
					return Ok(());
				},
				Err(ProtocolError::Timeout) => continue,
				Err(e) => {
					self.state = SyncState::Failed;
					return Err(e);
				},
			}
		}
	}

	fn send_answer(&mut self, request_type: u32, answer: &Answer) -> Result<(), ProtocolError<B::Error>> {
		let payload = answer.encode_payload();
		match write_frame(&mut self.bus, answer.answer_type(), &payload) {
			Ok(()) => Ok(()),
			Err(e) => {
				warn!("failed to send answer to request {}: {}", request_type, e);
				self.state = next_sync_state(self.state, &e);
				Err(e)
			},
		}
	}

	/// Answer a `MatchProtocolVersion` request with this crate's [`PROTOCOL_VERSION`].
	pub fn answer_match_protocol_version(&mut self) -> Result<(), ProtocolError<B::Error>> {
		self.send_answer(
			request::MATCH_PROTOCOL_VERSION,
			&Answer::MatchProtocolVersion { protocol_version: PROTOCOL_VERSION },
		)
	}

	/// Answer a `GetDeviceInfo` request with the given device identifiers.
	pub fn answer_get_device_info(&mut self, info: DeviceInfo) -> Result<(), ProtocolError<B::Error>> {
		self.send_answer(request::GET_DEVICE_INFO, &Answer::GetDeviceInfo(info))
	}

	/// Reject `request` because of inappropriate server state or similar reason.
	pub fn answer_rejected(&mut self, request: &Request) -> Result<(), ProtocolError<B::Error>> {
		self.send_answer(request.request_type(), &Answer::RequestRejected)
	}

	/// Reject `request` because it carried wrong, probably out of range, arguments.
	pub fn answer_wrong_arguments(&mut self, request: &Request) -> Result<(), ProtocolError<B::Error>> {
		self.send_answer(request.request_type(), &Answer::WrongRequestArguments)
	}

	/// Answer a custom, host-defined request type with a raw payload.
	pub fn answer_custom(&mut self, request_type: u32, payload: Vec<u8>) -> Result<(), ProtocolError<B::Error>> {
		self.send_answer(request_type, &Answer::Custom { request_type, payload })
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test_support::MockBus;
	use assert2::{assert, let_assert};

	fn connected_server() -> Server<MockBus> {
		let mut bus = MockBus::new();
		bus.queue_timeout();
		Server::connect(bus).unwrap()
	}

	#[test]
	fn no_request_times_out_cleanly() {
		let mut server = connected_server();
		server.bus.queue_timeout();
		let_assert!(Ok(ServerEvent::NoRequest) = server.poll(Duration::from_millis(10)));
	}

	#[test]
	fn reads_match_protocol_version_request() {
		let mut server = connected_server();
		write_frame(&mut server.bus, request::MATCH_PROTOCOL_VERSION, &[1, 0]).unwrap();
		server.bus.loopback();

		let_assert!(Ok(ServerEvent::Request(request)) = server.poll(Duration::from_millis(10)));
		assert!(request == Request::MatchProtocolVersion { protocol_version: 1 });

		server.answer_match_protocol_version().unwrap();
		assert!(!server.bus.written().is_empty());
	}

	#[test]
	fn corrupted_request_is_auto_recovered() {
		let mut server = connected_server();
		let mut scratch = MockBus::new();
		write_frame(&mut scratch, request::GET_DEVICE_INFO, &[]).unwrap();
		let mut bytes = scratch.written().to_vec();
		*bytes.last_mut().unwrap() ^= 0xFF;
		server.bus.queue_bytes(&bytes);
		server.bus.queue_timeout();

		let_assert!(Ok(ServerEvent::UnknownRequestRecovered) = server.poll(Duration::from_millis(10)));
		assert!(server.state() == SyncState::Synchronized);
	}

	#[test]
	fn rejected_answer_carries_no_payload() {
		let mut server = connected_server();
		let request = Request::GetDeviceInfo;
		server.answer_rejected(&request).unwrap();
		let mut read_back = MockBus::new();
		read_back.queue_bytes(server.bus.written());
		let frame = read_frame(&mut read_back, Duration::from_millis(10), |_| 0).unwrap();
		assert!(frame.tag == crate::answer::REQUEST_REJECTED);
		assert!(frame.payload.is_empty());
	}
}
