//! Client side of the protocol: the side that sends requests and waits for answers.

use crate::answer;
use crate::catalog::{BuiltinCatalog, Catalog};
use crate::error::{next_sync_state, ProtocolError, RequestError};
use crate::frame::{read_frame, write_frame};
use crate::recovery::recover;
use crate::request::Request;
use crate::transport::Bus;
use crate::{Answer, DeviceInfo, SyncState, PROTOCOL_VERSION, RECOVERY_WAIT_TIMEOUT, WAIT_ANSWER_TIMEOUT};
use std::time::Duration;

/// The requesting side of the protocol.
pub struct Client<B: Bus, C: Catalog = BuiltinCatalog> {
	bus: B,
	catalog: C,
	state: SyncState,
}

impl<B: Bus> Client<B, BuiltinCatalog> {
	/// Run the bus-quiet bootstrap procedure, then return a client ready to exchange requests.
	///
	/// Loops calling [`recover`] with a one second timeout until it succeeds, exactly as
	/// the reference client's `bridge_init()` does, so a freshly opened, possibly noisy
	/// bus is given a chance to settle before the first real request goes out.
	pub fn connect(bus: B) -> Result<Self, ProtocolError<B::Error>> {
		Self::connect_with_catalog(bus, BuiltinCatalog)
	}
}

impl<B: Bus, C: Catalog> Client<B, C> {
	/// Wrap a bus that is already known to be synchronized, without running the bootstrap.
	pub fn new(bus: B, catalog: C) -> Self {
		Self { bus, catalog, state: SyncState::Synchronized }
	}

	/// Like [`Client::connect`], but with a catalog covering custom request types.
	pub fn connect_with_catalog(mut bus: B, catalog: C) -> Result<Self, ProtocolError<B::Error>> {
		debug!("waiting for bus to fall silent before first exchange");
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

	/// Send `request` and wait for the matching answer.
	///
	/// A `Corrupted` result leaves the connection desynchronized: call [`Client::recover`]
	/// before sending anything else. This method never retries on its own.
	pub fn exchange(&mut self, request: Request) -> Result<Answer, ProtocolError<B::Error>> {
		let request_type = request.request_type();
		let payload = request.encode_payload();

		if let Err(e) = write_frame(&mut self.bus, request_type, &payload) {
			warn!("failed to send request {}: {}", request_type, e);
			self.state = next_sync_state(self.state, &e);
			return Err(e);
		}

		let catalog = &self.catalog;
		let frame = read_frame(&mut self.bus, WAIT_ANSWER_TIMEOUT, |answer_type| {
			catalog.answer_payload_size(request_type, answer_type)
		});

		match frame {
			Ok(frame) => {
				self.state = SyncState::Synchronized;
				Ok(Answer::decode(request_type, frame.tag, &frame.payload))
			},
			Err(e) => {
				warn!("failed to read answer to request {}: {}", request_type, e);
				self.state = next_sync_state(self.state, &e);
				Err(e)
			},
		}
	}

	/// Ask the server to confirm it speaks [`PROTOCOL_VERSION`].
	///
	/// Returns the protocol version the server reports, which may differ from this
	/// crate's; comparing it against `PROTOCOL_VERSION` is left to the caller.
	pub fn match_protocol_version(&mut self) -> Result<u16, RequestError<B::Error>> {
		match self.exchange(Request::MatchProtocolVersion { protocol_version: PROTOCOL_VERSION })? {
			Answer::MatchProtocolVersion { protocol_version } => Ok(protocol_version),
			Answer::RequestRejected => Err(RequestError::Rejected),
			Answer::WrongRequestArguments => Err(RequestError::WrongArguments),
			other => Err(unexpected_answer(other)),
		}
	}

	/// Ask the server for its hardware and firmware version.
	pub fn get_device_info(&mut self) -> Result<DeviceInfo, RequestError<B::Error>> {
		match self.exchange(Request::GetDeviceInfo)? {
			Answer::GetDeviceInfo(info) => Ok(info),
			Answer::RequestRejected => Err(RequestError::Rejected),
			Answer::WrongRequestArguments => Err(RequestError::WrongArguments),
			other => Err(unexpected_answer(other)),
		}
	}
}

/// A built-in request can only ever come back as its matching success shape or one of
/// the two rejection answers: any other answer means the server's catalog disagrees
/// with ours about a built-in type. The wire format has no way to express that as a
/// typed rejection, so it surfaces as its own error variant instead of bogus data.
fn unexpected_answer<E>(answer: Answer) -> RequestError<E> {
	warn!("server returned an answer that does not match the request: {:?}", answer);
	RequestError::UnexpectedAnswer(answer)
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::test_support::MockBus;
	use assert2::{assert, let_assert};

	fn connected_client() -> Client<MockBus> {
		let mut bus = MockBus::new();
		bus.queue_timeout();
		Client::connect(bus).unwrap()
	}

	fn queue_answer(client: &mut Client<MockBus>, answer_type: u32, payload: &[u8]) {
		let mut scratch = MockBus::new();
		write_frame(&mut scratch, answer_type, payload).unwrap();
		client.bus.queue_bytes(scratch.written());
	}

	#[test]
	fn match_protocol_version_roundtrips() {
		let mut client = connected_client();
		queue_answer(&mut client, answer::SUCCESS, &[1, 0]);
		let version = client.match_protocol_version().unwrap();
		assert!(version == 1);
		assert!(client.state() == SyncState::Synchronized);
	}

	#[test]
	fn get_device_info_roundtrips() {
		let mut client = connected_client();
		queue_answer(&mut client, answer::SUCCESS, &[1, 0, 0, 0, 2, 0, 0, 0]);
		let info = client.get_device_info().unwrap();
		assert!(info == DeviceInfo { hardware_version: 1, firmware_version: 2 });
	}

	#[test]
	fn rejection_is_reported_not_panicked() {
		let mut client = connected_client();
		queue_answer(&mut client, answer::REQUEST_REJECTED, &[]);
		let_assert!(Err(RequestError::Rejected) = client.match_protocol_version());
		assert!(client.state() == SyncState::Synchronized);
	}

	#[test]
	fn corrupted_answer_marks_suspected() {
		let mut client = connected_client();
		let mut scratch = MockBus::new();
		write_frame(&mut scratch, answer::SUCCESS, &[1, 0]).unwrap();
		let mut bytes = scratch.written().to_vec();
		*bytes.last_mut().unwrap() ^= 0xFF;
		client.bus.queue_bytes(&bytes);

		let_assert!(Err(RequestError::Protocol(ProtocolError::Corrupted)) = client.match_protocol_version());
		assert!(client.state() == SyncState::Suspected);
	}
}
