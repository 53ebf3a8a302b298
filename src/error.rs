use std::fmt;

/// Error produced by a transport while waiting for a single byte.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ByteReadError<E> {
	/// No byte arrived before the requested timeout elapsed.
	Timeout,
	/// The transport itself failed.
	Io(E),
}

impl<E: fmt::Display> fmt::Display for ByteReadError<E> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Timeout => write!(f, "timed out waiting for a byte"),
			Self::Io(e) => write!(f, "{}", e),
		}
	}
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ByteReadError<E> {}

/// Error produced while reading or writing a single frame.
///
/// `Timeout` only ever occurs on the very first byte of a frame: nothing was in
/// flight yet, so there is nothing to recover from. Any timeout that happens once a
/// frame has started is reported as `Corrupted`, the same as a bad size or checksum,
/// because the peer is now mid-message and the bus needs to run quiet before trusting
/// it again.
#[derive(Debug)]
pub enum FrameError<E> {
	Timeout,
	Corrupted,
	Io(E),
}

impl<E: fmt::Display> fmt::Display for FrameError<E> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Timeout => write!(f, "timed out waiting for a frame"),
			Self::Corrupted => write!(f, "received a corrupted frame"),
			Self::Io(e) => write!(f, "{}", e),
		}
	}
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for FrameError<E> {}

impl<E> From<ByteReadError<E>> for FrameError<E> {
	/// Only valid for the very first byte read of a frame: see the type docs.
	fn from(other: ByteReadError<E>) -> Self {
		match other {
			ByteReadError::Timeout => Self::Timeout,
			ByteReadError::Io(e) => Self::Io(e),
		}
	}
}

/// Error produced by a client or server level protocol operation.
///
/// Shares its shape with [`FrameError`]: a protocol operation fails for exactly the
/// same three reasons a frame read does, since an exchange is built out of one or two
/// frame transfers. `RequestRejected` and `WrongRequestArguments` are not represented
/// here because they are not failures of the transfer itself, just the answer the peer
/// chose to send back: see [`crate::Answer`].
pub type ProtocolError<E> = FrameError<E>;

/// Update a tracked [`crate::SyncState`] after a protocol operation returns `result`.
///
/// Shared by [`crate::Client`] and [`crate::Server`] so both sides classify a failed
/// exchange the same way: a bare timeout changes nothing, corruption means the next
/// operation must recover first, and an I/O error means the bus itself is gone.
pub(crate) fn next_sync_state<E>(current: crate::SyncState, result: &ProtocolError<E>) -> crate::SyncState {
	match result {
		FrameError::Timeout => current,
		FrameError::Corrupted => crate::SyncState::Suspected,
		FrameError::Io(_) => crate::SyncState::Failed,
	}
}

/// Error produced by a typed, single-purpose request like
/// [`crate::Client::match_protocol_version`] or [`crate::Client::get_device_info`].
///
/// These helpers promise a concrete success value, so unlike [`crate::Client::exchange`]
/// they cannot return `RequestRejected`/`WrongRequestArguments` as an `Ok` answer: those
/// outcomes are folded in here instead, mirroring how the reference client's typed
/// wrappers (`bridge_protocol_match_protocol_version`, `bridge_protocol_get_device_info`)
/// only ever populate their output parameter on a `SUCCESS` result.
#[derive(Debug)]
pub enum RequestError<E> {
	Protocol(ProtocolError<E>),
	Rejected,
	WrongArguments,
	/// The server answered with a `SUCCESS` type that does not match the request it was
	/// answering, most likely because its catalog disagrees with this client's about a
	/// built-in request type.
	UnexpectedAnswer(crate::Answer),
}

impl<E: fmt::Display> fmt::Display for RequestError<E> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Protocol(e) => write!(f, "{}", e),
			Self::Rejected => write!(f, "server rejected the request"),
			Self::WrongArguments => write!(f, "server reported wrong request arguments"),
			Self::UnexpectedAnswer(answer) => write!(f, "server returned an answer that does not match the request: {:?}", answer),
		}
	}
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RequestError<E> {}

impl<E> From<ProtocolError<E>> for RequestError<E> {
	fn from(other: ProtocolError<E>) -> Self {
		Self::Protocol(other)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use assert2::assert;

	#[test]
	fn byte_read_timeout_converts_to_frame_timeout() {
		let err: FrameError<std::io::Error> = ByteReadError::<std::io::Error>::Timeout.into();
		assert!(matches!(err, FrameError::Timeout));
	}
}
