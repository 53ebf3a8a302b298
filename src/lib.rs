//! A symmetric request/response framing protocol for byte streams that may drop,
//! delay, or corrupt data: typically a UART or similar serial link between two devices.
//!
//! One side runs [`Client`], the other runs [`Server`]; both halves share the same
//! wire format, checksum, and recovery procedure, implemented once in [`frame`] and
//! [`recovery`] and reused by both.

#[macro_use]
mod log;

pub mod answer;
pub mod catalog;
pub mod checksum;
pub mod endian;
pub mod error;
pub mod frame;
pub mod recovery;
pub mod request;
pub mod transport;

mod client;
mod server;

#[cfg(test)]
mod test_support;

pub use answer::{Answer, DeviceInfo};
pub use catalog::{BuiltinCatalog, Catalog};
pub use client::Client;
pub use error::{ByteReadError, FrameError, ProtocolError, RequestError};
pub use request::Request;
pub use server::{Server, ServerEvent};
pub use transport::Bus;

use std::time::Duration;

/// Bridge protocol version implemented by this crate.
pub const PROTOCOL_VERSION: u16 = 1;

/// Maximum time allowed between individual bytes of a single frame.
pub const BETWEEN_BYTES_TIMEOUT_MS: u64 = 50;
/// Maximum time a client waits for an answer after sending a request.
pub const WAIT_ANSWER_TIMEOUT_MS: u64 = 5000;
/// Polling interval used while waiting for the bus to fall silent during recovery.
pub const RECOVER_TIMEOUT_MS: u64 = 100;

pub(crate) const BETWEEN_BYTES_TIMEOUT: Duration = Duration::from_millis(BETWEEN_BYTES_TIMEOUT_MS);
pub(crate) const WAIT_ANSWER_TIMEOUT: Duration = Duration::from_millis(WAIT_ANSWER_TIMEOUT_MS);
pub(crate) const RECOVER_TIMEOUT: Duration = Duration::from_millis(RECOVER_TIMEOUT_MS);
/// Timeout used by the bootstrap and unknown-request recovery loops, matching the
/// reference implementation's `bridge_init()`/`bridge_recovery_wait()` helpers.
pub(crate) const RECOVERY_WAIT_TIMEOUT: Duration = Duration::from_millis(1000);

/// How well a [`Client`] or [`Server`] believes it is in step with its peer.
///
/// Tracked purely from the return values of past operations: nothing here retries or
/// re-synchronizes on its own. A `Corrupted` result moves a session to `Suspected`; the
/// caller is expected to call `recover()` before sending or reading anything else. An
/// I/O error moves a session to `Failed`, since the transport itself is no longer
/// trustworthy and no amount of protocol-level recovery can fix that.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SyncState {
	Synchronized,
	Suspected,
	Failed,
}
