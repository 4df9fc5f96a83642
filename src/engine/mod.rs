//! Transport engine abstraction.
//!
//! An [`Engine`] owns everything below the PDU: addressing, the wire codec,
//! retransmission and timeouts. The client drives it through three calls per
//! operation: open a session, exchange one request, close the session.
//!
//! [`UdpEngine`] is the real implementation. [`MockEngine`] replays scripted
//! replies for tests.

pub mod message;
mod mock;
mod udp;

pub use mock::*;
pub use udp::*;

use crate::error::Result;
use crate::pdu::{RequestPdu, ResponsePdu};
use crate::version::Version;
use bytes::Bytes;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

/// Everything an engine needs to open a session with one agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Resolved agent address.
    pub agent: SocketAddr,
    pub version: Version,
    pub community: Bytes,
    /// How long to wait for a reply to each attempt.
    pub timeout: Duration,
    /// Retransmissions after the first attempt.
    pub retries: u32,
}

impl SessionParams {
    /// Upper bound on how long one exchange can take.
    pub fn max_wait(&self) -> Duration {
        self.timeout.saturating_mul(self.retries.saturating_add(1))
    }
}

/// Transport engine used by [`Client`](crate::Client).
///
/// Sessions are never shared between operations: each operation opens one,
/// exchanges exactly one request on it, and closes it on every exit path.
pub trait Engine: Send + Sync {
    /// Engine-owned session handle.
    type Session: Send;

    /// Create a session. Must not send anything on the wire.
    fn open_session(
        &self,
        params: &SessionParams,
    ) -> impl Future<Output = Result<Self::Session>> + Send;

    /// Send `request` and wait for the matching response, retransmitting up
    /// to `retries` times and waiting up to `timeout` per attempt.
    ///
    /// Returns [`Error::Timeout`](crate::Error::Timeout) when every attempt
    /// goes unanswered and [`Error::Network`](crate::Error::Network) on socket
    /// faults, which are not retried.
    fn send_and_wait(
        &self,
        session: &mut Self::Session,
        request: &RequestPdu,
    ) -> impl Future<Output = Result<ResponsePdu>> + Send;

    /// Release the session's resources. Called exactly once per session.
    fn close_session(&self, session: &mut Self::Session);
}
