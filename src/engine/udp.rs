//! UDP engine.

use super::message;
use super::{Engine, SessionParams};
use crate::error::{Error, Result};
use crate::pdu::{RequestPdu, ResponsePdu};
use crate::util::bind_ephemeral_udp;
use crate::version::Version;
use bytes::Bytes;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::timeout_at;

/// Largest datagram accepted from an agent.
const MAX_DATAGRAM: usize = 65535;

/// Engine that speaks SNMPv1/v2c over UDP.
///
/// Each session owns an ephemeral socket connected to the agent, so datagrams
/// from other sources never reach it. Request ids come from one counter per
/// engine, seeded from the clock so a restarted process does not reuse the
/// ids of its predecessor.
#[derive(Debug)]
pub struct UdpEngine {
    next_request_id: AtomicI32,
}

impl UdpEngine {
    pub fn new() -> Self {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as i32)
            .unwrap_or(1);
        Self {
            next_request_id: AtomicI32::new(seed.wrapping_abs().max(1)),
        }
    }

    /// Next request id, always positive.
    fn next_request_id(&self) -> i32 {
        loop {
            let id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
            if id > 0 {
                return id;
            }
            // Wrapped past i32::MAX; restart the sequence.
            let _ = self.next_request_id.compare_exchange(
                id.wrapping_add(1),
                1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            );
        }
    }
}

impl Default for UdpEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Session state for [`UdpEngine`].
#[derive(Debug)]
pub struct UdpSession {
    socket: Option<UdpSocket>,
    agent: SocketAddr,
    version: Version,
    community: Bytes,
    timeout: Duration,
    retries: u32,
}

impl UdpSession {
    /// Local address of the session socket, if still open.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    fn network_error(&self, source: io::Error) -> Error {
        Error::Network {
            target: self.agent,
            source,
        }
    }
}

impl Engine for UdpEngine {
    type Session = UdpSession;

    async fn open_session(&self, params: &SessionParams) -> Result<UdpSession> {
        let socket = bind_ephemeral_udp(params.agent).map_err(|e| Error::Network {
            target: params.agent,
            source: e,
        })?;
        socket.connect(params.agent).await.map_err(|e| Error::Network {
            target: params.agent,
            source: e,
        })?;

        tracing::debug!(
            target: "snmp_core::engine",
            { snmp.target = %params.agent, snmp.local_addr = ?socket.local_addr().ok(), snmp.version = %params.version },
            "UDP session opened"
        );

        Ok(UdpSession {
            socket: Some(socket),
            agent: params.agent,
            version: params.version,
            community: params.community.clone(),
            timeout: params.timeout,
            retries: params.retries,
        })
    }

    async fn send_and_wait(
        &self,
        session: &mut UdpSession,
        request: &RequestPdu,
    ) -> Result<ResponsePdu> {
        let Some(socket) = session.socket.as_ref() else {
            return Err(session.network_error(io::Error::new(
                io::ErrorKind::NotConnected,
                "session closed",
            )));
        };

        let request_id = self.next_request_id();
        let data =
            message::encode_request(session.version, &session.community, request_id, request);
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let start = Instant::now();

        for attempt in 0..=session.retries {
            if attempt > 0 {
                tracing::debug!(target: "snmp_core::engine", { snmp.request_id = request_id, snmp.attempt = attempt }, "retrying request");
            }

            tracing::trace!(target: "snmp_core::engine", { snmp.target = %session.agent, snmp.bytes = data.len() }, "UDP send");
            socket
                .send(&data)
                .await
                .map_err(|e| session.network_error(e))?;

            let deadline = tokio::time::Instant::now() + session.timeout;
            loop {
                let len = match timeout_at(deadline, socket.recv(&mut buf)).await {
                    Err(_) => break,
                    Ok(Err(e)) => {
                        tracing::debug!(target: "snmp_core::engine", { snmp.target = %session.agent, error = %e }, "UDP recv error");
                        return Err(session.network_error(e));
                    }
                    Ok(Ok(len)) => len,
                };
                tracing::trace!(target: "snmp_core::engine", { snmp.target = %session.agent, snmp.bytes = len }, "UDP recv");

                let Ok(response) = message::decode_response(Bytes::copy_from_slice(&buf[..len]))
                else {
                    tracing::warn!(target: "snmp_core::engine", { snmp.target = %session.agent, snmp.bytes = len }, "ignoring undecodable datagram");
                    continue;
                };

                if response.pdu.request_id != request_id {
                    tracing::warn!(
                        target: "snmp_core::engine",
                        { snmp.target = %session.agent, expected_request_id = request_id, actual_request_id = response.pdu.request_id },
                        "ignoring response with mismatched request id"
                    );
                    continue;
                }

                if response.version != session.version {
                    tracing::warn!(
                        target: "snmp_core::engine",
                        { snmp.target = %session.agent, expected_version = %session.version, response_version = %response.version },
                        "version mismatch in response"
                    );
                    return Err(Error::MalformedResponse {
                        target: Some(session.agent),
                    });
                }

                tracing::debug!(
                    target: "snmp_core::engine",
                    { snmp.request_id = request_id, snmp.attempt = attempt, snmp.elapsed_ms = start.elapsed().as_millis() as u64 },
                    "response received"
                );
                return Ok(response.pdu);
            }
        }

        let elapsed = start.elapsed();
        tracing::debug!(target: "snmp_core::engine", { snmp.target = %session.agent, snmp.request_id = request_id, ?elapsed, snmp.retries = session.retries }, "request timed out");
        Err(Error::Timeout {
            target: session.agent,
            elapsed,
            retries: session.retries,
        })
    }

    fn close_session(&self, session: &mut UdpSession) {
        if session.socket.take().is_some() {
            tracing::debug!(target: "snmp_core::engine", { snmp.target = %session.agent }, "UDP session closed");
        }
    }
}
