//! Mock engine for testing.
//!
//! Replays scripted replies instead of touching the network, and records
//! what the client asked of it.

use super::{Engine, SessionParams};
use crate::error::{Error, Result};
use crate::pdu::{RequestPdu, ResponsePdu};
use crate::varbind::VarBind;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One scripted outcome of a single attempt.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// The agent answers with this PDU.
    Response(ResponsePdu),
    /// The attempt goes unanswered; the engine waits out the session timeout.
    Timeout,
    /// The socket fails with this message.
    NetworkError(String),
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<MockReply>,
    fail_open: bool,
    sessions: Vec<SessionParams>,
    requests: Vec<RequestPdu>,
    attempts: usize,
    opened: usize,
    closed: usize,
}

/// Scripted engine for tests.
///
/// Clones share state, so a test can keep one handle for inspection and give
/// another to the client.
///
/// ```rust
/// use snmp_core::{Client, ManagedObject, MockEngine, Value, VarBind, Version, oid};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> snmp_core::Result<()> {
/// let engine = MockEngine::new();
/// engine.queue_bindings(vec![VarBind::new(
///     oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
///     Value::from("core-sw1"),
/// )]);
///
/// let client = Client::builder().build_with_engine(engine.clone());
/// let mut objects = [ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0))];
/// client.get(Version::V2c, "public", "192.0.2.1", &mut objects).await?;
///
/// assert_eq!(objects[0].value().as_str(), Some("core-sw1"));
/// assert_eq!(engine.closed_sessions(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

/// Session handle issued by [`MockEngine`].
#[derive(Debug)]
pub struct MockSession {
    params: SessionParams,
    closed: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn queue(&self, reply: MockReply) {
        self.state().replies.push_back(reply);
    }

    pub fn queue_response(&self, response: ResponsePdu) {
        self.queue(MockReply::Response(response));
    }

    /// Queue a successful response carrying `bindings`.
    pub fn queue_bindings(&self, bindings: Vec<VarBind>) {
        self.queue_response(ResponsePdu::new(0, bindings));
    }

    pub fn queue_timeout(&self) {
        self.queue(MockReply::Timeout);
    }

    pub fn queue_network_error(&self, message: impl Into<String>) {
        self.queue(MockReply::NetworkError(message.into()));
    }

    /// Make every subsequent `open_session` fail.
    pub fn fail_open(&self, fail: bool) {
        self.state().fail_open = fail;
    }

    /// Parameters of every session opened so far.
    pub fn sessions(&self) -> Vec<SessionParams> {
        self.state().sessions.clone()
    }

    /// Every request passed to `send_and_wait`, once per exchange.
    pub fn requests(&self) -> Vec<RequestPdu> {
        self.state().requests.clone()
    }

    /// Number of attempts made, retransmissions included.
    pub fn attempts(&self) -> usize {
        self.state().attempts
    }

    pub fn opened_sessions(&self) -> usize {
        self.state().opened
    }

    pub fn closed_sessions(&self) -> usize {
        self.state().closed
    }

    pub fn remaining_replies(&self) -> usize {
        self.state().replies.len()
    }
}

impl Engine for MockEngine {
    type Session = MockSession;

    async fn open_session(&self, params: &SessionParams) -> Result<MockSession> {
        let mut state = self.state();
        if state.fail_open {
            return Err(Error::Network {
                target: params.agent,
                source: io::Error::other("scripted open failure"),
            });
        }
        state.opened += 1;
        state.sessions.push(params.clone());
        Ok(MockSession {
            params: params.clone(),
            closed: false,
        })
    }

    async fn send_and_wait(
        &self,
        session: &mut MockSession,
        request: &RequestPdu,
    ) -> Result<ResponsePdu> {
        let params = &session.params;
        if session.closed {
            return Err(Error::Network {
                target: params.agent,
                source: io::Error::new(io::ErrorKind::NotConnected, "session closed"),
            });
        }
        self.state().requests.push(request.clone());

        let start = tokio::time::Instant::now();
        for _ in 0..=params.retries {
            // Guard must not be held across the sleep.
            let reply = {
                let mut state = self.state();
                state.attempts += 1;
                state.replies.pop_front()
            };
            match reply {
                Some(MockReply::Response(response)) => return Ok(response),
                Some(MockReply::NetworkError(message)) => {
                    return Err(Error::Network {
                        target: params.agent,
                        source: io::Error::other(message),
                    });
                }
                Some(MockReply::Timeout) | None => tokio::time::sleep(params.timeout).await,
            }
        }

        Err(Error::Timeout {
            target: params.agent,
            elapsed: start.elapsed(),
            retries: params.retries,
        })
    }

    fn close_session(&self, session: &mut MockSession) {
        if !session.closed {
            session.closed = true;
            self.state().closed += 1;
        }
    }
}
