//! SNMP client.
//!
//! A [`Client`] runs one operation per call: build the request PDU, open a
//! session with the agent, exchange the request, map the response onto the
//! caller's objects, and close the session. The session is closed on every
//! exit path, including errors and a dropped future.

mod builder;
mod exchange;
pub mod response;
mod session;

pub use builder::ClientBuilder;

use std::time::Duration;

use tracing::instrument;

use crate::engine::{Engine, UdpEngine};
use crate::error::Result;
use crate::mib::{ForeignMibNode, MibTree};
use crate::object::ManagedObject;
use crate::pdu::{RequestPdu, RequestType, ResponsePdu};
use crate::version::Version;

/// Agent port used when the agent string names none.
pub const DEFAULT_PORT: u16 = 161;

/// Retransmissions after the first attempt.
pub const DEFAULT_RETRIES: u16 = 3;

/// Wait per attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// GETBULK non-repeaters when the caller has no preference.
pub const DEFAULT_NON_REPEATERS: u16 = 0;

/// GETBULK max-repetitions when the caller has no preference.
pub const DEFAULT_MAX_REPETITIONS: u16 = 10;

/// Per-client session parameters.
///
/// Each operation takes a copy when it starts, so changing the configuration
/// only affects operations started afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    pub port: u16,
    pub retries: u16,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Upper bound on the time one operation spends waiting for the agent.
    pub fn max_wait(&self) -> Duration {
        self.timeout.saturating_mul(u32::from(self.retries) + 1)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            retries: DEFAULT_RETRIES,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// SNMP v1/v2c client.
///
/// The client holds no per-agent state: version, community and agent are
/// arguments of each operation. Share a client across tasks with
/// `Arc<Client>`.
///
/// # Example
///
/// ```rust,no_run
/// use snmp_core::{Client, ManagedObject, Version, oid};
///
/// # async fn example() -> snmp_core::Result<()> {
/// let client = Client::builder().build();
/// let mut objects = vec![
///     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)),
///     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
/// ];
///
/// client.get(Version::V2c, "public", "192.168.1.1", &mut objects).await?;
/// for object in &objects {
///     println!("{object}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client<E: Engine = UdpEngine> {
    engine: E,
    config: ClientConfig,
}

impl Client<UdpEngine> {
    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<E: Engine> Client<E> {
    pub fn new(engine: E, config: ClientConfig) -> Self {
        Self { engine, config }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> ClientConfig {
        self.config
    }

    pub fn set_port(&mut self, port: u16) {
        self.config.port = port;
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn set_retries(&mut self, retries: u16) {
        self.config.retries = retries;
    }

    pub fn retries(&self) -> u16 {
        self.config.retries
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.timeout = timeout;
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Run one request against `agent` and map the response onto `objects`.
    ///
    /// `agent` is an IP literal, a hostname, or `host:port`; without a port
    /// the configured one is used. `non_repeaters` (clamped to
    /// `objects.len()`) and `max_repetitions` only matter for GETBULK.
    ///
    /// On success, object `i` holds the value of response binding `i` (see
    /// [`response::apply`]). On error, `objects` is left untouched. Total
    /// time spent waiting is bounded by [`ClientConfig::max_wait`].
    #[allow(clippy::too_many_arguments)]
    #[instrument(
        level = "debug",
        skip_all,
        err,
        fields(snmp.pdu_type = %request_type, snmp.version = %version, snmp.agent = agent, snmp.varbind_count = objects.len())
    )]
    pub async fn execute(
        &self,
        request_type: RequestType,
        version: Version,
        community: impl AsRef<[u8]>,
        agent: &str,
        objects: &mut [ManagedObject],
        non_repeaters: u16,
        max_repetitions: u16,
    ) -> Result<()> {
        let response = self
            .run(
                request_type,
                version,
                community.as_ref(),
                agent,
                objects,
                non_repeaters,
                max_repetitions,
            )
            .await?;
        response::apply(response, version, objects);
        Ok(())
    }

    /// Run one request and return the validated response without mapping it.
    ///
    /// This is the way to see every binding of a GETBULK response; `execute`
    /// maps only one binding per object.
    #[allow(clippy::too_many_arguments)]
    #[instrument(
        level = "debug",
        skip_all,
        err,
        fields(snmp.pdu_type = %request_type, snmp.version = %version, snmp.agent = agent, snmp.varbind_count = objects.len())
    )]
    pub async fn exchange(
        &self,
        request_type: RequestType,
        version: Version,
        community: impl AsRef<[u8]>,
        agent: &str,
        objects: &[ManagedObject],
        non_repeaters: u16,
        max_repetitions: u16,
    ) -> Result<ResponsePdu> {
        self.run(
            request_type,
            version,
            community.as_ref(),
            agent,
            objects,
            non_repeaters,
            max_repetitions,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        &self,
        request_type: RequestType,
        version: Version,
        community: &[u8],
        agent: &str,
        objects: &[ManagedObject],
        non_repeaters: u16,
        max_repetitions: u16,
    ) -> Result<ResponsePdu> {
        let config = self.config;
        let request =
            RequestPdu::build(request_type, version, objects, non_repeaters, max_repetitions)?;
        let mut session =
            session::open_session(&self.engine, version, community, agent, &config).await?;
        exchange::send(&mut session, &request).await
    }

    /// GET the current values of `objects`.
    pub async fn get(
        &self,
        version: Version,
        community: impl AsRef<[u8]>,
        agent: &str,
        objects: &mut [ManagedObject],
    ) -> Result<()> {
        self.execute(RequestType::Get, version, community, agent, objects, 0, 0)
            .await
    }

    /// GETNEXT: each object receives the value of its lexicographic successor.
    ///
    /// Object OIDs are not changed; use [`exchange`](Self::exchange) to see
    /// the successor OIDs.
    pub async fn get_next(
        &self,
        version: Version,
        community: impl AsRef<[u8]>,
        agent: &str,
        objects: &mut [ManagedObject],
    ) -> Result<()> {
        self.execute(RequestType::GetNext, version, community, agent, objects, 0, 0)
            .await
    }

    /// SET every object to its current value.
    pub async fn set(
        &self,
        version: Version,
        community: impl AsRef<[u8]>,
        agent: &str,
        objects: &mut [ManagedObject],
    ) -> Result<()> {
        self.execute(RequestType::Set, version, community, agent, objects, 0, 0)
            .await
    }

    /// GETBULK (SNMPv2c only). See [`DEFAULT_NON_REPEATERS`] and
    /// [`DEFAULT_MAX_REPETITIONS`] for neutral counts.
    pub async fn get_bulk(
        &self,
        version: Version,
        community: impl AsRef<[u8]>,
        agent: &str,
        objects: &mut [ManagedObject],
        non_repeaters: u16,
        max_repetitions: u16,
    ) -> Result<()> {
        self.execute(
            RequestType::GetBulk,
            version,
            community,
            agent,
            objects,
            non_repeaters,
            max_repetitions,
        )
        .await
    }

    /// Convert a foreign MIB tree into an owned [`MibTree`].
    ///
    /// Independent of any agent; see [`crate::mib::parse`].
    pub fn get_mib_tree<N: ForeignMibNode>(&self, root: &N) -> Result<MibTree> {
        crate::mib::parse(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use crate::error::{Error, ErrorStatus, PduErrorKind, SessionErrorKind};
    use crate::oid;
    use crate::value::Value;
    use crate::varbind::VarBind;

    fn client(engine: &MockEngine) -> Client<MockEngine> {
        Client::builder().build_with_engine(engine.clone())
    }

    fn sys_objects() -> Vec<ManagedObject> {
        vec![
            ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)),
            ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
        ]
    }

    #[test]
    fn test_config_max_wait() {
        assert_eq!(ClientConfig::default().max_wait(), Duration::from_secs(4));
    }

    #[test]
    fn test_setters() {
        let mut c = client(&MockEngine::new());
        c.set_port(1161);
        c.set_retries(0);
        c.set_timeout(Duration::from_millis(10));
        assert_eq!(c.port(), 1161);
        assert_eq!(c.retries(), 0);
        assert_eq!(c.timeout(), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_get_maps_values() {
        let engine = MockEngine::new();
        engine.queue_bindings(vec![
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("edge router")),
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(123_456)),
        ]);

        let mut objects = sys_objects();
        client(&engine)
            .get(Version::V2c, "public", "192.0.2.1", &mut objects)
            .await
            .unwrap();

        assert_eq!(objects[0].value().as_str(), Some("edge router"));
        assert_eq!(objects[1].value(), &Value::TimeTicks(123_456));
        assert_eq!(engine.opened_sessions(), 1);
        assert_eq!(engine.closed_sessions(), 1);

        let request = &engine.requests()[0];
        assert_eq!(request.request_type(), RequestType::Get);
        assert!(request.bindings().iter().all(|vb| vb.value == Value::Null));
    }

    #[tokio::test]
    async fn test_build_failure_opens_nothing() {
        let engine = MockEngine::new();
        let c = client(&engine);

        let err = c
            .get(Version::V2c, "public", "192.0.2.1", &mut [])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Pdu {
                kind: PduErrorKind::NoObjects,
                ..
            }
        ));

        let mut objects = sys_objects();
        let err = c
            .get_bulk(Version::V1, "public", "192.0.2.1", &mut objects, 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Pdu {
                request_type: RequestType::GetBulk,
                kind: PduErrorKind::UnsupportedType,
            }
        ));

        assert_eq!(engine.opened_sessions(), 0);
    }

    #[tokio::test]
    async fn test_error_leaves_objects_untouched() {
        let engine = MockEngine::new();
        engine.queue_response(
            ResponsePdu::new(1, vec![VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))])
                .with_error(ErrorStatus::NotWritable, 1),
        );

        let mut objects = vec![ManagedObject::with_value(
            oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
            Value::from("new descr"),
        )];
        let before = objects.clone();
        let err = client(&engine)
            .set(Version::V2c, "private", "192.0.2.1", &mut objects)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Snmp {
                status: ErrorStatus::NotWritable,
                index: 1,
                ..
            }
        ));
        assert_eq!(objects, before);
        assert_eq!(engine.closed_sessions(), 1);
    }

    #[tokio::test]
    async fn test_port_applies_to_bare_agents() {
        let engine = MockEngine::new();
        engine.queue_bindings(vec![VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))]);
        engine.queue_bindings(vec![VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))]);

        let mut c = client(&engine);
        let mut objects = vec![ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))];
        c.set_port(1161);
        c.get(Version::V1, "public", "192.0.2.1", &mut objects)
            .await
            .unwrap();
        c.get(Version::V1, "public", "192.0.2.1:2161", &mut objects)
            .await
            .unwrap();

        let sessions = engine.sessions();
        assert_eq!(sessions[0].agent.port(), 1161);
        assert_eq!(sessions[1].agent.port(), 2161);
    }

    #[tokio::test]
    async fn test_unresolvable_agent() {
        let engine = MockEngine::new();
        let mut objects = sys_objects();
        let err = client(&engine)
            .get(Version::V2c, "public", "nonexistent.invalid", &mut objects)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Session {
                kind: SessionErrorKind::Resolution,
                ..
            }
        ));
        assert_eq!(engine.opened_sessions(), 0);
        assert!(engine.requests().is_empty());
    }
}
