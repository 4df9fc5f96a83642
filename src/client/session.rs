//! Per-operation sessions.

use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;

use crate::engine::{Engine, SessionParams};
use crate::error::{Error, Result, SessionErrorKind};
use crate::version::Version;

use super::ClientConfig;

/// An open engine session, closed when dropped.
///
/// Borrowing the engine ties the session to the operation that opened it; it
/// can never outlive the call or be handed to another operation.
pub(crate) struct Session<'a, E: Engine> {
    engine: &'a E,
    handle: E::Session,
    params: SessionParams,
}

impl<'a, E: Engine> Session<'a, E> {
    pub(crate) fn params(&self) -> &SessionParams {
        &self.params
    }

    pub(crate) fn engine(&self) -> &'a E {
        self.engine
    }

    pub(crate) fn handle_mut(&mut self) -> &mut E::Session {
        &mut self.handle
    }
}

impl<E: Engine> Drop for Session<'_, E> {
    fn drop(&mut self) {
        self.engine.close_session(&mut self.handle);
        tracing::debug!(target: "snmp_core::client", { snmp.target = %self.params.agent }, "session closed");
    }
}

/// Resolve `agent` and open a session on `engine`.
///
/// Nothing is sent on the wire.
pub(crate) async fn open_session<'a, E: Engine>(
    engine: &'a E,
    version: Version,
    community: &[u8],
    agent: &str,
    config: &ClientConfig,
) -> Result<Session<'a, E>> {
    let addr = resolve_agent(agent, config.port).await?;
    let params = SessionParams {
        agent: addr,
        version,
        community: Bytes::copy_from_slice(community),
        timeout: config.timeout,
        retries: u32::from(config.retries),
    };

    let handle = engine
        .open_session(&params)
        .await
        .map_err(|err| match err {
            Error::Network { source, .. } => {
                Error::session(agent, SessionErrorKind::EngineInit, Some(source))
            }
            Error::Session { .. } => err,
            other => {
                tracing::debug!(target: "snmp_core::client", { snmp.target = %addr, error = %other }, "engine rejected session");
                Error::session(agent, SessionErrorKind::EngineInit, None)
            }
        })?;

    tracing::debug!(
        target: "snmp_core::client",
        { snmp.target = %addr, snmp.version = %version, snmp.timeout = ?params.timeout, snmp.retries = params.retries },
        "session opened"
    );

    Ok(Session {
        engine,
        handle,
        params,
    })
}

/// Resolve an IP literal, `host`, or `host:port`. `default_port` applies when
/// the agent string carries none.
pub(crate) async fn resolve_agent(agent: &str, default_port: u16) -> Result<SocketAddr> {
    let agent = agent.trim();
    let unresolved = |source| Error::session(agent, SessionErrorKind::Resolution, source);

    if agent.is_empty() {
        return Err(unresolved(None));
    }
    if let Ok(addr) = agent.parse::<SocketAddr>() {
        return Ok(addr);
    }
    let bare = agent
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(agent);
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, default_port));
    }

    let lookup = match agent.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse::<u16>() {
            Ok(port) => tokio::net::lookup_host((host, port)).await,
            Err(_) => return Err(unresolved(None)),
        },
        _ => tokio::net::lookup_host((agent, default_port)).await,
    };

    let mut addrs = lookup.map_err(|err| {
        tracing::debug!(target: "snmp_core::client", { snmp.agent = agent, error = %err }, "resolution failed");
        unresolved(Some(err))
    })?;
    addrs.next().ok_or_else(|| unresolved(None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MockEngine;
    use crate::error::ErrorCategory;
    use std::time::Duration;

    #[tokio::test]
    async fn test_resolve_literals() {
        assert_eq!(
            resolve_agent("192.0.2.1", 161).await.unwrap(),
            "192.0.2.1:161".parse().unwrap()
        );
        assert_eq!(
            resolve_agent("192.0.2.1:1161", 161).await.unwrap(),
            "192.0.2.1:1161".parse().unwrap()
        );
        assert_eq!(
            resolve_agent("::1", 10161).await.unwrap(),
            "[::1]:10161".parse().unwrap()
        );
        assert_eq!(
            resolve_agent("[::1]", 162).await.unwrap(),
            "[::1]:162".parse().unwrap()
        );
        assert_eq!(
            resolve_agent("[2001:db8::1]:1161", 161).await.unwrap(),
            "[2001:db8::1]:1161".parse().unwrap()
        );
    }

    #[tokio::test]
    async fn test_resolve_localhost() {
        let addr = resolve_agent("localhost", 1161).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 1161);

        let addr = resolve_agent("localhost:2161", 161).await.unwrap();
        assert_eq!(addr.port(), 2161);
    }

    #[tokio::test]
    async fn test_resolve_failures() {
        for agent in ["", "   ", "host:notaport", "nonexistent.invalid"] {
            let err = resolve_agent(agent, 161).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    Error::Session {
                        kind: SessionErrorKind::Resolution,
                        ..
                    }
                ),
                "{agent:?}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_open_session_snapshots_config() {
        let engine = MockEngine::new();
        let config = ClientConfig {
            port: 1161,
            retries: 2,
            timeout: Duration::from_millis(300),
        };
        {
            let session = open_session(&engine, Version::V1, b"ro", "192.0.2.9", &config)
                .await
                .unwrap();
            assert_eq!(session.params().agent, "192.0.2.9:1161".parse().unwrap());
            assert_eq!(session.params().retries, 2);
            assert_eq!(engine.closed_sessions(), 0);
        }
        assert_eq!(engine.closed_sessions(), 1);

        let params = &engine.sessions()[0];
        assert_eq!(params.version, Version::V1);
        assert_eq!(&params.community[..], b"ro");
        assert_eq!(params.timeout, Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_engine_failure_is_engine_init() {
        let engine = MockEngine::new();
        engine.fail_open(true);
        let err = open_session(&engine, Version::V2c, b"public", "192.0.2.9", &ClientConfig::default())
            .await
            .err()
            .unwrap();
        assert_eq!(err.category(), ErrorCategory::Session);
        assert!(matches!(
            err,
            Error::Session {
                kind: SessionErrorKind::EngineInit,
                source: Some(_),
                ..
            }
        ));
        assert_eq!(engine.closed_sessions(), 0);
    }
}
