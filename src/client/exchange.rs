//! Single request/response exchange over an open session.

use std::net::SocketAddr;

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::pdu::{RequestPdu, ResponsePdu};
use crate::version::Version;

use super::response::attributed_error;
use super::session::Session;

/// Send `request` on `session` and validate the response against it.
///
/// Retransmission and per-attempt timeouts are the engine's job; nothing is
/// retried here.
pub(crate) async fn send<E: Engine>(
    session: &mut Session<'_, E>,
    request: &RequestPdu,
) -> Result<ResponsePdu> {
    let target = session.params().agent;
    let version = session.params().version;
    let engine = session.engine();

    tracing::debug!(
        target: "snmp_core::client",
        { snmp.target = %target, snmp.pdu_type = %request.request_type(), snmp.varbind_count = request.bindings().len() },
        "sending request"
    );

    let response = engine.send_and_wait(session.handle_mut(), request).await?;
    validate(&response, request, version, target)?;

    tracing::debug!(
        target: "snmp_core::client",
        { snmp.target = %target, snmp.request_id = response.request_id, snmp.varbind_count = response.bindings.len() },
        "response accepted"
    );
    Ok(response)
}

/// Check a response's error status and binding count.
///
/// Error statuses are checked first: one an SNMPv1 agent pins on a single
/// binding is left for the mapper, anything else fails the exchange.
pub(crate) fn validate(
    response: &ResponsePdu,
    request: &RequestPdu,
    version: Version,
    target: SocketAddr,
) -> Result<()> {
    if response.is_error()
        && attributed_error(response, version, request.bindings().len()).is_none()
    {
        tracing::debug!(
            target: "snmp_core::client",
            { snmp.target = %target, snmp.error_status = %response.error_status, snmp.error_index = response.error_index },
            "agent reported error"
        );
        return Err(Error::Snmp {
            target: Some(target),
            status: response.error_status,
            index: response.error_index,
            oid: response.error_binding().map(|vb| vb.oid.clone()),
        });
    }

    let count = response.bindings.len();
    let min = request.min_response_bindings();
    let max = request.max_response_bindings();
    if count < min || count > max {
        tracing::warn!(
            target: "snmp_core::client",
            { snmp.target = %target, snmp.pdu_type = %request.request_type(), snmp.varbind_count = count, min, max },
            "response binding count does not fit the request"
        );
        return Err(Error::MalformedResponse {
            target: Some(target),
        });
    }

    Ok(())
}
