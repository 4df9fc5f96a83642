//! Community-based SNMP message format (v1/v2c).
//!
//! Both versions share one structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`

use crate::ber::{Decoder, EncodeBuf};
use crate::error::internal::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::error::{Error, Result};
use crate::pdu::{RequestPdu, ResponsePdu};
use crate::version::Version;
use bytes::Bytes;

/// A decoded response message.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseMessage {
    pub version: Version,
    pub community: Bytes,
    pub pdu: ResponsePdu,
}

/// Encode a request message.
pub fn encode_request(
    version: Version,
    community: &[u8],
    request_id: i32,
    pdu: &RequestPdu,
) -> Bytes {
    let mut buf = EncodeBuf::new();
    buf.push_sequence(|buf| {
        pdu.encode(request_id, buf);
        buf.push_octet_string(community);
        buf.push_integer(version.as_i32());
    });
    buf.finish()
}

/// Encode a response message, as an agent would send it.
pub fn encode_response(version: Version, community: &[u8], pdu: &ResponsePdu) -> Bytes {
    let mut buf = EncodeBuf::new();
    buf.push_sequence(|buf| {
        pdu.encode(buf);
        buf.push_octet_string(community);
        buf.push_integer(version.as_i32());
    });
    buf.finish()
}

/// Decode a response message.
///
/// The detailed reason for a failure is logged at debug level; the caller
/// only sees [`Error::MalformedResponse`].
pub fn decode_response(data: Bytes) -> Result<ResponseMessage> {
    decode_response_inner(data).map_err(|err| {
        tracing::debug!(target: "snmp_core::ber", { snmp.offset = err.offset, kind = %err.kind }, "decode error");
        Error::MalformedResponse { target: None }
    })
}

fn decode_response_inner(data: Bytes) -> DecodeResult<ResponseMessage> {
    let mut decoder = Decoder::new(data);
    let mut seq = decoder.read_sequence()?;
    if !decoder.is_empty() {
        return Err(DecodeError::new(
            decoder.position(),
            DecodeErrorKind::TrailingData {
                remaining: decoder.remaining(),
            },
        ));
    }

    let version = read_version(&mut seq)?;
    let community = seq.read_octet_string()?;
    let pdu = ResponsePdu::decode(&mut seq)?;

    Ok(ResponseMessage {
        version,
        community,
        pdu,
    })
}

fn read_version(seq: &mut Decoder) -> DecodeResult<Version> {
    let at = seq.position();
    let number = seq.read_integer()?;
    Version::from_i32(number)
        .ok_or(DecodeError::new(at, DecodeErrorKind::UnknownVersion(number)))
}

/// Decode a request message: `(version, community, request_id, pdu)`.
#[cfg(test)]
pub(crate) fn decode_request(data: Bytes) -> DecodeResult<(Version, Bytes, i32, RequestPdu)> {
    let mut decoder = Decoder::new(data);
    let mut seq = decoder.read_sequence()?;
    let version = read_version(&mut seq)?;
    let community = seq.read_octet_string()?;
    let (request_id, pdu) = RequestPdu::decode(&mut seq)?;
    Ok((version, community, request_id, pdu))
}
