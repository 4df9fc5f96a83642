//! SNMP Protocol Data Units (PDUs).
//!
//! [`RequestPdu`] is built from the caller's objects and is immutable once
//! built. [`ResponsePdu`] is what an engine hands back after a successful
//! exchange.

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::internal::{DecodeError, DecodeErrorKind, DecodeResult};
use crate::error::{Error, ErrorStatus, PduErrorKind, Result};
use crate::object::ManagedObject;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};
use crate::version::Version;

/// Kind of request an operation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    Get,
    GetNext,
    GetBulk,
    Set,
}

impl RequestType {
    /// PDU tag byte.
    pub fn tag(self) -> u8 {
        match self {
            RequestType::Get => tag::pdu::GET_REQUEST,
            RequestType::GetNext => tag::pdu::GET_NEXT_REQUEST,
            RequestType::GetBulk => tag::pdu::GET_BULK_REQUEST,
            RequestType::Set => tag::pdu::SET_REQUEST,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::pdu::GET_REQUEST => Some(RequestType::Get),
            tag::pdu::GET_NEXT_REQUEST => Some(RequestType::GetNext),
            tag::pdu::GET_BULK_REQUEST => Some(RequestType::GetBulk),
            tag::pdu::SET_REQUEST => Some(RequestType::Set),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GetRequest"),
            Self::GetNext => write!(f, "GetNextRequest"),
            Self::GetBulk => write!(f, "GetBulkRequest"),
            Self::Set => write!(f, "SetRequest"),
        }
    }
}

/// A request ready to be sent.
///
/// `non_repeaters` and `max_repetitions` are zero for every type except
/// [`RequestType::GetBulk`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPdu {
    request_type: RequestType,
    bindings: Vec<VarBind>,
    non_repeaters: u16,
    max_repetitions: u16,
}

impl RequestPdu {
    /// Build a request from the caller's objects.
    ///
    /// Read requests (GET, GETNEXT, GETBULK) bind each OID to NULL; SET binds
    /// each OID to the object's current value. For GETBULK, `non_repeaters` is
    /// clamped to the number of objects and `max_repetitions` is taken as
    /// given; both are ignored for the other types.
    ///
    /// Nothing is sent. Failures are reported as [`Error::Pdu`]:
    ///
    /// - GETBULK under SNMPv1: [`PduErrorKind::UnsupportedType`]
    /// - empty object list: [`PduErrorKind::NoObjects`]
    /// - an object OID that cannot be BER-encoded: [`PduErrorKind::InvalidObjectId`]
    /// - a SET value the version cannot carry: [`PduErrorKind::ValueEncoding`]
    ///
    /// ```
    /// use snmp_core::{ManagedObject, RequestPdu, RequestType, Version, oid};
    ///
    /// let objects = [
    ///     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 3)),
    ///     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)),
    /// ];
    /// let pdu = RequestPdu::build(RequestType::GetBulk, Version::V2c, &objects, 5, 10).unwrap();
    /// assert_eq!(pdu.non_repeaters(), 2);
    /// assert_eq!(pdu.max_repetitions(), 10);
    ///
    /// let pdu = RequestPdu::build(RequestType::Get, Version::V2c, &objects, 5, 10).unwrap();
    /// assert_eq!((pdu.non_repeaters(), pdu.max_repetitions()), (0, 0));
    /// ```
    pub fn build(
        request_type: RequestType,
        version: Version,
        objects: &[ManagedObject],
        non_repeaters: u16,
        max_repetitions: u16,
    ) -> Result<Self> {
        let fail = |kind| Err(Error::pdu(request_type, kind));

        if request_type == RequestType::GetBulk && !version.is_v2() {
            return fail(PduErrorKind::UnsupportedType);
        }
        if objects.is_empty() {
            return fail(PduErrorKind::NoObjects);
        }

        let mut bindings = Vec::with_capacity(objects.len());
        for (index, object) in objects.iter().enumerate() {
            if object.oid().validate().is_err() {
                return fail(PduErrorKind::InvalidObjectId { index });
            }
            let binding = match request_type {
                RequestType::Set => {
                    if !object.value().is_encodable(version) {
                        return fail(PduErrorKind::ValueEncoding { index });
                    }
                    VarBind::new(object.oid().clone(), object.value().clone())
                }
                _ => VarBind::null(object.oid().clone()),
            };
            bindings.push(binding);
        }

        let (non_repeaters, max_repetitions) = match request_type {
            RequestType::GetBulk => {
                let len = u16::try_from(bindings.len()).unwrap_or(u16::MAX);
                (non_repeaters.min(len), max_repetitions)
            }
            _ => (0, 0),
        };

        tracing::trace!(
            target: "snmp_core::pdu",
            { snmp.pdu_type = %request_type, snmp.varbind_count = bindings.len(), snmp.non_repeaters = non_repeaters, snmp.max_repetitions = max_repetitions },
            "request built"
        );

        Ok(Self {
            request_type,
            bindings,
            non_repeaters,
            max_repetitions,
        })
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn bindings(&self) -> &[VarBind] {
        &self.bindings
    }

    pub fn non_repeaters(&self) -> u16 {
        self.non_repeaters
    }

    pub fn max_repetitions(&self) -> u16 {
        self.max_repetitions
    }

    /// Largest binding count a well-formed response to this request can carry.
    pub fn max_response_bindings(&self) -> usize {
        match self.request_type {
            RequestType::GetBulk => {
                let nr = usize::from(self.non_repeaters);
                let repeaters = self.bindings.len() - nr;
                nr + repeaters * usize::from(self.max_repetitions)
            }
            _ => self.bindings.len(),
        }
    }

    /// Smallest binding count a well-formed response to this request can carry.
    ///
    /// A GETBULK agent may stop after the non-repeaters only when
    /// `max_repetitions` is zero; otherwise every repeater appears at least once.
    pub fn min_response_bindings(&self) -> usize {
        match self.request_type {
            RequestType::GetBulk if self.max_repetitions > 0 => {
                self.bindings.len() - usize::from(self.non_repeaters)
            }
            RequestType::GetBulk => 0,
            _ => self.bindings.len(),
        }
    }

    /// Encode the PDU (not the enclosing message).
    ///
    /// GETBULK carries its counts in the error-status / error-index slots.
    pub fn encode(&self, request_id: i32, buf: &mut EncodeBuf) {
        let (second, third) = match self.request_type {
            RequestType::GetBulk => (
                i32::from(self.non_repeaters),
                i32::from(self.max_repetitions),
            ),
            _ => (0, 0),
        };
        buf.push_constructed(self.request_type.tag(), |buf| {
            encode_varbind_list(buf, &self.bindings);
            buf.push_integer(third);
            buf.push_integer(second);
            buf.push_integer(request_id);
        });
    }

    /// Decode a request PDU. Used by in-crate agent doubles.
    #[cfg(test)]
    pub(crate) fn decode(decoder: &mut Decoder) -> DecodeResult<(i32, Self)> {
        let at = decoder.position();
        let pdu_tag = decoder.read_tag()?;
        let request_type = RequestType::from_tag(pdu_tag)
            .ok_or(DecodeError::new(at, DecodeErrorKind::UnknownPduType(pdu_tag)))?;
        let len = decoder.read_length()?;
        let mut body = decoder.sub_decoder(len)?;

        let request_id = body.read_integer()?;
        let second = body.read_integer()?;
        let third = body.read_integer()?;
        let bindings = decode_varbind_list(&mut body)?;

        let (non_repeaters, max_repetitions) = match request_type {
            RequestType::GetBulk => (second as u16, third as u16),
            _ => (0, 0),
        };
        Ok((
            request_id,
            Self {
                request_type,
                bindings,
                non_repeaters,
                max_repetitions,
            },
        ))
    }
}

/// A decoded Response-PDU.
///
/// `error_index` is 1-based; zero means the error (if any) is not tied to a
/// particular binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponsePdu {
    pub request_id: i32,
    pub error_status: ErrorStatus,
    pub error_index: u32,
    pub bindings: Vec<VarBind>,
}

impl ResponsePdu {
    /// A successful response carrying `bindings`.
    pub fn new(request_id: i32, bindings: Vec<VarBind>) -> Self {
        Self {
            request_id,
            error_status: ErrorStatus::NoError,
            error_index: 0,
            bindings,
        }
    }

    /// Replace the error status and index.
    pub fn with_error(mut self, status: ErrorStatus, index: u32) -> Self {
        self.error_status = status;
        self.error_index = index;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error_status.is_error()
    }

    /// Binding named by `error_index`, if the index is in range.
    pub fn error_binding(&self) -> Option<&VarBind> {
        let index = usize::try_from(self.error_index).ok()?;
        index.checked_sub(1).and_then(|i| self.bindings.get(i))
    }

    pub fn encode(&self, buf: &mut EncodeBuf) {
        buf.push_constructed(tag::pdu::RESPONSE, |buf| {
            encode_varbind_list(buf, &self.bindings);
            buf.push_integer(i32::try_from(self.error_index).unwrap_or(i32::MAX));
            buf.push_integer(self.error_status.as_i32());
            buf.push_integer(self.request_id);
        });
    }

    /// Decode a Response-PDU. Any other PDU tag is an error.
    pub(crate) fn decode(decoder: &mut Decoder) -> DecodeResult<Self> {
        let len = decoder.expect_tag(tag::pdu::RESPONSE)?;
        let mut body = decoder.sub_decoder(len)?;

        let request_id = body.read_integer()?;
        let error_status = body.read_integer()?;
        let at = body.position();
        let error_index = body.read_integer()?;
        let error_index = u32::try_from(error_index).map_err(|_| {
            DecodeError::new(
                at,
                DecodeErrorKind::NegativeErrorIndex { value: error_index },
            )
        })?;
        let bindings = decode_varbind_list(&mut body)?;

        Ok(Self {
            request_id,
            error_status: ErrorStatus::from_i32(error_status),
            error_index,
            bindings,
        })
    }
}
