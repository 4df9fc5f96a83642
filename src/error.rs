//! Error types for snmp-core.
//!
//! All errors are `#[non_exhaustive]` to allow adding new variants without breaking changes.
//!
//! Every [`Error`] belongs to exactly one [`ErrorCategory`], so callers can branch on
//! the broad failure class without matching every variant:
//!
//! ```rust
//! use snmp_core::{Error, ErrorCategory};
//!
//! fn should_try_another_agent(error: &Error) -> bool {
//!     matches!(error.category(), ErrorCategory::Session | ErrorCategory::Transport)
//! }
//! ```

pub(crate) mod internal;

use std::net::SocketAddr;
use std::time::Duration;

use crate::oid::Oid;
use crate::pdu::RequestType;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a session could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// Agent address or hostname did not resolve.
    Resolution,
    /// Transport engine refused to create the session.
    EngineInit,
}

impl std::fmt::Display for SessionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolution => write!(f, "address resolution failed"),
            Self::EngineInit => write!(f, "engine initialization failed"),
        }
    }
}

/// Why a request PDU could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PduErrorKind {
    /// Request type not supported by the SNMP version (GETBULK over v1).
    UnsupportedType,
    /// A SET value cannot be encoded for this version.
    ValueEncoding { index: usize },
    /// An object identifier violates X.690 arc rules.
    InvalidObjectId { index: usize },
    /// The object list is empty.
    NoObjects,
}

impl std::fmt::Display for PduErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType => write!(f, "request type not supported by this version"),
            Self::ValueEncoding { index } => {
                write!(f, "value of object {} cannot be encoded", index)
            }
            Self::InvalidObjectId { index } => {
                write!(f, "object {} has an invalid OID", index)
            }
            Self::NoObjects => write!(f, "no objects to request"),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Invalid arc value.
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u32),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u32, second: u32 },
    /// OID too short (minimum 2 arcs).
    TooShort,
    /// OID has too many arcs (exceeds MAX_OID_LEN).
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
            Self::TooShort => write!(f, "OID must have at least 2 arcs"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// SNMP error status codes (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    NoError,
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// Unknown/future error status code.
    Unknown(i32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            6 => Self::NoAccess,
            7 => Self::WrongType,
            8 => Self::WrongLength,
            9 => Self::WrongEncoding,
            10 => Self::WrongValue,
            11 => Self::NoCreation,
            12 => Self::InconsistentValue,
            13 => Self::ResourceUnavailable,
            14 => Self::CommitFailed,
            15 => Self::UndoFailed,
            16 => Self::AuthorizationError,
            17 => Self::NotWritable,
            18 => Self::InconsistentName,
            other => {
                tracing::warn!(target: "snmp_core::error", { snmp.error_status = other }, "unknown SNMP error status");
                Self::Unknown(other)
            }
        }
    }

    /// Convert to raw status code.
    pub fn as_i32(&self) -> i32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::NoAccess => 6,
            Self::WrongType => 7,
            Self::WrongLength => 8,
            Self::WrongEncoding => 9,
            Self::WrongValue => 10,
            Self::NoCreation => 11,
            Self::InconsistentValue => 12,
            Self::ResourceUnavailable => 13,
            Self::CommitFailed => 14,
            Self::UndoFailed => 15,
            Self::AuthorizationError => 16,
            Self::NotWritable => 17,
            Self::InconsistentName => 18,
            Self::Unknown(code) => *code,
        }
    }

    /// True for every status other than `noError`.
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::NoError)
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::NoAccess => write!(f, "noAccess"),
            Self::WrongType => write!(f, "wrongType"),
            Self::WrongLength => write!(f, "wrongLength"),
            Self::WrongEncoding => write!(f, "wrongEncoding"),
            Self::WrongValue => write!(f, "wrongValue"),
            Self::NoCreation => write!(f, "noCreation"),
            Self::InconsistentValue => write!(f, "inconsistentValue"),
            Self::ResourceUnavailable => write!(f, "resourceUnavailable"),
            Self::CommitFailed => write!(f, "commitFailed"),
            Self::UndoFailed => write!(f, "undoFailed"),
            Self::AuthorizationError => write!(f, "authorizationError"),
            Self::NotWritable => write!(f, "notWritable"),
            Self::InconsistentName => write!(f, "inconsistentName"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Broad failure class of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Session could not be opened. Nothing was sent.
    Session,
    /// Request could not be built. Nothing was sent.
    Pdu,
    /// No usable response after all retries, or a socket fault.
    Transport,
    /// A response arrived but reports an SNMP error or is inconsistent.
    Protocol,
    /// The foreign MIB tree is not a finite tree.
    Structural,
    /// Caller-supplied input could not be parsed.
    Input,
}

/// Library error type.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Session could not be opened.
    #[error("cannot open session with {agent}: {kind}")]
    Session {
        agent: Box<str>,
        kind: SessionErrorKind,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Request PDU could not be built.
    #[error("cannot build {request_type} request: {kind}")]
    Pdu {
        request_type: RequestType,
        kind: PduErrorKind,
    },

    /// Request timed out after all retries.
    #[error("timeout after {elapsed:?} waiting for {target} ({retries} retries)")]
    Timeout {
        target: SocketAddr,
        elapsed: Duration,
        retries: u32,
    },

    /// Socket fault the engine does not retry.
    #[error("network error communicating with {target}: {source}")]
    Network {
        target: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// SNMP error status returned by the agent.
    #[error("SNMP error{}: {status} at index {index}", target.map(|t| format!(" from {}", t)).unwrap_or_default())]
    Snmp {
        target: Option<SocketAddr>,
        status: ErrorStatus,
        index: u32,
        oid: Option<Oid>,
    },

    /// Response could not be decoded or does not match the request.
    #[error("malformed response{}", target.map(|t| format!(" from {}", t)).unwrap_or_default())]
    MalformedResponse { target: Option<SocketAddr> },

    /// Foreign MIB tree contains a node that is its own ancestor.
    #[error("MIB tree cycle detected at node '{name}'")]
    CycleDetected { name: Box<str> },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>, // Only allocated when parsing string input
    },
}

impl Error {
    /// Create a session error.
    pub(crate) fn session(
        agent: impl Into<Box<str>>,
        kind: SessionErrorKind,
        source: Option<std::io::Error>,
    ) -> Self {
        Self::Session {
            agent: agent.into(),
            kind,
            source,
        }
    }

    /// Create a PDU construction error.
    pub(crate) fn pdu(request_type: RequestType, kind: PduErrorKind) -> Self {
        Self::Pdu { request_type, kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// Failure class of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Session { .. } => ErrorCategory::Session,
            Self::Pdu { .. } => ErrorCategory::Pdu,
            Self::Timeout { .. } | Self::Network { .. } => ErrorCategory::Transport,
            Self::Snmp { .. } | Self::MalformedResponse { .. } => ErrorCategory::Protocol,
            Self::CycleDetected { .. } => ErrorCategory::Structural,
            Self::InvalidOid { .. } => ErrorCategory::Input,
        }
    }

    /// Get the target address if this error has one.
    pub fn target(&self) -> Option<SocketAddr> {
        match self {
            Self::Timeout { target, .. } => Some(*target),
            Self::Network { target, .. } => Some(*target),
            Self::Snmp { target, .. } => *target,
            Self::MalformedResponse { target } => *target,
            _ => None,
        }
    }
}
