// Allow large error types - the Error enum includes OIDs inline for debugging convenience.
#![allow(clippy::result_large_err)]

//! # snmp-core
//!
//! Request core of an SNMP v1/v2c client, plus conversion of foreign MIB
//! trees into an owned, queryable form.
//!
//! ## Features
//!
//! - GET, GETNEXT, GETBULK and SET against one agent per call
//! - Values mapped back onto caller-owned [`ManagedObject`]s in place
//! - Bounded retries: an operation waits at most `timeout * (retries + 1)`
//! - Pluggable transport [`Engine`]: UDP by default, [`MockEngine`] for tests
//! - Zero-copy BER decoding
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snmp_core::{Client, ManagedObject, Version, oid};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), snmp_core::Error> {
//!     let client = Client::builder()
//!         .timeout(Duration::from_secs(2))
//!         .retries(1)
//!         .build();
//!
//!     let mut objects = vec![ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0))];
//!     client.get(Version::V2c, "public", "192.168.1.1", &mut objects).await?;
//!     println!("sysDescr: {}", objects[0].value());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## GETBULK
//!
//! [`Client::get_bulk`] maps one binding per object. To see every
//! repetition, use [`Client::exchange`]:
//!
//! ```rust,no_run
//! use snmp_core::{Client, ManagedObject, RequestType, Version, oid};
//!
//! # async fn example() -> snmp_core::Result<()> {
//! let client = Client::builder().build();
//! let objects = [
//!     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 3)),
//!     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)),
//! ];
//! let response = client
//!     .exchange(RequestType::GetBulk, Version::V2c, "public", "192.168.1.1", &objects, 1, 10)
//!     .await?;
//! for vb in &response.bindings {
//!     println!("{vb}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod ber;
pub mod client;
pub mod engine;
pub mod error;
pub mod mib;
pub mod object;
pub mod oid;
pub mod pdu;
pub mod prelude;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

// Re-exports for convenience
pub use client::{
    Client, ClientBuilder, ClientConfig, DEFAULT_MAX_REPETITIONS, DEFAULT_NON_REPEATERS,
    DEFAULT_PORT, DEFAULT_RETRIES, DEFAULT_TIMEOUT,
};
pub use engine::{Engine, MockEngine, MockReply, SessionParams, UdpEngine};
pub use error::{
    Error, ErrorCategory, ErrorStatus, OidErrorKind, PduErrorKind, Result, SessionErrorKind,
};
pub use mib::{ForeignMibNode, MibNode, MibNodeType, MibTree, NodeId};
pub use object::ManagedObject;
pub use oid::Oid;
pub use pdu::{RequestPdu, RequestType, ResponsePdu};
pub use value::{Value, ValueType};
pub use varbind::VarBind;
pub use version::Version;

/// Type alias for a client over a dedicated UDP socket per operation.
pub type UdpClient = Client<UdpEngine>;
