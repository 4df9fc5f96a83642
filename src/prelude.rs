//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use snmp_core::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Client`], [`ManagedObject`], [`Oid`], [`Value`], [`VarBind`], [`Version`]
//! - Request types: [`RequestType`]
//! - Error handling: [`Error`], [`Result`]
//! - MIB conversion: [`ForeignMibNode`], [`MibTree`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::client::Client;
pub use crate::error::{Error, Result};
pub use crate::mib::{ForeignMibNode, MibTree};
pub use crate::object::ManagedObject;
pub use crate::oid::Oid;
pub use crate::pdu::RequestType;
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
