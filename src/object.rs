//! Caller-owned managed objects.

use crate::error::ErrorStatus;
use crate::oid::Oid;
use crate::value::{Value, ValueType};

/// One SNMP variable as seen by the caller: an OID, its last known value, and
/// the per-object error reported by an SNMPv1 agent.
///
/// A request reads the OID (and, for SET, the value). A successful response
/// overwrites the value in place; the OID is never changed.
///
/// ```
/// use snmp_core::{ManagedObject, Value, ValueType, oid};
///
/// let mut contact = ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 4, 0));
/// assert_eq!(contact.value_type(), ValueType::Null);
///
/// contact.set_value(Value::from("noc@example.net"));
/// assert_eq!(contact.value().as_str(), Some("noc@example.net"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedObject {
    oid: Oid,
    value: Value,
    error: Option<ErrorStatus>,
}

impl ManagedObject {
    /// Object with a NULL value, ready for a read request.
    pub fn new(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
            error: None,
        }
    }

    /// Object carrying a value, ready for a SET request.
    pub fn with_value(oid: Oid, value: Value) -> Self {
        Self {
            oid,
            value,
            error: None,
        }
    }

    pub fn oid(&self) -> &Oid {
        &self.oid
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_type(&self) -> ValueType {
        self.value.value_type()
    }

    /// Error status an SNMPv1 agent attributed to this object in the last
    /// response, if any.
    pub fn error(&self) -> Option<ErrorStatus> {
        self.error
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Take the value from a response binding and clear any stale error.
    pub(crate) fn apply_value(&mut self, value: Value) {
        self.value = value;
        self.error = None;
    }

    pub(crate) fn mark_error(&mut self, status: ErrorStatus) {
        self.error = Some(status);
    }
}

impl From<Oid> for ManagedObject {
    fn from(oid: Oid) -> Self {
        Self::new(oid)
    }
}

impl std::fmt::Display for ManagedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.error {
            Some(status) => write!(f, "{} = {} ({})", self.oid, self.value, status),
            None => write!(f, "{} = {}", self.oid, self.value),
        }
    }
}
