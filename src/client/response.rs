//! Mapping responses back onto caller objects.

use crate::object::ManagedObject;
use crate::pdu::ResponsePdu;
use crate::version::Version;

/// Position of the object an SNMPv1 error status names, if any.
///
/// Only v1 attributes an error to a single binding, and only when
/// `error_index` lies in `1..=object_count`.
pub(crate) fn attributed_error(
    response: &ResponsePdu,
    version: Version,
    object_count: usize,
) -> Option<usize> {
    if version != Version::V1 || !response.is_error() {
        return None;
    }
    let index = usize::try_from(response.error_index).ok()?;
    (1..=object_count).contains(&index).then(|| index - 1)
}

/// Copy response values onto `objects` in binding order.
///
/// Binding `i` updates object `i` for every `i` below the shorter of the two
/// lengths; objects past a short response keep their previous state. When an
/// SNMPv1 agent attributes its error status to one binding, that object keeps
/// its value and records the status instead. Exception values
/// (`noSuchObject`, `endOfMibView`, ...) are copied like any other value.
///
/// GETBULK responses usually carry more bindings than there are objects; the
/// surplus is ignored here. Use [`Client::exchange`](crate::Client::exchange)
/// to see every binding.
///
/// Returns the number of objects touched.
///
/// ```
/// use snmp_core::client::response::apply;
/// use snmp_core::{ManagedObject, ResponsePdu, Value, VarBind, Version, oid};
///
/// let mut objects = vec![
///     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)),
///     ManagedObject::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)),
/// ];
/// let response = ResponsePdu::new(
///     7,
///     vec![VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::TimeTicks(4200))],
/// );
///
/// assert_eq!(apply(response, Version::V2c, &mut objects), 1);
/// assert_eq!(objects[0].value(), &Value::TimeTicks(4200));
/// assert_eq!(objects[1].value(), &Value::Null);
/// ```
pub fn apply(response: ResponsePdu, version: Version, objects: &mut [ManagedObject]) -> usize {
    let errored = attributed_error(&response, version, objects.len());
    let status = response.error_status;

    let mut touched = 0;
    for (i, (object, binding)) in objects.iter_mut().zip(response.bindings).enumerate() {
        if errored == Some(i) {
            object.mark_error(status);
        } else {
            object.apply_value(binding.value);
        }
        touched += 1;
    }

    tracing::trace!(target: "snmp_core::client", { snmp.varbind_count = touched, snmp.error_index = ?errored }, "response mapped");
    touched
}
