//! Common test fixtures and constants.

use snmp_core::{Client, ManagedObject, MockEngine, Oid, Value, VarBind, oid};
use std::time::Duration;

// =============================================================================
// Standard system MIB OIDs (1.3.6.1.2.1.1.*)
// =============================================================================

pub fn sys_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}
pub fn sys_object_id() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 2, 0)
}
pub fn sys_uptime() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 3, 0)
}
pub fn sys_contact() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}
pub fn sys_name() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}
pub fn sys_location() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

// =============================================================================
// Interface table columns (1.3.6.1.2.1.2.2.1.*)
// =============================================================================

/// ifDescr column, without an instance.
pub fn if_descr() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2)
}

/// ifInOctets column, without an instance.
pub fn if_in_octets() -> Oid {
    oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 10)
}

/// Nonexistent OID for testing NoSuchObject/NoSuchInstance
pub fn nonexistent_oid() -> Oid {
    oid!(1, 3, 6, 1, 99, 99, 99, 0)
}

// =============================================================================
// Agents and communities
// =============================================================================

/// Documentation-range agent address; never contacted by the mock engine.
pub const AGENT: &str = "192.0.2.10";

/// Read-only community
pub const COMMUNITY_RO: &str = "public";
/// Read-write community
pub const COMMUNITY_RW: &str = "private";

// =============================================================================
// Helpers
// =============================================================================

/// Client over a clone of `engine`, with a short timeout so unscripted
/// attempts stay cheap under a paused clock.
pub fn mock_client(engine: &MockEngine) -> Client<MockEngine> {
    Client::builder()
        .timeout(Duration::from_millis(200))
        .retries(2)
        .build_with_engine(engine.clone())
}

pub fn objects(oids: &[Oid]) -> Vec<ManagedObject> {
    oids.iter().cloned().map(ManagedObject::new).collect()
}

pub fn varbind(oid: Oid, value: impl Into<Value>) -> VarBind {
    VarBind::new(oid, value.into())
}

/// Route `tracing` output to the test harness. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
