//! Shared test utilities for snmp-core integration tests.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

mod fixtures;
mod mib;

pub use fixtures::*;
pub use mib::*;
