//! Client builder.
//!
//! # Examples
//!
//! ```rust
//! # use snmp_core::Client;
//! # use std::time::Duration;
//! let client = Client::builder()
//!     .port(1161)
//!     .retries(1)
//!     .timeout(Duration::from_millis(500))
//!     .build();
//!
//! assert_eq!(client.port(), 1161);
//! assert_eq!(client.retries(), 1);
//! ```

use std::time::Duration;

use crate::engine::{Engine, UdpEngine};

use super::{Client, ClientConfig};

/// Builder for [`Client`].
///
/// Created via [`Client::builder()`]. Every setting starts at the value in
/// [`ClientConfig::default()`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the agent port used when the agent string names none.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the number of retransmissions after the first attempt.
    pub fn retries(mut self, retries: u16) -> Self {
        self.config.retries = retries;
        self
    }

    /// Set how long to wait for a response to each attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build a client over UDP.
    pub fn build(self) -> Client<UdpEngine> {
        self.build_with_engine(UdpEngine::new())
    }

    /// Build a client over a caller-supplied engine.
    pub fn build_with_engine<E: Engine>(self, engine: E) -> Client<E> {
        Client::new(engine, self.config)
    }
}
