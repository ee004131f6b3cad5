//! Router configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::wire::DEFAULT_PORT;

/// Settings for a [`MessageRouter`](crate::MessageRouter).
///
/// Every field has a default, so a JSON document only needs the fields it
/// changes.
///
/// # Example
///
/// ```
/// use lifx_lan_rs::RouterConfig;
///
/// let config = RouterConfig::from_json(r#"{"source": 7, "response_timeout_ms": 500}"#).unwrap();
/// assert_eq!(config.source, 7);
/// assert_eq!(config.broadcast_addr.port(), 56700);
/// assert!(config.response_timeout().is_some());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Local address the router socket binds to.
    pub bind_addr: SocketAddr,
    /// Destination of discovery requests.
    pub broadcast_addr: SocketAddr,
    /// Source id written into every request.
    pub source: u32,
    /// Largest datagram accepted, in bytes.
    pub receive_buffer: usize,
    /// Pause between setting power and reading it back.
    pub power_settle_ms: u64,
    /// How long to wait for a reply. `None` waits forever.
    pub response_timeout_ms: Option<u64>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            bind_addr: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0).into(),
            broadcast_addr: SocketAddrV4::new(Ipv4Addr::BROADCAST, DEFAULT_PORT).into(),
            source: 2,
            receive_buffer: 1024,
            power_settle_ms: 200,
            response_timeout_ms: None,
        }
    }
}

impl RouterConfig {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::JsonLoad)
    }

    pub fn power_settle(&self) -> Duration {
        Duration::from_millis(self.power_settle_ms)
    }

    pub fn response_timeout(&self) -> Option<Duration> {
        self.response_timeout_ms.map(Duration::from_millis)
    }
}
