//! Spa Discovery
//!
//! Finds spa controllers on the local network. A controller listens for a
//! broadcast request on the discovery port and replies with a signature
//! followed by its MAC address; the control channel is then reached over TCP
//! at the replying address.

pub mod broadcast;
pub mod error;

pub use broadcast::{discover, parse_response};
pub use error::{DiscoveryError, Result};

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Discovery configuration
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Broadcast port
    pub port: u16,
    /// Where the request is sent
    pub target: IpAddr,
    /// Local address replies are received on
    pub bind_addr: SocketAddr,
    /// Collection ends after this long without a new reply
    pub window: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: spa_core::DEFAULT_DISCOVERY_PORT,
            target: IpAddr::V4(Ipv4Addr::BROADCAST),
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            window: Duration::from_secs(1),
        }
    }
}
