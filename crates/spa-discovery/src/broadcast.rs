//! UDP broadcast discovery

use crate::{DiscoveryConfig, DiscoveryError, Result};
use spa_core::SpaEndpoint;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Request text; the controller expects the trailing NUL
pub const DISCOVERY_REQUEST: &[u8] = b"Discovery: Who is out there?\0";

/// Every controller reply starts with this, up to the vendor MAC prefix
pub const RESPONSE_SIGNATURE: &[u8] = b"BWGSPA         \r\n00-15-27-";

/// Start of the MAC address within a reply
const MAC_OFFSET: usize = 17;

/// Extract an endpoint from one discovery reply.
///
/// Returns `None` for replies that do not carry the controller signature.
pub fn parse_response(data: &[u8], from: SocketAddr) -> Option<SpaEndpoint> {
    if !data.starts_with(RESPONSE_SIGNATURE) {
        return None;
    }

    let mac = String::from_utf8_lossy(&data[MAC_OFFSET..]);
    let mac = mac.trim_end_matches(['\r', '\n', '\0']);

    Some(SpaEndpoint::new(from, mac))
}

/// Broadcast a discovery request and collect replies.
///
/// Collection ends once `config.window` passes without a new reply.
/// Endpoints are returned in the order first seen, without duplicates.
pub async fn discover(config: &DiscoveryConfig) -> Result<Vec<SpaEndpoint>> {
    let socket = UdpSocket::bind(config.bind_addr)
        .await
        .map_err(|e| DiscoveryError::Network(e.to_string()))?;

    socket
        .set_broadcast(true)
        .map_err(|e| DiscoveryError::Network(e.to_string()))?;

    let target = SocketAddr::new(config.target, config.port);
    info!("Broadcasting discovery request to {}", target);

    socket
        .send_to(DISCOVERY_REQUEST, target)
        .await
        .map_err(|e| DiscoveryError::Broadcast(e.to_string()))?;

    let mut spas = Vec::new();
    let mut buf = [0u8; 1024];

    loop {
        match timeout(config.window, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, from))) => {
                debug!("Received {} bytes from {}", len, from);

                match parse_response(&buf[..len], from) {
                    Some(spa) if spas.contains(&spa) => {
                        debug!("Duplicate reply from {}", spa);
                    }
                    Some(spa) => {
                        info!("Discovered spa: {}", spa);
                        spas.push(spa);
                    }
                    None => {
                        warn!(
                            "Unexpected discovery response from {}: {:?}",
                            from,
                            String::from_utf8_lossy(&buf[..len])
                        );
                    }
                }
            }
            Ok(Err(e)) => return Err(DiscoveryError::Io(e)),
            Err(_) => {
                // Window elapsed with no reply - discovery complete
                debug!("Broadcast discovery timeout");
                break;
            }
        }
    }

    Ok(spas)
}
