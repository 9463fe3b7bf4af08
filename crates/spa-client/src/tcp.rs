//! Control channel transport

use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::error::{ClientError, Result};

/// Open the TCP control channel to `addr`
pub(crate) async fn connect(addr: SocketAddr, config: &MonitorConfig) -> Result<TcpStream> {
    info!("Connecting to spa at {}", addr);

    let stream = timeout(config.connect_timeout, TcpStream::connect(addr))
        .await
        .map_err(|_| ClientError::ConnectionFailed(format!("timed out connecting to {}", addr)))?
        .map_err(|e| ClientError::ConnectionFailed(e.to_string()))?;

    // Enable TCP keepalive if configured
    if config.keepalive_secs > 0 {
        let socket = socket2::SockRef::from(&stream);
        let keepalive =
            socket2::TcpKeepalive::new().with_time(Duration::from_secs(config.keepalive_secs));
        if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
            debug!("Could not enable keepalive: {}", e);
        }
    }

    // Commands are a handful of bytes; don't hold them back
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not disable Nagle: {}", e);
    }

    info!("Connected to {}", addr);
    Ok(stream)
}
