//! Controller endpoint

use crate::DEFAULT_CONTROL_PORT;
use serde::Serialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// A spa controller found on the network.
///
/// Two endpoints are equal when MAC, IP address and port all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SpaEndpoint {
    addr: SocketAddr,
    mac_address: String,
}

impl SpaEndpoint {
    pub fn new(addr: SocketAddr, mac_address: impl Into<String>) -> Self {
        Self {
            addr,
            mac_address: mac_address.into(),
        }
    }

    /// Endpoint for a known host whose MAC has not been learned
    pub fn from_ip(ip: IpAddr) -> Self {
        Self::new(SocketAddr::new(ip, DEFAULT_CONTROL_PORT), String::new())
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ip(&self) -> IpAddr {
        self.addr.ip()
    }

    pub fn mac_address(&self) -> &str {
        &self.mac_address
    }

    /// Address of the control channel on `port`
    pub fn control_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.addr.ip(), port)
    }
}

impl fmt::Display for SpaEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mac_address.is_empty() {
            write!(f, "{}", self.addr.ip())
        } else {
            write!(f, "{} ({})", self.addr.ip(), self.mac_address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_equality() {
        let addr: SocketAddr = "192.168.1.50:30303".parse().unwrap();
        let a = SpaEndpoint::new(addr, "00-15-27-AA-BB-CC");
        let b = SpaEndpoint::new(addr, "00-15-27-AA-BB-CC");
        let other_mac = SpaEndpoint::new(addr, "00-15-27-AA-BB-CD");
        let other_port =
            SpaEndpoint::new("192.168.1.50:30304".parse().unwrap(), "00-15-27-AA-BB-CC");

        assert_eq!(a, b);
        assert_ne!(a, other_mac);
        assert_ne!(a, other_port);
    }

    #[test]
    fn test_control_addr() {
        let a = SpaEndpoint::new("10.0.0.7:30303".parse().unwrap(), "00-15-27-01-02-03");
        assert_eq!(a.control_addr(4257), "10.0.0.7:4257".parse().unwrap());
        assert_eq!(a.to_string(), "10.0.0.7 (00-15-27-01-02-03)");
    }
}
