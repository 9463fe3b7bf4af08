//! Config file support
//!
//! ```toml
//! [monitor]
//! port = 4257
//! wait_timeout_ms = 1000
//! max_silent_intervals = 5
//! coalesce_status = true
//!
//! [discovery]
//! target = "192.168.1.255"
//! window_ms = 1500
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use spa_client::MonitorConfig;
use spa_discovery::DiscoveryConfig;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

/// Settings read from `--config`; anything left out keeps its default
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub monitor: MonitorSection,
    pub discovery: DiscoverySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorSection {
    pub port: Option<u16>,
    pub connect_timeout_ms: Option<u64>,
    pub wait_timeout_ms: Option<u64>,
    pub max_silent_intervals: Option<u32>,
    pub read_buffer_size: Option<usize>,
    pub coalesce_status: Option<bool>,
    pub keepalive_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoverySection {
    pub port: Option<u16>,
    pub target: Option<IpAddr>,
    pub window_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        let m = &self.monitor;
        let mut config = MonitorConfig::default();

        if let Some(port) = m.port {
            config.port = port;
        }
        if let Some(ms) = m.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = m.wait_timeout_ms {
            config.wait_timeout = Duration::from_millis(ms);
        }
        if let Some(intervals) = m.max_silent_intervals {
            config.max_silent_intervals = intervals;
        }
        if let Some(size) = m.read_buffer_size {
            config.read_buffer_size = size;
        }
        if let Some(coalesce) = m.coalesce_status {
            config.coalesce_status = coalesce;
        }
        if let Some(secs) = m.keepalive_secs {
            config.keepalive_secs = secs;
        }

        config
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        let d = &self.discovery;
        let mut config = DiscoveryConfig::default();

        if let Some(port) = d.port {
            config.port = port;
        }
        if let Some(target) = d.target {
            config.target = target;
        }
        if let Some(ms) = d.window_ms {
            config.window = Duration::from_millis(ms);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_empty_config_keeps_defaults() {
        let config = FileConfig::parse("").unwrap();
        let monitor = config.monitor_config();
        assert_eq!(monitor.port, 4257);
        assert_eq!(monitor.max_silent_intervals, 5);
        assert_eq!(config.discovery_config().port, 30303);
    }

    #[test]
    fn test_overrides() {
        let config = FileConfig::parse(
            r#"
            [monitor]
            port = 14257
            wait_timeout_ms = 250
            coalesce_status = false

            [discovery]
            target = "10.0.0.255"
            window_ms = 3000
            "#,
        )
        .unwrap();

        let monitor = config.monitor_config();
        assert_eq!(monitor.port, 14257);
        assert_eq!(monitor.wait_timeout, Duration::from_millis(250));
        assert!(!monitor.coalesce_status);
        assert_eq!(monitor.read_buffer_size, 64);

        let discovery = config.discovery_config();
        assert_eq!(discovery.target, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 255)));
        assert_eq!(discovery.window, Duration::from_secs(3));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FileConfig::parse("[monitor]\nprot = 1\n").is_err());
    }
}
