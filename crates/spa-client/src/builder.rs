//! Connection builder pattern

use spa_core::SpaEndpoint;
use std::time::Duration;

use crate::callback::MonitorCallback;
use crate::config::MonitorConfig;
use crate::{Result, SpaConnection};

/// Builder for [`SpaConnection`]
pub struct SpaConnectionBuilder {
    endpoint: SpaEndpoint,
    config: MonitorConfig,
}

impl SpaConnectionBuilder {
    /// Create a new builder
    pub fn new(endpoint: SpaEndpoint) -> Self {
        Self {
            endpoint,
            config: MonitorConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the control channel port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the length of one readability wait
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.config.wait_timeout = timeout;
        self
    }

    /// Set how many silent waits are tolerated
    pub fn max_silent_intervals(mut self, intervals: u32) -> Self {
        self.config.max_silent_intervals = intervals;
        self
    }

    /// Set the socket read size
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Enable/disable suppression of unchanged status messages
    pub fn coalesce_status(mut self, enabled: bool) -> Self {
        self.config.coalesce_status = enabled;
        self
    }

    /// Set keepalive interval in seconds (0 disables it)
    pub fn keepalive(mut self, secs: u64) -> Self {
        self.config.keepalive_secs = secs;
        self
    }

    /// Build an idle connection
    pub fn build(self, callback: impl MonitorCallback + 'static) -> SpaConnection {
        SpaConnection::with_config(self.endpoint, self.config, callback)
    }

    /// Build and start monitoring
    pub async fn connect(self, callback: impl MonitorCallback + 'static) -> Result<SpaConnection> {
        let mut connection = self.build(callback);
        connection.start().await?;
        Ok(connection)
    }
}
