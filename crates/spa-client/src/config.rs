//! Connection configuration

use spa_core::DEFAULT_CONTROL_PORT;
use std::time::Duration;

/// Default number of silent wait intervals before the connection is declared dead
pub const DEFAULT_MAX_SILENT_INTERVALS: u32 = 5;

/// Monitor loop configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// TCP port of the control channel
    pub port: u16,
    /// Upper bound on the TCP connect
    pub connect_timeout: Duration,
    /// Length of one readability wait
    pub wait_timeout: Duration,
    /// Consecutive empty waits tolerated before failing
    pub max_silent_intervals: u32,
    /// Bytes requested per socket read
    pub read_buffer_size: usize,
    /// Suppress status messages identical to the previous one
    pub coalesce_status: bool,
    /// Keep-alive interval in seconds (0 = disabled)
    pub keepalive_secs: u64,
    /// Outbound commands that may wait for the socket
    pub command_queue_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_CONTROL_PORT,
            connect_timeout: Duration::from_secs(5),
            wait_timeout: Duration::from_secs(1),
            max_silent_intervals: DEFAULT_MAX_SILENT_INTERVALS,
            read_buffer_size: 64,
            coalesce_status: true,
            keepalive_secs: 30,
            command_queue_size: 32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_config_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.port, 4257);
        assert_eq!(config.wait_timeout, Duration::from_secs(1));
        assert_eq!(config.max_silent_intervals, 5);
        assert!(config.coalesce_status);
    }
}
