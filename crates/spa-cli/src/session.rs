//! Request/response helper on top of a monitored connection

use anyhow::{anyhow, bail, Context, Result};
use spa_client::{ChannelCallback, MonitorConfig, MonitorEvent, SpaConnection};
use spa_core::{SpaEndpoint, SpaMessage};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

/// How long to wait for a reply to a request
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Session {
    pub conn: SpaConnection,
    pub events: UnboundedReceiver<MonitorEvent>,
}

impl Session {
    pub async fn open(endpoint: SpaEndpoint, config: MonitorConfig) -> Result<Self> {
        let (callback, events) = ChannelCallback::new();
        let conn = SpaConnection::builder(endpoint.clone())
            .config(config)
            .connect(callback)
            .await
            .with_context(|| format!("Failed to connect to {}", endpoint))?;

        Ok(Self { conn, events })
    }

    /// Wait until `pick` accepts a message
    pub async fn wait_for<T>(
        &mut self,
        what: &str,
        mut pick: impl FnMut(&SpaMessage) -> Option<T>,
    ) -> Result<T> {
        let deadline = Instant::now() + REPLY_TIMEOUT;

        loop {
            let event = timeout_at(deadline, self.events.recv())
                .await
                .map_err(|_| anyhow!("Timed out waiting for {}", what))?;

            match event {
                Some(MonitorEvent::Message(message)) => match pick(&message) {
                    Some(value) => return Ok(value),
                    None => debug!("Skipping {} while waiting for {}", message.name(), what),
                },
                Some(MonitorEvent::Fatal(e)) => bail!("Connection failed: {}", e),
                Some(MonitorEvent::Disposed) | None => bail!("Connection closed"),
            }
        }
    }

    pub async fn close(self) {
        self.conn.close().await;
    }
}
