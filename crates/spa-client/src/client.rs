//! Spa connection

use parking_lot::{Mutex, RwLock};
use spa_core::{Command, FilterSchedule, Frame, SpaEndpoint, SpaTime, TempScale, ToggleItem};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::builder::SpaConnectionBuilder;
use crate::callback::MonitorCallback;
use crate::config::MonitorConfig;
use crate::error::{ClientError, Result};
use crate::monitor::{run_monitor, MonitorChannels, MonitorState, Outbound, SharedCallback};
use crate::tcp;

/// A connection to one spa controller.
///
/// [`start`](Self::start) opens the control channel and spawns the monitor
/// task, which owns the socket from then on. Commands are queued to that task
/// and resolve once their bytes have been written.
pub struct SpaConnection {
    endpoint: SpaEndpoint,
    config: MonitorConfig,
    callback: SharedCallback,
    state: Arc<RwLock<MonitorState>>,
    commands: Option<mpsc::Sender<Outbound>>,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl SpaConnection {
    /// Create an idle connection with the default configuration
    pub fn new(endpoint: SpaEndpoint, callback: impl MonitorCallback + 'static) -> Self {
        Self::with_config(endpoint, MonitorConfig::default(), callback)
    }

    pub fn with_config(
        endpoint: SpaEndpoint,
        config: MonitorConfig,
        callback: impl MonitorCallback + 'static,
    ) -> Self {
        Self {
            endpoint,
            config,
            callback: Arc::new(Mutex::new(Some(Box::new(callback)))),
            state: Arc::new(RwLock::new(MonitorState::Idle)),
            commands: None,
            shutdown: None,
            task: None,
        }
    }

    /// Create a builder
    pub fn builder(endpoint: SpaEndpoint) -> SpaConnectionBuilder {
        SpaConnectionBuilder::new(endpoint)
    }

    pub fn endpoint(&self) -> &SpaEndpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> MonitorState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == MonitorState::Running
    }

    /// Connect to the controller and start monitoring.
    ///
    /// Only valid from [`MonitorState::Idle`]; a connection that stopped or
    /// failed cannot be restarted. On a connect failure the state returns to
    /// `Idle`.
    pub async fn start(&mut self) -> Result<()> {
        self.transition_from_idle(MonitorState::Connecting)?;

        let addr = self.endpoint.control_addr(self.config.port);
        match tcp::connect(addr, &self.config).await {
            Ok(stream) => {
                self.spawn_monitor(stream);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", addr, e);
                *self.state.write() = MonitorState::Idle;
                Err(e)
            }
        }
    }

    /// Start monitoring over an already-open stream
    pub fn attach<S>(&mut self, stream: S) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        self.transition_from_idle(MonitorState::Connecting)?;
        self.spawn_monitor(stream);
        Ok(())
    }

    fn transition_from_idle(&self, next: MonitorState) -> Result<()> {
        let mut state = self.state.write();
        if *state != MonitorState::Idle {
            return Err(ClientError::AlreadyRunning);
        }
        *state = next;
        Ok(())
    }

    fn spawn_monitor<S>(&mut self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(self.config.command_queue_size.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // Running must be visible before the task can record a failure
        *self.state.write() = MonitorState::Running;

        self.task = Some(tokio::spawn(run_monitor(
            stream,
            self.config.clone(),
            self.callback.clone(),
            self.state.clone(),
            MonitorChannels {
                commands: command_rx,
                shutdown: shutdown_rx,
            },
        )));
        self.commands = Some(command_tx);
        self.shutdown = Some(shutdown_tx);

        info!("Monitoring {}", self.endpoint);
    }

    /// Stop the monitor task and wait for it to exit.
    ///
    /// Calling this more than once, or on a connection that never started,
    /// does nothing.
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        self.commands = None;

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Monitor task ended abnormally: {}", e);
            }
        }

        let mut state = self.state.write();
        if *state == MonitorState::Running {
            *state = MonitorState::Stopped;
            info!("Stopped monitoring {}", self.endpoint);
        }
    }

    /// Stop monitoring and release the callback
    pub async fn close(mut self) {
        self.stop().await;
        self.dispose();
    }

    /// Empty the callback slot so a still-running task delivers nothing more
    fn dispose(&mut self) {
        let taken = self.callback.lock().take();
        if let Some(mut callback) = taken {
            debug!("Disposing callback for {}", self.endpoint);
            callback.dispose();
        }
    }

    /// Queue a frame and wait until it has been written
    pub async fn send_frame(&self, frame: Frame) -> Result<()> {
        let commands = self.commands.as_ref().ok_or(ClientError::NotConnected)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(Outbound {
                frame,
                reply: reply_tx,
            })
            .await
            .map_err(|_| ClientError::NotConnected)?;

        reply_rx
            .await
            .map_err(|_| ClientError::SendFailed("monitor exited before writing".to_string()))?
    }

    /// Encode and send a command
    pub async fn send_command(&self, command: Command) -> Result<()> {
        let frame = command.encode()?;
        debug!("Sending {:?} as {}", command, frame.id());
        self.send_frame(frame).await
    }

    /// Ask for the controller's configuration (answered with its MAC address)
    pub async fn send_config_request(&self) -> Result<()> {
        self.send_command(Command::ConfigRequest).await
    }

    pub async fn send_filter_config_request(&self) -> Result<()> {
        self.send_command(Command::FilterConfigRequest).await
    }

    pub async fn send_version_info_request(&self) -> Result<()> {
        self.send_command(Command::VersionInfoRequest).await
    }

    pub async fn send_control_config_2_request(&self) -> Result<()> {
        self.send_command(Command::ControlConfig2Request).await
    }

    pub async fn send_toggle(&self, item: ToggleItem) -> Result<()> {
        self.send_command(Command::Toggle(item)).await
    }

    pub async fn send_set_temperature_scale(&self, scale: TempScale) -> Result<()> {
        self.send_command(Command::SetTemperatureScale(scale)).await
    }

    /// Set the target temperature, expressed in `scale`.
    ///
    /// The controller interprets the value in its current scale, so the scale
    /// is sent first. If that fails the temperature is not sent.
    pub async fn send_set_temperature(&self, value: u8, scale: TempScale) -> Result<()> {
        self.send_set_temperature_scale(scale).await?;
        self.send_command(Command::SetTemperature(value)).await
    }

    pub async fn send_set_filter_schedule(&self, schedule: FilterSchedule) -> Result<()> {
        self.send_command(Command::SetFilterSchedule(schedule)).await
    }

    /// Set the controller clock
    pub async fn send_set_time(&self, time: SpaTime, time_24h: bool) -> Result<()> {
        self.send_command(Command::SetTime { time, time_24h }).await
    }
}

impl Drop for SpaConnection {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
        self.dispose();
    }
}

impl std::fmt::Debug for SpaConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaConnection")
            .field("endpoint", &self.endpoint)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ChannelCallback;
    use std::net::{IpAddr, Ipv4Addr};

    fn endpoint() -> SpaEndpoint {
        SpaEndpoint::from_ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }

    #[tokio::test]
    async fn test_new_connection_is_idle() {
        let (cb, _rx) = ChannelCallback::new();
        let conn = SpaConnection::new(endpoint(), cb);
        assert_eq!(conn.state(), MonitorState::Idle);
        assert!(!conn.is_running());
    }

    #[tokio::test]
    async fn test_send_before_start() {
        let (cb, _rx) = ChannelCallback::new();
        let conn = SpaConnection::new(endpoint(), cb);
        assert!(matches!(
            conn.send_config_request().await,
            Err(ClientError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_invalid_command_not_queued() {
        let (cb, _rx) = ChannelCallback::new();
        let conn = SpaConnection::new(endpoint(), cb);
        let result = conn.send_set_time(SpaTime::new(25, 0), false).await;
        assert!(matches!(result, Err(ClientError::Protocol(_))));
    }
}
