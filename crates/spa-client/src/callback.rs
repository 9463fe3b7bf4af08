//! Consumer callbacks
//!
//! The monitor loop hands every decoded message to a [`MonitorCallback`].
//! Implementors either override [`MonitorCallback::on_message`] and match on
//! [`SpaMessage`] directly, or override only the per-message hooks they care
//! about.

use bytes::Bytes;
use spa_core::{
    ConfigResponse, FilterConfigResponse, RawMessage, SpaMessage, StatusMessage,
    VersionInfoResponse,
};
use tokio::sync::mpsc;

use crate::error::MonitorError;

/// Receives messages and lifecycle notifications from a connection.
///
/// All methods run on the monitor task, so they should return quickly.
pub trait MonitorCallback: Send {
    /// Called for every delivered message
    fn on_message(&mut self, message: SpaMessage) {
        match message {
            SpaMessage::Status(m) => self.on_status(&m),
            SpaMessage::ConfigResponse(m) => self.on_config_response(&m),
            SpaMessage::FilterConfig(m) => self.on_filter_config(&m),
            SpaMessage::VersionInfo(m) => self.on_version_info(&m),
            SpaMessage::ControlConfig2(m) => self.on_control_config_2(&m),
            SpaMessage::SetTempRange(m) => self.on_set_temp_range(&m),
            SpaMessage::Unknown(m) => self.on_unknown(&m.raw),
        }
    }

    fn on_status(&mut self, _status: &StatusMessage) {}

    fn on_config_response(&mut self, _config: &ConfigResponse) {}

    fn on_filter_config(&mut self, _filter: &FilterConfigResponse) {}

    fn on_version_info(&mut self, _info: &VersionInfoResponse) {}

    fn on_control_config_2(&mut self, _message: &RawMessage) {}

    fn on_set_temp_range(&mut self, _message: &RawMessage) {}

    /// Unrecognized id, or a known id with an unexpected size
    fn on_unknown(&mut self, _raw: &Bytes) {}

    /// The monitor loop failed; called at most once per connection
    fn on_fatal_error(&mut self, _error: &MonitorError) {}

    /// The connection is being torn down; called exactly once
    fn dispose(&mut self);
}

/// Everything a [`ChannelCallback`] forwards
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Message(SpaMessage),
    Fatal(MonitorError),
    Disposed,
}

/// Forwards callbacks into an unbounded channel
pub struct ChannelCallback {
    tx: mpsc::UnboundedSender<MonitorEvent>,
}

impl ChannelCallback {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MonitorEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MonitorCallback for ChannelCallback {
    fn on_message(&mut self, message: SpaMessage) {
        let _ = self.tx.send(MonitorEvent::Message(message));
    }

    fn on_fatal_error(&mut self, error: &MonitorError) {
        let _ = self.tx.send(MonitorEvent::Fatal(error.clone()));
    }

    fn dispose(&mut self) {
        let _ = self.tx.send(MonitorEvent::Disposed);
    }
}
