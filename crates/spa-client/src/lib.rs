//! Spa Client Library
//!
//! Async connection to a spa controller: a monitor task that reads and
//! decodes the controller's message stream, plus typed command senders.
//!
//! # Example
//!
//! ```ignore
//! use spa_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (callback, mut events) = ChannelCallback::new();
//!     let mut spa = SpaConnection::new(endpoint, callback);
//!     spa.start().await?;
//!
//!     spa.send_config_request().await?;
//!     while let Some(event) = events.recv().await {
//!         println!("{:?}", event);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod callback;
pub mod client;
pub mod config;
pub mod error;
pub mod monitor;
mod tcp;

pub use builder::SpaConnectionBuilder;
pub use callback::{ChannelCallback, MonitorCallback, MonitorEvent};
pub use client::SpaConnection;
pub use config::{MonitorConfig, DEFAULT_MAX_SILENT_INTERVALS};
pub use error::{ClientError, MonitorError, Result};
pub use monitor::MonitorState;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::builder::SpaConnectionBuilder;
    pub use crate::callback::{ChannelCallback, MonitorCallback, MonitorEvent};
    pub use crate::client::SpaConnection;
    pub use crate::config::MonitorConfig;
    pub use crate::error::{ClientError, MonitorError, Result};
    pub use crate::monitor::MonitorState;
    pub use spa_core::{Command, SpaEndpoint, SpaMessage, StatusMessage, TempScale, ToggleItem};
}
