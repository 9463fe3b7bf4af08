//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("not connected")]
    NotConnected,

    #[error("monitor already started")]
    AlreadyRunning,

    #[error("send failed: {0}")]
    SendFailed(String),

    #[error("partial write: {written} of {expected} bytes")]
    PartialWrite { written: usize, expected: usize },

    #[error("timeout")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(#[from] spa_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a running monitor loop gave up on its connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    #[error("no data for {intervals} consecutive wait intervals")]
    SilenceTimeout { intervals: u32 },

    #[error("connection closed by peer")]
    ConnectionClosed,

    #[error("write of {id} stalled for a full wait interval")]
    WriteStalled { id: String },

    #[error("read failed: {0}")]
    Io(String),
}
