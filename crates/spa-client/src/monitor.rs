//! Monitor loop
//!
//! One task per connection owns the socket. It reads and reassembles
//! frames, dispatches them to the callback, writes queued commands, and
//! declares the connection dead after too many silent wait intervals.

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use spa_core::{Dispatcher, Frame, FrameReassembler};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::callback::MonitorCallback;
use crate::config::MonitorConfig;
use crate::error::{ClientError, MonitorError, Result};

/// Lifecycle of a connection's monitor loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// No background activity
    Idle,
    /// Opening the control channel
    Connecting,
    /// Monitor task owns the socket
    Running,
    /// Stopped on request
    Stopped,
    /// Transport failure; the connection must be rebuilt
    Failed,
}

/// Callback slot shared by the connection and its task; emptied on dispose
pub(crate) type SharedCallback = Arc<Mutex<Option<Box<dyn MonitorCallback>>>>;

/// A frame waiting to be written, with a slot for the write outcome
pub(crate) struct Outbound {
    pub frame: Frame,
    pub reply: oneshot::Sender<Result<()>>,
}

/// Channels tying a running monitor task to its connection
pub(crate) struct MonitorChannels {
    pub commands: mpsc::Receiver<Outbound>,
    pub shutdown: watch::Receiver<bool>,
}

pub(crate) async fn run_monitor<S>(
    stream: S,
    config: MonitorConfig,
    callback: SharedCallback,
    state: Arc<RwLock<MonitorState>>,
    channels: MonitorChannels,
) where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let MonitorChannels {
        mut commands,
        mut shutdown,
    } = channels;

    let (mut reader, mut writer) = tokio::io::split(stream);
    let mut reassembler = FrameReassembler::new();
    let mut dispatcher = Dispatcher::new(config.coalesce_status);
    let mut read_buf = vec![0u8; config.read_buffer_size.max(1)];
    let mut silent_intervals = 0u32;

    let wait = tokio::time::sleep(config.wait_timeout);
    tokio::pin!(wait);

    let failure = loop {
        tokio::select! {
            biased;

            _ = shutdown.changed() => {
                debug!("Monitor shutdown requested");
                break None;
            }

            Some(outbound) = commands.recv() => {
                // Reads and the silence timer are parked while a write is pending,
                // so the write is bounded by one wait interval and by shutdown
                let write = timeout(
                    config.wait_timeout,
                    write_frame(&mut writer, &outbound.frame),
                );
                let result = tokio::select! {
                    biased;

                    _ = shutdown.changed() => {
                        let _ = outbound.reply.send(Err(ClientError::SendFailed(
                            "monitor stopped".to_string(),
                        )));
                        break None;
                    }

                    result = write => result,
                };

                match result {
                    Ok(result) => {
                        if let Err(e) = &result {
                            warn!("Failed to send {}: {}", outbound.frame.id(), e);
                        }
                        let _ = outbound.reply.send(result);
                    }
                    Err(_) => {
                        // The peer may now hold half a frame; the stream cannot be trusted
                        let _ = outbound.reply.send(Err(ClientError::Timeout));
                        break Some(MonitorError::WriteStalled {
                            id: outbound.frame.id().to_string(),
                        });
                    }
                }
            }

            result = reader.read(&mut read_buf) => match result {
                Ok(0) => break Some(MonitorError::ConnectionClosed),
                Ok(n) => {
                    silent_intervals = 0;
                    wait.as_mut().reset(Instant::now() + config.wait_timeout);

                    reassembler.feed(&read_buf[..n]);
                    for raw in reassembler.drain() {
                        deliver(raw, &mut dispatcher, &callback);
                    }
                }
                Err(e) => break Some(MonitorError::Io(e.to_string())),
            },

            () = &mut wait => {
                silent_intervals += 1;
                debug!("No data for {} interval(s)", silent_intervals);

                if silent_intervals >= config.max_silent_intervals {
                    break Some(MonitorError::SilenceTimeout {
                        intervals: silent_intervals,
                    });
                }
                wait.as_mut().reset(Instant::now() + config.wait_timeout);
            }
        }
    };

    // Close the queue before reporting so new sends fail fast
    drop(commands);

    match failure {
        Some(e) => {
            error!("Monitor loop failed: {}", e);
            *state.write() = MonitorState::Failed;
            if let Some(callback) = callback.lock().as_mut() {
                callback.on_fatal_error(&e);
            }
        }
        None => info!("Monitor loop stopped"),
    }
}

/// Validate, decode and hand one candidate frame to the callback
fn deliver(raw: Bytes, dispatcher: &mut Dispatcher, callback: &SharedCallback) {
    let frame = match Frame::parse(raw) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Discarding invalid frame: {}", e);
            return;
        }
    };

    debug!("Received {} ({} bytes)", frame.id(), frame.len());

    if let Some(message) = dispatcher.dispatch(&frame) {
        if let Some(callback) = callback.lock().as_mut() {
            callback.on_message(message);
        }
    }
}

/// Write a whole frame in one call; a short write is an error
async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = frame.as_bytes();
    let written = writer.write(bytes).await?;

    if written != bytes.len() {
        return Err(ClientError::PartialWrite {
            written,
            expected: bytes.len(),
        });
    }

    writer.flush().await?;
    debug!("Sent {} ({} bytes)", frame.id(), written);
    Ok(())
}
