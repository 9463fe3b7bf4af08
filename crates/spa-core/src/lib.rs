//! Spa Core
//!
//! Wire-level building blocks for the Balboa-style spa controller protocol.
//!
//! This crate provides:
//! - Frame encoding and validation ([`Frame`], [`frame::validate`])
//! - Stream reassembly of chunked socket reads ([`FrameReassembler`])
//! - Message identifiers and decoded message types ([`MessageId`], [`SpaMessage`])
//! - Table-driven message dispatch with status coalescing ([`codec`], [`Dispatcher`])
//! - Outbound command encoding ([`Command`])
//! - Controller endpoints ([`SpaEndpoint`]) and a hex dump helper ([`hex`])

pub mod checksum;
pub mod codec;
pub mod command;
pub mod endpoint;
pub mod error;
pub mod frame;
pub mod hex;
pub mod reassembler;
pub mod types;

pub use checksum::checksum;
pub use codec::{decode, Dispatcher};
pub use command::Command;
pub use endpoint::SpaEndpoint;
pub use error::{Error, FrameError, Result};
pub use frame::{Frame, FrameHeader};
pub use reassembler::FrameReassembler;
pub use types::*;

/// Sentinel byte that opens and closes every frame
pub const TERMINATOR: u8 = 0x7E;

/// Default TCP port for the control channel
pub const DEFAULT_CONTROL_PORT: u16 = 4257;

/// Default UDP port controllers listen on for discovery
pub const DEFAULT_DISCOVERY_PORT: u16 = 30303;
