//! Error types for the spa protocol

use thiserror::Error;

/// Result type alias for spa protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a byte sequence is not a usable frame
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than the smallest possible frame
    #[error("frame too short: {len} bytes (min 7)")]
    TooShort { len: usize },

    /// First byte is not the terminator
    #[error("invalid start byte: expected 0x7e, got 0x{0:02x}")]
    MissingStart(u8),

    /// Last byte is not the terminator
    #[error("invalid end byte: expected 0x7e, got 0x{0:02x}")]
    MissingEnd(u8),

    /// Length byte disagrees with the frame size
    #[error("length mismatch: header says {declared}, frame carries {actual}")]
    LengthMismatch { declared: u8, actual: usize },

    /// Trailing checksum does not match the frame contents
    #[error("checksum mismatch: frame has 0x{received:02x}, computed 0x{computed:02x}")]
    ChecksumMismatch { received: u8, computed: u8 },
}

/// Spa protocol error types
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed frame
    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),

    /// Payload does not fit the one-byte length field
    #[error("payload too large: {0} bytes (max 250)")]
    PayloadTooLarge(usize),

    /// Command field outside its encodable range
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: u32 },
}
