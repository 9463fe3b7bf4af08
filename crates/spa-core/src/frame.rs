//! Binary frame encoding/validation
//!
//! Spa frame format:
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Byte 0:       Terminator (0x7E)                              │
//! │ Byte 1:       Length = payload length + 5                    │
//! │ Bytes 2-4:    Message id (24-bit big-endian)                 │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Payload (length - 5 bytes)                                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Byte n-2:     CRC-8 over bytes 1..n-2                        │
//! │ Byte n-1:     Terminator (0x7E)                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The total frame size is always `length + 2`.

use crate::{checksum, Error, FrameError, MessageId, Result, TERMINATOR};
use bytes::{BufMut, Bytes, BytesMut};

/// Terminators, length, id and checksum
pub const FRAME_OVERHEAD: usize = 7;

/// Smallest possible frame (empty payload)
pub const MIN_FRAME_SIZE: usize = FRAME_OVERHEAD;

/// Offset of the first payload byte
pub const PAYLOAD_OFFSET: usize = 5;

/// Largest payload the one-byte length field can describe
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize - 5;

/// Header fields of a validated frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u8,
    pub id: MessageId,
    pub checksum: u8,
}

impl FrameHeader {
    pub fn payload_len(&self) -> usize {
        self.length as usize - 5
    }

    pub fn frame_len(&self) -> usize {
        self.length as usize + 2
    }
}

/// Check terminators, length and checksum of a complete frame
pub fn validate(bytes: &[u8]) -> std::result::Result<FrameHeader, FrameError> {
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(FrameError::TooShort { len: bytes.len() });
    }

    if bytes[0] != TERMINATOR {
        return Err(FrameError::MissingStart(bytes[0]));
    }

    let last = bytes[bytes.len() - 1];
    if last != TERMINATOR {
        return Err(FrameError::MissingEnd(last));
    }

    let length = bytes[1];
    if length as usize != bytes.len() - 2 {
        return Err(FrameError::LengthMismatch {
            declared: length,
            actual: bytes.len(),
        });
    }

    let crc_offset = bytes.len() - 2;
    let received = bytes[crc_offset];
    let computed = checksum(&bytes[1..crc_offset]);
    if received != computed {
        return Err(FrameError::ChecksumMismatch { received, computed });
    }

    Ok(FrameHeader {
        length,
        id: MessageId::from_bytes([bytes[2], bytes[3], bytes[4]]),
        checksum: received,
    })
}

/// A complete, validated frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    header: FrameHeader,
    raw: Bytes,
}

impl Frame {
    /// Build a frame around `payload`
    pub fn encode(id: MessageId, payload: &[u8]) -> Result<Self> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(Error::PayloadTooLarge(payload.len()));
        }

        let total = FRAME_OVERHEAD + payload.len();
        let length = (total - 2) as u8;
        let mut buf = BytesMut::with_capacity(total);

        buf.put_u8(TERMINATOR);
        buf.put_u8(length);
        buf.put_slice(&id.to_bytes());
        buf.put_slice(payload);

        let crc = checksum(&buf[1..]);
        buf.put_u8(crc);
        buf.put_u8(TERMINATOR);

        Ok(Self {
            header: FrameHeader {
                length,
                id,
                checksum: crc,
            },
            raw: buf.freeze(),
        })
    }

    /// Validate `raw` and wrap it as a frame
    pub fn parse(raw: impl Into<Bytes>) -> std::result::Result<Self, FrameError> {
        let raw = raw.into();
        let header = validate(&raw)?;
        Ok(Self { header, raw })
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn id(&self) -> MessageId {
        self.header.id
    }

    pub fn payload(&self) -> &[u8] {
        &self.raw[PAYLOAD_OFFSET..self.raw.len() - 2]
    }

    /// Full wire bytes, terminators included
    pub fn as_bytes(&self) -> &Bytes {
        &self.raw
    }

    pub fn into_bytes(self) -> Bytes {
        self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}
