//! Stream reassembly
//!
//! Socket reads arrive in arbitrary chunks: a read may hold several frames,
//! end in the middle of one, or start with stale bytes. [`FrameReassembler`]
//! buffers reads and hands back complete candidate frames.
//!
//! Framing decisions depend only on buffered content, never on where one
//! read ended and the next began.

use crate::frame::MIN_FRAME_SIZE;
use crate::TERMINATOR;
use bytes::{Buf, Bytes, BytesMut};
use tracing::{debug, trace};

/// Accumulates socket reads and splits them into frames
///
/// A length byte equal to the terminator (0x7E) is read as a stray
/// terminator, so a frame carrying exactly 121 payload bytes is never
/// returned. Such a frame is skipped and the frames after it still arrive.
#[derive(Debug)]
pub struct FrameReassembler {
    pending: BytesMut,
}

impl FrameReassembler {
    pub fn new() -> Self {
        Self {
            pending: BytesMut::with_capacity(1024),
        }
    }

    /// Append newly read bytes
    pub fn feed(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
        self.sync_to_terminator();
    }

    /// Iterate over the complete frames currently buffered.
    ///
    /// Stops at the first partial frame; the remainder stays buffered for
    /// the next [`feed`](Self::feed).
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { reassembler: self }
    }

    /// Bytes buffered but not yet returned as a frame
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Drop bytes ahead of the first terminator, or everything if there is none
    fn sync_to_terminator(&mut self) {
        if self.pending.first() == Some(&TERMINATOR) {
            return;
        }

        match self.pending.iter().position(|&b| b == TERMINATOR) {
            Some(start) => {
                debug!("Discarding {} bytes before frame start", start);
                self.pending.advance(start);
            }
            None => {
                if !self.pending.is_empty() {
                    debug!("Discarding {} bytes with no frame start", self.pending.len());
                }
                self.pending.clear();
            }
        }
    }

    /// Drop the leading terminator and look for the next one
    fn resync(&mut self) {
        self.pending.advance(1);
        self.sync_to_terminator();
    }

    fn next_frame(&mut self) -> Option<Bytes> {
        loop {
            self.sync_to_terminator();

            if self.pending.len() < MIN_FRAME_SIZE {
                return None;
            }

            // A terminator in the length position is the tail of a lost
            // frame followed by the start of the next one.
            let length = self.pending[1] as usize;
            if length + 2 < MIN_FRAME_SIZE || self.pending[1] == TERMINATOR {
                debug!("Implausible frame length {}, resynchronising", length);
                self.resync();
                continue;
            }

            let frame_len = length + 2;
            if self.pending.len() < frame_len {
                trace!(
                    "Partial frame: have {} of {} bytes",
                    self.pending.len(),
                    frame_len
                );
                return None;
            }

            if self.pending[frame_len - 1] != TERMINATOR {
                debug!("No terminator at declared frame end, resynchronising");
                self.resync();
                continue;
            }

            return Some(self.pending.split_to(frame_len).freeze());
        }
    }
}

impl Default for FrameReassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator returned by [`FrameReassembler::drain`]
pub struct Drain<'a> {
    reassembler: &'a mut FrameReassembler,
}

impl Iterator for Drain<'_> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.reassembler.next_frame()
    }
}
