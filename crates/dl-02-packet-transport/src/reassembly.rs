//! Receive-side framing: packets back into messages.
//!
//! Mirror of [`ChunkedWriter`](crate::ChunkedWriter). Data packets are
//! appended; a zero-length packet closes the message, including a message with
//! no data at all.
//!
//! An oversized message is reported once and then skipped through its own
//! terminator, so its tail never surfaces as a frame.

use bytes::{Bytes, BytesMut};

use crate::error::TransportError;

/// Accumulates packets until an end-of-message marker arrives.
#[derive(Debug)]
pub struct Reassembler {
    buffer: BytesMut,
    max_message: usize,
    packets: usize,
    /// Inside an oversized message; drop packets up to its terminator.
    discarding: bool,
}

impl Reassembler {
    /// Reassembler refusing messages longer than `max_message` bytes.
    pub fn new(max_message: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_message,
            packets: 0,
            discarding: false,
        }
    }

    /// Feed one packet.
    ///
    /// Returns `Some(message)` on the terminator, `None` while more is
    /// expected. An oversized message is reported on the packet that crosses
    /// the limit; the rest of it, terminator included, is then dropped.
    pub fn feed(&mut self, packet: &[u8]) -> Result<Option<Bytes>, TransportError> {
        if self.discarding {
            if packet.is_empty() {
                self.discarding = false;
            }
            return Ok(None);
        }

        if packet.is_empty() {
            self.packets = 0;
            return Ok(Some(self.buffer.split().freeze()));
        }

        if self.buffer.len() + packet.len() > self.max_message {
            self.buffer.clear();
            self.packets = 0;
            self.discarding = true;
            return Err(TransportError::MessageTooLarge {
                limit: self.max_message,
            });
        }

        self.buffer.extend_from_slice(packet);
        self.packets += 1;
        Ok(None)
    }

    /// Drop any partial or skipped message, e.g. after the link was reset.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.packets = 0;
        self.discarding = false;
    }

    /// Whether a message is partly received.
    pub fn is_active(&self) -> bool {
        self.packets > 0
    }

    /// Whether the rest of an oversized message is being skipped.
    pub fn is_discarding(&self) -> bool {
        self.discarding
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
