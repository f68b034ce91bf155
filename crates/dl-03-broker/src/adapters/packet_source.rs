//! Reply source reading raw packets and reassembling frames.

use async_trait::async_trait;
use bytes::Bytes;
use dl_02_packet_transport::Reassembler;
use tokio::sync::mpsc;

use crate::domain::FeedError;
use crate::ports::ReplySource;

/// Drains a channel of IN packets, yielding each zero-length-terminated
/// message as one frame.
pub struct PacketReplySource {
    packets: mpsc::Receiver<Bytes>,
    reassembler: Reassembler,
}

impl PacketReplySource {
    pub fn new(packets: mpsc::Receiver<Bytes>, max_message: usize) -> Self {
        Self {
            packets,
            reassembler: Reassembler::new(max_message),
        }
    }
}

#[async_trait]
impl ReplySource for PacketReplySource {
    async fn next_frame(&mut self) -> Result<Bytes, FeedError> {
        loop {
            let packet = self.packets.recv().await.ok_or(FeedError::Closed)?;
            if let Some(frame) = self.reassembler.feed(&packet)? {
                return Ok(frame);
            }
        }
    }
}
