//! Packet sink forwarding each packet into a Tokio channel.
//!
//! Stands in for a bulk OUT endpoint when the "device" is another task, e.g.
//! a loopback simulator in integration tests.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::ports::PacketSink;

pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
    max_packet: usize,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<Bytes>, max_packet: usize) -> Self {
        Self { tx, max_packet }
    }

    /// Sink plus the receiving end, with room for `capacity` packets.
    pub fn pair(max_packet: usize, capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx, max_packet), rx)
    }
}

#[async_trait]
impl PacketSink for ChannelSink {
    fn max_packet_size(&self) -> usize {
        self.max_packet
    }

    async fn write_packet(&mut self, packet: &[u8]) -> Result<usize, SinkError> {
        self.tx
            .send(Bytes::copy_from_slice(packet))
            .await
            .map_err(|_| SinkError::Disconnected)?;
        Ok(packet.len())
    }
}
