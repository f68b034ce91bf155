//! Outbound Ports (Driven Ports)
//!
//! What the transport needs from the device side: somewhere to put packets.

use async_trait::async_trait;

use crate::error::SinkError;

/// A packet-oriented endpoint with a fixed maximum packet size.
///
/// A USB bulk OUT endpoint is the typical implementation: every call is one
/// transfer, and a zero-length write is a zero-length packet.
#[async_trait]
pub trait PacketSink: Send {
    /// Largest packet `write_packet` accepts. Fixed for the sink's lifetime.
    fn max_packet_size(&self) -> usize;

    /// Write one packet of at most `max_packet_size()` bytes.
    ///
    /// Returns how many bytes the endpoint accepted. The future may be
    /// dropped part-way when the caller is cancelled.
    async fn write_packet(&mut self, packet: &[u8]) -> Result<usize, SinkError>;
}

#[async_trait]
impl<S: PacketSink + ?Sized> PacketSink for Box<S> {
    fn max_packet_size(&self) -> usize {
        (**self).max_packet_size()
    }

    async fn write_packet(&mut self, packet: &[u8]) -> Result<usize, SinkError> {
        (**self).write_packet(packet).await
    }
}
