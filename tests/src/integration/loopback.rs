//! # Loopback Device
//!
//! A simulated device on the far side of two packet channels: bulk OUT
//! (host to device) and bulk IN (device to host). It reassembles each request
//! frame, asks a [`Responder`] what to say, and writes the reply back with a
//! [`ChunkedWriter`], the same framing the host uses.

use bytes::Bytes;
use dl_02_packet_transport::adapters::ChannelSink;
use dl_02_packet_transport::{ChunkedWriter, Reassembler};
use dl_03_broker::{
    BrokerConfig, BrokerError, EnvelopeCodec, FrameCodec, ListenerStats, PacketReplySource,
    RequestBroker,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Packets buffered per direction.
const CHANNEL_CAPACITY: usize = 64;

/// What the device does with one request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Body(Vec<u8>),
    /// Send nothing; the host will time out.
    Silent,
    /// Send the same reply twice; the second copy has no waiter.
    Twice(Vec<u8>),
}

pub type Responder = Arc<dyn Fn(&[u8]) -> Reply + Send + Sync>;

/// Responder answering every request with its own body.
pub fn echo() -> Responder {
    Arc::new(|body: &[u8]| Reply::Body(body.to_vec()))
}

/// Counts kept by the device task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub requests: u64,
    pub replies: u64,
    pub malformed: u64,
}

/// Device half of the loopback.
pub struct LoopbackDevice {
    requests: mpsc::Receiver<Bytes>,
    replies: ChunkedWriter<ChannelSink>,
    reassembler: Reassembler,
    responder: Responder,
}

impl LoopbackDevice {
    pub fn new(
        requests: mpsc::Receiver<Bytes>,
        replies: ChunkedWriter<ChannelSink>,
        max_message: usize,
        responder: Responder,
    ) -> Self {
        Self {
            requests,
            replies,
            reassembler: Reassembler::new(max_message),
            responder,
        }
    }

    /// Serve until the host drops its OUT sink, or the IN side goes away.
    pub async fn run(mut self) -> DeviceStats {
        let mut stats = DeviceStats::default();
        let never = CancellationToken::new();

        while let Some(packet) = self.requests.recv().await {
            let frame = match self.reassembler.feed(&packet) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Device dropped oversized request");
                    stats.malformed += 1;
                    continue;
                }
            };

            let Ok((id, body)) = EnvelopeCodec.decode(&frame) else {
                stats.malformed += 1;
                continue;
            };
            stats.requests += 1;

            let copies = match (self.responder)(&body) {
                Reply::Body(reply) => vec![reply],
                Reply::Silent => Vec::new(),
                Reply::Twice(reply) => vec![reply.clone(), reply],
            };

            for reply in copies {
                let Ok(frame) = EnvelopeCodec.encode(id, &reply) else {
                    continue;
                };
                if let Err(e) = self.replies.write(&frame, &never).await {
                    warn!(error = %e, "Device lost the IN channel");
                    return stats;
                }
                stats.replies += 1;
            }
            debug!(correlation_id = %id, "Device answered request");
        }

        stats
    }
}

/// Host side: a broker, its reply listener, and the device task.
pub struct LoopbackHost {
    pub broker: Arc<RequestBroker<ChannelSink, String>>,
    listener: JoinHandle<ListenerStats>,
    device: JoinHandle<DeviceStats>,
}

impl LoopbackHost {
    /// Spawn the device and listener on the current runtime.
    pub fn start(
        max_packet: usize,
        config: BrokerConfig,
        responder: Responder,
    ) -> Result<Self, BrokerError> {
        let (out_sink, out_rx) = ChannelSink::pair(max_packet, CHANNEL_CAPACITY);
        let (in_sink, in_rx) = ChannelSink::pair(max_packet, CHANNEL_CAPACITY);

        let max_message = config.max_message_size;
        let broker = Arc::new(RequestBroker::new(out_sink, config)?);

        let replies = ChunkedWriter::new(in_sink)?;
        let device = LoopbackDevice::new(out_rx, replies, max_message, responder);
        let device = tokio::spawn(device.run());

        let listener = broker.listener(PacketReplySource::new(in_rx, max_message));
        let listener = tokio::spawn(listener.run());

        Ok(Self {
            broker,
            listener,
            device,
        })
    }

    /// Drop the broker and wait for both tasks to drain.
    ///
    /// Every other clone of `broker` must already be gone, or the device
    /// never sees its OUT channel close.
    pub async fn shutdown(self) -> Result<(DeviceStats, ListenerStats), tokio::task::JoinError> {
        drop(self.broker);
        let device = self.device.await?;
        let listener = self.listener.await?;
        Ok((device, listener))
    }
}
