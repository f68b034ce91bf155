//! In-memory packet sink.
//!
//! Records every packet it accepts. Clones share the same log, so a test can
//! keep one handle while the writer owns another.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

use crate::error::SinkError;
use crate::ports::PacketSink;

#[derive(Default)]
struct Inner {
    packets: Vec<Bytes>,
    attempts: usize,
    failure: Option<(usize, SinkError)>,
}

/// Packet sink backed by a `Vec`, with optional injected failure.
#[derive(Clone)]
pub struct MemorySink {
    max_packet: usize,
    inner: Arc<Mutex<Inner>>,
}

impl MemorySink {
    pub fn new(max_packet: usize) -> Self {
        Self {
            max_packet,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Fail the write attempt with 0-based index `attempt` with `error`.
    ///
    /// The failing packet is not recorded. Later attempts succeed.
    pub fn fail_at(self, attempt: usize, error: SinkError) -> Self {
        self.inner.lock().failure = Some((attempt, error));
        self
    }

    pub fn packets(&self) -> Vec<Bytes> {
        self.inner.lock().packets.clone()
    }

    pub fn packet_sizes(&self) -> Vec<usize> {
        self.inner.lock().packets.iter().map(Bytes::len).collect()
    }

    pub fn packet_count(&self) -> usize {
        self.inner.lock().packets.len()
    }

    /// Every recorded packet joined together.
    pub fn concatenated(&self) -> Vec<u8> {
        self.inner
            .lock()
            .packets
            .iter()
            .flat_map(|p| p.iter().copied())
            .collect()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.packets.clear();
        inner.attempts = 0;
    }
}

#[async_trait]
impl PacketSink for MemorySink {
    fn max_packet_size(&self) -> usize {
        self.max_packet
    }

    async fn write_packet(&mut self, packet: &[u8]) -> Result<usize, SinkError> {
        let mut inner = self.inner.lock();
        let attempt = inner.attempts;
        inner.attempts += 1;

        if matches!(inner.failure, Some((at, _)) if at == attempt) {
            if let Some((_, error)) = inner.failure.take() {
                return Err(error);
            }
        }

        if packet.len() > self.max_packet {
            return Err(SinkError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "packet of {} bytes exceeds maximum of {}",
                    packet.len(),
                    self.max_packet
                ),
            )));
        }

        inner.packets.push(Bytes::copy_from_slice(packet));
        Ok(packet.len())
    }
}
