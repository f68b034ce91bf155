//! Request broker: one request out, one correlated reply back.

use bytes::Bytes;
use dl_01_correlation::{CorrelationId, IdSource, ReplySlot, RequestRegistry, WaiterRegistry};
use dl_02_packet_transport::{ChunkedWriter, PacketSink, TransportError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::adapters::EnvelopeCodec;
use crate::domain::{BrokerConfig, BrokerError};
use crate::listener::ReplyListener;
use crate::ports::{FrameCodec, ReplySource};

/// Sends tagged requests over a packet sink and matches replies to callers.
///
/// `T` is whatever the caller wants to remember about a request while it is
/// outstanding (a command name, a started-at instant). It is visible through
/// [`in_flight`](Self::in_flight) and removed when the request finishes,
/// whatever the outcome.
pub struct RequestBroker<S, T> {
    waiters: Arc<WaiterRegistry>,
    requests: RequestRegistry<T>,
    writer: Mutex<ChunkedWriter<S>>,
    codec: Arc<dyn FrameCodec>,
    config: BrokerConfig,
}

impl<S: PacketSink, T: Clone> RequestBroker<S, T> {
    /// Broker writing to `sink` with the default [`EnvelopeCodec`].
    pub fn new(sink: S, config: BrokerConfig) -> Result<Self, BrokerError> {
        config.validate()?;
        let writer = ChunkedWriter::new(sink)?;

        Ok(Self {
            waiters: Arc::new(WaiterRegistry::new()),
            requests: RequestRegistry::new(),
            writer: Mutex::new(writer),
            codec: Arc::new(EnvelopeCodec),
            config,
        })
    }

    pub fn with_codec(mut self, codec: Arc<dyn FrameCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the ID source. Call before any request is made.
    pub fn with_id_source(mut self, ids: Arc<dyn IdSource>) -> Self {
        self.waiters = Arc::new(WaiterRegistry::with_id_source(ids));
        self
    }

    /// Shared waiter registry, for wiring a custom reply path.
    pub fn waiters(&self) -> Arc<WaiterRegistry> {
        Arc::clone(&self.waiters)
    }

    pub fn codec(&self) -> Arc<dyn FrameCodec> {
        Arc::clone(&self.codec)
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Listener that feeds replies from `source` to this broker's waiters.
    pub fn listener<R: ReplySource>(&self, source: R) -> ReplyListener<R> {
        ReplyListener::new(self.waiters(), self.codec(), source)
    }

    /// Send `body` and wait for its reply, up to the configured timeout.
    pub async fn request(
        &self,
        body: &[u8],
        record: T,
        cancel: &CancellationToken,
    ) -> Result<Bytes, BrokerError> {
        self.request_with_timeout(body, record, self.config.request_timeout(), cancel)
            .await
    }

    /// Send `body` and wait for its reply, up to `timeout`.
    ///
    /// # Errors
    ///
    /// - `BrokerError::Cancelled` - `cancel` fired while sending or waiting
    /// - `BrokerError::Timeout` - no reply within `timeout`
    /// - `BrokerError::Transport` - the sink failed mid-message
    /// - `BrokerError::Desynchronized` - an earlier request was cut short
    ///   mid-send; call [`reset`](Self::reset)
    /// - `BrokerError::MessageTooLarge` / `BrokerError::Codec` - nothing was sent
    pub async fn request_with_timeout(
        &self,
        body: &[u8],
        record: T,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Bytes, BrokerError> {
        let (id, mut slot) = self.waiters.register();
        self.requests.store(id, record);

        let result = self.exchange(id, &mut slot, body, timeout, cancel).await;

        self.requests.delete(id);
        result
    }

    async fn exchange(
        &self,
        id: CorrelationId,
        slot: &mut ReplySlot,
        body: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<Bytes, BrokerError> {
        if let Err(e) = self.send(id, body, cancel).await {
            self.waiters.cancel(id);
            warn!(correlation_id = %id, error = %e, "Request send failed");
            return Err(e);
        }

        let reason = tokio::select! {
            biased;
            reply = slot.recv() => {
                return reply.map_err(|_| BrokerError::ReplyDropped { id });
            }
            _ = cancel.cancelled() => BrokerError::Cancelled { id },
            _ = tokio::time::sleep(timeout) => BrokerError::Timeout { id, after: timeout },
        };

        self.abandon(id, slot, reason).await
    }

    async fn send(
        &self,
        id: CorrelationId,
        body: &[u8],
        cancel: &CancellationToken,
    ) -> Result<(), BrokerError> {
        let frame = self.codec.encode(id, body)?;
        if frame.len() > self.config.max_message_size {
            return Err(BrokerError::MessageTooLarge {
                size: frame.len(),
                limit: self.config.max_message_size,
            });
        }

        let mut writer = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(BrokerError::Cancelled { id }),
            writer = self.writer.lock() => writer,
        };

        match writer.write(&frame, cancel).await {
            Ok(written) => {
                debug!(correlation_id = %id, bytes = written, "Sent request");
                Ok(())
            }
            Err(e) if e.is_cancelled() => Err(BrokerError::Cancelled { id }),
            Err(TransportError::Desynchronized) => Err(BrokerError::Desynchronized),
            Err(e) => Err(e.into()),
        }
    }

    /// Give up on `id` for `reason`, unless a reply already won the race.
    async fn abandon(
        &self,
        id: CorrelationId,
        slot: &mut ReplySlot,
        reason: BrokerError,
    ) -> Result<Bytes, BrokerError> {
        if self.waiters.cancel(id) {
            debug!(correlation_id = %id, reason = %reason, "Abandoned request");
            return Err(reason);
        }

        // The entry was already taken by a delivery, so the payload is in
        // the slot or about to be.
        match slot.recv().await {
            Ok(reply) => {
                debug!(correlation_id = %id, "Reply arrived as the request was abandoned");
                Ok(reply)
            }
            Err(_) => Err(reason),
        }
    }

    /// Whether requests can go out, i.e. no message was left half-sent.
    pub async fn is_synchronized(&self) -> bool {
        self.writer.lock().await.is_synchronized()
    }

    /// Recover framing after a request was cancelled or failed mid-send.
    ///
    /// Terminates the device's partial frame with a lone zero-length packet.
    /// A no-op when nothing is pending. Clear any endpoint halt before
    /// calling this.
    pub async fn reset(&self) -> Result<(), BrokerError> {
        let mut writer = self.writer.lock().await;
        if writer.is_synchronized() {
            return Ok(());
        }
        writer.resync().await?;
        info!("Link framing reset");
        Ok(())
    }

    /// Records of every request still waiting for a reply.
    pub fn in_flight(&self) -> HashMap<CorrelationId, T> {
        self.requests.all()
    }

    pub fn is_in_flight(&self, id: CorrelationId) -> bool {
        self.requests.has_request(id)
    }

    pub fn pending_count(&self) -> usize {
        self.waiters.pending_count()
    }
}
