//! Chunked message writer over a bounded-packet sink.
//!
//! A message of any length goes out as full packets, then whatever remains,
//! then one zero-length packet:
//!
//! ```text
//! M = 64, payload = 130 bytes
//!
//! write #1: [64 bytes]
//! write #2: [64 bytes]
//! write #3: [ 2 bytes]
//! write #4: [ 0 bytes]   end of message
//! ```
//!
//! The terminator is sent even when the last data packet is short. A
//! receiver then never has to guess whether a full packet was the last one.
//!
//! Per message: `Sending -> Terminating -> Done`. A failed segment or a fired
//! cancellation token leaves `Sending` and returns at once, with no
//! terminator. If any part of the message may have reached the sink, the
//! writer is then desynchronized: the receiver holds a partial message, and
//! every further `write` is refused until [`ChunkedWriter::resync`] closes it
//! off with a lone terminator.

use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::{SinkError, TransportError};
use crate::ports::PacketSink;
use crate::progress::ByteCounter;

/// Writes whole messages to a [`PacketSink`] one segment at a time.
///
/// Takes `&mut self` to write: one message in flight per writer. Callers
/// sharing a sink serialize outside (see `RequestBroker`).
pub struct ChunkedWriter<S> {
    sink: S,
    max_packet: usize,
    progress: Option<ByteCounter>,
    /// A message was cut short after some of it may have been sent.
    desynchronized: bool,
}

impl<S: PacketSink> ChunkedWriter<S> {
    /// Wrap `sink`, taking its maximum packet size.
    pub fn new(sink: S) -> Result<Self, TransportError> {
        let max_packet = sink.max_packet_size();
        if max_packet == 0 {
            return Err(TransportError::InvalidPacketSize(max_packet));
        }
        Ok(Self {
            sink,
            max_packet,
            progress: None,
            desynchronized: false,
        })
    }

    /// Count every byte the sink accepts into `counter`.
    pub fn with_progress(mut self, counter: ByteCounter) -> Self {
        self.progress = Some(counter);
        self
    }

    pub fn max_packet_size(&self) -> usize {
        self.max_packet
    }

    /// `false` after an interrupted message, until [`resync`](Self::resync).
    pub fn is_synchronized(&self) -> bool {
        !self.desynchronized
    }

    pub fn get_ref(&self) -> &S {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    /// Send `payload` as one framed message.
    ///
    /// Returns the total payload bytes written. The token is checked before
    /// every segment and also raced against the segment in flight; a segment
    /// interrupted that way counts as unwritten.
    ///
    /// # Errors
    ///
    /// - `TransportError::Desynchronized` - an earlier message was cut short;
    ///   nothing is sent
    /// - `TransportError::Cancelled` - token fired; `written` is the total so far
    /// - `TransportError::Sink` - a write failed; `written` is that one
    ///   write's partial count
    pub async fn write(
        &mut self,
        payload: &[u8],
        cancel: &CancellationToken,
    ) -> Result<usize, TransportError> {
        if self.desynchronized {
            return Err(TransportError::Desynchronized);
        }

        let mut written = 0usize;
        let mut rest = payload;

        while !rest.is_empty() {
            if cancel.is_cancelled() {
                self.desynchronized = written > 0;
                debug!(written, remaining = rest.len(), "Chunked write cancelled");
                return Err(TransportError::Cancelled { written });
            }

            let segment = &rest[..rest.len().min(self.max_packet)];
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.sink.write_packet(segment) => Some(result),
            };

            let Some(result) = result else {
                // The dropped transfer may already have reached the endpoint.
                self.desynchronized = true;
                debug!(written, remaining = rest.len(), "Chunked write cancelled mid-segment");
                return Err(TransportError::Cancelled { written });
            };

            let n = match result {
                Ok(0) => {
                    self.desynchronized = written > 0;
                    let source = SinkError::WriteZero {
                        offered: segment.len(),
                    };
                    warn!(written, error = %source, "Segment write made no progress");
                    return Err(TransportError::Sink { written: 0, source });
                }
                Ok(n) => n.min(segment.len()),
                Err(source) => {
                    let partial = source.written();
                    self.record(partial);
                    self.desynchronized = written + partial > 0;
                    warn!(
                        written,
                        segment_len = segment.len(),
                        partial,
                        error = %source,
                        "Segment write failed"
                    );
                    return Err(TransportError::Sink {
                        written: partial,
                        source,
                    });
                }
            };

            self.record(n);
            written += n;
            rest = &rest[n..];
            trace!(segment = n, written, "Wrote segment");
        }

        if let Err(source) = self.sink.write_packet(&[]).await {
            self.desynchronized = written > 0;
            warn!(written, error = %source, "End-of-message packet failed");
            return Err(TransportError::Sink { written: 0, source });
        }

        debug!(bytes = written, max_packet = self.max_packet, "Chunked write complete");
        Ok(written)
    }

    /// Close off a message cut short by cancellation or failure.
    ///
    /// Sends one zero-length packet so the receiver ends the partial message
    /// (which it will fail to decode and drop). Does nothing when the writer
    /// is synchronized.
    pub async fn resync(&mut self) -> Result<(), TransportError> {
        if !self.desynchronized {
            return Ok(());
        }

        self.sink
            .write_packet(&[])
            .await
            .map_err(|source| TransportError::Sink { written: 0, source })?;

        self.desynchronized = false;
        debug!("Framing resynchronized");
        Ok(())
    }

    fn record(&self, n: usize) {
        if let Some(progress) = &self.progress {
            progress.add(n as u64);
        }
    }
}
