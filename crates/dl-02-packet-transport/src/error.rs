//! Error types for the packet transport.

use thiserror::Error;

/// Failure reported by a packet sink for a single packet write.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The endpoint timed out after accepting `written` bytes of the packet.
    #[error("packet write timed out after {written} bytes")]
    Timeout { written: usize },

    /// The endpoint is halted and needs a clear-halt before further writes.
    #[error("endpoint stalled")]
    Stall,

    #[error("device disconnected")]
    Disconnected,

    /// The sink accepted nothing of a non-empty packet.
    #[error("sink accepted 0 of {offered} bytes")]
    WriteZero { offered: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SinkError {
    /// Bytes of the failing packet the sink took before failing.
    pub fn written(&self) -> usize {
        match self {
            Self::Timeout { written } => *written,
            _ => 0,
        }
    }
}

/// Errors from chunked sends and reassembly.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid maximum packet size: {0}")]
    InvalidPacketSize(usize),

    /// The cancellation token fired mid-message. No terminator was sent.
    ///
    /// `written` is the total across every segment that completed.
    #[error("write cancelled after {written} bytes")]
    Cancelled { written: usize },

    /// A segment write failed. No terminator was sent.
    ///
    /// `written` covers only the failing segment's write call, not the
    /// message so far.
    #[error("segment write failed after {written} bytes: {source}")]
    Sink {
        written: usize,
        #[source]
        source: SinkError,
    },

    #[error("reassembled message exceeds {limit} bytes")]
    MessageTooLarge { limit: usize },

    /// An earlier message was cut short mid-send and the receiver still
    /// holds its partial frame. Call `ChunkedWriter::resync` first.
    #[error("framing desynchronized by an interrupted message")]
    Desynchronized,
}

impl TransportError {
    /// Byte count attached to a failed write, 0 for other errors.
    pub fn written(&self) -> usize {
        match self {
            Self::Cancelled { written } | Self::Sink { written, .. } => *written,
            _ => 0,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
