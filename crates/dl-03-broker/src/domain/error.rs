//! Broker error types.
//!
//! Nothing here is retried. Each failure goes back to the caller, which may
//! start a whole new request.

use dl_01_correlation::CorrelationId;
use dl_02_packet_transport::TransportError;
use std::time::Duration;
use thiserror::Error;

use crate::domain::config::ConfigError;

/// Frame encoding/decoding failure.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode frame: {0}")]
    Encode(String),
    #[error("failed to decode frame: {0}")]
    Decode(String),
}

/// Failure reading from the reply feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The read path is gone; the listener stops.
    #[error("reply source closed")]
    Closed,
    #[error("reply transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Failure of a single request/reply exchange.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Sending failed; the request never fully reached the device.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("request of {size} bytes exceeds the {limit}-byte limit")]
    MessageTooLarge { size: usize, limit: usize },

    #[error("request {id} timed out after {after:?}")]
    Timeout { id: CorrelationId, after: Duration },

    /// The caller's cancellation token fired.
    #[error("request {id} cancelled")]
    Cancelled { id: CorrelationId },

    /// An earlier request was cut short mid-send; nothing more goes out
    /// until `RequestBroker::reset`.
    #[error("link framing desynchronized; reset required")]
    Desynchronized,

    /// The waiter was removed from outside without a reply.
    #[error("reply slot for request {id} closed without a reply")]
    ReplyDropped { id: CorrelationId },
}

impl BrokerError {
    /// User-initiated abort, as opposed to a transport or device fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    pub fn is_desynchronized(&self) -> bool {
        matches!(self, Self::Desynchronized)
    }
}
