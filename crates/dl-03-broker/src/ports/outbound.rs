//! Outbound ports for the broker.

use async_trait::async_trait;
use bytes::Bytes;
use dl_01_correlation::CorrelationId;

use crate::domain::{CodecError, FeedError};

/// Wire framing for tagged messages.
///
/// The command schema inside `body` is opaque here; only the correlation ID
/// is read or written.
pub trait FrameCodec: Send + Sync {
    /// Wrap a request body together with its ID.
    fn encode(&self, id: CorrelationId, body: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Split a reply frame into the ID it answers and its payload.
    fn decode(&self, frame: &[u8]) -> Result<(CorrelationId, Bytes), CodecError>;
}

/// Source of complete reply frames from the device.
#[async_trait]
pub trait ReplySource: Send {
    /// Next frame. `FeedError::Closed` ends the listener.
    async fn next_frame(&mut self) -> Result<Bytes, FeedError>;
}
