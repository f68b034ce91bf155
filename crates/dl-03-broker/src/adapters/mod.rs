//! Adapters for the broker.

pub mod envelope;
pub mod packet_source;

pub use envelope::{Envelope, EnvelopeCodec};
pub use packet_source::PacketReplySource;
