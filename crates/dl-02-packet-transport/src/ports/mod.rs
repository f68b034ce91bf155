//! Ports Layer
//!
//! Driven ports only: the transport calls out to a packet sink and never
//! exposes an inbound trait of its own.

pub mod outbound;

pub use outbound::PacketSink;
