//! Adapters Layer
//!
//! In-process packet sinks. Real endpoint bindings live with the device
//! discovery code, outside this crate.

pub mod channel;
pub mod memory;

pub use channel::ChannelSink;
pub use memory::MemorySink;
