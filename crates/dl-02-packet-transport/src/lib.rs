//! # DL-02 Packet Transport
//!
//! Sends arbitrary-length messages over a transport that only moves bounded
//! packets, such as a USB bulk endpoint.
//!
//! ## Architecture
//!
//! - **Ports** (`ports/`): [`PacketSink`], the driven port a bulk endpoint
//!   implements
//! - **Framing**: [`ChunkedWriter`] splits and terminates messages;
//!   [`Reassembler`] undoes it on the receive side
//! - **Progress** (`progress`): byte counters a progress UI can poll
//! - **Adapters** (`adapters/`): in-memory and channel-backed sinks
//!
//! ## Framing
//!
//! Every message is its data packets followed by one zero-length packet.
//! Without the terminator, a message ending exactly on a packet boundary
//! cannot be told apart from one with more data to come.
//!
//! ## Usage
//!
//! ```
//! # tokio_test::block_on(async {
//! use dl_02_packet_transport::{adapters::MemorySink, ChunkedWriter};
//! use tokio_util::sync::CancellationToken;
//!
//! let sink = MemorySink::new(64);
//! let mut writer = ChunkedWriter::new(sink.clone())?;
//!
//! let written = writer.write(&[0u8; 130], &CancellationToken::new()).await?;
//! assert_eq!(written, 130);
//! assert_eq!(sink.packet_sizes(), vec![64, 64, 2, 0]);
//! # Ok::<(), dl_02_packet_transport::TransportError>(())
//! # }).unwrap();
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod chunked;
pub mod error;
pub mod ports;
pub mod progress;
pub mod reassembly;

pub use chunked::ChunkedWriter;
pub use error::{SinkError, TransportError};
pub use ports::PacketSink;
pub use progress::{
    format_bytes, ByteCounter, CountingReader, CountingSink, Progress, ProgressCounter,
};
pub use reassembly::Reassembler;

/// Full-speed USB bulk endpoints top out at 64 bytes per packet.
pub const FULL_SPEED_BULK_PACKET: usize = 64;

/// High-speed USB bulk endpoints top out at 512 bytes per packet.
pub const HIGH_SPEED_BULK_PACKET: usize = 512;
