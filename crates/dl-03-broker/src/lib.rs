//! # DL-03 Broker
//!
//! Request/reply over a packet transport: each request is tagged with a
//! correlation ID, written as one framed message, and matched to its reply by
//! a listener on the read path.
//!
//! ## Architecture
//!
//! ```text
//!  caller ──request()──▶ RequestBroker ──frame──▶ ChunkedWriter ──▶ PacketSink (OUT)
//!    ▲                        │
//!    │                  WaiterRegistry ◀──deliver()── ReplyListener ◀── ReplySource (IN)
//!    └──────── reply ─────────┘
//! ```
//!
//! - **Domain** (`domain/`): configuration and error types
//! - **Ports** (`ports/`): [`FrameCodec`] and [`ReplySource`]
//! - **Adapters** (`adapters/`): bincode [`EnvelopeCodec`] and a packet-channel
//!   [`PacketReplySource`]
//! - **Service**: [`RequestBroker`] and [`ReplyListener`]
//!
//! ## Outcomes
//!
//! A request ends in exactly one of: reply, timeout, cancellation, or send
//! failure. When a reply and a timeout race, whichever removes the waiter
//! first decides the outcome. The request record is removed in every case.
//!
//! ## Usage
//!
//! ```ignore
//! use dl_03_broker::{adapters::PacketReplySource, BrokerConfig, RequestBroker};
//!
//! let broker = Arc::new(RequestBroker::new(bulk_out, BrokerConfig::from_env())?);
//! tokio::spawn(broker.listener(PacketReplySource::new(bulk_in, limit)).run());
//!
//! let reply = broker.request(b"get_version", "get_version", &cancel).await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod listener;
pub mod ports;
pub mod service;

pub use adapters::{Envelope, EnvelopeCodec, PacketReplySource};
pub use domain::{BrokerConfig, BrokerError, CodecError, ConfigError, FeedError};
pub use listener::{ListenerStats, ReplyListener};
pub use ports::{FrameCodec, ReplySource};
pub use service::RequestBroker;
