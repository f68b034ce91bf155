//! Ports Layer
//!
//! - `FrameCodec`: tags request bodies with their correlation ID and reads it
//!   back out of replies
//! - `ReplySource`: the read path the listener drains

pub mod outbound;

pub use outbound::{FrameCodec, ReplySource};
