//! Reply listener: drains the read path and wakes waiters.

use dl_01_correlation::{DeliveryError, WaiterRegistry};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::domain::FeedError;
use crate::ports::{FrameCodec, ReplySource};

/// Totals for one listener run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerStats {
    pub frames: u64,
    pub delivered: u64,
    /// Replies nobody was waiting for (late, duplicate, or unknown).
    pub dropped: u64,
    /// Frames that failed to decode, plus feed errors.
    pub errors: u64,
}

/// Feeds decoded replies into a [`WaiterRegistry`].
pub struct ReplyListener<R> {
    waiters: Arc<WaiterRegistry>,
    codec: Arc<dyn FrameCodec>,
    source: R,
}

impl<R: ReplySource> ReplyListener<R> {
    pub fn new(waiters: Arc<WaiterRegistry>, codec: Arc<dyn FrameCodec>, source: R) -> Self {
        Self {
            waiters,
            codec,
            source,
        }
    }

    /// Run until the source closes.
    ///
    /// Decode failures and unmatched replies are logged and skipped; they
    /// never stop the loop.
    pub async fn run(mut self) -> ListenerStats {
        let mut stats = ListenerStats::default();

        loop {
            match self.source.next_frame().await {
                Ok(frame) => {
                    stats.frames += 1;
                    self.handle_frame(&frame, &mut stats);
                }
                Err(FeedError::Closed) => {
                    info!(
                        frames = stats.frames,
                        delivered = stats.delivered,
                        "Reply source closed, stopping listener"
                    );
                    break;
                }
                Err(e) => {
                    stats.errors += 1;
                    error!(error = %e, "Error receiving reply");
                }
            }
        }

        stats
    }

    fn handle_frame(&self, frame: &[u8], stats: &mut ListenerStats) {
        let (id, payload) = match self.codec.decode(frame) {
            Ok(decoded) => decoded,
            Err(e) => {
                stats.errors += 1;
                warn!(error = %e, frame_len = frame.len(), "Dropping undecodable reply");
                return;
            }
        };

        match self.waiters.deliver(id, payload) {
            Ok(()) => stats.delivered += 1,
            Err(DeliveryError::Unknown { .. }) | Err(DeliveryError::Abandoned { .. }) => {
                stats.dropped += 1;
                debug!(correlation_id = %id, "Dropped reply with no live waiter");
            }
        }
    }
}
