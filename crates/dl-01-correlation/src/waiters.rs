//! Waiter registry - correlation ID to single-use reply slot.
//!
//! Flow:
//! 1. Caller calls `register()` and gets an ID plus a `ReplySlot`
//! 2. Caller sends a request tagged with the ID
//! 3. The read path decodes a reply and calls `deliver(id, payload)`
//! 4. Caller awaits the slot, or gives up and calls `cancel(id)`
//!
//! `deliver` and `cancel` both go through a single `DashMap::remove`, so when
//! they race on one ID exactly one of them gets the entry. The other sees
//! nothing and must not act as if it resolved the request.

use crate::error::{DeliveryError, WaitError};
use crate::id::{CorrelationId, IdSource, RandomIdSource};
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::debug;

/// Receiving half of a registered waiter.
///
/// Holds at most one payload. Dropping it abandons the wait; a later delivery
/// for the same ID then reports `DeliveryError::Abandoned`.
#[derive(Debug)]
pub struct ReplySlot {
    id: CorrelationId,
    rx: oneshot::Receiver<Bytes>,
}

impl ReplySlot {
    pub fn id(&self) -> CorrelationId {
        self.id
    }

    /// Wait for the reply.
    ///
    /// Fails with `WaitError::Closed` if the waiter was cancelled. Once this
    /// has returned, the slot must not be awaited again.
    pub async fn recv(&mut self) -> Result<Bytes, WaitError> {
        let id = self.id;
        (&mut self.rx).await.map_err(|_| WaitError::Closed { id })
    }

    /// Take the reply if it has already been delivered.
    pub fn try_recv(&mut self) -> Result<Bytes, WaitError> {
        let id = self.id;
        self.rx.try_recv().map_err(|e| match e {
            oneshot::error::TryRecvError::Empty => WaitError::Empty { id },
            oneshot::error::TryRecvError::Closed => WaitError::Closed { id },
        })
    }
}

/// Counters for the registry. All values only ever grow.
#[derive(Debug, Default)]
pub struct WaiterStats {
    registered: AtomicU64,
    delivered: AtomicU64,
    cancelled: AtomicU64,
    unknown: AtomicU64,
    abandoned: AtomicU64,
}

/// Point-in-time copy of [`WaiterStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaiterStatsSnapshot {
    pub registered: u64,
    pub delivered: u64,
    pub cancelled: u64,
    pub unknown: u64,
    pub abandoned: u64,
}

impl WaiterStats {
    fn snapshot(&self) -> WaiterStatsSnapshot {
        WaiterStatsSnapshot {
            registered: self.registered.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            unknown: self.unknown.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Concurrent map of outstanding waiters.
///
/// Safe to share behind an `Arc` between callers, the reply feed, and
/// cancellation triggers without any outer lock.
pub struct WaiterRegistry {
    waiters: DashMap<CorrelationId, oneshot::Sender<Bytes>>,
    ids: Arc<dyn IdSource>,
    stats: WaiterStats,
}

impl WaiterRegistry {
    /// Registry minting random 128-bit IDs.
    pub fn new() -> Self {
        Self::with_id_source(Arc::new(RandomIdSource))
    }

    pub fn with_id_source(ids: Arc<dyn IdSource>) -> Self {
        Self {
            waiters: DashMap::new(),
            ids,
            stats: WaiterStats::default(),
        }
    }

    /// Mint an ID and a fresh single-capacity slot for it.
    pub fn register(&self) -> (CorrelationId, ReplySlot) {
        let id = self.ids.next_id();
        let (tx, rx) = oneshot::channel();

        self.waiters.insert(id, tx);
        self.stats.registered.fetch_add(1, Ordering::Relaxed);

        debug!(correlation_id = %id, "Registered waiter");

        (id, ReplySlot { id, rx })
    }

    /// Hand `payload` to the waiter for `id`, removing it.
    ///
    /// Never blocks: the slot has room for exactly the one payload.
    pub fn deliver(
        &self,
        id: CorrelationId,
        payload: impl Into<Bytes>,
    ) -> Result<(), DeliveryError> {
        let Some((_, tx)) = self.waiters.remove(&id) else {
            self.stats.unknown.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %id, "Reply for unknown or resolved correlation ID");
            return Err(DeliveryError::Unknown { id });
        };

        let payload = payload.into();
        let len = payload.len();
        match tx.send(payload) {
            Ok(()) => {
                self.stats.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(correlation_id = %id, bytes = len, "Delivered reply");
                Ok(())
            }
            Err(_) => {
                self.stats.abandoned.fetch_add(1, Ordering::Relaxed);
                debug!(correlation_id = %id, "Reply slot dropped before delivery");
                Err(DeliveryError::Abandoned { id })
            }
        }
    }

    /// Drop the waiter for `id` without delivering.
    ///
    /// Returns `true` only if this call removed the entry. `false` means a
    /// delivery (or an earlier cancel) already won.
    pub fn cancel(&self, id: CorrelationId) -> bool {
        if self.waiters.remove(&id).is_some() {
            self.stats.cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %id, "Cancelled waiter");
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, id: CorrelationId) -> bool {
        self.waiters.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.waiters.len()
    }

    pub fn stats(&self) -> WaiterStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for WaiterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
