//! # DL-01 Correlation
//!
//! Matches replies arriving on an independent read path with the callers
//! waiting for them.
//!
//! ## Components
//!
//! - [`IdSource`]: mints opaque 128-bit [`CorrelationId`]s
//! - [`WaiterRegistry`]: ID to single-use [`ReplySlot`], with atomic
//!   deliver/cancel
//! - [`RequestRegistry`]: ID to caller-defined in-flight metadata
//!
//! ```text
//!   caller                    WaiterRegistry                read path
//!     │  register() ──────────────▶ │                           │
//!     │ ◀──────────── (id, slot)    │                           │
//!     │  send(id, request) ───────────────────────▶ device      │
//!     │                             │ ◀──── deliver(id, bytes) ─┤
//!     │ ◀──── slot.recv() ──────────┤                           │
//! ```
//!
//! ## Usage
//!
//! ```
//! use dl_01_correlation::WaiterRegistry;
//!
//! let waiters = WaiterRegistry::new();
//! let (id, mut slot) = waiters.register();
//!
//! // ... request tagged with `id` goes out, reply comes back ...
//! waiters.deliver(id, &b"reply"[..]).unwrap();
//!
//! assert_eq!(&slot.try_recv().unwrap()[..], b"reply");
//! assert!(waiters.deliver(id, &b"duplicate"[..]).is_err());
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod id;
pub mod requests;
pub mod waiters;

pub use error::{DeliveryError, WaitError};
pub use id::{CorrelationId, IdSource, RandomIdSource, SequentialIdSource};
pub use requests::RequestRegistry;
pub use waiters::{ReplySlot, WaiterRegistry, WaiterStatsSnapshot};
