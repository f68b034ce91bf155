//! Correlation IDs and the sources that mint them.
//!
//! A correlation ID is 128 bits of randomness with no embedded meaning. It is
//! carried next to a request on the wire and echoed back by the device, which
//! is the only way a reply can be matched to the caller waiting for it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Opaque 128-bit identifier tagging one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Build from the raw 16 bytes found on the wire.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Build from a 128-bit integer.
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Parse the hyphenated text form produced by `Display`.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Raw bytes, in wire order.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<[u8; 16]> for CorrelationId {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<CorrelationId> for [u8; 16] {
    fn from(id: CorrelationId) -> Self {
        *id.as_bytes()
    }
}

/// Source of fresh correlation IDs.
///
/// Injected into the waiter registry so tests can swap in a deterministic
/// sequence instead of randomness.
pub trait IdSource: Send + Sync {
    /// Produce an ID that is not currently outstanding.
    fn next_id(&self) -> CorrelationId;
}

/// Draws all 128 bits from the thread-local CSPRNG.
///
/// Collisions are not detected; at 128 bits they are negligible.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> CorrelationId {
        CorrelationId::from_u128(rand::thread_rng().gen::<u128>())
    }
}

/// Deterministic counter-backed source, for tests and replays.
#[derive(Debug, Default)]
pub struct SequentialIdSource {
    next: AtomicU64,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting at `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> CorrelationId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        CorrelationId::from_u128(u128::from(n))
    }
}
