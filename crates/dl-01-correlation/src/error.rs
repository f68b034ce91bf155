//! Error types for reply correlation.

use crate::id::CorrelationId;
use thiserror::Error;

/// Why a reply could not be handed to a waiter.
///
/// Neither case is fatal: the reply feed logs and drops the payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No live waiter: already delivered, cancelled, or never registered.
    #[error("no waiter for correlation id {id} (unknown or already resolved)")]
    Unknown { id: CorrelationId },

    /// The waiter was removed by this delivery but its slot had been dropped.
    #[error("waiter for correlation id {id} was abandoned before the reply arrived")]
    Abandoned { id: CorrelationId },
}

impl DeliveryError {
    pub fn id(&self) -> CorrelationId {
        match self {
            Self::Unknown { id } | Self::Abandoned { id } => *id,
        }
    }
}

/// Why waiting on a reply slot ended without a payload.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    /// The registry entry was removed without a delivery.
    #[error("reply slot for correlation id {id} was closed without a reply")]
    Closed { id: CorrelationId },

    /// Nothing has been delivered yet.
    #[error("no reply yet for correlation id {id}")]
    Empty { id: CorrelationId },
}
