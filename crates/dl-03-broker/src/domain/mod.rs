//! Domain types for the broker: configuration and errors.

pub mod config;
pub mod error;

pub use config::{BrokerConfig, ConfigError};
pub use error::{BrokerError, CodecError, FeedError};
