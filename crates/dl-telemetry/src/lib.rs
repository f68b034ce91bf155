//! # DL Telemetry
//!
//! Structured logging setup shared by the device-link crates. Library crates
//! only emit `tracing` events; binaries and test harnesses call
//! [`init_logging`] once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dl_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DL_SERVICE_NAME` | `device-link` | Service name logged at startup |
//! | `DL_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directive |
//! | `DL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `DL_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}
