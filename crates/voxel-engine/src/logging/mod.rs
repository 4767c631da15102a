//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the engine logs
//! through the standard `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};
