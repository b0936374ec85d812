//! ctxjson Common
//!
//! Shared utilities for the ctxjson serializer crates.
//!
//! This crate provides:
//! - Component-based structured logging with marshal-context tracking
//! - Logging configuration backed by `env_logger`

pub mod logging;

// Re-export logging types at the root level
pub use logging::{Component, LogLevel, Logger, LoggingConfig};
