//! Logger backed by the `tracing` crate.

use crate::log::{LogLevel, Logger};
use std::fmt::Arguments;

/// Forwards every line to the matching `tracing` macro under the
/// `starlane::load` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, args: Arguments<'_>) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "starlane::load", "{}", args),
            LogLevel::Info => tracing::info!(target: "starlane::load", "{}", args),
            LogLevel::Warn => tracing::warn!(target: "starlane::load", "{}", args),
            LogLevel::Error => tracing::error!(target: "starlane::load", "{}", args),
        }
    }
}
