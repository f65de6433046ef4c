//! Warning sink used by the registry and loaders.
//!
//! Suppressed load errors are reported as `NOTE:` lines through a [`Logger`]
//! rather than straight to `tracing`. Production code shares a
//! [`TracingLogger`]; tests hand in a [`MemoryLogger`] and assert on the
//! lines it captured.
//!
//! ```
//! use starlane::log::{Logger, MemoryLogger};
//! use starlane::log_warn;
//! use std::sync::Arc;
//!
//! let sink = Arc::new(MemoryLogger::new());
//! let logger: Arc<dyn Logger> = sink.clone();
//! log_warn!(logger, "NOTE: {} skipped", "Sol");
//! assert_eq!(sink.messages(), vec!["NOTE: Sol skipped".to_string()]);
//! ```

mod memory;
mod tracing_adapter;
mod r#trait;

pub use memory::MemoryLogger;
pub use r#trait::{LogLevel, Logger};
pub use tracing_adapter::TracingLogger;
