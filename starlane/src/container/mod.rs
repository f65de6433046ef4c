//! GOMD bulk-import container.
//!
//! ```text
//! | "GOMD" | 8 hex digits: header length | header | record 0 | record 1 | ...
//! ```
//!
//! The header is a schema-encoded [`ContainerHeader`] naming the record kind
//! and the byte size of each record. All records in a container share one
//! kind.

mod header;
mod reader;
mod writer;

use thiserror::Error;

use crate::error::ErrorKind;
use crate::schema::{CodecError, MessageKind};

pub use header::{ContainerHeader, MAGIC, SIZE_PREFIX_LEN};
pub use reader::{ContainerReader, BUFFER_STEP};
pub use writer::ContainerWriter;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported file format (magic {0:02x?})")]
    BadMagic([u8; 4]),

    #[error("unable to parse header length: {0:?}")]
    BadSizePrefix(String),

    #[error("unable to parse header: {0}")]
    Header(#[source] CodecError),

    #[error("cannot load containers of kind {0}")]
    UnknownKind(u32),

    #[error("error reading entry {}: expected {expected} bytes: {source}", .index + 1)]
    ShortRead {
        index: usize,
        expected: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("error decoding entry {}: {source}", .index + 1)]
    Record {
        index: usize,
        #[source]
        source: CodecError,
    },

    #[error("{found} message in a {expected} container")]
    KindMismatch {
        expected: MessageKind,
        found: MessageKind,
    },

    #[error("header too large: {0} bytes")]
    HeaderTooLarge(usize),

    #[error("entry {} too large: {len} bytes", .index + 1)]
    RecordTooLarge { index: usize, len: usize },
}

impl ContainerError {
    /// Container errors are always fatal to the stream; the kind only
    /// describes them.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContainerError::UnknownKind(_) => ErrorKind::Unknown,
            _ => ErrorKind::Malformed,
        }
    }
}
