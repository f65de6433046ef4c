//! Store trait definition.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::CodecError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt store {path}: {reason} at offset {offset}")]
    Corrupt {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("Store {0} is already open")]
    Locked(PathBuf),

    #[error("Record too large: {0} bytes")]
    TooLarge(usize),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Ordered byte-keyed storage backing one table.
///
/// `keys` returns keys in ascending byte order. Implementations must be
/// `Send` so a table can be handed to a blocking load task.
pub trait Store: Send {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Insert or overwrite a value.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Remove a key. Returns whether it was present.
    fn delete(&mut self, key: &[u8]) -> Result<bool, StoreError>;

    fn keys(&self) -> Vec<Vec<u8>>;

    fn count(&self) -> usize;

    /// Make previous writes durable.
    fn flush(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
