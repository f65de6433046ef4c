//! Named table handles.

use crate::error::{ErrorFilter, RegistryError};
use crate::schema::SchemaMessage;

use super::loader::{LoadAborted, LoadReport, TypedLoader};
use super::memory::MemoryStore;
use super::r#trait::{Store, StoreError};

/// One logical table: a name plus the store holding its records.
pub struct Table {
    name: String,
    store: Box<dyn Store>,
}

impl Table {
    pub fn new(name: impl Into<String>, store: impl Store + 'static) -> Self {
        Self {
            name: name.into(),
            store: Box::new(store),
        }
    }

    /// A table kept only in memory.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(name, MemoryStore::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.store.keys()
    }

    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        self.store.get(key)
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.store.put(key, value)
    }

    pub fn delete(&mut self, key: &[u8]) -> Result<bool, StoreError> {
        self.store.delete(key)
    }

    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.store.flush()
    }

    /// Store a message under its id key.
    pub fn put_message<M: SchemaMessage>(&mut self, message: &M) -> Result<(), StoreError> {
        let value = message.encode()?;
        self.store.put(&message.key(), &value)
    }

    /// Fetch and decode the message stored under `id`.
    pub fn get_message<M: SchemaMessage>(&self, id: u32) -> Result<Option<M>, StoreError> {
        match self.store.get(&id.to_le_bytes())? {
            Some(bytes) => Ok(Some(crate::schema::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Feed every stored record, in key order, through `loader`.
    ///
    /// Errors are passed through `filter`. A demoted error skips the record
    /// and leaves it in place. A fatal error deletes the record's key and
    /// stops the load.
    pub fn load_data<T>(
        &mut self,
        loader: &mut TypedLoader<'_, T>,
        filter: &ErrorFilter,
    ) -> Result<LoadReport, LoadAborted>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut loaded = 0;
        let mut skipped = 0;

        for key in self.store.keys() {
            let value = match self.store.get(&key) {
                Ok(Some(value)) => value,
                Ok(None) => continue,
                Err(err) => return Err(self.aborted(loaded, err.into())),
            };

            let err = match loader.load(&value) {
                Ok(()) => {
                    loaded += 1;
                    continue;
                }
                Err(err) => err,
            };

            match filter.filter(err) {
                Ok(()) => {
                    skipped += 1;
                    tracing::debug!(table = %self.name, key = %hex(&key), "Skipped record");
                }
                Err(err) => {
                    match self.store.delete(&key) {
                        Ok(_) => tracing::warn!(
                            table = %self.name,
                            key = %hex(&key),
                            error = %err,
                            "Deleted bad record"
                        ),
                        Err(delete_err) => tracing::error!(
                            table = %self.name,
                            key = %hex(&key),
                            error = %delete_err,
                            "Failed to delete bad record"
                        ),
                    }
                    return Err(self.aborted(loaded, err));
                }
            }
        }

        tracing::info!(table = %self.name, loaded, skipped, "Loaded table");
        Ok(LoadReport {
            table: self.name.clone(),
            loaded,
            skipped,
        })
    }

    fn aborted(&self, completed: usize, source: RegistryError) -> LoadAborted {
        LoadAborted {
            table: self.name.clone(),
            completed,
            source,
        }
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("count", &self.store.count())
            .finish()
    }
}

fn hex(key: &[u8]) -> String {
    key.iter().map(|b| format!("{:02x}", b)).collect()
}
