//! Base identity record shared by every entity.

use thiserror::Error;

use super::id::EntityId;

/// Errors raised while constructing an entity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    #[error("invalid id: {0}")]
    InvalidId(i64),

    #[error("empty name for id #{0}")]
    EmptyName(u32),
}

/// Id and display name of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbEntity {
    id: EntityId,
    name: String,
}

impl DbEntity {
    /// Build a record, trimming the name. Blank names are rejected.
    pub fn new(id: i64, name: &str) -> Result<Self, EntityError> {
        let id = EntityId::new(id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EntityError::EmptyName(id.get()));
        }
        Ok(Self {
            id,
            name: name.to_string(),
        })
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Case-folded name used by the registry name indexes.
    pub fn lookup_key(&self) -> String {
        lookup_key(&self.name)
    }

    pub(crate) fn rename(&mut self, name: &str) -> Result<(), EntityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EntityError::EmptyName(self.id.get()));
        }
        self.name = name.to_string();
        Ok(())
    }
}

/// Case-fold a name for index lookups.
pub(crate) fn lookup_key(name: &str) -> String {
    name.trim().to_lowercase()
}
